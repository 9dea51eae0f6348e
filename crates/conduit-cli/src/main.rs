use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use conduit_core::WorkScheduler;
use conduit_io::{Emitter, OutputMode, RuntimeOptions, Session, logging};

#[derive(Parser)]
#[command(name = "conduit", version, about = "Plan the work of an ad-platform connector run")]
struct Cli {
    /// Configuration document
    #[arg(long, global = true, env = "CONDUIT_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// Resume state document
    #[arg(long, global = true, env = "CONDUIT_STATE", default_value = "state.json")]
    state: PathBuf,

    /// Credentials document
    #[arg(
        long,
        global = true,
        env = "CONDUIT_CREDENTIALS",
        default_value = "credentials.json"
    )]
    credentials: PathBuf,

    /// Human-readable output instead of the stdout protocol
    #[arg(long, global = true, env = "CONDUIT_DEBUG", default_value_t = false)]
    debug: bool,

    /// Base directory for bare document names
    #[arg(long, global = true, env = "DATA_PATH")]
    data_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Commands {
    /// Emit the remaining work items as a plan message
    Plan,

    /// Print a summary of the run configuration
    Inspect,
}

impl Commands {
    /// Whether stdout carries protocol messages for this command.
    fn speaks_protocol(&self) -> bool {
        match self {
            Commands::Plan => true,
            Commands::Inspect => false,
        }
    }
}

impl Cli {
    fn runtime_options(&self) -> RuntimeOptions {
        RuntimeOptions {
            config_path: self.config.clone(),
            state_path: self.state.clone(),
            credentials_path: self.credentials.clone(),
            mode: OutputMode::from_debug_flag(self.debug),
            data_path: self.data_path.clone(),
        }
    }
}

fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let options = cli.runtime_options();

    let emitter = Emitter::stdout(options.mode)
        .with_credentials_file(options.resolve(&options.credentials_path));
    if cli.command.speaks_protocol() {
        logging::init(&emitter)?;
    } else {
        // stdout is reserved for the human summary
        logging::init(&Emitter::new(std::io::stderr(), options.mode))?;
    }

    let session = Session::load(&options, emitter).context("Failed to load run documents")?;

    match cli.command {
        Commands::Plan => cmd_plan(&session),
        Commands::Inspect => cmd_inspect(&session),
    }
}

fn cmd_plan(session: &Session) -> Result<()> {
    let items = session
        .work_items()
        .context("Failed to schedule work items")?;
    session.emitter().plan(&items)?;
    Ok(())
}

fn cmd_inspect(session: &Session) -> Result<()> {
    let scheduler =
        WorkScheduler::from_config(&session.config).context("Invalid run configuration")?;
    let resume = session.resume_state();

    println!("Process: {}", session.config.process_id);

    match (scheduler.dates().first(), scheduler.dates().last()) {
        (Some(first), Some(last)) => println!(
            "Dates: {} to {} ({} days)",
            first,
            last,
            scheduler.dates().len()
        ),
        _ => println!("Dates: none"),
    }

    println!("\nRequests ({}):", scheduler.requests().len());
    for request in scheduler.requests() {
        let kind = if request.is_dimension() {
            "dimension"
        } else {
            "metric"
        };
        println!("  {} [{}]", request.id(), kind);
    }

    println!("\nAd accounts ({}):", scheduler.accounts().len());
    for account in scheduler.accounts() {
        println!(
            "  {} {}",
            account.normalized_id().unwrap_or_default(),
            account.name
        );
    }

    if !resume.is_empty() {
        println!(
            "\nResuming from date={} requestId={}",
            resume.date.as_deref().unwrap_or("-"),
            resume.request_filter().unwrap_or("-")
        );
    }

    let items = scheduler
        .schedule(&resume)
        .context("Failed to schedule work items")?;
    println!("\nRemaining work items: {}", items.len());

    Ok(())
}
