use std::collections::{BTreeMap, HashMap};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde_json::{Map, Value};

use conduit_core::date_range::parse_date;
use conduit_core::resume::STATE_DATE_KEY;
use conduit_core::{AppError, DIMENSION_SENTINEL, ErrorDescriptor, PlanEntry, WorkItem};

use crate::messages::{LogLevel, Message, timestamp};
use crate::options::OutputMode;

/// Shared, line-buffered output of the process.
pub type Sink = Arc<Mutex<Box<dyn Write + Send>>>;

/// Writes protocol messages, or their human rendering in debug mode.
#[derive(Clone)]
pub struct Emitter {
    sink: Sink,
    mode: OutputMode,
    credentials_file: PathBuf,
}

impl Emitter {
    pub fn new(writer: impl Write + Send + 'static, mode: OutputMode) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(writer))),
            mode,
            credentials_file: PathBuf::from("credentials.json"),
        }
    }

    pub fn stdout(mode: OutputMode) -> Self {
        Self::new(std::io::stdout(), mode)
    }

    /// File refreshed credentials are written to in debug mode.
    pub fn with_credentials_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_file = path.into();
        self
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Write one message as a JSON line.
    pub fn send(&self, message: &Message) -> Result<(), AppError> {
        let line = serde_json::to_string(message)?;
        let mut sink = self.sink.lock().unwrap_or_else(PoisonError::into_inner);
        writeln!(sink, "{line}")?;
        sink.flush()?;
        Ok(())
    }

    /// Report one output row.
    ///
    /// The row must carry a string `requestId`. The date is taken from the
    /// state: empty means a dimension row, anything else must be `YYYY-MM-DD`.
    pub fn processed(
        &self,
        row: &Map<String, Value>,
        state: &HashMap<String, String>,
    ) -> Result<(), AppError> {
        let request_id = row
            .get("requestId")
            .and_then(Value::as_str)
            .ok_or_else(|| AppError::InvalidUpsert("requestId missing from row".into()))?;

        let ad_account = ["accountId", "adAccount"]
            .iter()
            .find_map(|key| row.get(*key).and_then(Value::as_str))
            .unwrap_or_default();

        let date = match state.get(STATE_DATE_KEY).map(String::as_str) {
            None => "",
            Some("") | Some(DIMENSION_SENTINEL) => DIMENSION_SENTINEL,
            Some(date) if parse_date(date).is_some() => date,
            Some(date) => {
                return Err(AppError::InvalidUpsert(format!(
                    "invalid date in state: {date}"
                )));
            }
        };

        let payload = serde_json::to_vec(row)?;

        if self.mode.is_debug() {
            tracing::info!(
                %request_id,
                %ad_account,
                %date,
                row = %String::from_utf8_lossy(&payload),
                "Processed row"
            );
            return Ok(());
        }

        self.send(&Message::Processed {
            ad_account: ad_account.to_string(),
            request_id: request_id.to_string(),
            message: STANDARD.encode(&payload),
            date: date.to_string(),
        })
    }

    /// Log for the parent process, or for humans in debug mode.
    pub fn log(
        &self,
        level: LogLevel,
        msg: &str,
        fields: Map<String, Value>,
    ) -> Result<(), AppError> {
        if self.mode.is_debug() {
            let fields = Value::Object(fields);
            match level {
                LogLevel::Debug => tracing::debug!(%fields, "{msg}"),
                LogLevel::Info => tracing::info!(%fields, "{msg}"),
                LogLevel::Warn => tracing::warn!(%fields, "{msg}"),
                LogLevel::Error | LogLevel::Fatal => tracing::error!(%level, %fields, "{msg}"),
            }
            return Ok(());
        }

        self.send(&Message::Log {
            level,
            msg: msg.to_string(),
            fields,
            timestamp: timestamp(),
        })
    }

    /// Report the state reached, with the error that stopped the run if any.
    pub fn checkpoint(
        &self,
        state: &HashMap<String, String>,
        error: Option<&ErrorDescriptor>,
    ) -> Result<(), AppError> {
        let state: BTreeMap<String, String> = state
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        if self.mode.is_debug() {
            match error {
                None => tracing::info!(?state, "Checkpoint OK"),
                Some(err) => tracing::error!(
                    ?state,
                    code = err.code,
                    cause = err.cause.as_deref().unwrap_or_default(),
                    "{}",
                    err.details.as_deref().unwrap_or(err.label())
                ),
            }
            return Ok(());
        }

        self.send(&Message::Checkpoint {
            state,
            error: error.cloned(),
            timestamp: timestamp(),
        })
    }

    /// Hand refreshed credentials back to the parent process.
    pub fn credentials(&self, credentials: &Map<String, Value>) -> Result<(), AppError> {
        if self.mode.is_debug() {
            let pretty = serde_json::to_string_pretty(credentials)?;
            std::fs::write(&self.credentials_file, pretty)?;
            tracing::info!(path = %self.credentials_file.display(), "Credentials written");
            return Ok(());
        }

        self.send(&Message::Credentials {
            credentials: credentials.clone(),
            timestamp: timestamp(),
        })
    }

    /// Announce the work items left to execute.
    pub fn plan(&self, items: &[WorkItem]) -> Result<(), AppError> {
        self.send(&Message::Plan {
            msg: items.iter().map(PlanEntry::from).collect(),
        })
    }

    /// Dump `data` as pretty JSON to a local file, in debug mode only.
    ///
    /// A `.json` extension is appended when missing. Returns the written path.
    pub fn dump_to_file(
        &self,
        path: &Path,
        data: &impl Serialize,
    ) -> Result<Option<PathBuf>, AppError> {
        if !self.mode.is_debug() {
            return Ok(None);
        }

        let has_json_ext = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let path = if has_json_ext {
            path.to_path_buf()
        } else {
            let mut name = path.as_os_str().to_owned();
            name.push(".json");
            PathBuf::from(name)
        };

        let file = std::fs::File::create(&path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), data)?;
        Ok(Some(path))
    }
}
