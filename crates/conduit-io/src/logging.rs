//! Tracing setup.
//!
//! In machine mode every tracing event becomes a `log` message on the
//! protocol stream. In debug mode events are formatted on stderr.

use std::fmt;

use serde_json::{Map, Value};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use conduit_core::AppError;

use crate::emitter::Emitter;
use crate::messages::LogLevel;

/// Forwards tracing events to an [`Emitter`] as `log` messages.
pub struct ProtocolLayer {
    emitter: Emitter,
}

impl ProtocolLayer {
    pub fn new(emitter: Emitter) -> Self {
        Self { emitter }
    }
}

impl<S: Subscriber> Layer<S> for ProtocolLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let level = LogLevel::from(*event.metadata().level());
        // Nowhere left to report a failing sink.
        let _ = self.emitter.log(level, &visitor.message, visitor.fields);
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: String,
    fields: Map<String, Value>,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        if field.name() == "message" {
            self.message = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::from(format!("{value:?}")));
    }
}

/// Install the global subscriber for the emitter's output mode.
///
/// `RUST_LOG` overrides the default `info` (`debug` in debug mode) level.
pub fn init(emitter: &Emitter) -> Result<(), AppError> {
    let debug = emitter.mode().is_debug();
    let default_level = if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let console = debug.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
    });
    let protocol = (!debug).then(|| ProtocolLayer::new(emitter.clone()));

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(protocol)
        .try_init()
        .map_err(|e| AppError::ConfigError(format!("Failed to install tracing subscriber: {e}")))
}
