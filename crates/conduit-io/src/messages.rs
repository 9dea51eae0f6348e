//! Line-delimited JSON messages read by the parent process.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

use conduit_core::{ErrorDescriptor, PlanEntry};

/// Severity of a `log` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<tracing::Level> for LogLevel {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::ERROR => LogLevel::Error,
            tracing::Level::WARN => LogLevel::Warn,
            tracing::Level::INFO => LogLevel::Info,
            _ => LogLevel::Debug,
        }
    }
}

/// One protocol message, serialized as a single JSON line.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Message {
    /// One output row.
    Processed {
        ad_account: String,
        request_id: String,
        /// Row JSON, base64-encoded outside debug mode.
        message: String,
        date: String,
    },
    Log {
        level: LogLevel,
        msg: String,
        fields: Map<String, Value>,
        timestamp: String,
    },
    Checkpoint {
        state: BTreeMap<String, String>,
        error: Option<ErrorDescriptor>,
        timestamp: String,
    },
    Credentials {
        credentials: Map<String, Value>,
        timestamp: String,
    },
    /// Work items left to execute.
    Plan { msg: Vec<PlanEntry> },
}

/// Current UTC time as RFC 3339 with second precision.
pub fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
