use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Whether a reported failure is final or may clear up on a later run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// `DEF`: the run cannot succeed without a configuration change.
    Definitive,
    /// `TMP`: the upstream platform was unavailable; retry later.
    Temporary,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Definitive => "DEF",
            ErrorKind::Temporary => "TMP",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Numeric error codes shared with the parent process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    AuthNotValid = 1000,
    InvalidRequest = 1010,
    InvalidData = 1020,
    NotFound = 1040,
    PermissionDenied = 1050,
    InvalidUpsert = 1060,
    InvalidDate = 1070,
    InvalidRequests = 1080,
    ApiUnavailable = 1090,
    UnableToStartProcess = 1100,
    CantInsertInDatawarehouse = 1200,
    ProcessedWithError = 1210,
    RateLimitExceeded = 2000,
    Timeout = 2010,
    ServiceUnavailable = 2020,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 15] = [
        ErrorCode::AuthNotValid,
        ErrorCode::InvalidRequest,
        ErrorCode::InvalidData,
        ErrorCode::NotFound,
        ErrorCode::PermissionDenied,
        ErrorCode::InvalidUpsert,
        ErrorCode::InvalidDate,
        ErrorCode::InvalidRequests,
        ErrorCode::ApiUnavailable,
        ErrorCode::UnableToStartProcess,
        ErrorCode::CantInsertInDatawarehouse,
        ErrorCode::ProcessedWithError,
        ErrorCode::RateLimitExceeded,
        ErrorCode::Timeout,
        ErrorCode::ServiceUnavailable,
    ];

    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Look up a known code by number.
    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Parse a code from a loosely-typed JSON value (number or numeric string).
    pub fn parse_value(value: &serde_json::Value) -> Option<u16> {
        match value {
            serde_json::Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
                .and_then(|n| u16::try_from(n).ok()),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Human label reported alongside the code.
    pub fn label(&self) -> &'static str {
        match self {
            ErrorCode::AuthNotValid => "Auth not valid",
            ErrorCode::InvalidRequest => "Invalid Request",
            ErrorCode::InvalidData => "Invalid Data",
            ErrorCode::NotFound => "Not Found",
            ErrorCode::PermissionDenied => "Permission Denied",
            ErrorCode::InvalidUpsert => "Invalid Upsert",
            ErrorCode::InvalidDate => "Invalid Date",
            ErrorCode::InvalidRequests => "Invalid Requests",
            ErrorCode::ApiUnavailable => "API Unavailable",
            ErrorCode::UnableToStartProcess => "Process start is disabled",
            ErrorCode::CantInsertInDatawarehouse => "Can't insert in Datawarehouse",
            ErrorCode::ProcessedWithError => "Processed with error",
            ErrorCode::RateLimitExceeded => "Rate Limit Exceeded",
            ErrorCode::Timeout => "Timeout",
            ErrorCode::ServiceUnavailable => "Service Unavailable",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorCode::RateLimitExceeded | ErrorCode::Timeout | ErrorCode::ServiceUnavailable => {
                ErrorKind::Temporary
            }
            _ => ErrorKind::Definitive,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Temporary
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for ErrorCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code: u16 = s
            .trim()
            .parse()
            .map_err(|_| format!("Invalid error code: {}", s))?;
        Self::from_code(code).ok_or_else(|| format!("Unknown error code: {}", code))
    }
}

/// Structured error attached to checkpoint messages.
///
/// The code is kept as a raw number so that connector-specific codes outside
/// the known table survive a round trip to the parent process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDescriptor {
    pub code: u16,
    /// Free-text detail supplied by the connector.
    pub details: Option<String>,
    /// Underlying cause, usually the source error's message.
    pub cause: Option<String>,
}

impl ErrorDescriptor {
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code: code.code(),
            details: None,
            cause: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    pub fn error_code(&self) -> Option<ErrorCode> {
        ErrorCode::from_code(self.code)
    }

    /// Label looked up from the code table.
    pub fn label(&self) -> &'static str {
        match self.error_code() {
            Some(code) => code.label(),
            None if self.code == 0 => "",
            None => "unknown error",
        }
    }
}

impl From<&crate::AppError> for ErrorDescriptor {
    fn from(err: &crate::AppError) -> Self {
        match err {
            crate::AppError::ConnectorFailed(descriptor) => descriptor.clone(),
            other => ErrorDescriptor::new(other.error_code()).with_cause(other.to_string()),
        }
    }
}

impl From<crate::AppError> for ErrorDescriptor {
    fn from(err: crate::AppError) -> Self {
        ErrorDescriptor::from(&err)
    }
}

impl fmt::Display for ErrorDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cause.as_deref().filter(|c| !c.is_empty()) {
            Some(cause) => write!(
                f,
                "code: {}, message: {}, cause: {}",
                self.code,
                self.label(),
                cause
            ),
            None => write!(f, "code: {}, message: {}", self.code, self.label()),
        }
    }
}

impl Serialize for ErrorDescriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a> {
            code: u16,
            message: &'static str,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<&'a str>,
            error: &'a str,
        }

        Wire {
            code: self.code,
            message: self.label(),
            details: self.details.as_deref(),
            error: self.cause.as_deref().unwrap_or_default(),
        }
        .serialize(serializer)
    }
}
