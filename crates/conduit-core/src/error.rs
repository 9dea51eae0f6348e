use thiserror::Error;

use crate::error_code::{ErrorCode, ErrorDescriptor};

/// Application-wide error types for Conduit.
#[derive(Error, Debug)]
pub enum AppError {
    /// A start/end date is not a `YYYY-MM-DD` calendar date.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// The start date falls after the end date.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: String, end: String },

    /// A request or account section is present but has the wrong shape.
    #[error("Malformed configuration: {0}")]
    MalformedConfig(String),

    /// The `date` key of the resume state is not a calendar date.
    #[error("Invalid resume date: {0}")]
    InvalidResumeDate(String),

    /// A configuration, state or credentials file could not be loaded.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A processed row or its state cannot be turned into a protocol message.
    #[error("Invalid upsert: {0}")]
    InvalidUpsert(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Writing to the output sink or a local file failed.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The connector reported a failure while processing its work items.
    #[error("Connector failed: {0}")]
    ConnectorFailed(ErrorDescriptor),
}

impl AppError {
    /// Returns true if this error is transient and worth retrying.
    ///
    /// Failures produced by this crate come from the inputs of the run, so only
    /// connector failures carrying a temporary code are retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::ConnectorFailed(descriptor) => descriptor
                .error_code()
                .is_some_and(|code| code.is_retryable()),
            _ => false,
        }
    }

    /// Protocol error code reported in checkpoint messages for this error.
    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::InvalidDate(_)
            | AppError::InvalidRange { .. }
            | AppError::InvalidResumeDate(_) => ErrorCode::InvalidDate,
            AppError::MalformedConfig(_) => ErrorCode::InvalidRequests,
            AppError::InvalidUpsert(_) | AppError::SerializationError(_) => {
                ErrorCode::InvalidUpsert
            }
            AppError::ConfigError(_) | AppError::IoError(_) => ErrorCode::UnableToStartProcess,
            AppError::ConnectorFailed(descriptor) => descriptor
                .error_code()
                .unwrap_or(ErrorCode::ProcessedWithError),
        }
    }
}
