pub mod accounts;
pub mod config;
pub mod date_range;
pub mod document;
pub mod error;
pub mod error_code;
pub mod models;
pub mod requests;
pub mod resume;
pub mod scheduler;

pub use config::{ConfigFile, RequestParams};
pub use date_range::DateRange;
pub use error::AppError;
pub use error_code::{ErrorCode, ErrorDescriptor, ErrorKind};
pub use models::{AdAccount, PlanEntry, Request, RequestDescriptor, RequestStatus, WorkItem};
pub use resume::ResumeState;
pub use scheduler::{WorkScheduler, plan_work, schedule};

/// Calendar date format used in configuration, state and messages.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// State `date` value recorded for dimension work items.
pub const DIMENSION_SENTINEL: &str = "dimension";
