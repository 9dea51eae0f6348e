use std::collections::HashMap;

use chrono::NaiveDate;

use crate::DIMENSION_SENTINEL;
use crate::date_range::parse_date;
use crate::error::AppError;
use crate::models::WorkItem;

/// State key holding the last processed date.
pub const STATE_DATE_KEY: &str = "date";

/// State key holding the last processed request id.
pub const STATE_REQUEST_ID_KEY: &str = "requestId";

/// Last processed position of an interrupted run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResumeState {
    /// `YYYY-MM-DD` or [`DIMENSION_SENTINEL`].
    pub date: Option<String>,
    pub request_id: Option<String>,
}

impl ResumeState {
    pub fn new(date: Option<&str>, request_id: Option<&str>) -> Self {
        Self {
            date: date.filter(|d| !d.is_empty()).map(str::to_string),
            request_id: request_id.filter(|r| !r.is_empty()).map(str::to_string),
        }
    }

    /// Read the flat state document. Empty values count as absent.
    pub fn from_map(state: &HashMap<String, String>) -> Self {
        Self::new(
            state.get(STATE_DATE_KEY).map(String::as_str),
            state.get(STATE_REQUEST_ID_KEY).map(String::as_str),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.date.is_none() && self.request_id.is_none()
    }

    /// Date floor of the run, `None` when absent or set to the dimension sentinel.
    pub fn date_filter(&self) -> Result<Option<NaiveDate>, AppError> {
        match self.date.as_deref() {
            None | Some(DIMENSION_SENTINEL) => Ok(None),
            Some(raw) => parse_date(raw)
                .map(Some)
                .ok_or_else(|| AppError::InvalidResumeDate(raw.to_string())),
        }
    }

    pub fn request_filter(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// State to persist once `item` has been completed.
    ///
    /// Resuming from it starts again at `item`.
    pub fn checkpoint_for(item: &WorkItem) -> HashMap<String, String> {
        HashMap::from([
            (STATE_DATE_KEY.to_string(), item.date_label()),
            (
                STATE_REQUEST_ID_KEY.to_string(),
                item.request_id().to_string(),
            ),
        ])
    }
}
