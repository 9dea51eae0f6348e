use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::accounts::extract_ad_accounts;
use crate::date_range::DateRange;
use crate::error::AppError;
use crate::models::{AdAccount, Request, null_as_default};
use crate::requests::extract_requests;

/// Run parameters chosen by the parent process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestParams {
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub end_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub process_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<String>,
}

/// The configuration document handed to a connector run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFile {
    #[serde(default)]
    pub personnal_credentials: Option<Map<String, Value>>,
    #[serde(default)]
    pub connector_credentials: Option<Map<String, Value>>,
    /// Connector-specific section, shape varies between connectors.
    #[serde(default)]
    pub connector_conf: Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub request_params: RequestParams,
    #[serde(default, deserialize_with = "null_as_default")]
    pub process_id: String,
}

impl ConfigFile {
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        serde_json::from_str(json)
            .map_err(|e| AppError::ConfigError(format!("invalid configuration document: {e}")))
    }

    pub fn date_range(&self) -> Result<DateRange, AppError> {
        DateRange::parse(&self.request_params.start_date, &self.request_params.end_date)
    }

    pub fn requests(&self) -> Result<Vec<Request>, AppError> {
        extract_requests(&self.connector_conf)
    }

    pub fn ad_accounts(&self) -> Result<Vec<AdAccount>, AppError> {
        extract_ad_accounts(&self.connector_conf)
    }
}
