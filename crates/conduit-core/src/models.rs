use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::AppError;

/// Deserialize an explicit JSON `null` as the type's default, like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Status code of a configured request.
///
/// Kept as an open numeric value: only codes strictly between
/// [`RequestStatus::DISABLED`] and [`RequestStatus::ERROR`] are schedulable,
/// which leaves room for intermediate statuses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestStatus(pub i64);

impl RequestStatus {
    pub const DISABLED: RequestStatus = RequestStatus(100);
    pub const ENABLED: RequestStatus = RequestStatus(200);
    pub const ERROR: RequestStatus = RequestStatus(300);

    pub fn is_schedulable(&self) -> bool {
        *self > Self::DISABLED && *self < Self::ERROR
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Typed descriptor of a request as configured on the connector account.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, rename = "isDimension", deserialize_with = "null_as_default")]
    pub is_dimension: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: RequestStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, rename = "isPrebuild", deserialize_with = "null_as_default")]
    pub is_prebuild: bool,
    /// Output table schema, kept opaque until [`Request::table_schema`].
    #[serde(default)]
    pub schema: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_domain: Option<String>,
    /// Data granularity, e.g. `daily`, `event`, `snapshot`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grain: Option<String>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub sample_questions: Vec<String>,
    /// Fields this model does not name (e.g. an account id set on the descriptor).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A normalized, schedulable request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Request {
    pub descriptor: RequestDescriptor,
    /// Free-form `request` payload of the wrapper, preserved unparsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
}

impl Request {
    pub fn new(descriptor: RequestDescriptor, payload: Option<serde_json::Value>) -> Self {
        Self {
            descriptor,
            payload,
        }
    }

    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    pub fn is_dimension(&self) -> bool {
        self.descriptor.is_dimension
    }

    pub fn status(&self) -> RequestStatus {
        self.descriptor.status
    }

    /// Decode the opaque schema into its typed form.
    pub fn table_schema(&self) -> Result<TableSchema, AppError> {
        if self.descriptor.schema.is_null() {
            return Ok(TableSchema::default());
        }
        TableSchema::deserialize(&self.descriptor.schema).map_err(|e| {
            AppError::MalformedConfig(format!("schema of request {}: {e}", self.id()))
        })
    }
}

/// Output table layout produced by a request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    #[serde(default, deserialize_with = "null_as_default")]
    pub table_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ordered_fields: Vec<OrderedField>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderedField {
    #[serde(default, deserialize_with = "null_as_default")]
    pub field_path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub field_src: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub database_meta_data: FieldMetadata,
}

/// Warehouse metadata of a single output column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldMetadata {
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(deserialize_with = "null_as_default")]
    pub format: String,
    #[serde(deserialize_with = "null_as_default")]
    pub is_metric: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub is_quanti_date: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub managed: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub quanti_field: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub quanti_id: bool,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub field_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(rename = "business_name", skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    /// One of `id`, `dimension`, `metric`, `date`, `currency_micro`.
    #[serde(rename = "semantic_type", skip_serializing_if = "Option::is_none")]
    pub semantic_type: Option<String>,
    #[serde(rename = "format_hint", skip_serializing_if = "Option::is_none")]
    pub format_hint: Option<String>,
    #[serde(rename = "is_pii", deserialize_with = "null_as_default")]
    pub is_pii: bool,
}

/// An ad account configured on the connector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdAccount {
    #[serde(
        default,
        rename = "account_id",
        alias = "accountId",
        deserialize_with = "null_as_default"
    )]
    pub account_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

impl AdAccount {
    /// `account_id` when set, else `id`, else `None`.
    pub fn normalized_id(&self) -> Option<&str> {
        [self.account_id.as_str(), self.id.as_str()]
            .into_iter()
            .find(|id| !id.is_empty())
    }
}

/// The atomic unit of scheduled work.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    pub request: Request,
    /// `None` exactly when the request is a dimension.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_account_id: Option<String>,
    /// Resolved account object; may be missing even when an id is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_account: Option<AdAccount>,
}

impl WorkItem {
    pub fn request_id(&self) -> &str {
        self.request.id()
    }

    /// Date as reported in state and protocol messages.
    pub fn date_label(&self) -> String {
        match self.date {
            Some(date) => date.format(crate::DATE_FORMAT).to_string(),
            None => crate::DIMENSION_SENTINEL.to_string(),
        }
    }
}

/// One entry of the `plan` protocol message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanEntry {
    pub request_id: String,
    pub date: String,
    pub account_id: String,
}

impl From<&WorkItem> for PlanEntry {
    fn from(item: &WorkItem) -> Self {
        Self {
            request_id: item.request_id().to_string(),
            date: item.date_label(),
            account_id: item.ad_account_id.clone().unwrap_or_default(),
        }
    }
}
