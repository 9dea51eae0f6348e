//! Typed views over the loosely-typed connector section of a configuration.
//!
//! The connector section is arbitrary JSON written by several generations of
//! tooling. Rather than scattering key lookups through the crate, every key
//! the SDK understands is read through an accessor here.

use serde_json::{Map, Value};

use crate::error::AppError;

/// Key wrapping the typed descriptor inside a request wrapper.
pub const DESCRIPTOR_KEY: &str = "connectorsaccountrequest";

/// Key holding the free-form payload of a request wrapper.
pub const PAYLOAD_KEY: &str = "request";

/// Field names accepted as an explicit ad account id, in lookup order.
///
/// A bare `id` is deliberately absent: it names the request itself.
pub const ACCOUNT_ID_KEYS: [&str; 8] = [
    "adaccount",
    "adAccount",
    "ad_account",
    "adaccount_id",
    "adAccountId",
    "ad_account_id",
    "account_id",
    "accountId",
];

/// Read-only view over the `connectorConf` section.
#[derive(Debug, Clone, Copy)]
pub struct ConnectorConf<'a> {
    map: Option<&'a Map<String, Value>>,
}

impl<'a> ConnectorConf<'a> {
    /// Wrap a connector section. `null` is treated as an empty section.
    pub fn new(value: &'a Value) -> Result<Self, AppError> {
        match value {
            Value::Null => Ok(Self { map: None }),
            Value::Object(map) => Ok(Self { map: Some(map) }),
            other => Err(AppError::MalformedConfig(format!(
                "connector configuration must be an object, got {}",
                json_type(other)
            ))),
        }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.map?.get(key).filter(|v| !v.is_null())
    }

    /// Items of the collection shape (`requests`), if configured.
    pub fn requests(&self) -> Result<&'a [Value], AppError> {
        match self.get("requests") {
            None => Ok(Default::default()),
            Some(Value::Array(items)) => Ok(items.as_slice()),
            Some(other) => Err(AppError::MalformedConfig(format!(
                "requests is not a list (got {})",
                json_type(other)
            ))),
        }
    }

    /// The singular wrapper (`request`), if configured.
    pub fn request(&self) -> Option<&'a Value> {
        self.get("request")
    }

    /// Items of the `adaccounts` list.
    ///
    /// The key is matched case-insensitively; an exact `adaccounts` key wins.
    pub fn ad_accounts(&self) -> Result<&'a [Value], AppError> {
        let value = self.get("adaccounts").or_else(|| {
            self.map?
                .iter()
                .find(|(k, v)| k.eq_ignore_ascii_case("adaccounts") && !v.is_null())
                .map(|(_, v)| v)
        });
        match value {
            None => Ok(Default::default()),
            Some(Value::Array(items)) => Ok(items.as_slice()),
            Some(other) => Err(AppError::MalformedConfig(format!(
                "adaccounts is not a list (got {})",
                json_type(other)
            ))),
        }
    }
}

/// A request wrapper, or a legacy item that is the descriptor itself.
#[derive(Debug, Clone, Copy)]
pub struct RequestWrapper<'a> {
    value: &'a Value,
    map: &'a Map<String, Value>,
}

impl<'a> RequestWrapper<'a> {
    /// Returns `None` when the item is not an object.
    pub fn new(value: &'a Value) -> Option<Self> {
        value.as_object().map(|map| Self { value, map })
    }

    /// The typed descriptor: the nested one when present, else the item itself.
    pub fn descriptor(&self) -> &'a Value {
        self.map.get(DESCRIPTOR_KEY).unwrap_or(self.value)
    }

    /// Free-form payload carried next to the descriptor.
    pub fn payload(&self) -> Option<&'a Value> {
        self.map.get(PAYLOAD_KEY).filter(|v| !v.is_null())
    }
}

/// First non-empty string among [`ACCOUNT_ID_KEYS`] in `map`.
pub fn explicit_account_id(map: &Map<String, Value>) -> Option<&str> {
    ACCOUNT_ID_KEYS
        .iter()
        .filter_map(|key| map.get(*key))
        .filter_map(Value::as_str)
        .find(|id| !id.is_empty())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
