use chrono::NaiveDate;
use serde_json::{Value, json};

use conduit_core::{ConfigFile, WorkItem};

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

/// Wrapped request entry, as the platform sends it.
pub fn metric(id: &str) -> Value {
    json!({"connectorsaccountrequest": {"id": id, "isDimension": false, "status": 200}})
}

pub fn dimension(id: &str) -> Value {
    json!({"connectorsaccountrequest": {"id": id, "isDimension": true, "status": 200}})
}

/// Configuration document with the given connector section and date range.
pub fn config(connector_conf: Value, start: &str, end: &str) -> ConfigFile {
    ConfigFile::from_json(
        &json!({
            "connectorConf": connector_conf,
            "requestParams": {"start_date": start, "end_date": end, "process_type": "daily"},
            "processId": "it"
        })
        .to_string(),
    )
    .unwrap()
}

/// `(request id, date, account id)` triples, `-` for missing parts.
pub fn triples(items: &[WorkItem]) -> Vec<(String, String, String)> {
    items
        .iter()
        .map(|item| {
            (
                item.request_id().to_string(),
                item.date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".into()),
                item.ad_account_id.clone().unwrap_or_else(|| "-".into()),
            )
        })
        .collect()
}

pub fn triple(request: &str, date: &str, account: &str) -> (String, String, String) {
    (request.into(), date.into(), account.into())
}
