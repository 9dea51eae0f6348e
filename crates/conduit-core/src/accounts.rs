use std::collections::HashSet;

use serde::Deserialize;
use serde_json::Value;

use crate::document::ConnectorConf;
use crate::error::AppError;
use crate::models::AdAccount;

/// Extract the usable ad accounts from a connector section.
///
/// Input order is kept. Entries without a resolvable identifier are dropped,
/// and so are later entries whose identifier was already seen.
pub fn extract_ad_accounts(connector_conf: &Value) -> Result<Vec<AdAccount>, AppError> {
    let conf = ConnectorConf::new(connector_conf)?;
    Ok(normalize_ad_accounts(conf.ad_accounts()?.iter().filter_map(
        |item| match AdAccount::deserialize(item) {
            Ok(account) => Some(account),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping undecodable ad account");
                None
            }
        },
    )))
}

/// Drop accounts without an identifier and de-duplicate by identifier.
pub fn normalize_ad_accounts(accounts: impl IntoIterator<Item = AdAccount>) -> Vec<AdAccount> {
    let mut seen = HashSet::new();
    accounts
        .into_iter()
        .filter(|account| match account.normalized_id() {
            Some(id) => seen.insert(id.to_string()),
            None => {
                tracing::debug!(name = %account.name, "Skipping ad account without identifier");
                false
            }
        })
        .collect()
}
