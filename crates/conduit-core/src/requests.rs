use serde::Deserialize;
use serde_json::Value;

use crate::document::{ConnectorConf, RequestWrapper};
use crate::error::AppError;
use crate::models::{Request, RequestDescriptor};

/// Extract the schedulable requests from a connector section.
///
/// Collection items (`requests`) come first, then the singular `request`.
/// Items that are not objects, do not decode as a descriptor, or are not
/// enabled are skipped without failing the whole section.
pub fn extract_requests(connector_conf: &Value) -> Result<Vec<Request>, AppError> {
    let conf = ConnectorConf::new(connector_conf)?;

    let requests: Vec<Request> = conf
        .requests()?
        .iter()
        .chain(conf.request())
        .enumerate()
        .filter_map(|(position, item)| normalize(position, item))
        .collect();

    tracing::info!(count = requests.len(), "Requests loaded");
    Ok(requests)
}

fn normalize(position: usize, item: &Value) -> Option<Request> {
    let Some(wrapper) = RequestWrapper::new(item) else {
        tracing::debug!(position, "Skipping request item that is not an object");
        return None;
    };

    let descriptor = match RequestDescriptor::deserialize(wrapper.descriptor()) {
        Ok(descriptor) => descriptor,
        Err(e) => {
            tracing::debug!(position, error = %e, "Skipping undecodable request item");
            return None;
        }
    };

    if !descriptor.status.is_schedulable() {
        tracing::debug!(
            position,
            id = %descriptor.id,
            status = %descriptor.status,
            "Skipping request that is not enabled"
        );
        return None;
    }

    Some(Request::new(descriptor, wrapper.payload().cloned()))
}
