use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::Path;

use serde_json::{Map, Value};

use conduit_core::{AppError, ConfigFile};

/// Load and parse the configuration document.
pub fn load_config(path: &Path) -> Result<ConfigFile, AppError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        AppError::ConfigError(format!("Failed to read config file {}: {e}", path.display()))
    })?;
    serde_json::from_str(&raw).map_err(|e| {
        AppError::ConfigError(format!("Invalid JSON in config file {}: {e}", path.display()))
    })
}

/// Load the flat resume state. A missing file is an empty state.
pub fn load_state(path: &Path) -> Result<HashMap<String, String>, AppError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No state file, starting fresh");
            return Ok(HashMap::new());
        }
        Err(e) => {
            return Err(AppError::ConfigError(format!(
                "Failed to read state file {}: {e}",
                path.display()
            )));
        }
    };
    serde_json::from_str(&raw).map_err(|e| {
        AppError::ConfigError(format!("Invalid JSON in state file {}: {e}", path.display()))
    })
}

/// Load the optional credentials document.
///
/// Credentials are not required to start a run: any problem is logged and
/// treated as "no credentials".
pub fn load_credentials(path: &Path) -> Option<Map<String, Value>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read credentials file");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(credentials) => Some(credentials),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring invalid credentials file");
            None
        }
    }
}
