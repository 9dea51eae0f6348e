use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde_json::{Map, Value};

use conduit_core::{AppError, ConfigFile, ErrorDescriptor, ResumeState, WorkItem, plan_work};

use crate::emitter::Emitter;
use crate::loader::{load_config, load_credentials, load_state};
use crate::options::RuntimeOptions;

/// Everything a connector run starts from: its documents and its output.
pub struct Session {
    pub config: ConfigFile,
    pub state: HashMap<String, String>,
    pub credentials: Option<Map<String, Value>>,
    emitter: Emitter,
    last_checkpoint: Mutex<HashMap<String, String>>,
}

impl Session {
    /// Load the config, state and credentials documents named by `options`.
    pub fn load(options: &RuntimeOptions, emitter: Emitter) -> Result<Self, AppError> {
        let config = load_config(&options.resolve(&options.config_path))?;
        let state = load_state(&options.resolve(&options.state_path))?;
        let credentials = load_credentials(&options.resolve(&options.credentials_path));

        if options.mode.is_debug() {
            tracing::debug!(process_id = %config.process_id, params = ?config.request_params, "Config loaded");
            tracing::debug!(?state, "State loaded");
            if let Some(credentials) = &credentials {
                let keys: Vec<&str> = credentials.keys().map(String::as_str).collect();
                tracing::debug!(?keys, "Credentials loaded");
            }
        }

        Ok(Self::new(config, state, credentials, emitter))
    }

    pub fn new(
        config: ConfigFile,
        state: HashMap<String, String>,
        credentials: Option<Map<String, Value>>,
        emitter: Emitter,
    ) -> Self {
        let last_checkpoint = Mutex::new(state.clone());
        Self {
            config,
            state,
            credentials,
            emitter,
            last_checkpoint,
        }
    }

    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    pub fn resume_state(&self) -> ResumeState {
        ResumeState::from_map(&self.state)
    }

    /// Work items left to execute for this run.
    pub fn work_items(&self) -> Result<Vec<WorkItem>, AppError> {
        plan_work(&self.config, &self.resume_state())
    }

    /// Record and emit the checkpoint reached once `item` is done.
    pub fn checkpoint_after(&self, item: &WorkItem) -> Result<(), AppError> {
        let state = ResumeState::checkpoint_for(item);
        self.emitter.checkpoint(&state, None)?;
        *self
            .last_checkpoint
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = state;
        Ok(())
    }

    /// Last state recorded, initially the loaded state.
    pub fn last_checkpoint(&self) -> HashMap<String, String> {
        self.last_checkpoint
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Load a session and run `connector` against it.
///
/// A connector failure is reported as a checkpoint carrying the error and the
/// last recorded state, then returned as [`AppError::ConnectorFailed`].
pub fn process<F>(options: &RuntimeOptions, emitter: Emitter, connector: F) -> Result<(), AppError>
where
    F: FnOnce(&Session) -> Result<(), ErrorDescriptor>,
{
    let session = Session::load(options, emitter)?;
    tracing::info!(process_id = %session.config.process_id, "Process started");

    match connector(&session) {
        Ok(()) => {
            tracing::info!("Process finished");
            Ok(())
        }
        Err(descriptor) => {
            tracing::error!(code = descriptor.code, error = %descriptor, "Process failed");
            session
                .emitter
                .checkpoint(&session.last_checkpoint(), Some(&descriptor))?;
            Err(AppError::ConnectorFailed(descriptor))
        }
    }
}
