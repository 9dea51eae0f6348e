use std::path::{Path, PathBuf};

/// How the process talks to the outside world.
///
/// Threaded explicitly through the loader, the emitter and the logging setup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Line-delimited JSON on stdout for the parent process.
    #[default]
    Machine,
    /// Human-readable logs on stderr, raw payloads, local files.
    Debug,
}

impl OutputMode {
    pub fn from_debug_flag(debug: bool) -> Self {
        if debug {
            OutputMode::Debug
        } else {
            OutputMode::Machine
        }
    }

    pub fn is_debug(&self) -> bool {
        *self == OutputMode::Debug
    }
}

/// Locations of the run documents and the output mode.
#[derive(Debug, Clone)]
pub struct RuntimeOptions {
    pub config_path: PathBuf,
    pub state_path: PathBuf,
    pub credentials_path: PathBuf,
    pub mode: OutputMode,
    /// Base directory for bare file names (`DATA_PATH`).
    pub data_path: Option<PathBuf>,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from("config.json"),
            state_path: PathBuf::from("state.json"),
            credentials_path: PathBuf::from("credentials.json"),
            mode: OutputMode::Machine,
            data_path: None,
        }
    }
}

impl RuntimeOptions {
    /// Defaults with `data_path` read from `DATA_PATH`.
    pub fn from_env() -> Self {
        Self {
            data_path: std::env::var_os("DATA_PATH").map(PathBuf::from),
            ..Self::default()
        }
    }

    pub fn with_mode(mut self, mode: OutputMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_data_path(mut self, data_path: impl Into<PathBuf>) -> Self {
        self.data_path = Some(data_path.into());
        self
    }

    /// Resolve a document path.
    ///
    /// Bare file names are looked up under `data_path`; absolute paths, paths
    /// with a directory part, and every path in debug mode are used as given.
    pub fn resolve(&self, name: &Path) -> PathBuf {
        let has_dir = name.parent().is_some_and(|p| !p.as_os_str().is_empty());
        if self.mode.is_debug() || name.is_absolute() || has_dir {
            return name.to_path_buf();
        }
        match self.data_path.as_deref() {
            Some(base) if !base.as_os_str().is_empty() => base.join(name),
            _ => name.to_path_buf(),
        }
    }
}
