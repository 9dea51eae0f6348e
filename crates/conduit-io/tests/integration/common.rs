use std::io::Write;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tempfile::TempDir;

use conduit_io::{Emitter, OutputMode, RuntimeOptions};

/// Captures everything written to the protocol stream.
#[derive(Clone, Default)]
pub struct Captured(Arc<Mutex<Vec<u8>>>);

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Captured {
    pub fn messages(&self) -> Vec<Value> {
        let raw = String::from_utf8(self.0.lock().unwrap().clone()).unwrap();
        raw.lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }
}

/// A data directory holding the given run documents.
pub fn data_dir(config: &Value, state: Option<&Value>) -> (TempDir, RuntimeOptions) {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("config.json"), config.to_string()).unwrap();
    if let Some(state) = state {
        std::fs::write(tmp.path().join("state.json"), state.to_string()).unwrap();
    }
    let options = RuntimeOptions::default().with_data_path(tmp.path());
    (tmp, options)
}

pub fn machine_emitter() -> (Emitter, Captured) {
    let captured = Captured::default();
    (Emitter::new(captured.clone(), OutputMode::Machine), captured)
}
