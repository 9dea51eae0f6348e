pub mod emitter;
pub mod loader;
pub mod logging;
pub mod messages;
pub mod options;
pub mod session;

pub use emitter::{Emitter, Sink};
pub use loader::{load_config, load_credentials, load_state};
pub use messages::{LogLevel, Message};
pub use options::{OutputMode, RuntimeOptions};
pub use session::{Session, process};
