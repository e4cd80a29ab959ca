//! Infrastructure adapters for ChatDeck: configuration on disk, the HTTP
//! session backend and attachment loading.

pub mod config;
pub mod file_loader;
pub mod http_session;
pub mod paths;

pub use config::{ApiConfig, ChatDeckConfig, ConfigService, LogConfig};
pub use file_loader::load_attachment;
pub use http_session::{HttpSession, SessionEvent};
pub use paths::ChatDeckPaths;
