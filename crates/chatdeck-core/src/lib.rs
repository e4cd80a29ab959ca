//! Domain layer of ChatDeck: the types, pure rules and ports behind the chat input.

pub mod artifact;
pub mod attachment;
pub mod draft;
pub mod error;
pub mod overlay;
pub mod paste;
pub mod prompt;
pub mod session;
pub mod signal;
pub mod view;

// Re-export common error type
pub use error::{ChatDeckError, Result};
