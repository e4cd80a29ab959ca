//! Error types for the ChatDeck crates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fallback shown to the user when the backend error payload carries no usable message.
pub const GENERIC_BACKEND_ERROR: &str = "The server returned an unexpected error";

/// A shared error type for the chat input stack.
///
/// Guard failures (a disabled submit, a paste while responding) are not errors
/// and never produce one of these. Every variant here is recoverable: the
/// controller turns it into a single notification and returns to an editable state.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ChatDeckError {
    /// The backend answered with a structured error payload.
    #[error("Backend error: {message}")]
    Backend { message: String },

    /// Transport failure (connection refused, timeout, non-JSON body)
    #[error("Network error: {0}")]
    Network(String),

    /// User input rejected before any backend call
    #[error("Validation error: {0}")]
    Validation(String),

    /// IO error (reading attachments from disk, config files)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChatDeckError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Backend error, substituting the generic fallback for a blank message.
    pub fn backend(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            Self::Backend {
                message: GENERIC_BACKEND_ERROR.to_string(),
            }
        } else {
            Self::Backend { message }
        }
    }

    /// Creates a Network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// One-line text suitable for a toast notification.
    ///
    /// Backend and validation messages are shown as-is; everything else keeps
    /// its category prefix.
    pub fn user_message(&self) -> String {
        match self {
            Self::Backend { message } => message.clone(),
            Self::Validation(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for ChatDeckError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ChatDeckError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ChatDeckError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for ChatDeckError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, ChatDeckError>`.
pub type Result<T> = std::result::Result<T, ChatDeckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_backend_message_uses_fallback() {
        let err = ChatDeckError::backend("   ");
        assert_eq!(err.user_message(), GENERIC_BACKEND_ERROR);
        assert!(err.is_backend());
    }

    #[test]
    fn test_user_message_keeps_backend_text() {
        let err = ChatDeckError::backend("Quota exceeded");
        assert_eq!(err.user_message(), "Quota exceeded");

        let err = ChatDeckError::network("connection refused");
        assert_eq!(err.user_message(), "Network error: connection refused");
    }

    #[test]
    fn test_io_conversion_records_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ChatDeckError = io.into();
        match err {
            ChatDeckError::Io { message } => assert!(message.contains("NotFound")),
            other => panic!("unexpected variant: {other:?}"),
        }
    }
}
