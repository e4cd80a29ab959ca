//! Unified path management for ChatDeck files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/chatdeck/          # Config directory (platform default)
//! └── config.toml              # Application configuration
//! ```

use std::path::PathBuf;

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for chatdeck_core::ChatDeckError {
    fn from(err: PathError) -> Self {
        chatdeck_core::ChatDeckError::config(err.to_string())
    }
}

const APP_DIR_NAME: &str = "chatdeck";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Path resolution for ChatDeck.
pub struct ChatDeckPaths;

impl ChatDeckPaths {
    /// Returns the ChatDeck configuration directory (e.g. `~/.config/chatdeck/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path of `config.toml`.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_lives_in_app_dir() {
        if let Ok(path) = ChatDeckPaths::config_file() {
            assert!(path.ends_with("chatdeck/config.toml"));
        }
    }
}
