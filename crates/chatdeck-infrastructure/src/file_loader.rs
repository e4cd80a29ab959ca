//! Reads files from disk into attachments.

use chatdeck_core::attachment::FileAttachment;
use chatdeck_core::{ChatDeckError, Result};
use chrono::{DateTime, Utc};
use std::path::Path;

/// Loads a file as an attachment; the MIME type is guessed from the extension.
pub async fn load_attachment(path: &Path) -> Result<FileAttachment> {
    let metadata = tokio::fs::metadata(path).await?;
    if !metadata.is_file() {
        return Err(ChatDeckError::validation(format!(
            "Not a regular file: {}",
            path.display()
        )));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            ChatDeckError::validation(format!("Path has no file name: {}", path.display()))
        })?;

    let last_modified = metadata
        .modified()
        .map(|time| DateTime::<Utc>::from(time).timestamp_millis())
        .unwrap_or(0);

    let mime_type = mime_guess::from_path(path).first_or_octet_stream().to_string();
    let data = tokio::fs::read(path).await?;

    tracing::debug!(
        "[FileLoader] Loaded {} ({} bytes, {})",
        name,
        data.len(),
        mime_type
    );

    Ok(FileAttachment::from_bytes(name, mime_type, last_modified, data))
}

/// Reads a UTF-8 text file, e.g. to stand in for clipboard text.
pub async fn load_text(path: &Path) -> Result<String> {
    Ok(tokio::fs::read_to_string(path).await?)
}
