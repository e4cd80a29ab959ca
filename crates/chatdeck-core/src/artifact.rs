//! Artifacts created from large pasted text.
//!
//! A paste that is too large to inline is offered to the user as an artifact:
//! a named, typed file stored by the backend and shown as a badge next to the
//! input until the message is sent.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// File-like payload sent to the backend's artifact endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactUpload {
    /// File name including extension (e.g. `notes.md`)
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
    pub description: Option<String>,
}

/// Reference returned by the backend for a stored artifact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactRef {
    pub uri: String,
    /// Set when the upload had to create a session first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Badge shown under the input for an artifact saved from a paste.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PastedArtifactItem {
    pub id: String,
    pub artifact: ArtifactRef,
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

impl PastedArtifactItem {
    pub fn new(artifact: ArtifactRef, display_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            artifact,
            display_name: display_name.into(),
            created_at: Utc::now(),
        }
    }
}

/// MIME type picked in the artifact form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MimeChoice {
    /// Detect from the pasted content
    #[default]
    Auto,
    Explicit(String),
}

impl MimeChoice {
    /// Parses the form value; `"auto"` (any case) and blank mean detection.
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("auto") {
            Self::Auto
        } else {
            Self::Explicit(trimmed.to_string())
        }
    }

    pub fn resolve(&self, content: &str) -> String {
        match self {
            Self::Auto => detect_text_mime(content).to_string(),
            Self::Explicit(mime) => mime.clone(),
        }
    }
}

/// Guesses a MIME type for pasted text.
pub fn detect_text_mime(content: &str) -> &'static str {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return "text/plain";
    }

    if (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_str::<serde_json::Value>(trimmed).is_ok()
    {
        return "application/json";
    }

    if trimmed.starts_with("<?xml") {
        return "application/xml";
    }

    if trimmed.starts_with('<') && trimmed.ends_with('>') && trimmed.contains("</") {
        let lower = trimmed.to_lowercase();
        const HTML_MARKERS: [&str; 5] = ["<!doctype html", "<html", "<body", "<div", "<p>"];
        if HTML_MARKERS.iter().any(|marker| lower.contains(marker)) {
            return "text/html";
        }
        return "application/xml";
    }

    if looks_like_markdown(trimmed) {
        return "text/markdown";
    }

    if looks_like_csv(trimmed) {
        return "text/csv";
    }

    "text/plain"
}

fn looks_like_markdown(text: &str) -> bool {
    text.lines().any(|line| {
        let line = line.trim_start();
        line.starts_with("# ")
            || line.starts_with("## ")
            || line.starts_with("### ")
            || line.starts_with("```")
            || line.starts_with("- [ ]")
            || line.starts_with("> ")
    })
}

fn looks_like_csv(text: &str) -> bool {
    let rows: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    if rows.len() < 2 {
        return false;
    }
    let columns = rows[0].matches(',').count();
    columns > 0 && rows.iter().all(|row| row.matches(',').count() == columns)
}

/// File extension used when naming an artifact of the given MIME type.
pub fn extension_for_mime(mime: &str) -> &'static str {
    match mime {
        "application/json" => "json",
        "application/xml" => "xml",
        "text/html" => "html",
        "text/markdown" => "md",
        "text/csv" => "csv",
        "text/x-rust" => "rs",
        "text/x-python" => "py",
        "application/javascript" => "js",
        "application/typescript" => "ts",
        "text/css" => "css",
        _ => "txt",
    }
}

/// Builds the upload for a pasted block.
///
/// The title becomes the file stem; a blank title falls back to `pasted-text`.
/// A title that already ends with the right extension is kept as is.
pub fn build_artifact_upload(
    title: &str,
    mime: &MimeChoice,
    description: Option<String>,
    content: &str,
) -> ArtifactUpload {
    let mime_type = mime.resolve(content);
    let extension = extension_for_mime(&mime_type);
    let stem = match title.trim() {
        "" => "pasted-text",
        other => other,
    };
    let name = if stem.ends_with(&format!(".{extension}")) {
        stem.to_string()
    } else {
        format!("{stem}.{extension}")
    };

    ArtifactUpload {
        name,
        mime_type,
        data: content.as_bytes().to_vec(),
        description: description.filter(|d| !d.trim().is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_json() {
        assert_eq!(detect_text_mime("{\"a\": [1, 2]}"), "application/json");
        assert_eq!(detect_text_mime("[1, 2"), "text/plain");
    }

    #[test]
    fn test_detect_markup() {
        assert_eq!(detect_text_mime("<?xml version=\"1.0\"?><a></a>"), "application/xml");
        assert_eq!(detect_text_mime("<html><body>hi</body></html>"), "text/html");
        assert_eq!(detect_text_mime("<note><to>x</to></note>"), "application/xml");
    }

    #[test]
    fn test_detect_markdown_and_csv() {
        assert_eq!(detect_text_mime("# Title\n\nbody"), "text/markdown");
        assert_eq!(detect_text_mime("a,b,c\n1,2,3\n4,5,6"), "text/csv");
        assert_eq!(detect_text_mime("just some words"), "text/plain");
    }

    #[test]
    fn test_mime_choice_parse() {
        assert_eq!(MimeChoice::parse("AUTO"), MimeChoice::Auto);
        assert_eq!(MimeChoice::parse(""), MimeChoice::Auto);
        assert_eq!(
            MimeChoice::parse(" text/x-rust "),
            MimeChoice::Explicit("text/x-rust".to_string())
        );
    }

    #[test]
    fn test_build_upload_names_file_from_title() {
        let upload = build_artifact_upload("notes", &MimeChoice::Auto, None, "# Heading");
        assert_eq!(upload.name, "notes.md");
        assert_eq!(upload.mime_type, "text/markdown");
        assert_eq!(upload.data, b"# Heading".to_vec());

        let upload = build_artifact_upload(
            "  ",
            &MimeChoice::Explicit("application/json".into()),
            Some("  ".into()),
            "{}",
        );
        assert_eq!(upload.name, "pasted-text.json");
        assert!(upload.description.is_none());
    }

    #[test]
    fn test_build_upload_keeps_existing_extension() {
        let upload = build_artifact_upload("data.csv", &MimeChoice::Auto, None, "a,b\n1,2");
        assert_eq!(upload.name, "data.csv");
    }
}
