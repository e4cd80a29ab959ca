//! Clipboard payloads and the large-paste classifier.

use serde::{Deserialize, Serialize};

use crate::attachment::FileAttachment;

/// Pastes with at least this many chars become artifact candidates.
pub const DEFAULT_PASTE_CHAR_THRESHOLD: usize = 1000;
/// Pastes with at least this many lines become artifact candidates.
pub const DEFAULT_PASTE_LINE_THRESHOLD: usize = 40;

/// What the clipboard carried when the user pasted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardPayload {
    Files(Vec<FileAttachment>),
    Text(String),
}

/// How a paste was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteOutcome {
    /// Let the host perform its default text insertion.
    InsertDefault,
    /// Default insertion suppressed; files were merged into the selection.
    FilesAttached { added: usize },
    /// Default insertion suppressed; the artifact form now holds the text.
    ArtifactPending,
    /// Nothing happened and default insertion is suppressed: a response is
    /// in progress, or a large paste arrived while a dialog or form is open.
    Ignored,
}

impl PasteOutcome {
    /// Whether the host must cancel its default paste behaviour.
    pub fn suppresses_default(self) -> bool {
        !matches!(self, Self::InsertDefault)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteKind {
    Small,
    Large,
}

/// Size-based classifier for pasted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasteClassifier {
    pub char_threshold: usize,
    pub line_threshold: usize,
}

impl Default for PasteClassifier {
    fn default() -> Self {
        Self {
            char_threshold: DEFAULT_PASTE_CHAR_THRESHOLD,
            line_threshold: DEFAULT_PASTE_LINE_THRESHOLD,
        }
    }
}

impl PasteClassifier {
    pub fn new(char_threshold: usize, line_threshold: usize) -> Self {
        Self {
            char_threshold,
            line_threshold,
        }
    }

    pub fn classify(&self, text: &str) -> PasteKind {
        let chars = text.chars().count();
        let lines = text.lines().count();
        if chars >= self.char_threshold || lines >= self.line_threshold {
            PasteKind::Large
        } else {
            PasteKind::Small
        }
    }

    pub fn is_large(&self, text: &str) -> bool {
        self.classify(text) == PasteKind::Large
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_inclusive() {
        let classifier = PasteClassifier::new(10, 100);
        assert_eq!(classifier.classify(&"a".repeat(9)), PasteKind::Small);
        assert_eq!(classifier.classify(&"a".repeat(10)), PasteKind::Large);
    }

    #[test]
    fn test_many_short_lines_are_large() {
        let classifier = PasteClassifier::new(10_000, 5);
        assert!(classifier.is_large("a\nb\nc\nd\ne"));
        assert!(!classifier.is_large("a\nb\nc\nd"));
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        let classifier = PasteClassifier::new(4, 100);
        assert!(!classifier.is_large("日本語"));
    }

    #[test]
    fn test_outcome_suppression() {
        assert!(!PasteOutcome::InsertDefault.suppresses_default());
        assert!(PasteOutcome::ArtifactPending.suppresses_default());
        assert!(PasteOutcome::FilesAttached { added: 0 }.suppresses_default());
        assert!(PasteOutcome::Ignored.suppresses_default());
    }
}
