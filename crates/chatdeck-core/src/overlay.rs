//! The single overlay that may drive the input at any time.

use crate::prompt::PromptGroup;

/// Where the text produced by the variable dialog goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertionTarget {
    /// Replace the `/`-token ending at the cursor.
    SlashToken,
    /// Replace the whole draft (prompt carried in by navigation).
    Draft,
}

/// State of the variable-substitution dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDialog {
    pub group: PromptGroup,
    pub variables: Vec<String>,
    pub target: InsertionTarget,
}

/// Exactly one of these is active; switching replaces the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActiveOverlay {
    #[default]
    None,
    SlashCommand,
    VariableDialog(VariableDialog),
    /// Artifact form holding the raw pasted text awaiting save or discard.
    ArtifactForm { pending_content: String },
}

/// Discriminant of [`ActiveOverlay`] for cheap comparisons and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    None,
    SlashCommand,
    VariableDialog,
    ArtifactForm,
}

impl ActiveOverlay {
    pub fn kind(&self) -> OverlayKind {
        match self {
            Self::None => OverlayKind::None,
            Self::SlashCommand => OverlayKind::SlashCommand,
            Self::VariableDialog(_) => OverlayKind::VariableDialog,
            Self::ArtifactForm { .. } => OverlayKind::ArtifactForm,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn is_slash_command(&self) -> bool {
        matches!(self, Self::SlashCommand)
    }

    pub fn pending_paste(&self) -> Option<&str> {
        match self {
            Self::ArtifactForm { pending_content } => Some(pending_content),
            _ => None,
        }
    }

    pub fn variable_dialog(&self) -> Option<&VariableDialog> {
        match self {
            Self::VariableDialog(dialog) => Some(dialog),
            _ => None,
        }
    }

    /// Closes whatever is open and returns it.
    pub fn take(&mut self) -> ActiveOverlay {
        std::mem::take(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_resets_to_none() {
        let mut overlay = ActiveOverlay::ArtifactForm {
            pending_content: "text".to_string(),
        };
        assert_eq!(overlay.pending_paste(), Some("text"));
        let previous = overlay.take();
        assert_eq!(previous.kind(), OverlayKind::ArtifactForm);
        assert!(overlay.is_none());
        assert_eq!(overlay.pending_paste(), None);
    }
}
