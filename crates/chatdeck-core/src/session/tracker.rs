/// Result of observing the active session id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionTransition {
    /// Same id as before (including staying unset).
    Unchanged,
    /// First id observed after mount; not a change.
    Initial(String),
    /// A defined id was replaced by a different one, or cleared.
    Changed {
        from: String,
        to: Option<String>,
    },
}

impl SessionTransition {
    /// Whether transient input state must be reset.
    pub fn requires_reset(&self) -> bool {
        matches!(self, Self::Changed { .. })
    }
}

/// Remembers the last session id seen so id updates can be classified.
#[derive(Debug, Clone, Default)]
pub struct SessionTracker {
    current: Option<String>,
}

impl SessionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn observe(&mut self, next: Option<&str>) -> SessionTransition {
        let transition = match (self.current.as_deref(), next) {
            (None, None) => SessionTransition::Unchanged,
            (None, Some(to)) => SessionTransition::Initial(to.to_string()),
            (Some(from), Some(to)) if from == to => SessionTransition::Unchanged,
            (Some(from), to) => SessionTransition::Changed {
                from: from.to_string(),
                to: to.map(str::to_string),
            },
        };
        self.current = next.map(str::to_string);
        transition
    }
}
