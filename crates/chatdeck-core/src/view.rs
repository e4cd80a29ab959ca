//! Requests for the view, honoured after the next render commits.

/// Work the host performs once the render reflecting the latest state is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEffect {
    FocusInput,
    ScrollToBottom,
}

/// FIFO of pending view effects; an effect already queued is not queued twice.
#[derive(Debug, Default)]
pub struct ViewEffects {
    queue: Vec<ViewEffect>,
}

impl ViewEffects {
    pub fn push(&mut self, effect: ViewEffect) {
        if !self.queue.contains(&effect) {
            self.queue.push(effect);
        }
    }

    /// Called from the host's "render committed" hook.
    pub fn drain(&mut self) -> Vec<ViewEffect> {
        std::mem::take(&mut self.queue)
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_collapse_until_drained() {
        let mut effects = ViewEffects::default();
        effects.push(ViewEffect::FocusInput);
        effects.push(ViewEffect::ScrollToBottom);
        effects.push(ViewEffect::FocusInput);
        assert_eq!(effects.drain(), vec![ViewEffect::FocusInput, ViewEffect::ScrollToBottom]);
        assert!(effects.is_empty());
        effects.push(ViewEffect::FocusInput);
        assert_eq!(effects.drain(), vec![ViewEffect::FocusInput]);
    }
}
