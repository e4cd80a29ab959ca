//! The state machine behind the message input.
//!
//! The controller owns everything the user is composing (draft, selected files,
//! pasted-artifact badges, the pending paste) and the single active overlay.
//! Network work goes through the host's [`SessionContext`]; the controller never
//! retries and turns every failure into exactly one notification.

use std::sync::Arc;

use chatdeck_core::artifact::{MimeChoice, PastedArtifactItem, build_artifact_upload};
use chatdeck_core::attachment::{FileAttachment, SelectedFiles};
use chatdeck_core::draft::{self, Draft};
use chatdeck_core::error::{ChatDeckError, Result};
use chatdeck_core::overlay::{ActiveOverlay, InsertionTarget, OverlayKind, VariableDialog};
use chatdeck_core::paste::{ClipboardPayload, PasteClassifier, PasteKind, PasteOutcome};
use chatdeck_core::prompt::{
    PendingPrompt, PromptGroup, ReservedCommand, VariableValues, build_create_template_instruction,
    missing_variables, substitute_variables,
};
use chatdeck_core::session::{
    Notification, SessionContext, SessionTracker, SessionTransition, TemplateNavigator,
};
use chatdeck_core::signal::{AppSignal, quote_selection};
use chatdeck_core::view::{ViewEffect, ViewEffects};

use crate::signal_bus::SignalSubscription;

/// Orchestrates the chat input: local edits, paste routing, and submission.
///
/// All handlers take `&mut self` and run to completion; the only suspension
/// points are the awaits on the session context.
pub struct ChatInputController {
    session: Arc<dyn SessionContext>,
    navigator: Arc<dyn TemplateNavigator>,
    classifier: PasteClassifier,
    draft: Draft,
    files: SelectedFiles,
    pasted_artifacts: Vec<PastedArtifactItem>,
    overlay: ActiveOverlay,
    session_tracker: SessionTracker,
    was_responding: bool,
    effects: ViewEffects,
}

impl ChatInputController {
    /// Creates a controller with the default paste thresholds.
    pub fn new(session: Arc<dyn SessionContext>, navigator: Arc<dyn TemplateNavigator>) -> Self {
        Self::with_classifier(session, navigator, PasteClassifier::default())
    }

    pub fn with_classifier(
        session: Arc<dyn SessionContext>,
        navigator: Arc<dyn TemplateNavigator>,
        classifier: PasteClassifier,
    ) -> Self {
        let mut session_tracker = SessionTracker::new();
        session_tracker.observe(session.session_id().as_deref());
        let was_responding = session.is_responding();

        Self {
            session,
            navigator,
            classifier,
            draft: Draft::new(),
            files: SelectedFiles::new(),
            pasted_artifacts: Vec::new(),
            overlay: ActiveOverlay::None,
            session_tracker,
            was_responding,
            effects: ViewEffects::default(),
        }
    }

    // ============================================================================
    // State accessors
    // ============================================================================

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn files(&self) -> &SelectedFiles {
        &self.files
    }

    pub fn pasted_artifacts(&self) -> &[PastedArtifactItem] {
        &self.pasted_artifacts
    }

    pub fn overlay(&self) -> &ActiveOverlay {
        &self.overlay
    }

    pub fn is_slash_popover_open(&self) -> bool {
        self.overlay.is_slash_command()
    }

    pub fn pending_paste(&self) -> Option<&str> {
        self.overlay.pending_paste()
    }

    /// Text typed after the active `/`, while the popover is open.
    pub fn slash_query(&self) -> Option<&str> {
        if !self.overlay.is_slash_command() {
            return None;
        }
        draft::slash_query(self.draft.text(), self.draft.cursor())
    }

    /// Submit is available only when idle and there is something to send.
    pub fn can_submit(&self) -> bool {
        !self.session.is_responding() && (!self.draft.is_blank() || !self.files.is_empty())
    }

    /// Effects to run once the host has committed the render for the current state.
    pub fn drain_view_effects(&mut self) -> Vec<ViewEffect> {
        self.effects.drain()
    }

    // ============================================================================
    // Text input
    // ============================================================================

    /// Records a keystroke-level edit and updates the slash popover.
    pub fn on_text_change(&mut self, value: impl Into<String>, cursor: usize) {
        self.draft.set(value, cursor);
        let text = self.draft.text();
        let cursor = self.draft.cursor();

        if draft::is_slash_trigger(text, cursor) {
            match self.overlay.kind() {
                OverlayKind::None => {
                    tracing::debug!("[ChatInput] Opening slash command popover");
                    self.overlay = ActiveOverlay::SlashCommand;
                }
                OverlayKind::SlashCommand => {}
                other => {
                    tracing::debug!(
                        "[ChatInput] Slash trigger ignored while {:?} is active",
                        other
                    );
                }
            }
        } else if self.overlay.is_slash_command()
            && !draft::text_before_cursor(text, cursor).contains('/')
        {
            tracing::debug!("[ChatInput] Closing slash command popover");
            self.overlay = ActiveOverlay::None;
        }
    }

    pub fn close_slash_popover(&mut self) {
        if self.overlay.is_slash_command() {
            self.overlay = ActiveOverlay::None;
        }
    }

    /// Appends speech-to-text output to the draft.
    pub fn on_transcription(&mut self, transcript: &str) {
        self.draft.append_transcription(transcript);
        self.effects.push(ViewEffect::FocusInput);
    }

    pub fn set_context(&mut self, context: Option<String>) {
        self.draft.set_context(context);
    }

    pub fn clear_context(&mut self) {
        self.draft.set_context(None);
    }

    // ============================================================================
    // Paste, picker and drop
    // ============================================================================

    /// Routes a clipboard paste.
    ///
    /// The returned outcome tells the host whether to cancel its default
    /// insertion (see [`PasteOutcome::suppresses_default`]).
    pub fn on_paste(&mut self, payload: ClipboardPayload) -> PasteOutcome {
        if self.session.is_responding() {
            tracing::debug!("[ChatInput] Paste ignored while responding");
            return PasteOutcome::Ignored;
        }

        match payload {
            ClipboardPayload::Files(files) => {
                let added = self.merge_files("paste", files);
                PasteOutcome::FilesAttached { added }
            }
            ClipboardPayload::Text(text) => match self.classifier.classify(&text) {
                PasteKind::Small => PasteOutcome::InsertDefault,
                PasteKind::Large if !self.can_open_overlay() => {
                    tracing::debug!(
                        "[ChatInput] Large paste ignored while {:?} is active",
                        self.overlay.kind()
                    );
                    PasteOutcome::Ignored
                }
                PasteKind::Large => {
                    tracing::info!(
                        "[ChatInput] Large paste ({} chars) held for artifact creation",
                        text.chars().count()
                    );
                    self.overlay = ActiveOverlay::ArtifactForm {
                        pending_content: text,
                    };
                    PasteOutcome::ArtifactPending
                }
            },
        }
    }

    pub fn on_files_picked(&mut self, files: Vec<FileAttachment>) -> usize {
        if self.session.is_responding() {
            return 0;
        }
        self.merge_files("picker", files)
    }

    pub fn on_files_dropped(&mut self, files: Vec<FileAttachment>) -> usize {
        if self.session.is_responding() {
            return 0;
        }
        self.merge_files("drop", files)
    }

    fn merge_files(&mut self, source: &str, files: Vec<FileAttachment>) -> usize {
        let offered = files.len();
        let added = self.files.merge(files);
        tracing::debug!(
            "[ChatInput] {} file(s) from {}: {} added, {} duplicate(s)",
            offered,
            source,
            added,
            offered - added
        );
        added
    }

    pub fn remove_file(&mut self, index: usize) -> Option<FileAttachment> {
        self.files.remove(index)
    }

    pub fn remove_pasted_artifact(&mut self, id: &str) -> bool {
        let before = self.pasted_artifacts.len();
        self.pasted_artifacts.retain(|item| item.id != id);
        self.pasted_artifacts.len() != before
    }

    /// Takes the pending paste out of the artifact form, closing it.
    fn take_pending_paste(&mut self) -> Option<String> {
        if !matches!(self.overlay, ActiveOverlay::ArtifactForm { .. }) {
            return None;
        }
        match self.overlay.take() {
            ActiveOverlay::ArtifactForm { pending_content } => Some(pending_content),
            _ => None,
        }
    }

    /// Drops the pending paste without uploading it.
    pub fn discard_pending_paste(&mut self) -> Option<String> {
        self.take_pending_paste()
    }

    /// Saves the pending paste as a backend artifact.
    ///
    /// The pending paste is released before the upload starts, so the form is
    /// closed on every path. On failure one error notification is emitted and
    /// `None` is returned.
    pub async fn save_pasted_artifact(
        &mut self,
        title: &str,
        mime: MimeChoice,
        description: Option<String>,
    ) -> Option<PastedArtifactItem> {
        let Some(content) = self.take_pending_paste() else {
            tracing::warn!("[ChatInput] save_pasted_artifact called without pending paste");
            return None;
        };

        let upload = build_artifact_upload(title, &mime, description, &content);
        let display_name = upload.name.clone();
        tracing::info!(
            "[ChatInput] Uploading pasted content as '{}' ({})",
            upload.name,
            upload.mime_type
        );

        let session_id = self.session.session_id();
        match self.session.upload_artifact(upload, session_id).await {
            Ok(artifact) => {
                let item = PastedArtifactItem::new(artifact, display_name);
                self.pasted_artifacts.push(item.clone());
                self.session.refresh_artifacts().await;
                self.effects.push(ViewEffect::FocusInput);
                Some(item)
            }
            Err(e) => {
                tracing::error!("[ChatInput] Artifact upload failed: {}", e);
                self.session.notify(Notification::error(
                    "Failed to save pasted content",
                    e.user_message(),
                ));
                self.effects.push(ViewEffect::FocusInput);
                None
            }
        }
    }

    // ============================================================================
    // Submission
    // ============================================================================

    /// Sends the draft and selected files.
    ///
    /// Returns `false` without touching the backend when submit is disabled.
    /// On success the input is left empty; on failure the draft and files are
    /// kept so the user can retry.
    pub async fn submit(&mut self) -> bool {
        if !self.can_submit() {
            tracing::debug!("[ChatInput] Submit ignored: nothing to send or responding");
            return false;
        }

        let message = self.draft.compose_message();
        let files = self.files.as_slice().to_vec();
        tracing::info!(
            "[ChatInput] Submitting message ({} chars, {} file(s))",
            message.chars().count(),
            files.len()
        );

        match self.session.submit(files, message).await {
            Ok(()) => {
                self.draft.clear();
                self.files.clear();
                self.pasted_artifacts.clear();
                self.close_slash_popover();
                self.effects.push(ViewEffect::ScrollToBottom);
                true
            }
            Err(e) => {
                tracing::error!("[ChatInput] Submit failed: {}", e);
                self.session
                    .notify(Notification::error("Failed to send message", e.user_message()));
                self.effects.push(ViewEffect::FocusInput);
                false
            }
        }
    }

    /// Stops the response stream in progress.
    pub async fn cancel_response(&mut self) {
        if !self.session.is_responding() {
            return;
        }
        if let Err(e) = self.session.cancel().await {
            tracing::error!("[ChatInput] Cancel failed: {}", e);
            self.session
                .notify(Notification::error("Failed to cancel response", e.user_message()));
        }
    }

    /// Host notification that the responding flag changed.
    pub fn on_responding_changed(&mut self, responding: bool) {
        if self.was_responding && !responding {
            self.effects.push(ViewEffect::FocusInput);
        }
        self.was_responding = responding;
    }

    // ============================================================================
    // Prompts and commands
    // ============================================================================

    /// Replaces the `/`-token before the cursor with `prompt_text`.
    pub fn select_prompt_command(&mut self, prompt_text: &str) {
        let (text, cursor) =
            draft::replace_slash_token(self.draft.text(), self.draft.cursor(), prompt_text);
        self.draft.set(text, cursor);
        self.close_slash_popover();
        self.effects.push(ViewEffect::FocusInput);
    }

    /// Selects a prompt group from the popover, asking for variables when needed.
    ///
    /// Returns `false` and changes nothing while the variable dialog or the
    /// artifact form is open.
    pub fn select_prompt_group(&mut self, group: PromptGroup) -> bool {
        if !self.can_open_overlay() {
            tracing::debug!(
                "[ChatInput] Prompt '{}' ignored while {:?} is active",
                group.name,
                self.overlay.kind()
            );
            return false;
        }

        let variables = group.variables();
        if variables.is_empty() {
            self.select_prompt_command(&group.prompt_text);
            return true;
        }

        tracing::debug!(
            "[ChatInput] Prompt '{}' needs {} variable(s)",
            group.name,
            variables.len()
        );
        self.overlay = ActiveOverlay::VariableDialog(VariableDialog {
            group,
            variables,
            target: InsertionTarget::SlashToken,
        });
        true
    }

    /// Fills the open variable dialog and inserts the resulting prompt.
    ///
    /// Every variable needs a non-blank value; otherwise the dialog stays open.
    pub fn submit_variables(&mut self, values: &VariableValues) -> Result<String> {
        let dialog = self
            .overlay
            .variable_dialog()
            .ok_or_else(|| ChatDeckError::validation("No prompt is waiting for variables"))?;

        let missing = missing_variables(&dialog.group.prompt_text, values);
        if !missing.is_empty() {
            return Err(ChatDeckError::validation(format!(
                "Missing values for: {}",
                missing.join(", ")
            )));
        }

        let ActiveOverlay::VariableDialog(dialog) = self.overlay.take() else {
            return Err(ChatDeckError::internal("variable dialog vanished"));
        };
        let prompt = substitute_variables(&dialog.group.prompt_text, values);

        match dialog.target {
            InsertionTarget::SlashToken => {
                let (text, cursor) =
                    draft::replace_slash_token(self.draft.text(), self.draft.cursor(), &prompt);
                self.draft.set(text, cursor);
            }
            InsertionTarget::Draft => self.draft.set_text(prompt.clone()),
        }
        self.effects.push(ViewEffect::FocusInput);
        Ok(prompt)
    }

    /// Closes the variable dialog without touching the draft.
    pub fn cancel_variables(&mut self) {
        if self.overlay.variable_dialog().is_some() {
            self.overlay = ActiveOverlay::None;
            self.effects.push(ViewEffect::FocusInput);
        }
    }

    /// Applies a prompt carried in by navigation, consuming it.
    ///
    /// While the variable dialog or the artifact form is open the prompt is
    /// left in `state` for a later call.
    pub fn apply_router_state(&mut self, state: &mut Option<PendingPrompt>) -> bool {
        if state.is_none() {
            return false;
        }
        if !self.can_open_overlay() {
            tracing::debug!(
                "[ChatInput] Router prompt deferred while {:?} is active",
                self.overlay.kind()
            );
            return false;
        }
        let Some(pending) = state.take() else {
            return false;
        };

        let group = pending.into_group();
        let variables = group.variables();
        if variables.is_empty() {
            self.draft.set_text(group.prompt_text);
        } else {
            self.overlay = ActiveOverlay::VariableDialog(VariableDialog {
                group,
                variables,
                target: InsertionTarget::Draft,
            });
        }
        self.effects.push(ViewEffect::FocusInput);
        true
    }

    /// Runs a reserved popover command instead of inserting a prompt.
    pub fn on_reserved_command(&mut self, command: ReservedCommand, transcript: Option<&str>) {
        match command {
            ReservedCommand::CreateTemplate => {
                let instruction = build_create_template_instruction(transcript);
                tracing::info!("[ChatInput] Handing off to template authoring");
                self.navigator.open_template_authoring(instruction);
            }
        }
        self.draft.clear_text();
        self.close_slash_popover();
    }

    // ============================================================================
    // Session and signals
    // ============================================================================

    /// Observes the active session id; a real change resets the input.
    pub fn on_session_changed(&mut self, session_id: Option<&str>) -> SessionTransition {
        let transition = self.session_tracker.observe(session_id);
        if let SessionTransition::Changed { from, to } = &transition {
            tracing::info!(
                "[ChatInput] Session changed {} -> {:?}, resetting input",
                from,
                to
            );
            self.reset_transient_state();
        }
        transition
    }

    /// Only the slash popover may be replaced by another overlay.
    fn can_open_overlay(&self) -> bool {
        matches!(self.overlay.kind(), OverlayKind::None | OverlayKind::SlashCommand)
    }

    fn reset_transient_state(&mut self) {
        self.draft.clear();
        self.files.clear();
        self.pasted_artifacts.clear();
        self.overlay = ActiveOverlay::None;
    }

    /// Reacts to an application-level signal.
    pub async fn handle_signal(&mut self, signal: AppSignal) {
        match signal {
            AppSignal::FocusChatInput => self.effects.push(ViewEffect::FocusInput),
            AppSignal::FollowUpQuestion {
                selected_text,
                prompt,
                auto_submit,
            } => {
                let prompt = prompt.filter(|p| !p.trim().is_empty());
                if let Some(prompt) = &prompt {
                    self.draft.set_text(prompt.clone());
                }
                self.draft.set_context(Some(quote_selection(&selected_text)));

                if auto_submit && prompt.is_some() {
                    tracing::debug!("[ChatInput] Auto-submitting follow-up question");
                    self.submit().await;
                } else {
                    self.effects.push(ViewEffect::FocusInput);
                }
            }
        }
    }

    /// Handles every signal already queued on `subscription` without waiting.
    pub async fn drain_signals(&mut self, subscription: &mut SignalSubscription) -> usize {
        let mut handled = 0;
        while let Some(signal) = subscription.try_recv() {
            self.handle_signal(signal).await;
            handled += 1;
        }
        handled
    }
}
