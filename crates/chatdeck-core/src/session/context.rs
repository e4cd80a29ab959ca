//! Ports implemented by the host application.

use async_trait::async_trait;

use crate::artifact::{ArtifactRef, ArtifactUpload};
use crate::attachment::FileAttachment;
use crate::error::Result;
use crate::session::Notification;

/// The chat session the input talks to.
///
/// The host owns the responding flag and the active session id; the input
/// only reads them.
#[async_trait]
pub trait SessionContext: Send + Sync {
    /// True while the backend is producing a response.
    fn is_responding(&self) -> bool;

    /// Id of the active session, if one exists yet.
    fn session_id(&self) -> Option<String>;

    /// Sends a message with its attachments.
    async fn submit(&self, files: Vec<FileAttachment>, message: String) -> Result<()>;

    /// Cancels the response stream in progress.
    async fn cancel(&self) -> Result<()>;

    /// Stores a file-like object as a session artifact.
    async fn upload_artifact(
        &self,
        upload: ArtifactUpload,
        session_id: Option<String>,
    ) -> Result<ArtifactRef>;

    /// Asks the artifact list to reload.
    async fn refresh_artifacts(&self);

    /// Shows a notification to the user.
    fn notify(&self, notification: Notification);
}

/// Navigation into the template-authoring flow.
pub trait TemplateNavigator: Send + Sync {
    fn open_template_authoring(&self, instruction: String);
}
