//! HttpSession - JSON-over-HTTP implementation of [`SessionContext`].
//!
//! Endpoints (relative to `api.base_url`):
//! - `POST /artifacts` stores a pasted artifact
//! - `POST /sessions/{id}/messages` sends a message with base64 file bytes
//! - `POST /sessions/{id}/cancel` stops the response in progress
//!
//! Everything the host has to render (notifications, responding flag, replies)
//! is forwarded as [`SessionEvent`]s over an unbounded channel.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chatdeck_core::artifact::{ArtifactRef, ArtifactUpload};
use chatdeck_core::attachment::FileAttachment;
use chatdeck_core::session::{Notification, SessionContext};
use chatdeck_core::{ChatDeckError, Result};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::config::ApiConfig;

/// Something the host should react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Notification(Notification),
    RespondingChanged(bool),
    /// The artifact list is stale.
    ArtifactsChanged,
    /// The backend created a session while storing an artifact.
    SessionAssigned(String),
    Reply(String),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireFile<'a> {
    name: &'a str,
    size: u64,
    last_modified: i64,
    mime_type: &'a str,
    data: String,
}

impl<'a> WireFile<'a> {
    fn from_attachment(file: &'a FileAttachment) -> Self {
        Self {
            name: &file.name,
            size: file.size,
            last_modified: file.last_modified,
            mime_type: &file.mime_type,
            data: BASE64.encode(&file.data),
        }
    }
}

#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
    message: String,
    files: Vec<WireFile<'a>>,
}

#[derive(Debug, Default, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    reply: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ArtifactRequest {
    name: String,
    mime_type: String,
    data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    session_id: Option<String>,
}

/// Session backend reached over HTTP.
pub struct HttpSession {
    client: Client,
    base_url: String,
    session_id: RwLock<Option<String>>,
    responding: AtomicBool,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl HttpSession {
    pub fn new(api: &ApiConfig, events: mpsc::UnboundedSender<SessionEvent>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .build()
            .map_err(|e| ChatDeckError::network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            session_id: RwLock::new(None),
            responding: AtomicBool::new(false),
            events,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Switches the active session; the host feeds the new id to the controller.
    pub fn set_session_id(&self, session_id: Option<String>) {
        let mut guard = self.session_id.write().unwrap_or_else(|e| e.into_inner());
        *guard = session_id.filter(|id| !id.trim().is_empty());
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn emit(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("[HttpSession] Event dropped: receiver closed");
        }
    }

    fn set_responding(&self, responding: bool) {
        if self.responding.swap(responding, Ordering::SeqCst) != responding {
            self.emit(SessionEvent::RespondingChanged(responding));
        }
    }

    fn require_session(&self) -> Result<String> {
        self.session_id()
            .ok_or_else(|| ChatDeckError::validation("No active session"))
    }

    /// Adopts a session id handed back by the backend when none is active yet.
    fn adopt_session(&self, session_id: &str) {
        let mut guard = self.session_id.write().unwrap_or_else(|e| e.into_inner());
        if guard.is_none() {
            tracing::info!("[HttpSession] Backend assigned session {}", session_id);
            *guard = Some(session_id.to_string());
            drop(guard);
            self.emit(SessionEvent::SessionAssigned(session_id.to_string()));
        }
    }

    async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<(StatusCode, String)> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| transport_error(url, e))?;
        Ok((status, text))
    }

    async fn send_message(
        &self,
        session_id: &str,
        files: &[FileAttachment],
        message: String,
    ) -> Result<()> {
        let url = self.url(&format!("sessions/{}/messages", session_id));
        let request = MessageRequest {
            message,
            files: files.iter().map(WireFile::from_attachment).collect(),
        };

        let (status, body) = self.post_json(&url, &request).await?;
        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }

        let response: MessageResponse = if body.trim().is_empty() {
            MessageResponse::default()
        } else {
            serde_json::from_str(&body)?
        };
        if let Some(reply) = response.reply {
            self.emit(SessionEvent::Reply(reply));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionContext for HttpSession {
    fn is_responding(&self) -> bool {
        self.responding.load(Ordering::SeqCst)
    }

    fn session_id(&self) -> Option<String> {
        self.session_id.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    async fn submit(&self, files: Vec<FileAttachment>, message: String) -> Result<()> {
        let session_id = self.require_session()?;
        tracing::info!(
            "[HttpSession] Sending message to {} ({} chars, {} file(s))",
            session_id,
            message.chars().count(),
            files.len()
        );

        self.set_responding(true);
        let result = self.send_message(&session_id, &files, message).await;
        self.set_responding(false);
        result
    }

    async fn cancel(&self) -> Result<()> {
        let session_id = self.require_session()?;
        let url = self.url(&format!("sessions/{}/cancel", session_id));
        let (status, body) = self.post_json(&url, &serde_json::json!({})).await?;
        self.set_responding(false);
        if !status.is_success() {
            return Err(error_from_body(status, &body));
        }
        Ok(())
    }

    async fn upload_artifact(
        &self,
        upload: ArtifactUpload,
        session_id: Option<String>,
    ) -> Result<ArtifactRef> {
        let url = self.url("artifacts");
        tracing::debug!(
            "[HttpSession] Uploading artifact {} ({}, {} bytes)",
            upload.name,
            upload.mime_type,
            upload.data.len()
        );

        let request = ArtifactRequest {
            name: upload.name,
            mime_type: upload.mime_type,
            data: BASE64.encode(&upload.data),
            description: upload.description,
            session_id,
        };
        let (status, body) = self.post_json(&url, &request).await?;
        let artifact = parse_upload_response(status, &body)?;

        if let Some(ref assigned) = artifact.session_id {
            self.adopt_session(assigned);
        }
        Ok(artifact)
    }

    async fn refresh_artifacts(&self) {
        self.emit(SessionEvent::ArtifactsChanged);
    }

    fn notify(&self, notification: Notification) {
        self.emit(SessionEvent::Notification(notification));
    }
}

fn transport_error(url: &str, err: reqwest::Error) -> ChatDeckError {
    tracing::error!("[HttpSession] Request to {} failed: {}", url, err);
    ChatDeckError::network(err.to_string())
}

/// Extracts `error.message` from a response body.
///
/// Returns `None` when the body has no `error` key at all, and `Some("")` when
/// the key is present but carries no usable message.
fn extract_error_message(value: &serde_json::Value) -> Option<String> {
    let error = value.get("error")?;
    let message = error
        .get("message")
        .and_then(|m| m.as_str())
        .or_else(|| error.as_str())
        .unwrap_or_default();
    Some(message.to_string())
}

fn error_from_body(status: StatusCode, body: &str) -> ChatDeckError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| extract_error_message(&value))
        .unwrap_or_default();
    tracing::warn!("[HttpSession] Backend responded {}: {}", status, body);
    ChatDeckError::backend(message)
}

/// Interprets the artifact endpoint's response.
///
/// The error shape is checked before the status: a `{"error": ...}` body is a
/// failure even with a 2xx status, and a malformed error falls back to the
/// generic message.
pub fn parse_upload_response(status: StatusCode, body: &str) -> Result<ArtifactRef> {
    let value: serde_json::Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) if status.is_success() => {
            return Err(ChatDeckError::network(format!("Invalid artifact response: {}", e)));
        }
        Err(_) => return Err(error_from_body(status, body)),
    };

    if let Some(message) = extract_error_message(&value) {
        return Err(ChatDeckError::backend(message));
    }
    if !status.is_success() {
        return Err(error_from_body(status, body));
    }

    let artifact: ArtifactRef = serde_json::from_value(value)?;
    if artifact.uri.trim().is_empty() {
        return Err(ChatDeckError::backend(""));
    }
    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatdeck_core::error::GENERIC_BACKEND_ERROR;

    fn session() -> (HttpSession, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let api = ApiConfig {
            base_url: "http://127.0.0.1:9/api/".to_string(),
            timeout_secs: 1,
        };
        (HttpSession::new(&api, tx).unwrap(), rx)
    }

    #[test]
    fn test_parse_upload_success() {
        let body = r#"{"uri":"artifact://1","sessionId":"s9"}"#;
        let artifact = parse_upload_response(StatusCode::OK, body).unwrap();
        assert_eq!(artifact.uri, "artifact://1");
        assert_eq!(artifact.session_id.as_deref(), Some("s9"));
    }

    #[test]
    fn test_parse_upload_error_shape_wins_over_status() {
        let body = r#"{"error":{"message":"Too large"}}"#;
        let err = parse_upload_response(StatusCode::OK, body).unwrap_err();
        assert_eq!(err, ChatDeckError::backend("Too large"));
    }

    #[test]
    fn test_parse_upload_malformed_error_uses_fallback() {
        let err =
            parse_upload_response(StatusCode::BAD_REQUEST, r#"{"error":{"code":7}}"#).unwrap_err();
        assert_eq!(err.user_message(), GENERIC_BACKEND_ERROR);

        let err = parse_upload_response(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>")
            .unwrap_err();
        assert_eq!(err.user_message(), GENERIC_BACKEND_ERROR);
    }

    #[test]
    fn test_parse_upload_string_error() {
        let body = r#"{"error":"Duplicate name"}"#;
        let err = parse_upload_response(StatusCode::CONFLICT, body).unwrap_err();
        assert_eq!(err.user_message(), "Duplicate name");
    }

    #[test]
    fn test_parse_upload_missing_uri() {
        let err = parse_upload_response(StatusCode::OK, r#"{"sessionId":"s1"}"#).unwrap_err();
        assert!(matches!(err, ChatDeckError::Serialization { .. }));

        let err = parse_upload_response(StatusCode::OK, r#"{"uri":" "}"#).unwrap_err();
        assert!(err.is_backend());
    }

    #[test]
    fn test_parse_upload_non_json_success_is_network_error() {
        let err = parse_upload_response(StatusCode::OK, "ok").unwrap_err();
        assert!(err.is_network());
    }

    #[test]
    fn test_urls_join_without_double_slash() {
        let (session, _rx) = session();
        assert_eq!(session.base_url(), "http://127.0.0.1:9/api");
        assert_eq!(session.url("/artifacts"), "http://127.0.0.1:9/api/artifacts");
    }

    #[test]
    fn test_wire_file_encodes_base64() {
        let file =
            FileAttachment::from_bytes("a.bin", "application/octet-stream", 5, vec![0xff, 0x00]);
        let wire = serde_json::to_value(WireFile::from_attachment(&file)).unwrap();
        assert_eq!(wire["data"], "/wA=");
        assert_eq!(wire["lastModified"], 5);
        assert_eq!(wire["mimeType"], "application/octet-stream");
    }

    #[tokio::test]
    async fn test_submit_without_session_is_rejected() {
        let (session, mut rx) = session();
        let err = session.submit(Vec::new(), "hi".to_string()).await.unwrap_err();
        assert!(err.is_validation());
        assert!(!session.is_responding());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_notify_and_refresh_forward_events() {
        let (session, mut rx) = session();
        session.notify(Notification::error("Failed", "boom"));
        session.refresh_artifacts().await;

        assert_eq!(
            rx.recv().await,
            Some(SessionEvent::Notification(Notification::error("Failed", "boom")))
        );
        assert_eq!(rx.recv().await, Some(SessionEvent::ArtifactsChanged));
    }

    #[test]
    fn test_adopt_session_only_when_unset() {
        let (session, mut rx) = session();
        session.adopt_session("s1");
        assert_eq!(session.session_id().as_deref(), Some("s1"));
        assert_eq!(rx.try_recv().ok(), Some(SessionEvent::SessionAssigned("s1".to_string())));

        session.adopt_session("s2");
        assert_eq!(session.session_id().as_deref(), Some("s1"));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_blank_session_id_clears() {
        let (session, _rx) = session();
        session.set_session_id(Some("  ".to_string()));
        assert_eq!(session.session_id(), None);
    }
}
