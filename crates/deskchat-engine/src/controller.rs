//! Chat widget controller.
//!
//! The controller owns the view and a transport handle. Sending is split
//! into a synchronous half that touches the view ([`ChatController::begin_send`])
//! and an async half that only touches the network ([`PendingRequest::resolve`]),
//! so a host can run several requests at once while keeping the view on one
//! task. Results are appended in the order the host completes them.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info_span, Instrument};
use uuid::Uuid;

use crate::chat::{ChatMessage, ChatReply};
use crate::config::ClientConfig;
use crate::outcome::{interpret_chat, interpret_reset, Outcome};
use crate::transport::ChatTransport;
use crate::view::{ChatView, Visibility};

/// What a pending request will do when resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    /// `POST /chat` with the given message.
    Send(String),
    /// `POST /chat/reset`.
    Reset,
}

/// A request that has been committed to the log but not yet sent.
///
/// Owns everything it needs, so it can be moved onto another task.
pub struct PendingRequest {
    id: Uuid,
    kind: RequestKind,
    path: String,
    transport: Arc<dyn ChatTransport>,
}

impl PendingRequest {
    /// Identifier used to correlate log lines.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// What this request does.
    pub fn kind(&self) -> &RequestKind {
        &self.kind
    }

    /// Perform the request and interpret the response.
    ///
    /// Never fails: every error is mapped to an [`Outcome`].
    pub async fn resolve(self) -> Outcome {
        let span = info_span!("chat_request", id = %self.id, path = %self.path);
        async move {
            match self.kind {
                RequestKind::Send(message) => {
                    let body = json!({ "message": message });
                    interpret_chat(self.transport.post_json(&self.path, body).await)
                }
                RequestKind::Reset => {
                    interpret_reset(self.transport.post_json(&self.path, json!({})).await)
                }
            }
        }
        .instrument(span)
        .await
    }
}

impl std::fmt::Debug for PendingRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingRequest")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Controller for one chat widget.
pub struct ChatController<V> {
    view: V,
    transport: Arc<dyn ChatTransport>,
    chat_path: String,
    reset_path: String,
    in_flight: usize,
    last_reply: Option<ChatReply>,
}

impl<V: ChatView> ChatController<V> {
    /// Create a controller over an injected view and transport.
    ///
    /// The toggle label is synced to the view's initial visibility.
    pub fn new(mut view: V, transport: Arc<dyn ChatTransport>, config: &ClientConfig) -> Self {
        view.set_toggle_label(view.visibility().toggle_label());
        Self {
            view,
            transport,
            chat_path: config.chat_path.clone(),
            reset_path: config.reset_path.clone(),
            in_flight: 0,
            last_reply: None,
        }
    }

    /// The view.
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Mutable access to the view (for input editing by the host).
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Number of requests begun but not yet completed.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Metadata of the most recent successful reply.
    pub fn last_reply(&self) -> Option<&ChatReply> {
        self.last_reply.as_ref()
    }

    /// Flip panel visibility and update the toggle label.
    pub fn toggle(&mut self) -> Visibility {
        let next = self.view.visibility().toggled();
        self.view.set_visibility(next);
        self.view.set_toggle_label(next.toggle_label());
        next
    }

    /// Commit the current input to the log and prepare the request.
    ///
    /// Returns `None` (and touches nothing) when the trimmed input is empty.
    pub fn begin_send(&mut self) -> Option<PendingRequest> {
        let text = self.view.input().trim().to_string();
        if text.is_empty() {
            return None;
        }

        self.view.append(ChatMessage::user(text.clone()));
        self.view.clear_input();
        self.view.focus_input();

        let pending = self.pending(RequestKind::Send(text), self.chat_path.clone());
        debug!(id = %pending.id, "send started");
        Some(pending)
    }

    /// Prepare a conversation reset request. The local log is kept.
    pub fn begin_reset(&mut self) -> PendingRequest {
        let pending = self.pending(RequestKind::Reset, self.reset_path.clone());
        debug!(id = %pending.id, "reset started");
        pending
    }

    /// Append the bot message for a resolved request.
    pub fn complete(&mut self, outcome: Outcome) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if let Outcome::Reply(reply) = &outcome {
            self.last_reply = Some(reply.clone());
        }
        self.view.append(ChatMessage::bot(outcome.into_text()));
    }

    /// Run the whole send flow. Returns `false` if the input was blank.
    pub async fn send(&mut self) -> bool {
        let Some(pending) = self.begin_send() else {
            return false;
        };
        let outcome = pending.resolve().await;
        self.complete(outcome);
        true
    }

    /// Run the whole reset flow.
    pub async fn reset(&mut self) {
        let outcome = self.begin_reset().resolve().await;
        self.complete(outcome);
    }

    fn pending(&mut self, kind: RequestKind, path: String) -> PendingRequest {
        self.in_flight += 1;
        PendingRequest {
            id: Uuid::new_v4(),
            kind,
            path,
            transport: Arc::clone(&self.transport),
        }
    }
}
