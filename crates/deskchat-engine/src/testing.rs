//! Test doubles shared by the engine and the hosts.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::chat::{ChatMessage, Sender};
use crate::transport::{ChatTransport, TransportError, TransportResponse};
use crate::view::{ChatView, Visibility};

/// Transport that answers from a script, in call order, and records requests.
///
/// When the script runs out, requests fail as a transport error.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    responses: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    requests: Mutex<Vec<(String, serde_json::Value)>>,
}

impl ScriptedTransport {
    /// Create a transport with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response.
    #[must_use]
    pub fn respond(self, response: TransportResponse) -> Self {
        self.push(Ok(response));
        self
    }

    /// Queue a transport failure.
    #[must_use]
    pub fn fail(self, reason: &str) -> Self {
        self.push(Err(TransportError::Other(reason.into())));
        self
    }

    /// Queue a result.
    pub fn push(&self, result: Result<TransportResponse, TransportError>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(result);
    }

    /// Requests seen so far as `(path, body)`.
    pub fn requests(&self) -> Vec<(String, serde_json::Value)> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<TransportResponse, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((path.to_string(), body));

        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Other("no scripted response".into())))
    }
}

/// In-memory view that records everything the controller does to it.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    pub input: String,
    pub log: Vec<ChatMessage>,
    pub visibility: Visibility,
    pub toggle_label: String,
    pub focus_count: usize,
}

impl RecordingView {
    /// Create a view with the given input text.
    pub fn with_input(input: &str) -> Self {
        Self {
            input: input.into(),
            ..Default::default()
        }
    }

    /// Texts of all messages from one sender, in log order.
    pub fn texts(&self, sender: Sender) -> Vec<&str> {
        self.log
            .iter()
            .filter(|m| m.sender == sender)
            .map(|m| m.text.as_str())
            .collect()
    }
}

impl ChatView for RecordingView {
    fn input(&self) -> &str {
        &self.input
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn focus_input(&mut self) {
        self.focus_count += 1;
    }

    fn append(&mut self, message: ChatMessage) {
        self.log.push(message);
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
    }

    fn set_toggle_label(&mut self, label: &str) {
        self.toggle_label = label.to_string();
    }
}
