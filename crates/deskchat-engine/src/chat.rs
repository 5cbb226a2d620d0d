//! Chat message and wire types.
//!
//! Messages are transient: they live in the widget's log and are never
//! persisted. The wire types mirror the helpdesk server's JSON contract.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Author of a message in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Text typed by the local user.
    User,
    /// Text produced by the server, or a fixed advisory.
    Bot,
}

impl Sender {
    /// Label shown in front of the message text.
    pub fn label(self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Bot => "Bot",
        }
    }
}

/// A single entry in the chat log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Who wrote the message.
    pub sender: Sender,
    /// Message text, rendered verbatim.
    pub text: String,
    /// When the message was appended (display only).
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a new user message.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new bot message.
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Deserialize an optional field, treating a value of the wrong type as absent.
///
/// Keeps one odd field from discarding the rest of the record.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Trimmed user text.
    pub message: String,
}

/// Body of a JSON response from `POST /chat`.
///
/// Every field is optional and read on its own; an unparsable body is treated
/// as the empty record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Text to show the user.
    #[serde(default, deserialize_with = "lenient")]
    pub reply: Option<String>,

    /// Topic the server classified the message under.
    #[serde(default, deserialize_with = "lenient")]
    pub topic: Option<String>,

    /// Number of messages in the server-side conversation.
    #[serde(default, deserialize_with = "lenient")]
    pub message_count: Option<u64>,

    /// Server's confidence in the topic ("high" / "low").
    #[serde(default, deserialize_with = "lenient")]
    pub confidence: Option<String>,
}

impl ChatReply {
    /// The reply text, if present and non-empty.
    pub fn reply_text(&self) -> Option<&str> {
        self.reply.as_deref().filter(|r| !r.is_empty())
    }
}

/// Body of a JSON response from `POST /chat/reset`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetReply {
    /// "ok" or "error".
    #[serde(default, deserialize_with = "lenient")]
    pub status: Option<String>,

    /// Confirmation text to show the user.
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_creation() {
        let user_msg = ChatMessage::user("Hello");
        assert_eq!(user_msg.sender, Sender::User);
        assert_eq!(user_msg.text, "Hello");

        let bot_msg = ChatMessage::bot("Hi there!");
        assert_eq!(bot_msg.sender, Sender::Bot);
        assert_eq!(bot_msg.sender.label(), "Bot");
    }

    #[test]
    fn test_chat_request_wire_format() {
        let req = ChatRequest {
            message: "hello".into(),
        };
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"message":"hello"}"#
        );
    }

    #[test]
    fn test_chat_reply_ignores_unknown_fields() {
        let reply: ChatReply = serde_json::from_str(
            r#"{"reply":"Try restarting","topic":"network","message_count":3,"confidence":"high","extra":1}"#,
        )
        .unwrap();
        assert_eq!(reply.reply_text(), Some("Try restarting"));
        assert_eq!(reply.topic.as_deref(), Some("network"));
        assert_eq!(reply.message_count, Some(3));
    }

    #[test]
    fn test_mistyped_metadata_keeps_reply() {
        let reply: ChatReply = serde_json::from_str(
            r#"{"reply":"hi there","topic":42,"message_count":"3","confidence":0.8}"#,
        )
        .unwrap();
        assert_eq!(reply.reply_text(), Some("hi there"));
        assert_eq!(reply.topic, None);
        assert_eq!(reply.message_count, None);
        assert_eq!(reply.confidence, None);
    }

    #[test]
    fn test_null_and_mistyped_reply_are_absent() {
        let reply: ChatReply = serde_json::from_str(r#"{"reply":null,"topic":"vpn"}"#).unwrap();
        assert_eq!(reply.reply_text(), None);
        assert_eq!(reply.topic.as_deref(), Some("vpn"));

        let reply: ChatReply = serde_json::from_str(r#"{"reply":["a"]}"#).unwrap();
        assert_eq!(reply.reply_text(), None);
    }

    #[test]
    fn test_reset_reply_tolerates_mistyped_status() {
        let reply: ResetReply =
            serde_json::from_str(r#"{"status":true,"message":"Cleared"}"#).unwrap();
        assert_eq!(reply.status, None);
        assert_eq!(reply.message.as_deref(), Some("Cleared"));
    }

    #[test]
    fn test_chat_reply_empty_text_is_absent() {
        let reply: ChatReply = serde_json::from_str(r#"{"reply":""}"#).unwrap();
        assert_eq!(reply.reply_text(), None);

        let reply: ChatReply = serde_json::from_str("{}").unwrap();
        assert_eq!(reply, ChatReply::default());
    }
}
