//! deskchat-engine: Headless controller for the helpdesk chat widget
//!
//! This crate provides the widget logic without any terminal code:
//! - Message and wire types
//! - The view and transport seams the controller is built over
//! - Response interpretation and fixed advisories
//! - Client configuration

pub mod chat;
pub mod config;
pub mod controller;
pub mod outcome;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod transport;
pub mod view;

// Re-export commonly used types
pub use chat::{ChatMessage, ChatReply, ChatRequest, ResetReply, Sender};
pub use config::{ClientConfig, ConfigError, DEFAULT_CONFIG_PATH};
pub use controller::{ChatController, PendingRequest, RequestKind};
pub use outcome::{
    interpret_chat, interpret_reset, Outcome, CONNECTIVITY_ADVISORY, GENERIC_FAILURE_TEXT,
    NO_REPLY_TEXT, RESET_CONFIRMATION_TEXT, SESSION_EXPIRED_ADVISORY,
};
pub use transport::{ChatTransport, HttpTransport, TransportError, TransportResponse};
pub use view::{ChatView, Visibility};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
