//! Mapping from transport results to what the user sees.
//!
//! Every result, including failures, becomes exactly one bot message.

use tracing::{debug, warn};

use crate::chat::{ChatReply, ResetReply};
use crate::transport::{TransportError, TransportResponse};

/// Shown when the server answers with something other than JSON.
pub const SESSION_EXPIRED_ADVISORY: &str =
    "You appear to be logged out. Reload and sign in again, then try once more.";

/// Shown for a non-success JSON response without a reply.
pub const GENERIC_FAILURE_TEXT: &str = "Something went wrong. Please try again.";

/// Shown for a success response without a reply.
pub const NO_REPLY_TEXT: &str = "No reply.";

/// Shown when the request never got a response.
pub const CONNECTIVITY_ADVISORY: &str =
    "Could not reach the server. Are you signed in and is the app running?";

/// Shown after a reset when the server sends no message of its own.
pub const RESET_CONFIRMATION_TEXT: &str = "The conversation has been reset.";

/// Result of one request, as far as the widget is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Success with a non-empty reply.
    Reply(ChatReply),
    /// Success without a usable reply.
    NoReply,
    /// Response was not JSON; most likely a login page.
    SessionExpired,
    /// Non-success JSON response, with the server's reason if any.
    ServerError(Option<String>),
    /// The request failed before a response arrived.
    Unreachable,
    /// Conversation reset succeeded, with the server's message if any.
    Reset(Option<String>),
}

impl Outcome {
    /// The text of the bot message for this outcome.
    pub fn into_text(self) -> String {
        match self {
            Outcome::Reply(reply) => reply.reply.unwrap_or_else(|| NO_REPLY_TEXT.into()),
            Outcome::NoReply => NO_REPLY_TEXT.into(),
            Outcome::SessionExpired => SESSION_EXPIRED_ADVISORY.into(),
            Outcome::ServerError(reason) => reason.unwrap_or_else(|| GENERIC_FAILURE_TEXT.into()),
            Outcome::Unreachable => CONNECTIVITY_ADVISORY.into(),
            Outcome::Reset(message) => message.unwrap_or_else(|| RESET_CONFIRMATION_TEXT.into()),
        }
    }

    /// Whether this outcome is one of the failure kinds.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Outcome::SessionExpired | Outcome::ServerError(_) | Outcome::Unreachable
        )
    }
}

/// Interpret the result of `POST /chat`.
pub fn interpret_chat(result: Result<TransportResponse, TransportError>) -> Outcome {
    let response = match checked_json(result) {
        Ok(response) => response,
        Err(outcome) => return outcome,
    };

    let data: ChatReply = parse_or_empty(&response.body);
    let text = data.reply_text().map(str::to_string);

    match (response.is_success(), text) {
        (false, reason) => Outcome::ServerError(reason),
        (true, Some(_)) => Outcome::Reply(data),
        (true, None) => Outcome::NoReply,
    }
}

/// Interpret the result of `POST /chat/reset`.
pub fn interpret_reset(result: Result<TransportResponse, TransportError>) -> Outcome {
    let response = match checked_json(result) {
        Ok(response) => response,
        Err(outcome) => return outcome,
    };

    let data: ResetReply = parse_or_empty(&response.body);
    let message = data.message.filter(|m| !m.is_empty());

    if response.is_success() {
        Outcome::Reset(message)
    } else {
        Outcome::ServerError(message)
    }
}

/// Handle the two failure kinds shared by every endpoint.
fn checked_json(
    result: Result<TransportResponse, TransportError>,
) -> Result<TransportResponse, Outcome> {
    match result {
        Err(e) => {
            warn!(error = %e, "chat request failed");
            Err(Outcome::Unreachable)
        }
        Ok(response) if !response.is_json() => {
            warn!(
                status = response.status,
                content_type = ?response.content_type,
                "non-JSON response, assuming the session has expired"
            );
            Err(Outcome::SessionExpired)
        }
        Ok(response) => Ok(response),
    }
}

fn parse_or_empty<T>(body: &[u8]) -> T
where
    T: serde::de::DeserializeOwned + Default,
{
    serde_json::from_slice(body).unwrap_or_else(|e| {
        debug!(error = %e, "unparsable JSON body, using empty record");
        T::default()
    })
}
