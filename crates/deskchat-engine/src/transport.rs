//! Transport for the chat endpoint.
//!
//! [`ChatTransport`] is the seam between the controller and the network.
//! [`HttpTransport`] is the real implementation; tests substitute their own.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use tracing::{debug, warn};

use crate::config::ClientConfig;

/// Raw response handed back by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Declared `Content-Type`, if any.
    pub content_type: Option<String>,
    /// Response body. Empty when the body was not read.
    pub body: Vec<u8>,
}

impl TransportResponse {
    /// Build a JSON response (used by tests and fakes).
    pub fn json(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type: Some("application/json".into()),
            body: body.into(),
        }
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Whether the declared content type mentions `application/json`.
    ///
    /// This is the only signal used to detect an expired session: a server
    /// that redirects to its HTML login page answers with `text/html`.
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"))
    }
}

/// Something that can POST JSON to the chat server.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// POST `body` as JSON to `path` on the server.
    async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<TransportResponse, TransportError>;
}

/// HTTP transport backed by reqwest.
///
/// Cookies live in a jar scoped to the configured server, so a session
/// cookie is never sent to another origin.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base: Url,
}

impl HttpTransport {
    /// Build a transport from client configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let base = config
            .base_url()
            .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;

        let jar = Arc::new(Jar::default());
        if let Some(cookie) = &config.session_cookie {
            jar.add_cookie_str(cookie, &base);
        }

        let mut builder = Client::builder()
            .cookie_provider(jar)
            .user_agent(concat!("deskchat/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            base,
        })
    }

    /// The server origin requests are sent to.
    pub fn base_url(&self) -> &Url {
        &self.base
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn post_json(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<TransportResponse, TransportError> {
        let url = self
            .base
            .join(path)
            .map_err(|e| TransportError::InvalidUrl(format!("{path}: {e}")))?;

        debug!(%url, "POST");
        let response = self.client.post(url).json(&body).send().await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut result = TransportResponse {
            status,
            content_type,
            body: Vec::new(),
        };

        // A non-JSON body is never inspected.
        if result.is_json() {
            match response.bytes().await {
                Ok(bytes) => result.body = bytes.to_vec(),
                Err(e) => warn!(error = %e, "failed to read response body"),
            }
        }

        debug!(status, content_type = ?result.content_type, "response");
        Ok(result)
    }
}

/// Errors raised by a transport.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Request could not be built, sent, or timed out.
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server URL or endpoint path is not a valid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Any other transport failure (used by non-HTTP transports).
    #[error("Transport failure: {0}")]
    Other(String),
}
