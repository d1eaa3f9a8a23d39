//! Clients for the Slack Web API and the RTM websocket.
//!
//! Gated behind the `client` cargo feature so downstream crates that only
//! need the shared types and signature helpers do not pull in `reqwest`.

mod rtm;
mod web;

pub use rtm::RtmStream;
pub use web::{DEFAULT_API_BASE, PostMessageResponse, SlackClient};

use crate::objects::DecodeError;

/// Slack API error codes that mean the token itself is unusable.
const AUTH_FAILURE_CODES: &[&str] = &[
    "invalid_auth",
    "not_authed",
    "account_inactive",
    "token_revoked",
    "token_expired",
];

/// Errors produced by the SDK clients.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Slack answered with `"ok": false`.
    #[error("{method} error: {error}")]
    Api { method: String, error: String },

    /// A successful response lacked a field the caller needs.
    #[error("{method} response missing `{field}`")]
    MissingField { method: String, field: &'static str },

    /// Response body could not be deserialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The base URL could not be joined with the method name.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// Websocket transport failure.
    #[error("websocket error: {0}")]
    WebSocket(#[from] Box<tokio_tungstenite::tungstenite::Error>),

    /// A websocket frame could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),
}

impl From<tokio_tungstenite::tungstenite::Error> for ClientError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        Self::WebSocket(Box::new(err))
    }
}

impl ClientError {
    /// Whether the error means the credentials are invalid, so retrying is
    /// pointless.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            Self::Api { error, .. } => AUTH_FAILURE_CODES.contains(&error.as_str()),
            _ => false,
        }
    }
}
