//! Custom Axum extractors for Slack webhook requests.
//!
//! Provides:
//! - `SlackSigned` verifies `X-Slack-Signature` against the raw body before
//!   anything parses it.
//! - `RetryInfo` reads the redelivery headers Slack adds on retries.
//!
//! All cryptographic operations are delegated to [`notico_sdk::signature`].

use axum::{
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request},
    http::{HeaderMap, request::Parts},
};
use notico_sdk::signature::{
    RETRY_NUM_HEADER, RETRY_REASON_HEADER, SIGNATURE_HEADER, TIMESTAMP_HEADER,
};
use std::convert::Infallible;

use crate::api::events::EventsApiError;
use crate::state::AppState;

/// Largest request body accepted from Slack.
const MAX_BODY_SIZE: usize = 1024 * 1024;

/// Retry reason for which redeliveries are acknowledged without processing.
pub const HTTP_TIMEOUT_REASON: &str = "http_timeout";

// ---------------------------------------------------------------------------
// SlackSigned: raw body authenticated with the signing secret
// ---------------------------------------------------------------------------

/// An Axum extractor that reads the full request body and verifies it.
///
/// # Header format
///
/// ```text
/// X-Slack-Request-Timestamp: {unix_timestamp}
/// X-Slack-Signature:         v0={hex_hmac_sha256}
/// ```
///
/// The signature is computed as
/// `HMAC-SHA256("v0:{timestamp}:{body}", signing_secret)`.
pub struct SlackSigned(pub Bytes);

impl FromRequest<AppState> for SlackSigned {
    type Rejection = EventsApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let timestamp = header_str(req.headers(), TIMESTAMP_HEADER)?.to_owned();
        let signature = header_str(req.headers(), SIGNATURE_HEADER)?.to_owned();

        let body = axum::body::to_bytes(req.into_body(), MAX_BODY_SIZE)
            .await
            .map_err(|e| EventsApiError::BodyRead(e.to_string()))?;

        let secret = state
            .config
            .slack
            .read()
            .await
            .signing_secret
            .clone()
            .ok_or(EventsApiError::SigningSecretMissing)?;
        secret.verify(&timestamp, &signature, &body)?;

        Ok(SlackSigned(body))
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &'static str) -> Result<&'a str, EventsApiError> {
    headers
        .get(name)
        .ok_or(EventsApiError::MissingHeader(name))?
        .to_str()
        .map_err(|_| EventsApiError::MissingHeader(name))
}

// ---------------------------------------------------------------------------
// RetryInfo: redelivery metadata
// ---------------------------------------------------------------------------

/// Redelivery headers of a request. Both are absent on a first delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetryInfo {
    /// `X-Slack-Retry-Num`
    pub num: Option<String>,
    /// `X-Slack-Retry-Reason`
    pub reason: Option<String>,
}

impl RetryInfo {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .map(str::to_owned)
        };
        Self {
            num: get(RETRY_NUM_HEADER),
            reason: get(RETRY_REASON_HEADER),
        }
    }

    /// A redelivery caused by our own slow response; the first delivery is
    /// already being handled.
    pub fn is_timeout_redelivery(&self) -> bool {
        self.num.is_some() && self.reason.as_deref() == Some(HTTP_TIMEOUT_REASON)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for RetryInfo {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
