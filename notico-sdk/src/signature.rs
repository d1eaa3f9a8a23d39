//! Slack request signing and verification.
//!
//! Every Events API request carries two headers:
//!
//! ```text
//! X-Slack-Request-Timestamp: {unix_timestamp}
//! X-Slack-Signature: v0={hex_hmac}
//! ```
//!
//! where the HMAC is `HMAC-SHA256("v0:{timestamp}:{raw_body}", signing_secret)`.
//! Requests older (or newer) than [`MAX_SIGNATURE_AGE`] are rejected to limit
//! replay.

/// Header carrying the request timestamp.
pub const TIMESTAMP_HEADER: &str = "X-Slack-Request-Timestamp";

/// Header carrying the `v0=` signature.
pub const SIGNATURE_HEADER: &str = "X-Slack-Signature";

/// Header carrying the redelivery counter.
pub const RETRY_NUM_HEADER: &str = "X-Slack-Retry-Num";

/// Header carrying the redelivery reason.
pub const RETRY_REASON_HEADER: &str = "X-Slack-Retry-Reason";

/// Signature scheme version understood by this module.
pub const SIGNATURE_VERSION: &str = "v0";

/// Maximum allowed skew between the request timestamp and now (in seconds).
pub const MAX_SIGNATURE_AGE: i64 = 5 * 60;

/// Errors produced by signature operations.
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    #[error("invalid timestamp header")]
    InvalidTimestamp,
    #[error("invalid signature header format")]
    InvalidFormat,
    #[error("invalid hex encoding")]
    InvalidHex,
    #[error("invalid signature")]
    SignatureMismatch,
    #[error("signature expired")]
    Expired,
}

impl From<ring::error::Unspecified> for SignatureError {
    fn from(_: ring::error::Unspecified) -> Self {
        Self::SignatureMismatch
    }
}

/// A signing secret shared with Slack.
///
/// Holds the prepared HMAC key so that verifying many requests does not
/// re-derive it each time.
#[derive(Clone)]
pub struct SigningSecret {
    key: ring::hmac::Key,
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningSecret(..)")
    }
}

impl SigningSecret {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: ring::hmac::Key::new(ring::hmac::HMAC_SHA256, secret.as_ref()),
        }
    }

    /// Compute the `v0={hex}` signature for a body sent at `timestamp`.
    pub fn sign(&self, timestamp: i64, body: &[u8]) -> String {
        let tag = ring::hmac::sign(&self.key, &base_string(timestamp, body));
        format!("{SIGNATURE_VERSION}={}", hex::encode(tag.as_ref()))
    }

    /// Verify raw header values against the body using the current time.
    pub fn verify(
        &self,
        timestamp_header: &str,
        signature_header: &str,
        body: &[u8],
    ) -> Result<(), SignatureError> {
        let now = time::OffsetDateTime::now_utc().unix_timestamp();
        self.verify_at(timestamp_header, signature_header, body, now)
    }

    /// Verify raw header values against the body as of `now`.
    ///
    /// The HMAC comparison is constant-time (delegated to `ring`).
    pub fn verify_at(
        &self,
        timestamp_header: &str,
        signature_header: &str,
        body: &[u8],
        now: i64,
    ) -> Result<(), SignatureError> {
        let timestamp = parse_timestamp(timestamp_header)?;
        check_timestamp(timestamp, now)?;
        let signature = parse_signature_header(signature_header)?;
        ring::hmac::verify(&self.key, &base_string(timestamp, body), &signature)?;
        Ok(())
    }
}

/// Build the `v0:{timestamp}:{body}` string that gets signed.
fn base_string(timestamp: i64, body: &[u8]) -> Vec<u8> {
    let prefix = format!("{SIGNATURE_VERSION}:{timestamp}:");
    let mut data = Vec::with_capacity(prefix.len() + body.len());
    data.extend_from_slice(prefix.as_bytes());
    data.extend_from_slice(body);
    data
}

/// Parse the `X-Slack-Request-Timestamp` header value.
pub fn parse_timestamp(value: &str) -> Result<i64, SignatureError> {
    value
        .trim()
        .parse()
        .map_err(|_| SignatureError::InvalidTimestamp)
}

/// Parse an `X-Slack-Signature` header value (`v0={hex}`) into raw bytes.
pub fn parse_signature_header(value: &str) -> Result<Vec<u8>, SignatureError> {
    let (version, digest) = value.split_once('=').ok_or(SignatureError::InvalidFormat)?;
    if version != SIGNATURE_VERSION {
        return Err(SignatureError::InvalidFormat);
    }
    hex::decode(digest).map_err(|_| SignatureError::InvalidHex)
}

/// Check that `timestamp` is within [`MAX_SIGNATURE_AGE`] of `now`.
pub fn check_timestamp(timestamp: i64, now: i64) -> Result<(), SignatureError> {
    if now.abs_diff(timestamp) > MAX_SIGNATURE_AGE.unsigned_abs() {
        return Err(SignatureError::Expired);
    }
    Ok(())
}
