//! Outer Events API payloads delivered to the webhook endpoint.

use serde_json::Value;

use super::DecodeError;
use super::event::SlackEvent;

/// A decoded Events API request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventsApiPayload {
    /// Endpoint registration handshake; `challenge` must be echoed back.
    UrlVerification { challenge: String },
    /// A wrapped workspace event.
    EventCallback(CallbackEvent),
    /// Any other top-level type, e.g. `app_rate_limited`.
    Other { kind: String },
}

/// The `event_callback` wrapper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackEvent {
    pub team_id: Option<String>,
    pub event_id: Option<String>,
    pub event: SlackEvent,
}

impl EventsApiPayload {
    /// Decode a raw request body.
    ///
    /// Fails on malformed JSON, a missing top-level `type`, a verification
    /// request without `challenge`, or a callback without an `event` object.
    pub fn decode(body: &[u8]) -> Result<Self, DecodeError> {
        let mut value: Value = serde_json::from_slice(body)?;
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(DecodeError::MissingDiscriminator)?
            .to_owned();

        match kind.as_str() {
            "url_verification" => {
                let challenge = value
                    .get("challenge")
                    .and_then(Value::as_str)
                    .ok_or(DecodeError::MissingField("challenge"))?
                    .to_owned();
                Ok(Self::UrlVerification { challenge })
            }
            "event_callback" => {
                let team_id = string_field(&value, "team_id");
                let event_id = string_field(&value, "event_id");
                let inner = value
                    .get_mut("event")
                    .filter(|event| event.is_object())
                    .map(Value::take)
                    .ok_or(DecodeError::MissingField("event"))?;
                Ok(Self::EventCallback(CallbackEvent {
                    team_id,
                    event_id,
                    event: SlackEvent::from_value(inner)?,
                }))
            }
            _ => Ok(Self::Other { kind }),
        }
    }
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_owned)
}
