//! RTM (real time messaging) connection objects.
//!
//! `rtm.connect` hands back a websocket URL plus the team the token belongs
//! to. Frames on that socket are JSON objects; workspace events share their
//! shape with the Events API inner events.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::DecodeError;
use super::event::SlackEvent;

/// Team identity returned by `rtm.connect`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TeamInfo {
    pub id: String,
    pub name: String,
    pub domain: String,
}

/// Successful `rtm.connect` result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtmConnection {
    pub url: String,
    pub team: TeamInfo,
}

/// A frame received over the RTM socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RtmFrame {
    /// The server accepted the connection.
    Hello,
    /// The server is about to close the connection; reconnect.
    Goodbye,
    /// Reply to one of our keepalive pings.
    Pong { reply_to: Option<u64> },
    /// Acknowledgement of something we sent (no `type`).
    Reply { reply_to: Option<u64>, ok: bool },
    /// Server-side error frame.
    Error { code: i64, msg: String },
    /// A workspace event.
    Event(SlackEvent),
}

impl RtmFrame {
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(text)?;
        let reply_to = value.get("reply_to").and_then(Value::as_u64);

        let Some(kind) = value.get("type").and_then(Value::as_str).map(str::to_owned) else {
            if value.get("reply_to").is_some() {
                let ok = value.get("ok").and_then(Value::as_bool).unwrap_or(false);
                return Ok(Self::Reply { reply_to, ok });
            }
            return Err(DecodeError::MissingDiscriminator);
        };

        match kind.as_str() {
            "hello" => Ok(Self::Hello),
            "goodbye" => Ok(Self::Goodbye),
            "pong" => Ok(Self::Pong { reply_to }),
            "error" => {
                let error = value.get("error");
                Ok(Self::Error {
                    code: error
                        .and_then(|e| e.get("code"))
                        .and_then(Value::as_i64)
                        .unwrap_or_default(),
                    msg: error
                        .and_then(|e| e.get("msg"))
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_owned(),
                })
            }
            _ => Ok(Self::Event(SlackEvent::from_value(value)?)),
        }
    }
}

/// Keepalive frame sent by the client.
#[derive(Debug, Clone, Serialize)]
pub struct RtmPing {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

impl RtmPing {
    pub fn new(id: u64) -> Self {
        Self { id, kind: "ping" }
    }
}
