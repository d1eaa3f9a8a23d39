//! Typed Slack workspace events.
//!
//! The same inner event shapes arrive wrapped in an Events API
//! `event_callback` (webhook) and as bare RTM frames (stream). Decoding is a
//! two-step affair: the `type` discriminator picks the variant, then the
//! remaining fields are deserialized into that variant's payload. Every
//! non-discriminator field defaults to empty so a partially populated event
//! still renders.

use serde::Deserialize;
use serde_json::Value;

use super::DecodeError;

/// A decoded workspace event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlackEvent {
    ChannelCreated(ChannelCreated),
    ChannelDeleted(ChannelDeleted),
    ChannelRenamed(ChannelRenamed),
    ChannelArchived(ChannelArchive),
    ChannelUnarchived(ChannelArchive),
    SubteamCreated(SubteamCreated),
    TeamJoined(TeamJoin),
    BotAdded(BotAdded),
    /// Synthesized by the stream client once a connection is established.
    Connected(Connected),
    Message(MessageEvent),
    /// Any event type not listed above. Carries the raw `type` for logging.
    Unrecognized { kind: String },
}

impl SlackEvent {
    /// Decode an inner event object by its `type` field.
    pub fn from_value(value: Value) -> Result<Self, DecodeError> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or(DecodeError::MissingDiscriminator)?
            .to_owned();

        let event = match kind.as_str() {
            "channel_created" => Self::ChannelCreated(serde_json::from_value(value)?),
            "channel_deleted" => Self::ChannelDeleted(serde_json::from_value(value)?),
            "channel_rename" => Self::ChannelRenamed(serde_json::from_value(value)?),
            "channel_archive" => Self::ChannelArchived(serde_json::from_value(value)?),
            "channel_unarchive" => Self::ChannelUnarchived(serde_json::from_value(value)?),
            "subteam_created" => Self::SubteamCreated(serde_json::from_value(value)?),
            "team_join" => Self::TeamJoined(serde_json::from_value(value)?),
            "bot_added" => Self::BotAdded(serde_json::from_value(value)?),
            "message" => Self::Message(serde_json::from_value(value)?),
            _ => Self::Unrecognized { kind },
        };
        Ok(event)
    }

    /// Short name used in log fields.
    pub fn kind(&self) -> &str {
        match self {
            Self::ChannelCreated(_) => "channel_created",
            Self::ChannelDeleted(_) => "channel_deleted",
            Self::ChannelRenamed(_) => "channel_rename",
            Self::ChannelArchived(_) => "channel_archive",
            Self::ChannelUnarchived(_) => "channel_unarchive",
            Self::SubteamCreated(_) => "subteam_created",
            Self::TeamJoined(_) => "team_join",
            Self::BotAdded(_) => "bot_added",
            Self::Connected(_) => "connected",
            Self::Message(_) => "message",
            Self::Unrecognized { kind } => kind,
        }
    }
}

/// Channel fields shared by `channel_created` and `channel_rename`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChannelInfo {
    pub id: String,
    pub name: String,
    pub creator: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChannelCreated {
    pub channel: ChannelInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChannelDeleted {
    pub channel: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChannelRenamed {
    pub channel: ChannelInfo,
}

/// Payload of both `channel_archive` and `channel_unarchive`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ChannelArchive {
    pub channel: String,
    pub user: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Subteam {
    pub id: String,
    pub handle: String,
    pub description: String,
    pub created_by: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SubteamCreated {
    pub subteam: Subteam,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: String,
    pub is_bot: bool,
    pub is_restricted: bool,
    pub is_ultra_restricted: bool,
    pub profile: UserProfile,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TeamJoin {
    pub user: User,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Bot {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BotAdded {
    pub bot: Bot,
}

/// Connection-established marker carrying the team's workspace domain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Connected {
    pub team_domain: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MessageEvent {
    pub channel: String,
    pub user: String,
    pub text: String,
    pub subtype: Option<String>,
}
