pub mod chat;
pub mod event;
pub mod events_api;
pub mod rtm;

pub use chat::PostMessage;
pub use event::{
    Bot, BotAdded, ChannelArchive, ChannelCreated, ChannelDeleted, ChannelInfo, ChannelRenamed,
    Connected, MessageEvent, SlackEvent, Subteam, SubteamCreated, TeamJoin, User, UserProfile,
};
pub use events_api::{CallbackEvent, EventsApiPayload};
pub use rtm::{RtmConnection, RtmFrame, RtmPing, TeamInfo};

/// Errors produced while decoding Slack payloads.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing type discriminator")]
    MissingDiscriminator,
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
}
