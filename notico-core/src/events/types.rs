//! Notification types produced by the dispatcher.

use notico_sdk::objects::User;

/// A rendered notification bound for a channel.
///
/// Created by the dispatcher and consumed exactly once by a
/// [`NotificationSink`](crate::processors::NotificationSink).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Target channel id.
    pub channel: String,
    /// Message text in Slack mrkdwn.
    pub text: String,
}

/// Account classification shown in team join notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountType {
    Bot,
    SingleChannelGuest,
    MultiChannelGuest,
    Normal,
}

impl AccountType {
    /// Classify a user. The bot flag wins over ultra-restricted, which wins
    /// over restricted.
    pub fn of(user: &User) -> Self {
        if user.is_bot {
            Self::Bot
        } else if user.is_ultra_restricted {
            Self::SingleChannelGuest
        } else if user.is_restricted {
            Self::MultiChannelGuest
        } else {
            Self::Normal
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountType::Bot => write!(f, "bot"),
            AccountType::SingleChannelGuest => write!(f, "single-channel-guest"),
            AccountType::MultiChannelGuest => write!(f, "multi-channel-guest"),
            AccountType::Normal => write!(f, "normal"),
        }
    }
}
