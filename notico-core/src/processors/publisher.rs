//! Message publisher.
//!
//! Delivers a rendered [`Notification`] through `chat.postMessage`. The
//! link-name and as-user flags are fixed; there is no threading and no
//! internal retry. Redelivery is the caller's concern.

use crate::events::Notification;
use async_trait::async_trait;
use notico_sdk::client::{ClientError, SlackClient};
use notico_sdk::objects::PostMessage;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Errors that can occur while publishing a notification.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The Slack API call failed (transport or `ok: false`).
    #[error("failed to send message: {0}")]
    Slack(#[from] ClientError),

    /// The publish did not finish within the caller's deadline.
    #[error("publish timed out after {0:?}")]
    Timeout(Duration),

    /// The publishing task ended without producing a result.
    #[error("publish task aborted: {0}")]
    Aborted(String),
}

/// Destination for rendered notifications.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn publish(&self, notification: &Notification) -> Result<(), PublishError>;
}

/// Publishes notifications to Slack as the token's user.
#[derive(Debug, Clone)]
pub struct SlackPublisher {
    client: SlackClient,
}

impl SlackPublisher {
    pub fn new(client: SlackClient) -> Self {
        Self { client }
    }

    fn request(notification: &Notification) -> PostMessage {
        PostMessage {
            channel: notification.channel.clone(),
            text: notification.text.clone(),
            link_names: true,
            as_user: true,
        }
    }
}

#[async_trait]
impl NotificationSink for SlackPublisher {
    async fn publish(&self, notification: &Notification) -> Result<(), PublishError> {
        let response = self
            .client
            .post_message(&Self::request(notification))
            .await?;
        info!(
            channel = %response.channel,
            ts = %response.ts,
            "Notification posted"
        );
        Ok(())
    }
}
