//! Application state shared across all request handlers.

use notico_core::config::{SharedConfig, SlackConfig};
use notico_core::processors::{Dispatcher, NotificationSink, SlackPublisher};
use notico_core::session::SessionState;
use notico_sdk::client::SlackClient;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Application state that is shared across all request handlers.
///
/// This is cloneable and cheap to pass around (everything is behind Arc).
#[derive(Clone)]
pub struct AppState {
    /// Runtime configuration (can be reloaded via SIGHUP).
    pub config: SharedConfig,
    /// Where rendered notifications go. Swapped on reload when the token
    /// changes.
    sink: Arc<RwLock<Arc<dyn NotificationSink>>>,
}

impl AppState {
    pub fn new(config: SharedConfig, sink: Arc<dyn NotificationSink>) -> Self {
        Self {
            config,
            sink: Arc::new(RwLock::new(sink)),
        }
    }

    /// Current notification sink.
    pub async fn sink(&self) -> Arc<dyn NotificationSink> {
        self.sink.read().await.clone()
    }

    /// Replace the notification sink (used during SIGHUP reload).
    pub async fn replace_sink(&self, sink: Arc<dyn NotificationSink>) {
        *self.sink.write().await = sink;
    }

    /// A dispatcher for one webhook request.
    ///
    /// Webhook deliveries carry no connection event, so the session is
    /// seeded with the configured team domain.
    pub async fn dispatcher(&self) -> Dispatcher {
        let slack = self.config.slack.read().await;
        let session = SessionState::with_team_domain(slack.team_domain.clone().unwrap_or_default());
        Dispatcher::new(slack.notify_channel.clone(), session)
    }
}

/// Build a Slack client from configuration.
pub fn slack_client(slack: &SlackConfig) -> SlackClient {
    SlackClient::new(slack.api_base.clone(), slack.token.clone())
}

/// Build the production sink that posts to Slack.
pub fn slack_publisher(slack: &SlackConfig) -> Arc<dyn NotificationSink> {
    Arc::new(SlackPublisher::new(slack_client(slack)))
}
