//! Slack configuration.

use notico_sdk::signature::SigningSecret;
use url::Url;

/// Channel notifications go to when none is configured.
pub const DEFAULT_NOTIFY_CHANNEL: &str = "#admins";

/// Slack credentials and notification target.
#[derive(Clone)]
pub struct SlackConfig {
    /// API token used for `chat.postMessage` and `rtm.connect`.
    pub token: String,
    /// Signing secret for webhook verification. Only the webhook server
    /// needs it.
    pub signing_secret: Option<SigningSecret>,
    /// Channel id (or `#name`) that receives notifications.
    pub notify_channel: String,
    /// Workspace domain, used by templates that link into the workspace when
    /// it cannot be learned from a connection.
    pub team_domain: Option<String>,
    /// Web API root.
    pub api_base: Url,
}

impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("token", &"<redacted>")
            .field("signing_secret", &self.signing_secret)
            .field("notify_channel", &self.notify_channel)
            .field("team_domain", &self.team_domain)
            .field("api_base", &self.api_base.as_str())
            .finish()
    }
}
