//! TOML file configuration structures.
//!
//! These structs directly map to the `notico.toml` file format. Every field
//! is optional in the file; CLI arguments and environment variables fill in
//! or override values before validation.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub slack: SlackConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
    /// Deadline for dispatching and publishing one webhook event.
    #[serde(default = "default_publish_timeout_secs")]
    pub publish_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
            publish_timeout_secs: default_publish_timeout_secs(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

fn default_publish_timeout_secs() -> u64 {
    notico_core::config::DEFAULT_PUBLISH_TIMEOUT.as_secs()
}

/// Slack section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlackConfig {
    /// API token (`xoxb-...` / `xoxp-...`).
    #[serde(default)]
    pub token: Option<String>,
    /// Signing secret from the app's "Basic Information" page.
    #[serde(default)]
    pub signing_secret: Option<String>,
    /// Channel that receives notifications.
    #[serde(default)]
    pub channel: Option<String>,
    /// Workspace domain (the `acme` in `acme.slack.com`).
    #[serde(default)]
    pub domain: Option<String>,
    /// Web API root, mainly for testing against a mock.
    #[serde(default)]
    pub api_base: Option<String>,
}
