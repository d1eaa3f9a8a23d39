//! Runtime configuration types for notico.
//!
//! These types represent the validated configuration used by the server and
//! the stream relay. Loading and parsing is handled by the server crate.

mod server;
mod slack;

pub use server::{DEFAULT_PUBLISH_TIMEOUT, ServerConfig};
pub use slack::{DEFAULT_NOTIFY_CHANNEL, SlackConfig};

use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared configuration state with separate locks for each section.
///
/// Sections can be swapped independently on reload without blocking readers
/// of the other one.
#[derive(Clone)]
pub struct SharedConfig {
    /// Listener and request handling settings.
    pub server: Arc<RwLock<ServerConfig>>,
    /// Slack credentials and notification target.
    pub slack: Arc<RwLock<SlackConfig>>,
}

impl SharedConfig {
    pub fn new(server: ServerConfig, slack: SlackConfig) -> Self {
        Self {
            server: Arc::new(RwLock::new(server)),
            slack: Arc::new(RwLock::new(slack)),
        }
    }
}
