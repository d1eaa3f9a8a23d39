//! Server configuration.

use std::net::SocketAddr;
use std::time::Duration;

/// Default deadline for dispatching and publishing one webhook event.
pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(10);

/// Webhook server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// The address and port to listen on.
    pub listen: SocketAddr,
    /// Upper bound on the outbound publish performed for one request.
    pub publish_timeout: Duration,
}
