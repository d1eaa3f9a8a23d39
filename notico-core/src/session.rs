//! Per-connection session state.

use std::sync::Arc;
use tokio::sync::RwLock;

/// Team domain learned from the most recent connection.
///
/// Cloning yields a handle to the same state. The stream relay clears it on
/// every reconnect; until the next connection event arrives, templates that
/// need the domain render it empty.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    team_domain: Arc<RwLock<String>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a known domain (e.g. from configuration).
    pub fn with_team_domain(domain: impl Into<String>) -> Self {
        Self {
            team_domain: Arc::new(RwLock::new(domain.into())),
        }
    }

    /// Current domain, empty if unknown.
    pub async fn team_domain(&self) -> String {
        self.team_domain.read().await.clone()
    }

    pub async fn set_team_domain(&self, domain: impl Into<String>) {
        *self.team_domain.write().await = domain.into();
    }

    /// Forget the domain.
    pub async fn reset(&self) {
        self.team_domain.write().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_and_reset() {
        let session = SessionState::new();
        assert_eq!(session.team_domain().await, "");

        let handle = session.clone();
        handle.set_team_domain("example").await;
        assert_eq!(session.team_domain().await, "example");

        session.reset().await;
        assert_eq!(handle.team_domain().await, "");
    }

    #[tokio::test]
    async fn test_seeded_domain() {
        let session = SessionState::with_team_domain("acme");
        assert_eq!(session.team_domain().await, "acme");
    }
}
