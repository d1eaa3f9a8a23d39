//! Test doubles shared with downstream crates (feature `test-util`).

use crate::events::Notification;
use crate::processors::{NotificationSink, PublishError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// A sink that records every notification it is asked to publish.
///
/// Clones share the same record, so a test can keep one handle and pass the
/// other into the code under test.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    published: Arc<Mutex<Vec<Notification>>>,
    fail_with: Option<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that records the attempt and then fails.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            fail_with: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Notifications received so far.
    pub fn published(&self) -> Vec<Notification> {
        self.published
            .lock()
            .map(|published| published.clone())
            .unwrap_or_default()
    }

    /// Number of publish calls so far.
    pub fn calls(&self) -> usize {
        self.published().len()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn publish(&self, notification: &Notification) -> Result<(), PublishError> {
        if let Ok(mut published) = self.published.lock() {
            published.push(notification.clone());
        }
        match &self.fail_with {
            Some(reason) => Err(PublishError::Aborted(reason.clone())),
            None => Ok(()),
        }
    }
}
