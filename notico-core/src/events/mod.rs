//! Notification types.
//!
//! # Event Flow
//!
//! 1. A `SlackEvent` arrives from the webhook handler or the RTM stream
//! 2. `Dispatcher` renders it into at most one `Notification`
//! 3. A `NotificationSink` delivers the `Notification` to Slack
//!
//! Nothing is persisted; a notification lives for one request or one frame.

pub mod types;

pub use types::{AccountType, Notification};
