//! Event processors.
//!
//! - `Dispatcher`: Receives `SlackEvent`, emits at most one `Notification`
//! - `SlackPublisher`: Delivers a `Notification` via `chat.postMessage`
//! - `StreamRelay`: Owns the RTM connection and drives the two above

pub mod dispatcher;
pub mod publisher;
pub mod stream_relay;

pub use dispatcher::{COMMAND_PREFIX, Dispatcher, render};
pub use publisher::{NotificationSink, PublishError, SlackPublisher};
pub use stream_relay::{RelayExit, StreamRelay};
