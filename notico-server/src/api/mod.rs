//! HTTP API handlers.

pub mod events;
pub mod extractors;

pub use events::{EventsApiError, receive_event};
