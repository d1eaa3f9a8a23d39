//! `chat.postMessage` request body.

use serde::Serialize;

/// Arguments for `chat.postMessage`.
///
/// Only the fields this relay sends are modelled; in particular there is no
/// `thread_ts`, so every message starts a new top-level post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostMessage {
    pub channel: String,
    pub text: String,
    /// Expand `@name` / `#channel` references into links.
    pub link_names: bool,
    /// Post as the token's user instead of a bot identity.
    pub as_user: bool,
}
