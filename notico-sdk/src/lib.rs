//! Shared Slack types for notico.
//!
//! - [`objects`]: Events API payloads, workspace events and RTM frames.
//! - [`signature`]: `v0` request signing and verification.
//! - [`client`] (feature `client`): Web API and RTM clients.

#![forbid(unsafe_code)]

#[cfg(feature = "client")]
pub mod client;
pub mod objects;
pub mod signature;
