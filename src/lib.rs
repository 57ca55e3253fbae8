//! Mirrors a status-page incident feed into a webhook channel.
//!
//! A fixed-interval reconciler compares the remote incident list against
//! locally persisted records and decides, per incident, whether to skip,
//! create a new webhook message, or edit the existing one. Records survive
//! restarts so old incidents are never re-announced.

pub mod config;
pub mod feed;
pub mod formatter;
pub mod liveness;
pub mod models;
pub mod notifier;
pub mod reconciler;
pub mod store;
