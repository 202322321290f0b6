//! Notification core for the NUHOUD job portal client.
//!
//! Covers push token registration, routing of live foreground messages
//! into a session scoped store, and cursor paginated loading of the
//! historical notification feed.

pub mod api;
pub mod cli;
pub mod core;
pub mod feed;
pub mod notify;
pub mod session;
