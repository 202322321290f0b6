//! Interface to the platform push messaging provider.
//!
//! The provider is a black box that hands out opaque registration
//! tokens and delivers foreground push messages.

use anyhow::{Error, Result};
use async_trait::async_trait;
use tokio::sync::mpsc;

use super::models::PushMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    /// The user dismissed the prompt without choosing.
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerRegistration {
    pub script_path: String,
    pub scope: String,
}

#[derive(Debug, Clone, Copy)]
pub struct TokenRequest<'a> {
    pub vapid_public_key: &'a str,
    pub registration: &'a WorkerRegistration,
}

#[async_trait]
pub trait NotificationProvider: Send + Sync {
    /// Whether background workers and the notification permission API
    /// are available in this environment.
    fn is_supported(&self) -> bool;

    async fn request_permission(&self) -> Result<Permission, Error>;

    async fn register_worker(&self, script_path: &str) -> Result<WorkerRegistration, Error>;

    async fn registration_token(&self, request: TokenRequest<'_>) -> Result<Option<String>, Error>;

    /// Subscribe to live foreground messages. Dropping the receiver
    /// unsubscribes.
    fn subscribe_foreground(&self) -> Result<mpsc::UnboundedReceiver<PushMessage>, Error>;
}
