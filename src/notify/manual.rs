//! A provider driven by the host process instead of a browser.
//!
//! Permission, support and the registration token are fixed at
//! construction and foreground messages are pushed in with `deliver`.
//! The CLI feeds it from stdin.

use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Error, Result, anyhow};
use async_trait::async_trait;
use tokio::sync::mpsc;

use super::models::PushMessage;
use super::provider::{NotificationProvider, Permission, TokenRequest, WorkerRegistration};

#[derive(Debug)]
pub struct ManualProvider {
    supported: bool,
    permission: Permission,
    device_token: Mutex<Option<String>>,
    worker_fails: bool,
    subscriber: Mutex<Option<mpsc::UnboundedSender<PushMessage>>>,
}

impl ManualProvider {
    pub fn new(device_token: Option<String>) -> Self {
        Self {
            supported: true,
            permission: Permission::Granted,
            device_token: Mutex::new(device_token),
            worker_fails: false,
            subscriber: Mutex::new(None),
        }
    }

    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new(None)
        }
    }

    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permission = permission;
        self
    }

    pub fn with_failing_worker(mut self) -> Self {
        self.worker_fails = true;
        self
    }

    /// Simulate the provider rotating the registration token.
    pub fn rotate_token(&self, token: Option<String>) {
        *lock(&self.device_token) = token;
    }

    /// Deliver a message to the current foreground subscriber. Returns
    /// false when nobody is subscribed.
    pub fn deliver(&self, message: PushMessage) -> bool {
        let mut subscriber = lock(&self.subscriber);
        let delivered = subscriber
            .as_ref()
            .is_some_and(|tx| tx.send(message).is_ok());
        if !delivered {
            // Receiver was dropped
            *subscriber = None;
        }
        delivered
    }

    /// Parse one JSON push payload and deliver it.
    pub fn deliver_json(&self, line: &str) -> Result<bool, Error> {
        let message: PushMessage =
            serde_json::from_str(line).context("Invalid push message payload")?;
        Ok(self.deliver(message))
    }

    pub fn has_subscriber(&self) -> bool {
        lock(&self.subscriber)
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl NotificationProvider for ManualProvider {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn request_permission(&self) -> Result<Permission, Error> {
        Ok(self.permission)
    }

    async fn register_worker(&self, script_path: &str) -> Result<WorkerRegistration, Error> {
        if self.worker_fails {
            return Err(anyhow!("Worker registration rejected for {}", script_path));
        }
        Ok(WorkerRegistration {
            script_path: script_path.to_string(),
            scope: String::from("/"),
        })
    }

    async fn registration_token(&self, _request: TokenRequest<'_>) -> Result<Option<String>, Error> {
        Ok(lock(&self.device_token).clone())
    }

    fn subscribe_foreground(&self) -> Result<mpsc::UnboundedReceiver<PushMessage>, Error> {
        if !self.supported {
            return Err(anyhow!("Foreground messaging is not supported"));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        *lock(&self.subscriber) = Some(tx);
        Ok(rx)
    }
}
