//! Routes live foreground push messages into the notification store.

use chrono::Utc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::provider::NotificationProvider;
use super::store::NotificationStore;

/// Owns the foreground subscription. Dropping the handle (or calling
/// `stop`) ends the routing task, which releases the subscription.
#[derive(Debug)]
pub struct RouterHandle {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl RouterHandle {
    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }

    /// Release the subscription and wait for the routing task to exit.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        let task = &mut self.task;
        if let Err(err) = task.await {
            tracing::error!("Foreground router task failed: {}", err);
        }
    }
}

impl Drop for RouterHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Subscribe to foreground messages and spawn a task feeding each one
/// into `store` in the order it was received. Returns `None` when the
/// provider is unavailable, in which case push notifications are
/// silently disabled.
pub fn spawn_foreground_router(
    provider: &dyn NotificationProvider,
    store: NotificationStore,
) -> Option<RouterHandle> {
    if !provider.is_supported() {
        tracing::warn!("Foreground notifications are not supported in this environment");
        return None;
    }

    let mut messages = match provider.subscribe_foreground() {
        Ok(rx) => rx,
        Err(err) => {
            tracing::warn!("Failed to subscribe to foreground messages: {:#}", err);
            return None;
        }
    };

    let cancel = CancellationToken::new();
    let stopped = cancel.clone();
    let task = tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                _ = stopped.cancelled() => break,
                message = messages.recv() => {
                    let Some(message) = message else {
                        tracing::debug!("Foreground message channel closed");
                        break;
                    };
                    let record = store.add(message.into_draft(Utc::now()));
                    tracing::debug!("Received foreground notification {}", record.id);
                }
            }
        }
        // `messages` is dropped here which unsubscribes
    });

    Some(RouterHandle { cancel, task })
}
