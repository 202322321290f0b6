//! Delivers this device's push registration token to the backend.
//!
//! Registration is best effort: every failure is logged and reported
//! through `RegistrationOutcome`, never returned as an error. The last
//! token successfully submitted is kept in memory so an unchanged
//! token is not sent twice in the same session.

use std::sync::Arc;

use anyhow::{Error, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;

use super::provider::{NotificationProvider, Permission, TokenRequest};
use crate::core::{AppConfig, CredentialSource};

/// Backend endpoint accepting device registration tokens.
#[async_trait]
pub trait TokenSink: Send + Sync {
    async fn submit_token(&self, bearer: &str, token: &str) -> Result<(), Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotAuthenticated,
    Unsupported,
    PermissionDenied,
    NoToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Worker registration, permission prompt or token retrieval failed.
    Registration,
    /// The backend rejected the token or could not be reached.
    Submission,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Registered,
    Unchanged,
    Skipped(SkipReason),
    Failed(FailureKind),
}

pub struct TokenRegistrar {
    provider: Arc<dyn NotificationProvider>,
    sink: Arc<dyn TokenSink>,
    credentials: Arc<dyn CredentialSource>,
    worker_script_path: String,
    vapid_public_key: String,
    // Held for the whole flow so overlapping calls can't both submit
    last_sent: Mutex<Option<String>>,
}

impl TokenRegistrar {
    pub fn new(
        config: &AppConfig,
        provider: Arc<dyn NotificationProvider>,
        sink: Arc<dyn TokenSink>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        Self {
            provider,
            sink,
            credentials,
            worker_script_path: config.worker_script_path.clone(),
            vapid_public_key: config.vapid_public_key.clone(),
            last_sent: Mutex::new(None),
        }
    }

    pub async fn last_sent_token(&self) -> Option<String> {
        self.last_sent.lock().await.clone()
    }

    /// Run the registration flow once.
    pub async fn register(&self) -> RegistrationOutcome {
        let mut last_sent = self.last_sent.lock().await;

        let Some(bearer) = self.credentials.current_token() else {
            tracing::debug!("Skipping push registration, not authenticated");
            return RegistrationOutcome::Skipped(SkipReason::NotAuthenticated);
        };

        if !self.provider.is_supported() {
            tracing::warn!("Push notifications are not supported in this environment");
            return RegistrationOutcome::Skipped(SkipReason::Unsupported);
        }

        let registration = match self
            .provider
            .register_worker(&self.worker_script_path)
            .await
        {
            Ok(registration) => registration,
            Err(err) => {
                tracing::error!("Failed to register notification worker: {:#}", err);
                return RegistrationOutcome::Failed(FailureKind::Registration);
            }
        };

        match self.provider.request_permission().await {
            Ok(Permission::Granted) => {}
            Ok(permission) => {
                tracing::info!("Notification permission not granted: {:?}", permission);
                return RegistrationOutcome::Skipped(SkipReason::PermissionDenied);
            }
            Err(err) => {
                tracing::error!("Failed to request notification permission: {:#}", err);
                return RegistrationOutcome::Failed(FailureKind::Registration);
            }
        }

        let request = TokenRequest {
            vapid_public_key: &self.vapid_public_key,
            registration: &registration,
        };
        let token = match self.provider.registration_token(request).await {
            Ok(Some(token)) => token,
            Ok(None) => {
                tracing::warn!("No registration token available");
                return RegistrationOutcome::Skipped(SkipReason::NoToken);
            }
            Err(err) => {
                tracing::error!("Failed to get registration token: {:#}", err);
                return RegistrationOutcome::Failed(FailureKind::Registration);
            }
        };

        if last_sent.as_deref() == Some(token.as_str()) {
            tracing::debug!("Registration token unchanged, not resubmitting");
            return RegistrationOutcome::Unchanged;
        }

        match self.sink.submit_token(&bearer, &token).await {
            Ok(()) => {
                tracing::info!("Registered device token for push notifications");
                *last_sent = Some(token);
                RegistrationOutcome::Registered
            }
            Err(err) => {
                tracing::error!("Failed to submit registration token: {:#}", err);
                RegistrationOutcome::Failed(FailureKind::Submission)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Credentials;
    use crate::notify::PushMessage;
    use crate::notify::manual::ManualProvider;
    use crate::notify::provider::WorkerRegistration;
    use anyhow::anyhow;
    use std::sync::Mutex as StdMutex;
    use tokio::sync::mpsc;

    /// Provider whose permission prompt or token lookup errors out
    struct BrokenProvider {
        permission_fails: bool,
    }

    #[async_trait]
    impl NotificationProvider for BrokenProvider {
        fn is_supported(&self) -> bool {
            true
        }

        async fn request_permission(&self) -> Result<Permission, Error> {
            if self.permission_fails {
                return Err(anyhow!("permission API unavailable"));
            }
            Ok(Permission::Granted)
        }

        async fn register_worker(&self, script_path: &str) -> Result<WorkerRegistration, Error> {
            Ok(WorkerRegistration {
                script_path: script_path.to_string(),
                scope: String::from("/"),
            })
        }

        async fn registration_token(
            &self,
            _request: TokenRequest<'_>,
        ) -> Result<Option<String>, Error> {
            Err(anyhow!("messaging service unreachable"))
        }

        fn subscribe_foreground(&self) -> Result<mpsc::UnboundedReceiver<PushMessage>, Error> {
            Err(anyhow!("not used"))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        submitted: StdMutex<Vec<(String, String)>>,
        fail: bool,
    }

    #[async_trait]
    impl TokenSink for RecordingSink {
        async fn submit_token(&self, bearer: &str, token: &str) -> Result<(), Error> {
            self.submitted
                .lock()
                .unwrap()
                .push((bearer.to_string(), token.to_string()));
            if self.fail {
                return Err(anyhow!("backend unreachable"));
            }
            Ok(())
        }
    }

    impl RecordingSink {
        fn calls(&self) -> usize {
            self.submitted.lock().unwrap().len()
        }
    }

    fn registrar(
        provider: Arc<dyn NotificationProvider>,
        sink: Arc<RecordingSink>,
        bearer: Option<&str>,
    ) -> TokenRegistrar {
        let config = AppConfig {
            api_base_url: String::from("http://localhost"),
            vapid_public_key: String::from("vapid-public"),
            worker_script_path: String::from("/firebase-messaging-sw.js"),
            feed_page_size: 20,
            request_timeout: std::time::Duration::from_secs(5),
        };
        let credentials = Credentials::new(bearer.map(String::from));
        TokenRegistrar::new(&config, provider, sink, Arc::new(credentials))
    }

    #[tokio::test]
    async fn it_submits_token_once_per_value() {
        let provider = Arc::new(ManualProvider::new(Some(String::from("device-1"))));
        let sink = Arc::new(RecordingSink::default());
        let registrar = registrar(provider.clone(), sink.clone(), Some("tok-1"));

        assert_eq!(registrar.register().await, RegistrationOutcome::Registered);
        assert_eq!(registrar.register().await, RegistrationOutcome::Unchanged);
        assert_eq!(sink.calls(), 1);
        assert_eq!(
            sink.submitted.lock().unwrap()[0],
            (String::from("tok-1"), String::from("device-1"))
        );

        provider.rotate_token(Some(String::from("device-2")));
        assert_eq!(registrar.register().await, RegistrationOutcome::Registered);
        assert_eq!(sink.calls(), 2);
        assert_eq!(registrar.last_sent_token().await.as_deref(), Some("device-2"));
    }

    #[tokio::test]
    async fn it_submits_once_when_called_concurrently() {
        let provider = Arc::new(ManualProvider::new(Some(String::from("device-1"))));
        let sink = Arc::new(RecordingSink::default());
        let registrar = registrar(provider, sink.clone(), Some("tok-1"));

        let (a, b) = tokio::join!(registrar.register(), registrar.register());
        assert!(a == RegistrationOutcome::Registered || b == RegistrationOutcome::Registered);
        assert_eq!(sink.calls(), 1);
    }

    #[tokio::test]
    async fn it_skips_without_credential() {
        let provider = Arc::new(ManualProvider::new(Some(String::from("device-1"))));
        let sink = Arc::new(RecordingSink::default());
        let registrar = registrar(provider, sink.clone(), None);

        assert_eq!(
            registrar.register().await,
            RegistrationOutcome::Skipped(SkipReason::NotAuthenticated)
        );
        assert_eq!(sink.calls(), 0);
    }

    #[tokio::test]
    async fn it_skips_when_unsupported() {
        let provider = Arc::new(ManualProvider::unsupported());
        let sink = Arc::new(RecordingSink::default());
        let registrar = registrar(provider, sink.clone(), Some("tok-1"));

        assert_eq!(
            registrar.register().await,
            RegistrationOutcome::Skipped(SkipReason::Unsupported)
        );
        assert_eq!(sink.calls(), 0);
    }

    #[tokio::test]
    async fn it_skips_when_permission_dismissed() {
        let provider = Arc::new(
            ManualProvider::new(Some(String::from("device-1"))).with_permission(Permission::Default),
        );
        let sink = Arc::new(RecordingSink::default());
        let registrar = registrar(provider, sink.clone(), Some("tok-1"));

        assert_eq!(
            registrar.register().await,
            RegistrationOutcome::Skipped(SkipReason::PermissionDenied)
        );
        assert_eq!(sink.calls(), 0);
    }

    #[tokio::test]
    async fn it_skips_when_no_token_issued() {
        let provider = Arc::new(ManualProvider::new(None));
        let sink = Arc::new(RecordingSink::default());
        let registrar = registrar(provider, sink.clone(), Some("tok-1"));

        assert_eq!(
            registrar.register().await,
            RegistrationOutcome::Skipped(SkipReason::NoToken)
        );
        assert_eq!(sink.calls(), 0);
    }

    #[tokio::test]
    async fn it_reports_worker_failure() {
        let provider = Arc::new(
            ManualProvider::new(Some(String::from("device-1"))).with_failing_worker(),
        );
        let sink = Arc::new(RecordingSink::default());
        let registrar = registrar(provider, sink.clone(), Some("tok-1"));

        assert_eq!(
            registrar.register().await,
            RegistrationOutcome::Failed(FailureKind::Registration)
        );
        assert_eq!(sink.calls(), 0);
    }

    #[tokio::test]
    async fn it_reports_permission_request_failure() {
        let provider = Arc::new(BrokenProvider {
            permission_fails: true,
        });
        let sink = Arc::new(RecordingSink::default());
        let registrar = registrar(provider, sink.clone(), Some("tok-1"));

        assert_eq!(
            registrar.register().await,
            RegistrationOutcome::Failed(FailureKind::Registration)
        );
        assert_eq!(sink.calls(), 0);
        assert_eq!(registrar.last_sent_token().await, None);
    }

    #[tokio::test]
    async fn it_reports_token_retrieval_failure() {
        let provider = Arc::new(BrokenProvider {
            permission_fails: false,
        });
        let sink = Arc::new(RecordingSink::default());
        let registrar = registrar(provider, sink.clone(), Some("tok-1"));

        assert_eq!(
            registrar.register().await,
            RegistrationOutcome::Failed(FailureKind::Registration)
        );
        assert_eq!(sink.calls(), 0);
    }

    #[tokio::test]
    async fn it_resubmits_after_submission_failure() {
        let provider = Arc::new(ManualProvider::new(Some(String::from("device-1"))));
        let sink = Arc::new(RecordingSink {
            fail: true,
            ..Default::default()
        });
        let registrar = registrar(provider, sink.clone(), Some("tok-1"));

        assert_eq!(
            registrar.register().await,
            RegistrationOutcome::Failed(FailureKind::Submission)
        );
        assert_eq!(registrar.last_sent_token().await, None);

        assert_eq!(
            registrar.register().await,
            RegistrationOutcome::Failed(FailureKind::Submission)
        );
        assert_eq!(sink.calls(), 2);
    }
}
