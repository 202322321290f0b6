//! Session lifecycle for the notification core.
//!
//! A session is created after authentication and owns the live store,
//! the token registrar and the foreground subscription. Ending the
//! session releases the subscription, empties the store and logs the
//! credential out.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::core::{AppConfig, Credentials};
use crate::notify::{
    NotificationProvider, NotificationStore, RegistrationOutcome, RouterHandle, TokenRegistrar,
    TokenSink, spawn_foreground_router,
};

pub struct Session {
    credentials: Credentials,
    store: NotificationStore,
    registrar: Arc<TokenRegistrar>,
    router: Option<RouterHandle>,
    registration: Option<JoinHandle<RegistrationOutcome>>,
}

impl Session {
    /// Start the registrar in the background and subscribe to
    /// foreground messages. Neither can fail the session.
    pub fn start(
        config: &AppConfig,
        provider: Arc<dyn NotificationProvider>,
        sink: Arc<dyn TokenSink>,
        credentials: Credentials,
    ) -> Self {
        let store = NotificationStore::new();
        let registrar = Arc::new(TokenRegistrar::new(
            config,
            Arc::clone(&provider),
            sink,
            Arc::new(credentials.clone()),
        ));

        let registration = {
            let registrar = Arc::clone(&registrar);
            tokio::spawn(async move { registrar.register().await })
        };
        let router = spawn_foreground_router(provider.as_ref(), store.clone());

        Self {
            credentials,
            store,
            registrar,
            router,
            registration: Some(registration),
        }
    }

    pub fn store(&self) -> &NotificationStore {
        &self.store
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn registrar(&self) -> &Arc<TokenRegistrar> {
        &self.registrar
    }

    /// Whether foreground messages are being routed into the store.
    pub fn is_listening(&self) -> bool {
        self.router.as_ref().is_some_and(RouterHandle::is_active)
    }

    /// Wait for the registration started with the session. Returns
    /// `None` if it was already awaited.
    pub async fn registration(&mut self) -> Option<RegistrationOutcome> {
        let handle = self.registration.take()?;
        match handle.await {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                tracing::error!("Push registration task failed: {}", err);
                None
            }
        }
    }

    /// Tear the session down.
    pub async fn end(mut self) {
        if let Some(registration) = self.registration.take() {
            registration.abort();
        }
        if let Some(router) = self.router.take() {
            router.stop().await;
        }
        self.store.clear();
        self.credentials.logout();
    }
}
