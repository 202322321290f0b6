//! Cursor paginated loader for historical notifications.
//!
//! A loader belongs to one consumer (a view). It supports a full reset
//! and incremental `load_more`. Every fetch is issued with a fresh
//! cancellation token and issuing a new one cancels the previous, so
//! the last request issued always wins. A cancelled fetch never touches
//! loader state: both the cancellation and the completion of a fetch
//! happen under the same lock.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Error, Result};
use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::public::{FeedEntry, FeedPage};
use crate::core::config::clamp_page_size;
use crate::core::{CredentialSource, Credentials};

/// Backend endpoint returning pages of historical notifications.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_page(
        &self,
        bearer: &str,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<FeedPage, Error>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Error,
    Settled,
}

/// What a view renders.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
    pub items: Vec<FeedEntry>,
    pub cursor: Option<String>,
    pub has_more: bool,
    pub status: LoadStatus,
    pub error: Option<String>,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            cursor: None,
            has_more: true,
            status: LoadStatus::Idle,
            error: None,
        }
    }
}

impl FeedState {
    fn logged_out() -> Self {
        Self {
            has_more: false,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    // First page, replaces the list
    Reset,
    // Continuation, appends to the list
    Append,
}

#[derive(Debug)]
struct Inner {
    state: FeedState,
    in_flight: Option<CancellationToken>,
    last_mode: Mode,
    // Whether any page has landed since the last reset
    page_loaded: bool,
}

struct Shared {
    source: Arc<dyn FeedSource>,
    credentials: Arc<dyn CredentialSource>,
    page_size: usize,
    inner: Mutex<Inner>,
    updates: watch::Sender<FeedState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &Inner) {
        self.updates.send_replace(inner.state.clone());
    }

    fn reset(self: &Arc<Self>) {
        let mut inner = self.lock();
        cancel_in_flight(&mut inner);
        inner.state = FeedState::default();
        inner.page_loaded = false;
        self.fetch(&mut inner, Mode::Reset);
    }

    fn load_more(self: &Arc<Self>) -> bool {
        let mut inner = self.lock();
        if inner.state.status == LoadStatus::Loading || !inner.state.has_more {
            return false;
        }
        // Without a cursor a continuation would refetch the first page
        if inner.page_loaded && inner.state.cursor.is_none() {
            tracing::debug!("Feed reports more pages but gave no cursor, not loading more");
            return false;
        }
        self.fetch(&mut inner, Mode::Append)
    }

    fn retry(self: &Arc<Self>) -> bool {
        let mut inner = self.lock();
        if inner.state.status != LoadStatus::Error {
            return false;
        }
        let mode = inner.last_mode;
        self.fetch(&mut inner, mode)
    }

    /// Issue a fetch, superseding any request still in flight. Returns
    /// false when there is no credential to fetch with.
    fn fetch(self: &Arc<Self>, inner: &mut Inner, mode: Mode) -> bool {
        cancel_in_flight(inner);

        let Some(bearer) = self.credentials.current_token() else {
            tracing::debug!("No credential, clearing notification feed");
            inner.state = FeedState::logged_out();
            inner.page_loaded = false;
            self.publish(inner);
            return false;
        };

        let cursor = match mode {
            Mode::Reset => None,
            Mode::Append => inner.state.cursor.clone(),
        };
        let token = CancellationToken::new();
        inner.in_flight = Some(token.clone());
        inner.last_mode = mode;
        inner.state.status = LoadStatus::Loading;
        inner.state.error = None;
        self.publish(inner);

        let shared = Arc::clone(self);
        tokio::spawn(async move {
            let result = tokio::select! {
                biased;
                _ = token.cancelled() => return,
                result = shared.source.fetch_page(&bearer, cursor.as_deref(), shared.page_size) => result,
            };
            shared.complete(&token, mode, result);
        });
        true
    }

    fn complete(&self, token: &CancellationToken, mode: Mode, result: Result<FeedPage, Error>) {
        let mut inner = self.lock();
        // Superseded between the response arriving and taking the lock
        if token.is_cancelled() {
            return;
        }
        inner.in_flight = None;

        match result {
            Ok(page) => {
                match mode {
                    Mode::Reset => inner.state.items = page.data,
                    Mode::Append => inner.state.items.extend(page.data),
                }
                inner.page_loaded = true;
                inner.state.cursor = page.next_cursor;
                inner.state.has_more = page.has_more;
                inner.state.status = LoadStatus::Settled;
                inner.state.error = None;
            }
            Err(err) => {
                tracing::error!("Failed to load notifications: {:#}", err);
                inner.state.status = LoadStatus::Error;
                inner.state.error = Some(err.to_string());
            }
        }
        self.publish(&inner);
    }
}

fn cancel_in_flight(inner: &mut Inner) {
    if let Some(token) = inner.in_flight.take() {
        token.cancel();
    }
}

/// Paginated view over the notification feed.
///
/// Dropping the loader cancels whatever request is still in flight.
pub struct FeedLoader {
    shared: Arc<Shared>,
    watcher: Option<JoinHandle<()>>,
}

impl FeedLoader {
    /// Create an idle loader. Nothing is fetched until `reset` or
    /// `load_more` is called.
    pub fn new(
        source: Arc<dyn FeedSource>,
        credentials: Arc<dyn CredentialSource>,
        page_size: usize,
    ) -> Self {
        let state = FeedState::default();
        let (updates, _) = watch::channel(state.clone());
        let shared = Arc::new(Shared {
            source,
            credentials,
            page_size: clamp_page_size(page_size),
            inner: Mutex::new(Inner {
                state,
                in_flight: None,
                last_mode: Mode::Reset,
                page_loaded: false,
            }),
            updates,
        });
        Self {
            shared,
            watcher: None,
        }
    }

    /// Create a loader, fetch the first page and reset again every time
    /// the credential changes.
    pub fn mount(source: Arc<dyn FeedSource>, credentials: &Credentials, page_size: usize) -> Self {
        let mut changes = credentials.subscribe();
        changes.borrow_and_update();

        let mut loader = Self::new(source, Arc::new(credentials.clone()), page_size);
        loader.reset();

        let shared = Arc::clone(&loader.shared);
        loader.watcher = Some(tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                tracing::debug!("Credential changed, reloading notification feed");
                shared.reset();
            }
        }));
        loader
    }

    pub fn page_size(&self) -> usize {
        self.shared.page_size
    }

    /// Clear the list and fetch the first page.
    pub fn reset(&self) {
        self.shared.reset();
    }

    /// Fetch the next page. A no-op returning false while a request is
    /// loading, when there are no more pages, or when logged out.
    pub fn load_more(&self) -> bool {
        self.shared.load_more()
    }

    /// Re-issue the request that failed. Returns false unless the
    /// loader is in the error state.
    pub fn retry(&self) -> bool {
        self.shared.retry()
    }

    pub fn state(&self) -> FeedState {
        self.shared.lock().state.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FeedState> {
        self.shared.updates.subscribe()
    }

    /// Wait until no request is loading and return the state.
    pub async fn settled(&self) -> FeedState {
        let mut rx = self.subscribe();
        let settled = match rx.wait_for(|s| s.status != LoadStatus::Loading).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        settled
    }
}

impl Drop for FeedLoader {
    fn drop(&mut self) {
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
        cancel_in_flight(&mut self.shared.lock());
    }
}
