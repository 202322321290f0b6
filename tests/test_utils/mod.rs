//! Test utilities for integration tests
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use tokio::sync::oneshot;

use nuhoud_notify::api::{FeedEntry, FeedPage};
use nuhoud_notify::core::AppConfig;
use nuhoud_notify::feed::FeedSource;

#[derive(Debug, Clone, PartialEq)]
pub struct FetchCall {
    pub bearer: String,
    pub cursor: Option<String>,
    pub limit: usize,
}

struct Scripted {
    gate: Option<oneshot::Receiver<()>>,
    result: Result<FeedPage, String>,
}

/// A feed source answering from a script. Gated responses are held
/// back until the returned sender fires, which lets a test decide the
/// order in which overlapping requests complete.
#[derive(Default)]
pub struct ScriptedFeedSource {
    calls: Mutex<Vec<FetchCall>>,
    script: Mutex<VecDeque<Scripted>>,
}

impl ScriptedFeedSource {
    pub fn respond(&self, page: FeedPage) {
        self.push(None, Ok(page));
    }

    pub fn respond_gated(&self, page: FeedPage) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.push(Some(rx), Ok(page));
        tx
    }

    pub fn fail(&self, message: &str) {
        self.push(None, Err(message.to_string()));
    }

    fn push(&self, gate: Option<oneshot::Receiver<()>>, result: Result<FeedPage, String>) {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted { gate, result });
    }

    pub fn calls(&self) -> Vec<FetchCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Wait until `n` fetches have been issued.
    pub async fn wait_for_calls(&self, n: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while self.calls.lock().unwrap().len() < n {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("timed out waiting for fetch calls");
    }
}

#[async_trait]
impl FeedSource for ScriptedFeedSource {
    async fn fetch_page(
        &self,
        bearer: &str,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<FeedPage, Error> {
        self.calls.lock().unwrap().push(FetchCall {
            bearer: bearer.to_string(),
            cursor: cursor.map(String::from),
            limit,
        });
        let scripted = self.script.lock().unwrap().pop_front();
        let Some(Scripted { gate, result }) = scripted else {
            return Err(anyhow!("unexpected fetch"));
        };
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        result.map_err(|message| anyhow!(message))
    }
}

pub fn entry(id: &str) -> FeedEntry {
    FeedEntry {
        id: Some(id.to_string()),
        title: format!("Notification {}", id),
        body: String::new(),
        data: Default::default(),
        created_at: Some(String::from("2026-10-01T09:00:00Z")),
        read: false,
    }
}

/// A page holding entries `n{from}..=n{to}`.
pub fn page(from: usize, to: usize, next_cursor: Option<&str>, has_more: bool) -> FeedPage {
    FeedPage {
        data: (from..=to).map(|i| entry(&format!("n{}", i))).collect(),
        next_cursor: next_cursor.map(String::from),
        has_more,
    }
}

pub fn ids(entries: &[FeedEntry]) -> Vec<String> {
    entries.iter().filter_map(|e| e.id.clone()).collect()
}

pub fn test_config(api_base_url: &str) -> AppConfig {
    AppConfig {
        api_base_url: api_base_url.to_string(),
        vapid_public_key: String::from("test-vapid-public-key"),
        worker_script_path: String::from("/firebase-messaging-sw.js"),
        feed_page_size: 20,
        request_timeout: Duration::from_secs(5),
    }
}
