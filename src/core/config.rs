use std::env;
use std::time::Duration;

/// Smallest page the feed endpoint accepts.
pub const MIN_PAGE_SIZE: usize = 1;
/// Largest page the feed endpoint accepts.
pub const MAX_PAGE_SIZE: usize = 50;
pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const DEFAULT_WORKER_SCRIPT_PATH: &str = "/firebase-messaging-sw.js";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: String,
    pub vapid_public_key: String,
    pub worker_script_path: String,
    pub feed_page_size: usize,
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        let host = "127.0.0.1";
        let port = "8000";
        let api_base_url =
            env::var("NUHOUD_API_URL").unwrap_or(format!("http://{}:{}/api", host, port));
        let vapid_public_key = env::var("NUHOUD_VAPID_PUBLIC_KEY").unwrap_or_default();
        let worker_script_path = env::var("NUHOUD_WORKER_SCRIPT_PATH")
            .unwrap_or_else(|_| DEFAULT_WORKER_SCRIPT_PATH.to_string());
        let feed_page_size = env::var("NUHOUD_FEED_PAGE_SIZE")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .map(clamp_page_size)
            .unwrap_or(DEFAULT_PAGE_SIZE);
        let request_timeout = env::var("NUHOUD_REQUEST_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        Self {
            api_base_url,
            vapid_public_key,
            worker_script_path,
            feed_page_size,
            request_timeout,
        }
    }
}

/// Out of range page sizes are clamped rather than rejected.
pub fn clamp_page_size(requested: usize) -> usize {
    requested.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE)
}
