//! HTTP client for the notification endpoints of the REST backend.

use anyhow::{Context, Error, Result};
use async_trait::async_trait;

use super::public::{FeedPage, ResponseError, TokenRegistrationRequest};
use crate::core::AppConfig;
use crate::core::config::clamp_page_size;
use crate::feed::FeedSource;
use crate::notify::TokenSink;

#[derive(Clone, Debug)]
pub struct BackendClient {
    api_base_url: String,
    http: reqwest::Client,
}

impl BackendClient {
    pub fn new(api_base_url: &str, timeout: std::time::Duration) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, Error> {
        Self::new(&config.api_base_url, config.request_timeout)
    }

    fn url(&self, path: &str) -> Result<reqwest::Url, Error> {
        reqwest::Url::parse(&format!("{}{}", self.api_base_url, path))
            .with_context(|| format!("Invalid API URL {}{}", self.api_base_url, path))
    }

    /// Submit a push registration token for the authenticated user.
    pub async fn register_device_token(&self, bearer: &str, token: &str) -> Result<(), Error> {
        let url = self.url("/notifications/device-token")?;
        let response = self
            .http
            .post(url)
            .bearer_auth(bearer)
            .json(&TokenRegistrationRequest::web(token))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    /// Fetch one page of historical notifications. `limit` is clamped
    /// to what the endpoint accepts.
    pub async fn fetch_notifications(
        &self,
        bearer: &str,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<FeedPage, Error> {
        let mut url = self.url("/notifications")?;
        url.query_pairs_mut()
            .append_pair("limit", &clamp_page_size(limit).to_string());
        if let Some(cursor) = cursor {
            url.query_pairs_mut().append_pair("cursor", cursor);
        }

        let response = self.http.get(url).bearer_auth(bearer).send().await?;
        let page = ensure_success(response)
            .await?
            .json::<FeedPage>()
            .await
            .context("Malformed notification feed response")?;
        Ok(page)
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ResponseError::new(status.as_u16(), &body).into())
}

#[async_trait]
impl TokenSink for BackendClient {
    async fn submit_token(&self, bearer: &str, token: &str) -> Result<(), Error> {
        self.register_device_token(bearer, token).await
    }
}

#[async_trait]
impl FeedSource for BackendClient {
    async fn fetch_page(
        &self,
        bearer: &str,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<FeedPage, Error> {
        self.fetch_notifications(bearer, cursor, limit).await
    }
}
