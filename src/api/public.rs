//! Public wire types for the notification endpoints

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Platform tag sent along with every device token.
pub const WEB_PLATFORM: &str = "web";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRegistrationRequest {
    pub token: String,
    pub platform: String,
}

impl TokenRegistrationRequest {
    pub fn web(token: &str) -> Self {
        Self {
            token: token.to_string(),
            platform: WEB_PLATFORM.to_string(),
        }
    }
}

/// A historical notification as the backend returns it. The shape
/// differs slightly from the in-session `NotificationRecord` so every
/// field is lenient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedEntry {
    #[serde(default, alias = "_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub data: HashMap<String, Value>,
    #[serde(default, alias = "created_at", alias = "sentAt")]
    pub created_at: Option<String>,
    #[serde(default, alias = "isRead")]
    pub read: bool,
}

/// One page of the notification feed. `next_cursor` is opaque and is
/// only ever echoed back to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub data: Vec<FeedEntry>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    pub has_more: bool,
}

// Errors

/// A non-2xx response from the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseError {
    pub status: u16,
    pub message: String,
}

impl ResponseError {
    /// Use the response body when there is one, otherwise describe
    /// the status code.
    pub fn new(status: u16, body: &str) -> Self {
        let message = if body.trim().is_empty() {
            format!("Request failed with status code {}", status)
        } else {
            body.to_string()
        };
        Self { status, message }
    }
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ResponseError {}
