use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title used when a push payload carries none.
pub const DEFAULT_TITLE: &str = "Notification";

/// A notification in the live, in-session list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    pub id: String,
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
    // When this client observed the message, not when the server sent it
    pub received_at: DateTime<Utc>,
    pub read: bool,
}

/// A record that has not been added to the store yet. The store fills
/// in the id and read flag when they are missing.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationDraft {
    pub id: Option<String>,
    pub title: String,
    pub body: String,
    pub data: HashMap<String, String>,
    pub received_at: DateTime<Utc>,
    pub read: Option<bool>,
}

impl NotificationDraft {
    pub fn new(title: &str, body: &str) -> Self {
        Self {
            id: None,
            title: title.to_string(),
            body: body.to_string(),
            data: HashMap::new(),
            received_at: Utc::now(),
            read: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushNotification {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

/// A push message as delivered by the live foreground channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    #[serde(default, alias = "fcmMessageId")]
    pub message_id: Option<String>,
    #[serde(default)]
    pub notification: Option<PushNotification>,
    #[serde(default)]
    pub data: HashMap<String, String>,
}

impl PushMessage {
    // Empty strings count as missing at every step
    pub fn title(&self) -> String {
        self.notification
            .as_ref()
            .and_then(|n| n.title.clone())
            .filter(|s| !s.is_empty())
            .or_else(|| self.data.get("title").cloned().filter(|s| !s.is_empty()))
            .unwrap_or_else(|| DEFAULT_TITLE.to_string())
    }

    pub fn body(&self) -> String {
        self.notification
            .as_ref()
            .and_then(|n| n.body.clone())
            .filter(|s| !s.is_empty())
            .or_else(|| self.data.get("body").cloned().filter(|s| !s.is_empty()))
            .unwrap_or_default()
    }

    /// Normalize into a draft stamped with the time of receipt. Any
    /// server provided timestamp in the payload is ignored.
    pub fn into_draft(self, received_at: DateTime<Utc>) -> NotificationDraft {
        NotificationDraft {
            title: self.title(),
            body: self.body(),
            id: self.message_id,
            data: self.data,
            received_at,
            read: None,
        }
    }
}
