//! Live, session scoped list of notifications.
//!
//! The store is the only writer of the list. Every operation takes the
//! lock once, mutates, and publishes the new unread count before
//! releasing it, so no observer ever sees a half applied update.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use super::models::{NotificationDraft, NotificationRecord};
use crate::core::ids::unique_id;

/// Most recent notifications kept in memory. Older ones are evicted.
pub const MAX_LIVE_NOTIFICATIONS: usize = 50;

#[derive(Debug)]
struct Shared {
    // Newest first
    records: Mutex<VecDeque<NotificationRecord>>,
    unread: watch::Sender<usize>,
}

/// Cloneable handle to the store. Clones share the same list.
#[derive(Clone, Debug)]
pub struct NotificationStore {
    shared: Arc<Shared>,
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationStore {
    pub fn new() -> Self {
        let (unread, _) = watch::channel(0);
        Self {
            shared: Arc::new(Shared {
                records: Mutex::new(VecDeque::with_capacity(MAX_LIVE_NOTIFICATIONS)),
                unread,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<NotificationRecord>> {
        self.shared
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, records: &VecDeque<NotificationRecord>) {
        self.shared.unread.send_replace(count_unread(records));
    }

    /// Insert a notification at the head of the list and return the
    /// stored record. A record with an id already in the list replaces
    /// the older entry.
    pub fn add(&self, draft: NotificationDraft) -> NotificationRecord {
        let mut records = self.lock();

        let id = match draft.id {
            Some(id) if !id.is_empty() => {
                records.retain(|r| r.id != id);
                id
            }
            _ => unique_id(|candidate| records.iter().any(|r| r.id == candidate)),
        };
        let record = NotificationRecord {
            id,
            title: draft.title,
            body: draft.body,
            data: draft.data,
            received_at: draft.received_at,
            read: draft.read.unwrap_or(false),
        };

        records.push_front(record.clone());
        records.truncate(MAX_LIVE_NOTIFICATIONS);
        self.publish(&records);
        record
    }

    pub fn mark_all_read(&self) {
        let mut records = self.lock();
        for record in records.iter_mut() {
            record.read = true;
        }
        self.publish(&records);
    }

    /// Mark a single notification as read. Returns false when no record
    /// has that id.
    pub fn mark_read(&self, id: &str) -> bool {
        let mut records = self.lock();
        let found = match records.iter_mut().find(|r| r.id == id) {
            Some(record) => {
                record.read = true;
                true
            }
            None => false,
        };
        self.publish(&records);
        found
    }

    pub fn clear(&self) {
        let mut records = self.lock();
        records.clear();
        self.publish(&records);
    }

    /// Snapshot of the list, newest first.
    pub fn records(&self) -> Vec<NotificationRecord> {
        self.lock().iter().cloned().collect()
    }

    pub fn unread_count(&self) -> usize {
        count_unread(&self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Watch the unread count, e.g. to render a badge.
    pub fn subscribe(&self) -> watch::Receiver<usize> {
        self.shared.unread.subscribe()
    }
}

fn count_unread(records: &VecDeque<NotificationRecord>) -> usize {
    records.iter().filter(|r| !r.read).count()
}
