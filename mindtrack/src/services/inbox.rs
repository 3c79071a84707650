//! In-app notification inbox
//!
//! Keeps delivered notifications for the UI's bell menu, newest first.

use crate::config::MAX_INBOX_ENTRIES;
use crate::models::{NotificationKind, NotificationRequest};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboxEntry {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub url: String,
    pub timestamp: DateTime<Utc>,
    pub read: bool,
}

#[derive(Debug, Clone, Default)]
pub struct NotificationInbox {
    entries: Arc<RwLock<VecDeque<InboxEntry>>>,
}

impl NotificationInbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a delivered notification as unread; returns its id
    pub async fn add(&self, request: &NotificationRequest) -> String {
        let entry = InboxEntry {
            id: Uuid::new_v4().to_string(),
            kind: request.kind,
            title: request.title.clone(),
            message: request.body.clone(),
            url: request.target_url.clone(),
            timestamp: Utc::now(),
            read: false,
        };
        let id = entry.id.clone();

        let mut entries = self.entries.write().await;
        entries.push_front(entry);
        entries.truncate(MAX_INBOX_ENTRIES);
        id
    }

    pub async fn list(&self) -> Vec<InboxEntry> {
        self.entries.read().await.iter().cloned().collect()
    }

    pub async fn unread_count(&self) -> usize {
        self.entries.read().await.iter().filter(|e| !e.read).count()
    }

    /// Returns false when no entry has that id
    pub async fn mark_as_read(&self, id: &str) -> bool {
        let mut entries = self.entries.write().await;
        match entries.iter_mut().find(|e| e.id == id) {
            Some(entry) => {
                entry.read = true;
                true
            }
            None => false,
        }
    }

    pub async fn mark_all_as_read(&self) {
        for entry in self.entries.write().await.iter_mut() {
            entry.read = true;
        }
    }
}
