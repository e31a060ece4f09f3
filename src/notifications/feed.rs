use crate::models::Notification;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// In-memory list of received notifications, newest first.
#[derive(Debug, Default)]
pub struct NotificationFeed {
    entries: Mutex<Vec<Notification>>,
}

impl NotificationFeed {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Notification>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn push(&self, notification: Notification) {
        self.lock().insert(0, notification);
    }

    pub fn list(&self) -> Vec<Notification> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn unread_count(&self) -> usize {
        self.lock().iter().filter(|n| !n.is_read).count()
    }

    pub fn mark_all_read(&self) {
        for entry in self.lock().iter_mut() {
            entry.is_read = true;
        }
    }

    /// Removes one entry. Returns whether it existed.
    pub fn delete(&self, id: Uuid) -> bool {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|n| n.id != id);
        entries.len() != before
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}
