//! Room-keyed read-through cache of booked events.
//!
//! Each room has one entry holding the last fetched snapshot behind a
//! `watch` channel. Every fetch is tagged with a generation number; a result
//! is applied only while its generation is still the newest one issued for
//! that room, so the latest invalidation always wins.

use crate::models::Event;
use crate::store::{EventStore, StoreError};
use crate::utils::logging::{log_network_error, log_room_refresh};
use chrono::{DateTime, Utc};
use log::debug;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

/// Anything that can be told a room's schedule is out of date.
pub trait Revalidator: Send + Sync {
    fn invalidate(&self, room_id: &str);
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoomSnapshot {
    pub events: Arc<Vec<Event>>,
    pub fetched_at: Option<DateTime<Utc>>,
    /// Set when an invalidation arrived after `fetched_at`.
    pub stale: bool,
    /// Last fetch failure; the previous events are kept.
    pub error: Option<StoreError>,
}

impl RoomSnapshot {
    pub fn is_loaded(&self) -> bool {
        self.fetched_at.is_some()
    }
}

struct RoomEntry {
    generation: u64,
    tx: watch::Sender<RoomSnapshot>,
}

impl RoomEntry {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(RoomSnapshot::default());
        Self { generation: 0, tx }
    }
}

struct Inner {
    store: Arc<dyn EventStore>,
    rooms: Mutex<HashMap<String, RoomEntry>>,
    closed: CancellationToken,
}

#[derive(Clone)]
pub struct RoomEventCache {
    inner: Arc<Inner>,
}

impl RoomEventCache {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                rooms: Mutex::new(HashMap::new()),
                closed: CancellationToken::new(),
            }),
        }
    }

    fn rooms(&self) -> MutexGuard<'_, HashMap<String, RoomEntry>> {
        self.inner.rooms.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn subscribe(&self, room_id: &str) -> watch::Receiver<RoomSnapshot> {
        self.rooms()
            .entry(room_id.to_string())
            .or_insert_with(RoomEntry::new)
            .tx
            .subscribe()
    }

    pub fn snapshot(&self, room_id: &str) -> Option<RoomSnapshot> {
        self.rooms().get(room_id).map(|entry| entry.tx.borrow().clone())
    }

    /// Events currently cached for the room, without fetching.
    pub fn cached_events(&self, room_id: &str) -> Arc<Vec<Event>> {
        self.snapshot(room_id).map(|s| s.events).unwrap_or_default()
    }

    /// Read-through: returns the cached events when loaded and fresh,
    /// otherwise fetches.
    pub async fn events(&self, room_id: &str) -> Result<Arc<Vec<Event>>, StoreError> {
        if let Some(snapshot) = self.snapshot(room_id) {
            if snapshot.is_loaded() && !snapshot.stale {
                return Ok(snapshot.events);
            }
        }
        self.refresh(room_id).await
    }

    /// Fetches the room's events. The result is published only if no newer
    /// fetch was started meanwhile; the fetched list is returned either way.
    pub async fn refresh(&self, room_id: &str) -> Result<Arc<Vec<Event>>, StoreError> {
        let generation = self.begin(room_id);
        let started = Instant::now();
        let result = self.inner.store.list(room_id).await.map(Arc::new);

        match &result {
            Ok(events) => {
                log_room_refresh(room_id, events.len(), started.elapsed().as_millis() as u64);
                self.apply(room_id, generation, |snapshot| {
                    snapshot.events = Arc::clone(events);
                    snapshot.fetched_at = Some(Utc::now());
                    snapshot.stale = false;
                    snapshot.error = None;
                });
            }
            Err(e) => {
                log_network_error(&format!("refresh room '{}'", room_id), e);
                self.apply(room_id, generation, |snapshot| {
                    snapshot.error = Some(e.clone());
                });
            }
        }
        result
    }

    /// Marks the room stale and, inside a runtime, starts a background
    /// refetch. Without a runtime the next `events` call refetches.
    pub fn invalidate(&self, room_id: &str) {
        if self.is_closed() {
            return;
        }
        if let Some(entry) = self.rooms().get(room_id) {
            entry.tx.send_modify(|snapshot| snapshot.stale = true);
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let cache = self.clone();
                let room_id = room_id.to_string();
                handle.spawn(async move {
                    // Failures are recorded on the snapshot.
                    let _ = cache.refresh(&room_id).await;
                });
            }
            Err(_) => debug!("No runtime, room '{}' marked stale only", room_id),
        }
    }

    /// Stops publishing results. In-flight fetches finish but are discarded.
    pub fn close(&self) {
        self.inner.closed.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.inner.closed.is_cancelled()
    }

    fn begin(&self, room_id: &str) -> u64 {
        let mut rooms = self.rooms();
        let entry = rooms.entry(room_id.to_string()).or_insert_with(RoomEntry::new);
        entry.generation += 1;
        entry.generation
    }

    fn apply<F>(&self, room_id: &str, generation: u64, update: F) -> bool
    where
        F: FnOnce(&mut RoomSnapshot),
    {
        if self.is_closed() {
            debug!("Cache closed, discarding result for room '{}'", room_id);
            return false;
        }
        let rooms = self.rooms();
        match rooms.get(room_id) {
            Some(entry) if entry.generation == generation => {
                entry.tx.send_modify(update);
                true
            }
            _ => {
                debug!(
                    "Discarding superseded fetch {} for room '{}'",
                    generation, room_id
                );
                false
            }
        }
    }
}

impl Revalidator for RoomEventCache {
    fn invalidate(&self, room_id: &str) {
        RoomEventCache::invalidate(self, room_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Identity, MeetingType};
    use crate::store::MockEventStore;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn event(id: &str) -> Event {
        Event {
            id: id.to_string(),
            room_id: "r1".to_string(),
            title: "Standup".to_string(),
            organizer: Identity::new("Alice", "alice@example.com"),
            members: vec![],
            meeting_type: MeetingType::Internal,
            other_meeting_type: None,
            start: Utc.with_ymd_and_hms(2025, 6, 10, 9, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2025, 6, 10, 10, 0, 0).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_read_through_fetches_once() {
        let mut store = MockEventStore::new();
        store.expect_list().times(1).returning(|_| Ok(vec![event("a")]));
        let cache = RoomEventCache::new(Arc::new(store));

        assert_eq!(cache.events("r1").await.unwrap().len(), 1);
        assert_eq!(cache.events("r1").await.unwrap().len(), 1);
        assert!(cache.snapshot("r1").unwrap().is_loaded());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_events() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut store = MockEventStore::new();
        store.expect_list().returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(vec![event("a")])
            } else {
                Err(StoreError::transport("offline"))
            }
        });
        let cache = RoomEventCache::new(Arc::new(store));

        cache.refresh("r1").await.unwrap();
        assert!(cache.refresh("r1").await.is_err());

        let snapshot = cache.snapshot("r1").unwrap();
        assert_eq!(snapshot.events.len(), 1);
        assert!(snapshot.error.is_some());
    }

    #[tokio::test]
    async fn test_invalidate_refetches_in_background() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut store = MockEventStore::new();
        store.expect_list().returning(move |_| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            Ok((0..=n).map(|i| event(&i.to_string())).collect())
        });
        let cache = RoomEventCache::new(Arc::new(store));
        let mut rx = cache.subscribe("r1");

        cache.refresh("r1").await.unwrap();
        rx.borrow_and_update();
        cache.invalidate("r1");

        tokio::time::timeout(Duration::from_secs(1), async {
            loop {
                rx.changed().await.unwrap();
                if rx.borrow().events.len() == 2 {
                    break;
                }
            }
        })
        .await
        .unwrap();
        assert!(!cache.snapshot("r1").unwrap().stale);
    }

    #[test]
    fn test_invalidate_without_runtime_marks_stale() {
        let store = MockEventStore::new();
        let cache = RoomEventCache::new(Arc::new(store));
        let _rx = cache.subscribe("r1");
        cache.invalidate("r1");
        assert!(cache.snapshot("r1").unwrap().stale);
    }

    #[tokio::test]
    async fn test_closed_cache_discards_results() {
        let mut store = MockEventStore::new();
        store.expect_list().returning(|_| Ok(vec![event("a")]));
        let cache = RoomEventCache::new(Arc::new(store));
        cache.close();

        let fetched = cache.refresh("r1").await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert!(cache.cached_events("r1").is_empty());
    }
}
