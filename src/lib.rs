// Roombook Library
// Scheduling engine for the room-booking client: time windows, conflict
// detection, slot policy, form validation and the booking lifecycle

pub mod cache;
pub mod calendar;
pub mod config;
pub mod directory;
pub mod error;
pub mod forms;
pub mod http_config;
pub mod lifecycle;
pub mod models;
pub mod notifications;
pub mod session;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use cache::{Revalidator, RoomEventCache, RoomSnapshot};
pub use calendar::{CandidateSlot, SlotContext, TimeWindow, ViewGranularity};
pub use config::ClientConfig;
pub use directory::{MemberSearch, SearchOutcome};
pub use error::{AppError, AppResult};
pub use forms::EventFormValidator;
pub use lifecycle::{DeleteConfirmation, EventLifecycleCoordinator, LifecycleState};
pub use models::*;
pub use session::SessionContext;
pub use store::{DirectorySearch, EventStore, HttpEventStore, RoomCatalog, StoreError};

use std::sync::Arc;

/// Shared client state: one store, one cache, one shutdown token.
#[derive(Clone)]
pub struct AppState {
    pub config: ClientConfig,
    pub store: Arc<dyn EventStore>,
    pub rooms: Arc<dyn RoomCatalog>,
    pub cache: RoomEventCache,
    pub shutdown: tokio_util::sync::CancellationToken,
}

impl AppState {
    /// Wires the HTTP store for `config.base_url`.
    pub fn connect(config: ClientConfig) -> AppResult<Self> {
        let http = Arc::new(HttpEventStore::from_config(
            config.base_url.clone(),
            &config.reads,
            &config.api,
        )?);
        Ok(Self::with_store(config, http.clone(), http))
    }

    pub fn with_store(config: ClientConfig, store: Arc<dyn EventStore>, rooms: Arc<dyn RoomCatalog>) -> Self {
        let cache = RoomEventCache::new(store.clone());
        Self {
            config,
            store,
            rooms,
            cache,
            shutdown: tokio_util::sync::CancellationToken::new(),
        }
    }

    /// Coordinator for one room's view within `session`.
    pub fn coordinator(&self, room_id: &str, session: Arc<SessionContext>) -> EventLifecycleCoordinator {
        EventLifecycleCoordinator::new(room_id, self.store.clone(), self.cache.clone(), session)
    }

    /// Member picker search tuned by the config, torn down with `session`.
    pub fn member_search(&self, directory: Arc<dyn DirectorySearch>, session: &SessionContext) -> MemberSearch {
        MemberSearch::new(directory, session.scope())
            .with_debounce(self.config.search_debounce)
            .with_min_len(self.config.min_search_len)
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.cache.close();
    }
}
