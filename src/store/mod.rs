//! Collaborator boundaries: the remote booking store, room catalog, identity,
//! push notifications and the people directory.
//!
//! Everything behind these traits is remote and fallible. The engine only
//! depends on the traits; [`http::HttpEventStore`] is the production binding.

pub mod http;
pub mod wire;

use crate::models::{Event, EventUpdate, Identity, MemberSuggestion, NewEvent, NotificationMessage, Room};
use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use tokio::sync::mpsc;

pub use http::HttpEventStore;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The request never produced a response.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    Decode(String),
}

impl StoreError {
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Failures worth retrying for idempotent reads.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => matches!(status, 429 | 502 | 503 | 504),
            Self::Decode(_) => false,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        match err.status() {
            Some(status) => Self::status(status.as_u16(), err.to_string()),
            None => Self::Transport(err.to_string()),
        }
    }
}

/// Booking storage for one deployment. `list` is scoped to a room.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn list(&self, room_id: &str) -> Result<Vec<Event>, StoreError>;
    async fn create(&self, event: &NewEvent) -> Result<Event, StoreError>;
    async fn update(&self, id: &str, update: &EventUpdate) -> Result<Event, StoreError>;
    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

#[async_trait]
pub trait RoomCatalog: Send + Sync {
    async fn list_rooms(&self) -> Result<Vec<Room>, StoreError>;
    async fn get_room(&self, room_id: &str) -> Result<Room, StoreError>;
    /// Rooms with their availability percentage filled in for `date`.
    async fn availability(&self, date: NaiveDate) -> Result<Vec<Room>, StoreError>;
}

pub trait IdentityProvider: Send + Sync {
    /// `None` when nobody is signed in.
    fn current_identity(&self) -> Option<Identity>;
}

#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn subscribe(&self, identity: &Identity) -> Result<mpsc::Receiver<NotificationMessage>, StoreError>;
}

#[async_trait]
pub trait DirectorySearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<MemberSuggestion>, StoreError>;
}
