//! Create/update/delete orchestration for one room's bookings.
//!
//! Every mutation goes `Idle -> Submitting -> Committed | Rejected`. A second
//! mutation on the same key is refused while the first is `Submitting`.

mod coordinator;
pub mod errors;

pub use coordinator::{DeleteConfirmation, EventLifecycleCoordinator};
pub use errors::map_store_error;

use crate::models::{Event, EventStatus, Identity, Rejection, RejectionKind};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LifecycleState {
    Idle,
    Submitting,
    Committed,
    Rejected,
}

/// What a mutation is serialized on: the room's new-event form, or an
/// existing event id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FlightKey {
    Draft,
    Event(String),
}

/// Edit and delete affordances for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Permissions {
    pub can_edit: bool,
    pub can_delete: bool,
}

/// The acting identity organizes the event and it has not started yet.
/// UI affordance only; the server re-checks.
pub fn can_modify(event: &Event, identity: Option<&Identity>, now: DateTime<Utc>) -> bool {
    identity.map_or(false, |who| event.organizer.has_email(&who.email))
        && event.status_at(now) == EventStatus::Upcoming
}

pub fn permissions(event: &Event, identity: Option<&Identity>, now: DateTime<Utc>) -> Permissions {
    let allowed = can_modify(event, identity, now);
    Permissions {
        can_edit: allowed,
        can_delete: allowed,
    }
}

pub(crate) fn authorize(event: &Event, identity: Option<&Identity>, now: DateTime<Utc>) -> Result<(), Rejection> {
    if identity.is_none() {
        return Err(not_signed_in());
    }
    if !can_modify(event, identity, now) {
        let message = match event.status_at(now) {
            EventStatus::Upcoming => "Only the organizer can change this event.",
            EventStatus::Running => "This event is already in progress.",
            EventStatus::Completed => "This event has already ended.",
        };
        return Err(Rejection::new(RejectionKind::AuthorizationDenied, "not_permitted", message));
    }
    Ok(())
}

pub(crate) fn not_signed_in() -> Rejection {
    Rejection::new(
        RejectionKind::AuthorizationDenied,
        "not_signed_in",
        "Sign in to change bookings.",
    )
}

#[derive(Debug, Default)]
pub(crate) struct FlightTable {
    states: Mutex<HashMap<FlightKey, LifecycleState>>,
}

impl FlightTable {
    pub(crate) fn state(&self, key: &FlightKey) -> LifecycleState {
        self.states
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .copied()
            .unwrap_or(LifecycleState::Idle)
    }

    /// Claims `key`, or refuses while a previous mutation is in flight.
    pub(crate) fn begin(&self, key: FlightKey) -> Result<FlightGuard<'_>, Rejection> {
        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        if states.get(&key) == Some(&LifecycleState::Submitting) {
            return Err(Rejection::new(
                RejectionKind::Busy,
                "in_flight",
                "A previous change to this event is still being saved.",
            ));
        }
        states.insert(key.clone(), LifecycleState::Submitting);
        Ok(FlightGuard {
            table: self,
            key,
            settled: false,
        })
    }

    fn set(&self, key: &FlightKey, state: LifecycleState) {
        self.states
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.clone(), state);
    }
}

/// Holds a key in `Submitting`. Dropping it unsettled returns the key to
/// `Idle`.
pub(crate) struct FlightGuard<'a> {
    table: &'a FlightTable,
    key: FlightKey,
    settled: bool,
}

impl FlightGuard<'_> {
    pub(crate) fn settle(mut self, state: LifecycleState) {
        self.table.set(&self.key, state);
        self.settled = true;
    }
}

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.table.set(&self.key, LifecycleState::Idle);
        }
    }
}
