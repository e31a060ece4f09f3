use super::errors::map_store_error;
use super::{authorize, not_signed_in, permissions, FlightGuard, FlightKey, FlightTable, LifecycleState, Permissions};
use crate::cache::RoomEventCache;
use crate::calendar::{conflict, TimeWindow};
use crate::forms::EventFormValidator;
use crate::models::{Event, EventDraft, EventPatch, FormField, Rejected, Rejection, RejectionKind};
use crate::session::SessionContext;
use crate::store::{EventStore, StoreError};
use crate::utils::logging::log_booking_mutation;
use chrono::{DateTime, Utc};
use log::{debug, info};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub const OVERLAP_MESSAGE: &str = "This time overlaps with an existing event in this room.";

/// Proof that the user confirmed a delete. Spent once
/// [`EventLifecycleCoordinator::confirm_delete`] has sent the request, or
/// when a newer delete of the same event is requested. Cannot be cloned.
#[derive(Debug, PartialEq, Eq)]
pub struct DeleteConfirmation {
    token: Uuid,
    event_id: String,
}

impl DeleteConfirmation {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }
}

/// Mutations for one room's schedule, on behalf of one session.
pub struct EventLifecycleCoordinator {
    room_id: String,
    store: Arc<dyn EventStore>,
    cache: RoomEventCache,
    session: Arc<SessionContext>,
    validator: EventFormValidator,
    flights: FlightTable,
    pending_deletes: Mutex<HashMap<Uuid, String>>,
    scope: CancellationToken,
}

impl EventLifecycleCoordinator {
    pub fn new(
        room_id: impl Into<String>,
        store: Arc<dyn EventStore>,
        cache: RoomEventCache,
        session: Arc<SessionContext>,
    ) -> Self {
        let validator = EventFormValidator::new(session.timezone());
        let scope = session.scope();
        Self {
            room_id: room_id.into(),
            store,
            cache,
            session,
            validator,
            flights: FlightTable::default(),
            pending_deletes: Mutex::new(HashMap::new()),
            scope,
        }
    }

    pub fn with_validator(mut self, validator: EventFormValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn validator(&self) -> &EventFormValidator {
        &self.validator
    }

    pub fn state(&self, key: &FlightKey) -> LifecycleState {
        self.flights.state(key)
    }

    pub fn permissions(&self, event: &Event, now: DateTime<Utc>) -> Permissions {
        permissions(event, self.session.identity(), now)
    }

    /// Detaches the coordinator from its view. Results of requests still in
    /// flight are returned to the caller but no longer touch the cache.
    pub fn close(&self) {
        self.scope.cancel();
        self.pending_deletes.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Deletes awaiting confirmation.
    pub fn pending_delete_count(&self) -> usize {
        self.pending_deletes.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_closed(&self) -> bool {
        self.scope.is_cancelled()
    }

    pub async fn create(&self, draft: &EventDraft) -> Result<Event, Rejected> {
        self.ensure_open()?;
        if self.session.identity().is_none() {
            return Err(not_signed_in().into());
        }
        let flight = self.flights.begin(FlightKey::Draft)?;

        let payload = match self.validator.prepare(draft, &self.room_id) {
            Ok(payload) => payload,
            Err(rejected) => {
                flight.settle(LifecycleState::Rejected);
                return Err(rejected);
            }
        };
        if let Err(rejected) = self.check_overlap(payload.start, payload.end, None) {
            flight.settle(LifecycleState::Rejected);
            return Err(rejected);
        }

        let result = self.store.create(&payload).await;
        self.finish("create", None, flight, result, false)
    }

    /// Full replace of title, members and window. The event must still be
    /// editable by the current identity at `now`.
    pub async fn update(&self, event: &Event, patch: &EventPatch, now: DateTime<Utc>) -> Result<Event, Rejected> {
        self.ensure_open()?;
        authorize(event, self.session.identity(), now)?;
        let flight = self.flights.begin(FlightKey::Event(event.id.clone()))?;

        let update = match self.validator.prepare_update(event, patch, now) {
            Ok(update) => update,
            Err(rejected) => {
                flight.settle(LifecycleState::Rejected);
                return Err(rejected);
            }
        };
        if let Err(rejected) = self.check_overlap(update.start, update.end, Some(&event.id)) {
            flight.settle(LifecycleState::Rejected);
            return Err(rejected);
        }

        let result = self.store.update(&event.id, &update).await;
        self.finish("update", Some(&event.id), flight, result, false)
    }

    /// First half of a delete. Nothing is sent until the returned
    /// confirmation is passed to [`confirm_delete`](Self::confirm_delete).
    pub fn request_delete(&self, event: &Event, now: DateTime<Utc>) -> Result<DeleteConfirmation, Rejected> {
        self.ensure_open()?;
        authorize(event, self.session.identity(), now)?;

        let token = Uuid::new_v4();
        let mut pending = self.pending_deletes.lock().unwrap_or_else(|e| e.into_inner());
        // Only the newest request per event stays confirmable.
        pending.retain(|_, id| *id != event.id);
        pending.insert(token, event.id.clone());
        drop(pending);
        debug!("Delete of event {} awaiting confirmation", event.id);
        Ok(DeleteConfirmation {
            token,
            event_id: event.id.clone(),
        })
    }

    pub fn cancel_delete(&self, confirmation: DeleteConfirmation) {
        self.take_pending(&confirmation);
    }

    pub async fn confirm_delete(&self, confirmation: &DeleteConfirmation) -> Result<(), Rejected> {
        self.ensure_open()?;
        // Claim the flight first so a Busy refusal leaves the confirmation usable.
        let flight = self.flights.begin(FlightKey::Event(confirmation.event_id.clone()))?;
        if !self.take_pending(confirmation) {
            return Err(Rejection::new(
                RejectionKind::Validation,
                "delete_not_requested",
                "Confirm the delete again.",
            )
            .into());
        }

        let result = self.store.delete(&confirmation.event_id).await;
        // A 404 means our view is stale: refresh it.
        self.finish("delete", Some(&confirmation.event_id), flight, result, true)
    }

    fn take_pending(&self, confirmation: &DeleteConfirmation) -> bool {
        let mut pending = self.pending_deletes.lock().unwrap_or_else(|e| e.into_inner());
        let matches = pending
            .get(&confirmation.token)
            .map_or(false, |id| *id == confirmation.event_id);
        if matches {
            pending.remove(&confirmation.token);
        }
        matches
    }

    fn ensure_open(&self) -> Result<(), Rejected> {
        if self.is_closed() {
            return Err(Rejection::new(
                RejectionKind::Cancelled,
                "closed",
                "This schedule is no longer open.",
            )
            .into());
        }
        Ok(())
    }

    /// Advisory check against what the cache already holds; the server
    /// decides authoritatively.
    fn check_overlap(&self, start: DateTime<Utc>, end: DateTime<Utc>, exclude: Option<&str>) -> Result<(), Rejected> {
        let window = match TimeWindow::new(start, end) {
            Ok(window) => window,
            Err(e) => {
                return Err(Rejection::validation(FormField::End, "end_not_after_start", e.to_string()).into());
            }
        };
        let events = self.cache.cached_events(&self.room_id);
        let conflicts = match exclude {
            Some(id) => conflict::find_conflicts_excluding(&window, &events, id),
            None => conflict::find_conflicts(&window, &events),
        };
        if conflicts.is_empty() {
            return Ok(());
        }
        debug!("Candidate overlaps {} cached event(s) in room '{}'", conflicts.len(), self.room_id);
        Err(Rejection::new(RejectionKind::Overlap, "overlap", OVERLAP_MESSAGE)
            .on_field(FormField::Start)
            .into())
    }

    fn finish<T>(
        &self,
        operation: &str,
        event_id: Option<&str>,
        flight: FlightGuard<'_>,
        result: Result<T, StoreError>,
        refresh_on_missing: bool,
    ) -> Result<T, Rejected>
    where
        T: CommittedId,
    {
        let abandoned = self.is_closed();
        match result {
            Ok(value) => {
                let id = value.committed_id().or(event_id);
                log_booking_mutation(operation, &self.room_id, id, "committed");
                if abandoned {
                    info!("Room '{}' closed during {}, skipping refresh", self.room_id, operation);
                } else {
                    self.cache.invalidate(&self.room_id);
                }
                flight.settle(LifecycleState::Committed);
                Ok(value)
            }
            Err(e) => {
                let rejected = map_store_error(&e);
                log_booking_mutation(operation, &self.room_id, event_id, rejected.primary().code);
                if refresh_on_missing && rejected.kind() == RejectionKind::NotFound && !abandoned {
                    self.cache.invalidate(&self.room_id);
                }
                flight.settle(LifecycleState::Rejected);
                Err(rejected)
            }
        }
    }
}

/// Id of the record a successful mutation produced, for logging.
trait CommittedId {
    fn committed_id(&self) -> Option<&str>;
}

impl CommittedId for Event {
    fn committed_id(&self) -> Option<&str> {
        Some(&self.id)
    }
}

impl CommittedId for () {
    fn committed_id(&self) -> Option<&str> {
        None
    }
}
