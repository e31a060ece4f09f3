//! Slot-selection policy: decides whether a window picked on the calendar
//! grid may be offered for booking.
//!
//! Day and week views hand over exact instants, so the past guard is
//! instant-precise and overlaps are checked immediately. Month view only
//! carries a date; the past guard compares dates and the overlap check is
//! left to the add-event form.

use super::conflict;
use super::window::{self, TimeWindow};
use crate::models::{Event, Rejection, RejectionKind, ValidationResult};
use chrono::{DateTime, Duration, NaiveDateTime, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use log::debug;
use serde::{Deserialize, Serialize};

pub const PAST_SLOT_MESSAGE: &str = "You cannot add events in the past! Please select a future time slot.";
pub const OVERLAP_SLOT_MESSAGE: &str =
    "Selected time overlaps with an existing event! Please choose a different time slot.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewGranularity {
    Day,
    Week,
    Month,
}

impl ViewGranularity {
    pub fn is_date_only(&self) -> bool {
        matches!(self, ViewGranularity::Month)
    }
}

/// A window produced by a grid interaction. Not yet checked for shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl CandidateSlot {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SlotContext<'a> {
    pub existing_events: &'a [Event],
    pub now: DateTime<Utc>,
    pub granularity: ViewGranularity,
    pub timezone: Tz,
}

/// Applies, in order: past guard, window shape, overlap guard (not in month
/// view). The first failure wins.
pub fn evaluate(candidate: &CandidateSlot, ctx: &SlotContext<'_>) -> ValidationResult {
    if is_in_past(candidate, ctx) {
        debug!(
            "Rejecting {:?} slot starting {}: in the past",
            ctx.granularity, candidate.start
        );
        return Rejection::new(RejectionKind::PastTime, "slot_in_past", PAST_SLOT_MESSAGE).into();
    }

    let window = match TimeWindow::new(candidate.start, candidate.end) {
        Ok(window) => window,
        Err(e) => {
            return Rejection::new(RejectionKind::Validation, "slot_invalid", e.to_string()).into();
        }
    };

    if !ctx.granularity.is_date_only() {
        let conflicts = conflict::find_conflicts(&window, ctx.existing_events);
        if let Some(first) = conflicts.first() {
            debug!(
                "Rejecting slot {}..{}: overlaps '{}' and {} other(s)",
                window.start(),
                window.end(),
                first.title,
                conflicts.len() - 1
            );
            return Rejection::new(RejectionKind::Overlap, "slot_overlap", OVERLAP_SLOT_MESSAGE).into();
        }
    }

    ValidationResult::Ok
}

fn is_in_past(candidate: &CandidateSlot, ctx: &SlotContext<'_>) -> bool {
    if ctx.granularity.is_date_only() {
        window::local_date(candidate.start, ctx.timezone) < window::local_date(ctx.now, ctx.timezone)
    } else {
        window::is_before(candidate.start, ctx.now)
    }
}

/// Form defaults with no slot: the next full local hour, for one hour,
/// ending no later than 23:59 on the start's day.
pub fn default_window(now: DateTime<Utc>, tz: Tz) -> (NaiveDateTime, NaiveDateTime) {
    let local_now = window::localize(now, tz);
    let top_of_hour = local_now
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(local_now);
    hour_on_day(top_of_hour + Duration::hours(1))
}

/// Local wall-clock window used to prefill the add-event form. Day and week
/// slots are taken verbatim; month slots keep their date and borrow the
/// default start time.
pub fn prefill_window(
    slot: Option<&CandidateSlot>,
    granularity: ViewGranularity,
    now: DateTime<Utc>,
    tz: Tz,
) -> (NaiveDateTime, NaiveDateTime) {
    match slot {
        None => default_window(now, tz),
        Some(slot) if granularity.is_date_only() => {
            let date = window::local_date(slot.start, tz);
            let (start, _) = default_window(now, tz);
            hour_on_day(date.and_time(start.time()))
        }
        Some(slot) => (window::localize(slot.start, tz), window::localize(slot.end, tz)),
    }
}

/// One hour from `start`, cut at 23:59 when that would cross midnight.
fn hour_on_day(start: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let end = start + Duration::hours(1);
    if end.date() == start.date() {
        return (start, end);
    }
    let last_minute = start.date().and_time(NaiveTime::MIN) + Duration::minutes(24 * 60 - 1);
    (start, last_minute)
}
