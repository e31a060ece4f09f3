//! Time-window primitives.
//!
//! All comparisons are on absolute instants. Calendar-day questions are
//! answered in the viewer's timezone, passed in explicitly by the caller at
//! the moment of validation, never in UTC.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WindowError {
    #[error("time window is empty: start and end are both {0}")]
    Empty(DateTime<Utc>),

    #[error("time window ends ({end}) before it starts ({start})")]
    Inverted {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("local time {local} does not exist in {}", .tz.name())]
    NonexistentLocalTime { local: NaiveDateTime, tz: Tz },
}

/// A half-open interval `[start, end)` with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, WindowError> {
        if start == end {
            return Err(WindowError::Empty(start));
        }
        if end < start {
            return Err(WindowError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Builds a window from viewer-local wall-clock times.
    pub fn from_local(
        start: NaiveDateTime,
        end: NaiveDateTime,
        tz: Tz,
    ) -> Result<Self, WindowError> {
        Self::new(absolutize(start, tz)?, absolutize(end, tz)?)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start <= instant && instant < self.end
    }

    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.overlaps_span(other.start, other.end)
    }

    /// Overlap against raw bounds, for stored events whose window was never
    /// re-validated on the client.
    pub fn overlaps_span(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && self.end > start
    }

    pub fn is_same_calendar_day(&self, tz: Tz) -> bool {
        is_same_calendar_day(self.start, self.end, tz)
    }
}

/// True iff `candidate.start < existing.end && candidate.end > existing.start`.
/// Touching boundaries are not an overlap.
pub fn overlaps(candidate: &TimeWindow, existing: &TimeWindow) -> bool {
    candidate.overlaps(existing)
}

pub fn is_after(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a > b
}

pub fn is_before(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a < b
}

pub fn is_strictly_future(instant: DateTime<Utc>, reference: DateTime<Utc>) -> bool {
    instant > reference
}

pub fn local_date(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

pub fn is_same_calendar_day(a: DateTime<Utc>, b: DateTime<Utc>, tz: Tz) -> bool {
    local_date(a, tz) == local_date(b, tz)
}

/// Wall-clock reading of `instant` in `tz`.
pub fn localize(instant: DateTime<Utc>, tz: Tz) -> NaiveDateTime {
    instant.with_timezone(&tz).naive_local()
}

/// Inverse of [`localize`]. Ambiguous wall-clock times (DST fall-back)
/// resolve to the earlier instant; times inside a DST gap are rejected.
pub fn absolutize(local: NaiveDateTime, tz: Tz) -> Result<DateTime<Utc>, WindowError> {
    tz.from_local_datetime(&local)
        .earliest()
        .map(|zoned| zoned.with_timezone(&Utc))
        .ok_or(WindowError::NonexistentLocalTime { local, tz })
}

/// First instant of the local calendar day containing `instant`.
pub fn start_of_day(instant: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let midnight = local_date(instant, tz).and_time(NaiveTime::MIN);
    // A few zones skip midnight on DST days; take the first wall-clock time
    // that exists.
    (0..=16)
        .map(|quarter| midnight + Duration::minutes(15 * quarter))
        .find_map(|local| absolutize(local, tz).ok())
        .unwrap_or_else(|| midnight.and_utc())
}
