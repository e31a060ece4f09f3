//! Overlap detection between a candidate window and a room's bookings.
//!
//! A linear scan: a room's calendar holds tens of events per day, so no
//! interval index is kept.

use super::window::TimeWindow;
use crate::models::Event;

/// Every event whose window overlaps `candidate`. Empty means available.
pub fn find_conflicts<'a>(candidate: &TimeWindow, existing: &'a [Event]) -> Vec<&'a Event> {
    existing
        .iter()
        .filter(|event| candidate.overlaps_span(event.start, event.end))
        .collect()
}

/// Same as [`find_conflicts`] but ignores the event being edited.
pub fn find_conflicts_excluding<'a>(
    candidate: &TimeWindow,
    existing: &'a [Event],
    exclude_id: &str,
) -> Vec<&'a Event> {
    existing
        .iter()
        .filter(|event| event.id != exclude_id)
        .filter(|event| candidate.overlaps_span(event.start, event.end))
        .collect()
}

pub fn is_available(candidate: &TimeWindow, existing: &[Event]) -> bool {
    !existing
        .iter()
        .any(|event| candidate.overlaps_span(event.start, event.end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Identity, MeetingType};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 10, h, m, 0).unwrap()
    }

    fn booking(id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Event {
        Event {
            id: id.to_string(),
            room_id: "room-1".to_string(),
            title: format!("Booking {}", id),
            organizer: Identity::new("Alice", "alice@example.com"),
            members: vec!["bob@example.com".to_string()],
            meeting_type: MeetingType::Internal,
            other_meeting_type: None,
            start,
            end,
        }
    }

    fn day() -> Vec<Event> {
        vec![
            booking("a", at(9, 0), at(10, 0)),
            booking("b", at(11, 0), at(12, 0)),
            booking("c", at(14, 0), at(15, 30)),
        ]
    }

    #[test]
    fn test_back_to_back_is_not_a_conflict() {
        let events = day();
        let after = TimeWindow::new(at(10, 0), at(11, 0)).unwrap();
        assert!(find_conflicts(&after, &events).is_empty());
        assert!(is_available(&after, &events));

        let before = TimeWindow::new(at(8, 0), at(9, 0)).unwrap();
        assert!(find_conflicts(&before, &events).is_empty());
    }

    #[test]
    fn test_partial_overlap_reported() {
        let events = day();
        let candidate = TimeWindow::new(at(9, 30), at(10, 30)).unwrap();
        let conflicts = find_conflicts(&candidate, &events);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].id, "a");
    }

    #[test]
    fn test_containment_both_ways() {
        let events = day();
        let inside = TimeWindow::new(at(14, 15), at(14, 45)).unwrap();
        assert_eq!(find_conflicts(&inside, &events)[0].id, "c");

        let spanning = TimeWindow::new(at(8, 0), at(13, 0)).unwrap();
        let ids: Vec<&str> = find_conflicts(&spanning, &events)
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_excluding_the_edited_event() {
        let events = day();
        let moved = TimeWindow::new(at(9, 30), at(10, 30)).unwrap();
        assert!(find_conflicts_excluding(&moved, &events, "a").is_empty());
        assert_eq!(find_conflicts_excluding(&moved, &events, "b").len(), 1);
    }

    #[test]
    fn test_empty_room_is_available() {
        let candidate = TimeWindow::new(at(9, 0), at(10, 0)).unwrap();
        assert!(is_available(&candidate, &[]));
    }
}
