use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::{America, Asia, Tz};
use roombook::calendar::{conflict, slot, window};
use roombook::{
    CandidateSlot, Event, EventDraft, EventFormValidator, FormField, Identity, MeetingType, RejectionKind, SlotContext,
    TimeWindow, ViewGranularity,
};

fn utc(d: u32, h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, d, h, m, 0).unwrap()
}

fn local(d: u32, h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, d)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn booking(id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Event {
    Event {
        id: id.to_string(),
        room_id: "room-1".to_string(),
        title: "Existing booking".to_string(),
        organizer: Identity::new("Carol", "carol@example.com"),
        members: vec!["dave@example.com".to_string()],
        meeting_type: MeetingType::External,
        other_meeting_type: None,
        start,
        end,
    }
}

#[test]
fn test_back_to_back_bookings_do_not_conflict() {
    let existing = vec![booking("a", utc(10, 9, 0), utc(10, 10, 0))];

    let after = TimeWindow::new(utc(10, 10, 0), utc(10, 11, 0)).unwrap();
    let before = TimeWindow::new(utc(10, 8, 0), utc(10, 9, 0)).unwrap();

    assert!(conflict::find_conflicts(&after, &existing).is_empty());
    assert!(conflict::find_conflicts(&before, &existing).is_empty());
    assert!(conflict::is_available(&after, &existing));
}

#[test]
fn test_overlap_is_symmetric() {
    let pairs = [
        ((9, 0, 10, 0), (9, 30, 10, 30)),
        ((9, 0, 12, 0), (10, 0, 11, 0)),
        ((9, 0, 10, 0), (9, 0, 10, 0)),
        ((9, 59, 10, 1), (10, 0, 10, 30)),
    ];
    for ((ah, am, aeh, aem), (bh, bm, beh, bem)) in pairs {
        let a = TimeWindow::new(utc(10, ah, am), utc(10, aeh, aem)).unwrap();
        let b = TimeWindow::new(utc(10, bh, bm), utc(10, beh, bem)).unwrap();
        assert!(window::overlaps(&a, &b), "{:?} should overlap {:?}", a, b);
        assert!(window::overlaps(&b, &a), "{:?} should overlap {:?}", b, a);
    }
}

#[test]
fn test_conflicts_return_every_overlapping_event() {
    let existing = vec![
        booking("a", utc(10, 9, 0), utc(10, 10, 0)),
        booking("b", utc(10, 10, 0), utc(10, 11, 0)),
        booking("c", utc(10, 13, 0), utc(10, 14, 0)),
    ];
    let candidate = TimeWindow::new(utc(10, 9, 30), utc(10, 10, 30)).unwrap();
    let ids: Vec<&str> = conflict::find_conflicts(&candidate, &existing)
        .into_iter()
        .map(|e| e.id.as_str())
        .collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn test_zero_length_window_rejected() {
    assert!(TimeWindow::new(utc(10, 9, 0), utc(10, 9, 0)).is_err());
}

#[test]
fn test_same_day_round_trips_across_offsets() {
    for tz in [Asia::Kolkata, America::New_York] {
        for wall in [local(10, 0, 0), local(10, 9, 0), local(10, 23, 30)] {
            let instant = window::absolutize(wall, tz).unwrap();
            assert_eq!(window::localize(instant, tz), wall);
            assert_eq!(window::local_date(instant, tz), wall.date());
        }

        let morning = window::absolutize(local(10, 0, 15), tz).unwrap();
        let night = window::absolutize(local(10, 23, 45), tz).unwrap();
        let next = window::absolutize(local(11, 0, 15), tz).unwrap();
        assert!(window::is_same_calendar_day(morning, night, tz));
        assert!(!window::is_same_calendar_day(night, next, tz));
    }
}

#[test]
fn test_valid_booking_scenario() {
    let validator = EventFormValidator::new(Asia::Kolkata);
    let draft = EventDraft::new(Identity::new("Owner", "owner@x.com"), local(10, 9, 0), local(10, 10, 0))
        .with_title("Team sync")
        .with_members(["alice@x.com"])
        .with_meeting_type("internal");

    assert!(validator.validate(&draft).is_ok());
}

#[test]
fn test_cross_day_scenario() {
    let validator = EventFormValidator::new(America::New_York);
    let draft = EventDraft::new(Identity::new("Owner", "owner@x.com"), local(10, 23, 30), local(11, 0, 30))
        .with_title("Team sync")
        .with_members(["alice@x.com"])
        .with_meeting_type("internal");

    let result = validator.validate(&draft);
    let rejected = result.rejected().expect("cross-day booking must be rejected");
    let same_day: Vec<_> = rejected.iter().filter(|r| r.code == "not_same_day").collect();
    assert_eq!(same_day.len(), 1);
    assert_eq!(same_day[0].field, Some(FormField::End));
    assert!(same_day[0].message.contains("same day"));
}

#[test]
fn test_month_view_past_date_scenario() {
    let context = SlotContext {
        existing_events: &[],
        now: utc(10, 12, 0),
        granularity: ViewGranularity::Month,
        timezone: Tz::UTC,
    };
    for hour in [0, 12, 23] {
        let candidate = CandidateSlot::new(utc(9, hour, 0), utc(9, hour, 30));
        let result = slot::evaluate(&candidate, &context);
        assert_eq!(result.rejected().map(|r| r.kind()), Some(RejectionKind::PastTime));
    }
}

#[test]
fn test_day_view_overlap_scenario() {
    let existing = vec![booking("a", utc(10, 9, 0), utc(10, 10, 0))];
    let context = SlotContext {
        existing_events: &existing,
        now: utc(10, 7, 0),
        granularity: ViewGranularity::Day,
        timezone: Tz::UTC,
    };

    let overlapping = slot::evaluate(&CandidateSlot::new(utc(10, 9, 30), utc(10, 10, 30)), &context);
    assert_eq!(overlapping.rejected().map(|r| r.kind()), Some(RejectionKind::Overlap));
    assert_eq!(overlapping.rejected().unwrap().primary().message, slot::OVERLAP_SLOT_MESSAGE);

    let adjacent = slot::evaluate(&CandidateSlot::new(utc(10, 10, 0), utc(10, 11, 0)), &context);
    assert!(adjacent.is_ok());
}

#[test]
fn test_slot_prefill_feeds_valid_form() {
    let tz = Asia::Kolkata;
    let now = utc(10, 3, 10);
    let candidate = CandidateSlot::new(
        window::absolutize(local(10, 14, 0), tz).unwrap(),
        window::absolutize(local(10, 15, 0), tz).unwrap(),
    );
    let (start, end) = slot::prefill_window(Some(&candidate), ViewGranularity::Week, now, tz);
    assert_eq!((start, end), (local(10, 14, 0), local(10, 15, 0)));

    let draft = EventDraft::new(Identity::new("Owner", "owner@x.com"), start, end)
        .with_title("Design review")
        .with_members(["alice@x.com"])
        .with_meeting_type("other")
        .with_other_meeting_type("Interview");
    let payload = EventFormValidator::new(tz).prepare(&draft, "room-1").unwrap();
    assert_eq!(payload.start, candidate.start);
    assert_eq!(payload.end, candidate.end);
}
