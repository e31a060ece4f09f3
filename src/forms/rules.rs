//! Named validation rules for the event forms.
//!
//! Each rule owns a stable `(field, code)` pair so client-side failures and
//! translated server errors render the same way. Single-field rules and
//! cross-field refinements are kept in separate lists; the validator runs all
//! of them and collects every failure.

use crate::calendar::window;
use crate::models::{FormField, MeetingType, Rejection};
use crate::utils;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

pub const TITLE_MIN_CHARS: usize = 3;

/// How many participants a booking needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MemberRule {
    /// At least one member who is not the organizer.
    #[default]
    DistinctFromOrganizer,
    /// At least one listed participant; the organizer counts.
    AnyParticipant,
}

/// Everything a rule may look at, already normalized.
#[derive(Debug, Clone)]
pub struct Submission<'a> {
    pub title: &'a str,
    /// Members with blanks, duplicates and the organizer removed.
    pub members: &'a [String],
    /// Participant list exactly as submitted.
    pub listed: &'a [String],
    pub meeting_type: &'a str,
    pub other_meeting_type: Option<&'a str>,
    pub email: Option<&'a str>,
    /// `None` when the wall-clock time does not exist in `timezone`.
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub timezone: Tz,
    pub now: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy)]
pub struct Rule {
    pub code: &'static str,
    pub field: FormField,
    pub message: &'static str,
    check: fn(&Submission<'_>) -> bool,
}

impl Rule {
    pub fn passes(&self, submission: &Submission<'_>) -> bool {
        (self.check)(submission)
    }

    pub fn reject(&self) -> Rejection {
        Rejection::validation(self.field, self.code, self.message)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("code", &self.code)
            .field("field", &self.field)
            .finish()
    }
}

pub const TITLE_LENGTH: Rule = Rule {
    code: "title_too_short",
    field: FormField::Title,
    message: "Title must be at least 3 characters",
    check: |s| s.title.trim().chars().count() >= TITLE_MIN_CHARS,
};

pub const MEMBERS_BESIDES_ORGANIZER: Rule = Rule {
    code: "members_required",
    field: FormField::Members,
    message: "Add at least one member besides the organizer",
    check: |s| !s.members.is_empty(),
};

pub const ANY_PARTICIPANT: Rule = Rule {
    code: "participants_required",
    field: FormField::Members,
    message: "Add at least one participant",
    check: |s| s.listed.iter().any(|m| !m.trim().is_empty()),
};

pub const MEETING_TYPE_KNOWN: Rule = Rule {
    code: "meeting_type_required",
    field: FormField::MeetingType,
    message: "Please select a meeting type",
    check: |s| MeetingType::parse(s.meeting_type).is_some(),
};

pub const EMAIL_SHAPE: Rule = Rule {
    code: "email_invalid",
    field: FormField::Email,
    message: "Invalid email address",
    check: |s| s.email.map_or(true, utils::is_valid_email),
};

pub const START_EXISTS: Rule = Rule {
    code: "start_nonexistent",
    field: FormField::Start,
    message: "Start time does not exist in your timezone (daylight-saving change)",
    check: |s| s.start.is_some(),
};

pub const END_EXISTS: Rule = Rule {
    code: "end_nonexistent",
    field: FormField::End,
    message: "End time does not exist in your timezone (daylight-saving change)",
    check: |s| s.end.is_some(),
};

pub const END_AFTER_START: Rule = Rule {
    code: "end_not_after_start",
    field: FormField::End,
    message: "End time must be after start time",
    check: |s| match (s.start, s.end) {
        (Some(start), Some(end)) => window::is_after(end, start),
        _ => true,
    },
};

pub const SAME_DAY: Rule = Rule {
    code: "not_same_day",
    field: FormField::End,
    message: "Start and end times must be on the same day",
    check: |s| match (s.start, s.end) {
        (Some(start), Some(end)) => window::is_same_calendar_day(start, end, s.timezone),
        _ => true,
    },
};

pub const OTHER_TYPE_SPECIFIED: Rule = Rule {
    code: "other_meeting_type_required",
    field: FormField::OtherMeetingType,
    message: "Please specify the meeting type when 'Other' is selected",
    check: |s| {
        MeetingType::parse(s.meeting_type) != Some(MeetingType::Other)
            || s.other_meeting_type.map_or(false, |t| !t.trim().is_empty())
    },
};

pub const START_IN_FUTURE: Rule = Rule {
    code: "start_in_past",
    field: FormField::Start,
    message: "Start time must be in the future",
    check: |s| match (s.start, s.now) {
        (Some(start), Some(now)) => window::is_strictly_future(start, now),
        _ => true,
    },
};

/// Single-field rules, except the member-count rule which depends on
/// [`MemberRule`].
pub const FIELD_RULES: &[Rule] = &[TITLE_LENGTH, MEETING_TYPE_KNOWN, EMAIL_SHAPE, START_EXISTS, END_EXISTS];

pub const REFINEMENTS: &[Rule] = &[END_AFTER_START, SAME_DAY, OTHER_TYPE_SPECIFIED];

/// Extra rules for editing an existing booking.
pub const EDIT_RULES: &[Rule] = &[START_IN_FUTURE];

pub fn member_rule(rule: MemberRule) -> &'static Rule {
    match rule {
        MemberRule::DistinctFromOrganizer => &MEMBERS_BESIDES_ORGANIZER,
        MemberRule::AnyParticipant => &ANY_PARTICIPANT,
    }
}

pub fn check<'r, I>(rules: I, submission: &Submission<'_>) -> Vec<Rejection>
where
    I: IntoIterator<Item = &'r Rule>,
{
    rules
        .into_iter()
        .filter(|rule| !rule.passes(submission))
        .map(Rule::reject)
        .collect()
}
