//! Event form validation.
//!
//! Turns raw add/edit form contents into validated, UTC-serialized requests.
//! Wall-clock times are resolved in the viewer's timezone at validation time.

pub mod rules;

use crate::calendar::window;
use crate::models::{
    Event, EventDraft, EventPatch, EventUpdate, FormField, Identity, MeetingType, NewEvent, Rejected,
    ValidationResult,
};
use crate::utils;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use log::debug;
use std::collections::HashSet;

pub use rules::{MemberRule, Rule, Submission};

#[derive(Debug, Clone, Copy)]
pub struct EventFormValidator {
    timezone: Tz,
    member_rule: MemberRule,
}

impl EventFormValidator {
    pub fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            member_rule: MemberRule::default(),
        }
    }

    pub fn with_member_rule(mut self, member_rule: MemberRule) -> Self {
        self.member_rule = member_rule;
        self
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn member_rule(&self) -> MemberRule {
        self.member_rule
    }

    pub fn validate(&self, draft: &EventDraft) -> ValidationResult {
        match self.prepare(draft, "") {
            Ok(_) => ValidationResult::Ok,
            Err(rejected) => ValidationResult::Rejected(rejected),
        }
    }

    /// Validates and converts a draft into the payload sent to the server.
    pub fn prepare(&self, draft: &EventDraft, room_id: &str) -> Result<NewEvent, Rejected> {
        let members = normalize_members(&draft.organizer, &draft.members);
        let start = self.resolve(draft.start);
        let end = self.resolve(draft.end);
        let submission = Submission {
            title: &draft.title,
            members: &members,
            listed: &draft.members,
            meeting_type: &draft.meeting_type,
            other_meeting_type: draft.other_meeting_type.as_deref(),
            email: draft.email.as_deref(),
            start,
            end,
            timezone: self.timezone,
            now: None,
        };

        self.run(&submission, &[])?;
        let (start, end, meeting_type) = resolved(start, end, &draft.meeting_type)?;

        Ok(NewEvent {
            room_id: room_id.to_string(),
            title: utils::normalize_title(&draft.title),
            organizer: draft.organizer.clone(),
            members,
            meeting_type,
            other_meeting_type: other_text(meeting_type, draft.other_meeting_type.as_deref()),
            start,
            end,
        })
    }

    pub fn validate_patch(&self, event: &Event, patch: &EventPatch, now: DateTime<Utc>) -> ValidationResult {
        match self.prepare_update(event, patch, now) {
            Ok(_) => ValidationResult::Ok,
            Err(rejected) => ValidationResult::Rejected(rejected),
        }
    }

    /// Validates an edit of `event`. Meeting type carries over unchanged; the
    /// new start must also lie after `now`.
    pub fn prepare_update(
        &self,
        event: &Event,
        patch: &EventPatch,
        now: DateTime<Utc>,
    ) -> Result<EventUpdate, Rejected> {
        let members = normalize_members(&event.organizer, &patch.members);
        let start = self.resolve(patch.start);
        let end = self.resolve(patch.end);
        let submission = Submission {
            title: &patch.title,
            members: &members,
            listed: &patch.members,
            meeting_type: event.meeting_type.as_str(),
            other_meeting_type: event.other_meeting_type.as_deref(),
            email: None,
            start,
            end,
            timezone: self.timezone,
            now: Some(now),
        };

        self.run(&submission, rules::EDIT_RULES)?;
        let (start, end, meeting_type) = resolved(start, end, event.meeting_type.as_str())?;

        Ok(EventUpdate {
            title: utils::normalize_title(&patch.title),
            members,
            meeting_type,
            other_meeting_type: other_text(meeting_type, event.other_meeting_type.as_deref()),
            start,
            end,
        })
    }

    fn resolve(&self, local: chrono::NaiveDateTime) -> Option<DateTime<Utc>> {
        window::absolutize(local, self.timezone).ok()
    }

    fn run(&self, submission: &Submission<'_>, extra: &[Rule]) -> Result<(), Rejected> {
        let field_rules = rules::FIELD_RULES
            .iter()
            .chain(std::iter::once(rules::member_rule(self.member_rule)));
        let mut rejections = rules::check(field_rules, submission);
        rejections.extend(rules::check(rules::REFINEMENTS.iter().chain(extra.iter()), submission));
        rejections.sort_by_key(|r| field_order(r.field));

        match Rejected::from_vec(rejections) {
            Some(rejected) => {
                debug!(
                    "Form rejected with {} error(s): {}",
                    rejected.len(),
                    rejected
                        .iter()
                        .map(|r| r.code)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                Err(rejected)
            }
            None => Ok(()),
        }
    }
}

/// Trims entries, drops blanks and the organizer, and removes duplicates
/// (case-insensitively) keeping first occurrence order.
pub fn normalize_members(organizer: &Identity, members: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    members
        .iter()
        .map(|m| m.trim())
        .filter(|m| !m.is_empty())
        .filter(|m| !organizer.has_email(m))
        .filter(|m| seen.insert(utils::normalize_email(m)))
        .map(str::to_string)
        .collect()
}

fn other_text(meeting_type: MeetingType, text: Option<&str>) -> Option<String> {
    match meeting_type {
        MeetingType::Other => text.map(|t| t.trim().to_string()),
        _ => None,
    }
}

// Rules guarantee these are present once validation passed.
fn resolved(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
    meeting_type: &str,
) -> Result<(DateTime<Utc>, DateTime<Utc>, MeetingType), Rejected> {
    let start = start.ok_or_else(|| rules::START_EXISTS.reject())?;
    let end = end.ok_or_else(|| rules::END_EXISTS.reject())?;
    let meeting_type = MeetingType::parse(meeting_type).ok_or_else(|| rules::MEETING_TYPE_KNOWN.reject())?;
    Ok((start, end, meeting_type))
}

fn field_order(field: Option<FormField>) -> u8 {
    match field {
        Some(FormField::Title) => 0,
        Some(FormField::Members) => 1,
        Some(FormField::MeetingType) => 2,
        Some(FormField::OtherMeetingType) => 3,
        Some(FormField::Start) => 4,
        Some(FormField::End) => 5,
        Some(FormField::Email) => 6,
        None => 7,
    }
}
