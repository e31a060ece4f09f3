// file: src/draft.rs
use super::event::{Event, MeetingType};
use super::identity::Identity;
use crate::calendar::window;
use chrono::{DateTime, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Raw add-event form contents. Times are viewer-local wall-clock values and
/// the meeting type is whatever the picker produced; nothing here has been
/// validated yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub organizer: Identity,
    pub members: Vec<String>,
    pub meeting_type: String,
    pub other_meeting_type: Option<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Organizer contact field, when the form shows one.
    pub email: Option<String>,
}

impl EventDraft {
    pub fn new(organizer: Identity, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            title: String::new(),
            organizer,
            members: Vec::new(),
            meeting_type: String::new(),
            other_meeting_type: None,
            start,
            end,
            email: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_members<I, S>(mut self, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.members = members.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_meeting_type(mut self, meeting_type: impl Into<String>) -> Self {
        self.meeting_type = meeting_type.into();
        self
    }

    pub fn with_other_meeting_type(mut self, text: impl Into<String>) -> Self {
        self.other_meeting_type = Some(text.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Edit-form contents for an existing event. Replaces title, members and the
/// time window wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPatch {
    pub title: String,
    pub members: Vec<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl EventPatch {
    /// Prefills the edit form from the stored event, localized to `tz`.
    pub fn from_event(event: &Event, tz: Tz) -> Self {
        Self {
            title: event.title.clone(),
            members: event.members.clone(),
            start: window::localize(event.start, tz),
            end: window::localize(event.end, tz),
        }
    }
}

/// A validated creation request, ready for transmission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub room_id: String,
    pub title: String,
    pub organizer: Identity,
    pub members: Vec<String>,
    pub meeting_type: MeetingType,
    pub other_meeting_type: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A validated full-replace update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventUpdate {
    pub title: String,
    pub members: Vec<String>,
    pub meeting_type: MeetingType,
    pub other_meeting_type: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}
