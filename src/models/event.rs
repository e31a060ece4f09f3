// file: src/event.rs
use super::identity::Identity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeetingType {
    Internal,
    External,
    Other,
}

impl MeetingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeetingType::Internal => "internal",
            MeetingType::External => "external",
            MeetingType::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "internal" => Some(MeetingType::Internal),
            "external" => Some(MeetingType::External),
            "other" => Some(MeetingType::Other),
            _ => None,
        }
    }
}

/// Where an event sits relative to a given instant, over `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Running,
    Completed,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Upcoming => "upcoming",
            EventStatus::Running => "running",
            EventStatus::Completed => "completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub room_id: String,
    pub title: String,
    pub organizer: Identity,
    /// Never contains the organizer.
    pub members: Vec<String>,
    pub meeting_type: MeetingType,
    pub other_meeting_type: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Event {
    pub fn status_at(&self, now: DateTime<Utc>) -> EventStatus {
        if now < self.start {
            EventStatus::Upcoming
        } else if now < self.end {
            EventStatus::Running
        } else {
            EventStatus::Completed
        }
    }

    pub fn status(&self) -> EventStatus {
        self.status_at(Utc::now())
    }

    pub fn minutes_until_start(&self, now: DateTime<Utc>) -> i64 {
        (self.start - now).num_minutes()
    }

    /// Label shown for the meeting classification; falls back to the free
    /// text when the type is `Other`.
    pub fn meeting_type_label(&self) -> &str {
        match (self.meeting_type, self.other_meeting_type.as_deref()) {
            (MeetingType::Other, Some(text)) if !text.trim().is_empty() => text.trim(),
            (kind, _) => kind.as_str(),
        }
    }
}
