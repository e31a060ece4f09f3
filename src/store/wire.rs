// file: src/store/wire.rs
// JSON shapes exchanged with the booking server

use crate::models::{Event, EventUpdate, Identity, MeetingType, NewEvent, Room};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// A stored meeting as the server returns it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingRecord {
    #[serde(alias = "_id", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub room_id: String,
    pub title: String,
    /// Organizer display name.
    #[serde(default)]
    pub organizer: String,
    /// Organizer email.
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub meeting_type: String,
    #[serde(default)]
    pub other_meeting_type: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MeetingRecord {
    /// Unknown meeting types are kept as `Other` with the raw label as text.
    pub fn into_event(self) -> Event {
        let (meeting_type, other_meeting_type) = match MeetingType::parse(&self.meeting_type) {
            Some(MeetingType::Other) => (MeetingType::Other, self.other_meeting_type),
            Some(kind) => (kind, None),
            None if self.meeting_type.trim().is_empty() => (MeetingType::Other, self.other_meeting_type),
            None => (MeetingType::Other, Some(self.meeting_type.trim().to_string())),
        };
        let organizer = Identity::new(self.organizer, self.email);
        let members = self
            .members
            .into_iter()
            .filter(|m| !organizer.has_email(m))
            .collect();

        Event {
            id: self.id,
            room_id: self.room_id,
            title: self.title,
            organizer,
            members,
            meeting_type,
            other_meeting_type,
            start: self.start,
            end: self.end,
        }
    }
}

/// Body for `POST /api/meetings` and `PUT /api/meetings/{id}`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingPayload<'a> {
    pub title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organizer: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<&'a str>,
    pub members: &'a [String],
    pub meeting_type: MeetingType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub other_meeting_type: Option<&'a str>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<&'a str>,
}

impl<'a> From<&'a NewEvent> for MeetingPayload<'a> {
    fn from(event: &'a NewEvent) -> Self {
        Self {
            title: &event.title,
            organizer: Some(&event.organizer.name),
            email: Some(&event.organizer.email),
            members: &event.members,
            meeting_type: event.meeting_type,
            other_meeting_type: event.other_meeting_type.as_deref(),
            start: event.start,
            end: event.end,
            room_id: Some(&event.room_id),
        }
    }
}

impl<'a> From<&'a EventUpdate> for MeetingPayload<'a> {
    fn from(update: &'a EventUpdate) -> Self {
        Self {
            title: &update.title,
            organizer: None,
            email: None,
            members: &update.members,
            meeting_type: update.meeting_type,
            other_meeting_type: update.other_meeting_type.as_deref(),
            start: update.start,
            end: update.end,
            room_id: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRecord {
    #[serde(alias = "_id", deserialize_with = "string_or_number")]
    pub room_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub availability_percentage: Option<f64>,
}

impl RoomRecord {
    pub fn into_room(self) -> Room {
        let name = match self.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => format!("Room {}", self.room_id),
        };
        Room {
            room_id: self.room_id,
            name,
            capacity: self.capacity.unwrap_or(0),
            features: self.features.into_iter().collect::<BTreeSet<_>>(),
            availability_percentage: self.availability_percentage,
        }
    }
}

/// Error body the server attaches to non-2xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error).filter(|m| !m.trim().is_empty())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}
