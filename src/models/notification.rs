// file: src/notification.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A raw push message as delivered by the notification channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub message: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl NotificationMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Room the message is about, when the server attached one. Accepts
    /// string and numeric ids.
    pub fn room_id(&self) -> Option<String> {
        match self.metadata.get("roomId")? {
            serde_json::Value::String(s) if !s.is_empty() => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// An entry in the session's notification feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub room_id: Option<String>,
    pub received_at: DateTime<Utc>,
    pub is_read: bool,
}

impl Notification {
    pub fn from_message(message: &NotificationMessage, received_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            message: message.message.clone(),
            room_id: message.room_id(),
            received_at,
            is_read: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_room_id_from_metadata() {
        let text = NotificationMessage::new("New meeting").with_metadata(json!({"roomId": "r-7"}));
        let numeric = NotificationMessage::new("New meeting").with_metadata(json!({"roomId": 12}));
        let missing = NotificationMessage::new("New meeting");

        assert_eq!(text.room_id().as_deref(), Some("r-7"));
        assert_eq!(numeric.room_id().as_deref(), Some("12"));
        assert_eq!(missing.room_id(), None);
    }

    #[test]
    fn test_notification_starts_unread() {
        let message = NotificationMessage::new("You were invited");
        let notification = Notification::from_message(&message, Utc::now());
        assert!(!notification.is_read);
        assert_eq!(notification.message, "You were invited");
    }
}
