// file: src/identity.rs
use serde::{Deserialize, Serialize};

/// A person as seen by the booking client: display name plus the email that
/// identifies them to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Emails are compared trimmed and case-insensitively.
    pub fn has_email(&self, email: &str) -> bool {
        let own = self.email.trim();
        !own.is_empty() && own.eq_ignore_ascii_case(email.trim())
    }
}

/// One entry returned by directory search, used to populate member pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSuggestion {
    pub value: String,
    pub label: String,
    pub email: String,
}
