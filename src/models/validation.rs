// file: src/validation.rs
use serde::Serialize;
use std::fmt;

/// Form field a rejection is displayed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    Title,
    Members,
    MeetingType,
    OtherMeetingType,
    Start,
    End,
    Email,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Title => "title",
            FormField::Members => "members",
            FormField::MeetingType => "meetingType",
            FormField::OtherMeetingType => "otherMeetingType",
            FormField::Start => "start",
            FormField::End => "end",
            FormField::Email => "email",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RejectionKind {
    /// Field-scoped, detected on the client, never sent to the server.
    Validation,
    /// Slot selection in the past.
    PastTime,
    /// Client-detected overlap with a cached booking. Advisory.
    Overlap,
    /// Server refused the write because the slot was taken (HTTP 409).
    ServerConflict,
    NotFound,
    /// Transport failure or 5xx. Retry is a user re-submit.
    Network,
    AuthorizationDenied,
    /// Another mutation for the same event is still in flight.
    Busy,
    /// The owning view or session was closed.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejection {
    pub kind: RejectionKind,
    pub field: Option<FormField>,
    /// Stable machine-readable reason.
    pub code: &'static str,
    pub message: String,
}

impl Rejection {
    pub fn new(kind: RejectionKind, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            field: None,
            code,
            message: message.into(),
        }
    }

    pub fn validation(field: FormField, code: &'static str, message: impl Into<String>) -> Self {
        Self::new(RejectionKind::Validation, code, message).on_field(field)
    }

    pub fn on_field(mut self, field: FormField) -> Self {
        self.field = Some(field);
        self
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field {
            Some(field) => write!(f, "{}: {}", field.as_str(), self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// One or more rejections. Never empty; the first entry is the one a toast
/// shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejected(Vec<Rejection>);

impl Rejected {
    pub fn new(first: Rejection) -> Self {
        Self(vec![first])
    }

    pub fn from_vec(rejections: Vec<Rejection>) -> Option<Self> {
        if rejections.is_empty() {
            None
        } else {
            Some(Self(rejections))
        }
    }

    pub fn primary(&self) -> &Rejection {
        &self.0[0]
    }

    pub fn kind(&self) -> RejectionKind {
        self.primary().kind
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.0.iter().any(|r| r.code == code)
    }

    pub fn for_field(&self, field: FormField) -> impl Iterator<Item = &Rejection> {
        self.0.iter().filter(move |r| r.field == Some(field))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rejection> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<Rejection> {
        self.0
    }
}

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.primary().fmt(f)?;
        if self.0.len() > 1 {
            write!(f, " (+{} more)", self.0.len() - 1)?;
        }
        Ok(())
    }
}

impl std::error::Error for Rejected {}

impl From<Rejection> for Rejected {
    fn from(rejection: Rejection) -> Self {
        Self::new(rejection)
    }
}

/// Uniform outcome for client checks and translated server responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ValidationResult {
    Ok,
    Rejected(Rejected),
}

impl ValidationResult {
    pub fn from_rejections(rejections: Vec<Rejection>) -> Self {
        match Rejected::from_vec(rejections) {
            Some(rejected) => ValidationResult::Rejected(rejected),
            None => ValidationResult::Ok,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, ValidationResult::Ok)
    }

    pub fn rejected(&self) -> Option<&Rejected> {
        match self {
            ValidationResult::Ok => None,
            ValidationResult::Rejected(rejected) => Some(rejected),
        }
    }

    pub fn into_result(self) -> Result<(), Rejected> {
        match self {
            ValidationResult::Ok => Ok(()),
            ValidationResult::Rejected(rejected) => Err(rejected),
        }
    }
}

impl From<Rejection> for ValidationResult {
    fn from(rejection: Rejection) -> Self {
        ValidationResult::Rejected(Rejected::new(rejection))
    }
}
