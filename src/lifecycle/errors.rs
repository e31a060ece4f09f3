// Server failure -> Rejection translation
// Keeps server-side outcomes in the same shape as client validation

use crate::models::{FormField, Rejected, Rejection, RejectionKind};
use crate::store::StoreError;
use regex::Regex;

pub const SERVER_CONFLICT_MESSAGE: &str =
    "This time slot was just booked by someone else. Please choose a different time.";
pub const NOT_FOUND_MESSAGE: &str = "This event no longer exists.";
pub const FORBIDDEN_MESSAGE: &str = "You are not allowed to change this event.";
pub const NETWORK_MESSAGE: &str = "Could not reach the booking server. Please try again.";

lazy_static::lazy_static! {
    // Earliest match in the message wins; ties go to the earlier entry.
    static ref FIELD_HINTS: Vec<(Regex, FormField)> = [
        (r"(?i)\bother\s*meeting\s*type\b", FormField::OtherMeetingType),
        (r"(?i)\bmeeting\s*type\b", FormField::MeetingType),
        (r"(?i)\b(members?|participants?)\b", FormField::Members),
        (r"(?i)\btitle\b", FormField::Title),
        (r"(?i)\be-?mail\b", FormField::Email),
        (r"(?i)\bstart(\s*time)?\b", FormField::Start),
        (r"(?i)\bend(\s*time)?\b", FormField::End),
    ]
    .into_iter()
    .filter_map(|(pattern, field)| Regex::new(pattern).ok().map(|re| (re, field)))
    .collect();
}

/// Form field a server message talks about, if it names one.
pub fn infer_field(message: &str) -> Option<FormField> {
    FIELD_HINTS
        .iter()
        .filter_map(|(re, field)| re.find(message).map(|m| (m.start(), *field)))
        .min_by_key(|(position, _)| *position)
        .map(|(_, field)| field)
}

pub fn map_store_error(error: &StoreError) -> Rejected {
    let rejection = match error {
        StoreError::Status { status: 409, message } => Rejection::new(
            RejectionKind::ServerConflict,
            "server_conflict",
            non_empty(message).unwrap_or(SERVER_CONFLICT_MESSAGE),
        ),
        StoreError::Status { status: 404, .. } => {
            Rejection::new(RejectionKind::NotFound, "not_found", NOT_FOUND_MESSAGE)
        }
        StoreError::Status {
            status: 401 | 403, ..
        } => Rejection::new(RejectionKind::AuthorizationDenied, "forbidden", FORBIDDEN_MESSAGE),
        StoreError::Status { status, message } if (400..500).contains(status) => {
            let text = non_empty(message).unwrap_or("The server rejected this booking.");
            let rejection = Rejection::new(RejectionKind::Validation, "server_rejected", text);
            match infer_field(text) {
                Some(field) => rejection.on_field(field),
                None => rejection,
            }
        }
        StoreError::Status { .. } => Rejection::new(RejectionKind::Network, "server_error", NETWORK_MESSAGE),
        StoreError::Transport(_) => Rejection::new(RejectionKind::Network, "network", NETWORK_MESSAGE),
        StoreError::Decode(_) => Rejection::new(RejectionKind::Network, "bad_response", NETWORK_MESSAGE),
    };
    Rejected::new(rejection)
}

fn non_empty(message: &str) -> Option<&str> {
    let trimmed = message.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
