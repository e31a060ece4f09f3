// Declare modules
pub mod draft;
pub mod event;
pub mod identity;
pub mod notification;
pub mod room;
pub mod validation;

// Re-export all public types so callers can write `crate::models::Event`.
pub use draft::{EventDraft, EventPatch, EventUpdate, NewEvent};
pub use event::{Event, EventStatus, MeetingType};
pub use identity::{Identity, MemberSuggestion};
pub use notification::{Notification, NotificationMessage};
pub use room::{AvailabilityLevel, Room};
pub use validation::{FormField, Rejected, Rejection, RejectionKind, ValidationResult};
