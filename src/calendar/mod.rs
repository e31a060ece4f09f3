// Scheduling engine
// Time-window primitives, overlap detection and slot-selection policy

pub mod conflict;
pub mod slot;
pub mod window;

pub use conflict::{find_conflicts, find_conflicts_excluding, is_available};
pub use slot::{evaluate as evaluate_slot, CandidateSlot, SlotContext, ViewGranularity};
pub use window::{TimeWindow, WindowError};
