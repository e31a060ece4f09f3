// file: src/room.rs
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub room_id: String,
    pub name: String,
    pub capacity: u32,
    pub features: BTreeSet<String>,
    /// Computed by the server for a given day; absent on plain detail reads.
    pub availability_percentage: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AvailabilityLevel {
    High,
    Limited,
    Low,
}

impl Room {
    pub fn availability_level(&self) -> Option<AvailabilityLevel> {
        self.availability_percentage.map(|pct| {
            if pct >= 50.0 {
                AvailabilityLevel::High
            } else if pct >= 20.0 {
                AvailabilityLevel::Limited
            } else {
                AvailabilityLevel::Low
            }
        })
    }

    pub fn has_feature(&self, tag: &str) -> bool {
        self.features.iter().any(|f| f.eq_ignore_ascii_case(tag))
    }
}
