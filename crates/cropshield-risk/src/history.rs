//! Per-location history of qualifying events

use serde::{Deserialize, Serialize};

use crate::event::EventType;

/// Event counters for one location. Counters never decrease.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationEventHistory {
    pub drought_count: u64,
    pub flood_count: u64,
    pub frost_count: u64,
    /// Time of the most recent qualifying event (0 when none)
    pub last_event: u64,
}

impl LocationEventHistory {
    /// Bump the counter for `event` and stamp `last_event`
    pub fn record(&mut self, event: EventType, at: u64) {
        let counter = match event {
            EventType::Drought => &mut self.drought_count,
            EventType::Flood => &mut self.flood_count,
            EventType::Frost => &mut self.frost_count,
        };
        *counter = counter.saturating_add(1);
        self.last_event = at;
    }

    pub fn count(&self, event: EventType) -> u64 {
        match event {
            EventType::Drought => self.drought_count,
            EventType::Flood => self.flood_count,
            EventType::Frost => self.frost_count,
        }
    }

    pub fn total(&self) -> u64 {
        self.drought_count
            .saturating_add(self.flood_count)
            .saturating_add(self.frost_count)
    }
}
