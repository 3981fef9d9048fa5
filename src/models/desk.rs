//! Desk headcount requirements.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::SlotId;

/// Default name of the synthetic break desk.
pub const DEFAULT_BREAK_DESK: &str = "break";

/// Per-slot headcount a desk needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeskRequirement {
    /// Desk name.
    pub desk_name: String,
    /// Required operators per slot. Missing slots require nobody.
    pub required_count_per_slot: BTreeMap<SlotId, u32>,
}

impl DeskRequirement {
    /// Creates a desk with no requirements.
    pub fn new(desk_name: impl Into<String>) -> Self {
        Self {
            desk_name: desk_name.into(),
            required_count_per_slot: BTreeMap::new(),
        }
    }

    /// Builds a desk from one row of a desk × hour headcount table.
    ///
    /// Hours outside 0..=23 are skipped.
    pub fn from_hourly_row(
        desk_name: impl Into<String>,
        row: impl IntoIterator<Item = (u32, u32)>,
    ) -> Self {
        let required_count_per_slot = row
            .into_iter()
            .filter_map(|(hour, count)| SlotId::new(hour).ok().map(|s| (s, count)))
            .collect();
        Self {
            desk_name: desk_name.into(),
            required_count_per_slot,
        }
    }

    /// Sets the requirement for one slot.
    pub fn with_requirement(mut self, slot: SlotId, count: u32) -> Self {
        self.set_requirement(slot, count);
        self
    }

    /// Sets the same requirement for several slots.
    pub fn with_requirements(mut self, slots: impl IntoIterator<Item = SlotId>, count: u32) -> Self {
        for slot in slots {
            self.set_requirement(slot, count);
        }
        self
    }

    /// Sets the requirement for one slot.
    pub fn set_requirement(&mut self, slot: SlotId, count: u32) {
        self.required_count_per_slot.insert(slot, count);
    }

    /// Required headcount for a slot (0 if unspecified).
    pub fn requirement_for(&self, slot: SlotId) -> u32 {
        self.required_count_per_slot.get(&slot).copied().unwrap_or(0)
    }

    /// Total required seats across all slots of one day.
    pub fn total_required(&self) -> u32 {
        self.required_count_per_slot.values().sum()
    }
}
