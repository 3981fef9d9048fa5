//! Consecutive-slot break tracking.
//!
//! Before a slot is matched, each available operator's earlier
//! assignments (same and prior days, chronological) are replayed: a
//! break seat resets the counter, any other seat adds one. An
//! operator whose counter has reached the limit must rest this slot.
//!
//! The count is rebuilt from the history on every call; there is no
//! incremental state to keep in sync.

use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::debug;

use crate::constraints::{break_rule, Constraint};
use crate::models::{Assignment, OperatorAvailability, SlotId};

/// Flags operators who must take a break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakTracker {
    max_slots: u32,
    break_desk: String,
}

impl BreakTracker {
    /// Creates a tracker for a slot limit and break desk.
    pub fn new(max_slots: u32, break_desk: impl Into<String>) -> Self {
        Self {
            max_slots,
            break_desk: break_desk.into(),
        }
    }

    /// Tracker for the first consecutive-slot rule in `constraints`.
    pub fn from_constraints(constraints: &[Constraint]) -> Option<Self> {
        break_rule(constraints).map(|(max, desk)| Self::new(max, desk))
    }

    #[inline]
    pub fn max_slots(&self) -> u32 {
        self.max_slots
    }

    #[inline]
    pub fn break_desk(&self) -> &str {
        &self.break_desk
    }

    /// Worked slots since the operator's last break, counting only
    /// assignments strictly before `(date, slot)`.
    pub fn consecutive_count(
        &self,
        history: &[Assignment],
        operator_name: &str,
        date: NaiveDate,
        slot: SlotId,
    ) -> u32 {
        let mut earlier: Vec<&Assignment> = history
            .iter()
            .filter(|a| a.operator_name() == operator_name && a.when() < (date, slot))
            .collect();
        earlier.sort_by_key(|a| a.when());
        earlier.iter().fold(0, |count, a| {
            if a.is_break() {
                0
            } else {
                count + 1
            }
        })
    }

    /// Whether the operator must rest at `(date, slot)`.
    ///
    /// An operator with no earlier work never has to.
    pub fn requires_break(
        &self,
        history: &[Assignment],
        operator_name: &str,
        date: NaiveDate,
        slot: SlotId,
    ) -> bool {
        let count = self.consecutive_count(history, operator_name, date, slot);
        count > 0 && count >= self.max_slots
    }

    /// Available operators who must rest at `(date, slot)`.
    pub fn break_required(
        &self,
        history: &[Assignment],
        operators: &[OperatorAvailability],
        date: NaiveDate,
        slot: SlotId,
    ) -> BTreeSet<String> {
        let flagged: BTreeSet<String> = operators
            .iter()
            .filter(|op| op.can_work_slot(slot))
            .filter(|op| self.requires_break(history, &op.operator_name, date, slot))
            .map(|op| op.operator_name.clone())
            .collect();
        if !flagged.is_empty() {
            debug!(%date, %slot, operators = ?flagged, "break required");
        }
        flagged
    }
}
