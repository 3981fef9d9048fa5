//! Per-slot staffing algorithms.
//!
//! A slot is staffed in three steps:
//! 1. [`BreakTracker`] flags operators who must rest this slot.
//! 2. [`SlotMatcher`] runs deferred acceptance over the normal desks and
//!    the break desk.
//! 3. [`ShortageResolver`] repairs understaffed desks.
//!
//! All three share a [`SlotContext`]: the slot's quotas and the
//! eligibility rule tying operators to desks.

mod break_tracker;
mod deferred_acceptance;
mod shortage;

pub use break_tracker::BreakTracker;
pub use deferred_acceptance::SlotMatcher;
pub use shortage::{Phase, Resolution, ResolverMove, ShortageResolver};

use chrono::NaiveDate;
use std::collections::BTreeSet;

use crate::models::{DeskRequirement, OperatorAvailability, SlotId};

/// Everything needed to staff one slot of one day.
#[derive(Debug, Clone)]
pub struct SlotContext<'a> {
    /// Day being staffed.
    pub date: NaiveDate,
    /// Slot being staffed.
    pub slot: SlotId,
    /// Operators available for the slot, in roster order.
    pub operators: Vec<&'a OperatorAvailability>,
    /// Desk quotas for the slot, in desk order. The break desk, if any,
    /// comes last.
    pub quotas: Vec<(String, u32)>,
    /// Name of the break desk, if a break rule is active.
    pub break_desk: Option<String>,
    /// Operators who must take a break this slot.
    pub break_required: BTreeSet<String>,
}

impl<'a> SlotContext<'a> {
    /// Builds the context for one slot.
    ///
    /// The break desk quota equals the number of break-required
    /// operators. A caller-supplied desk with the break desk's name is
    /// ignored.
    pub fn new(
        date: NaiveDate,
        slot: SlotId,
        operators: impl IntoIterator<Item = &'a OperatorAvailability>,
        desks: &[DeskRequirement],
        break_desk: Option<&str>,
        break_required: BTreeSet<String>,
    ) -> Self {
        let operators: Vec<&OperatorAvailability> = operators
            .into_iter()
            .filter(|op| op.can_work_slot(slot))
            .collect();
        let mut quotas: Vec<(String, u32)> = desks
            .iter()
            .filter(|d| Some(d.desk_name.as_str()) != break_desk)
            .map(|d| (d.desk_name.clone(), d.requirement_for(slot)))
            .collect();
        if let Some(name) = break_desk {
            quotas.push((name.to_string(), break_required.len() as u32));
        }
        Self {
            date,
            slot,
            operators,
            quotas,
            break_desk: break_desk.map(str::to_string),
            break_required,
        }
    }

    /// Whether `desk` is the break desk.
    #[inline]
    pub fn is_break_desk(&self, desk: &str) -> bool {
        self.break_desk.as_deref() == Some(desk)
    }

    /// Whether `operator` must rest this slot.
    #[inline]
    pub fn must_rest(&self, operator: &str) -> bool {
        self.break_required.contains(operator)
    }

    /// Whether an operator may sit at a desk this slot.
    ///
    /// Break-required operators may only take the break desk; everybody
    /// else needs competence and may not take the break desk.
    pub fn is_eligible(&self, op: &OperatorAvailability, desk: &str) -> bool {
        if self.is_break_desk(desk) {
            self.must_rest(&op.operator_name)
        } else {
            !self.must_rest(&op.operator_name) && op.can_work_desk(desk)
        }
    }

    /// Required headcount for a desk (0 for unknown desks).
    pub fn quota(&self, desk: &str) -> u32 {
        self.quotas
            .iter()
            .find(|(name, _)| name == desk)
            .map(|(_, q)| *q)
            .unwrap_or(0)
    }

    /// Looks up an available operator by name.
    pub fn operator(&self, name: &str) -> Option<&'a OperatorAvailability> {
        self.operators.iter().copied().find(|op| op.operator_name == name)
    }

    /// Total seats to fill, break desk included.
    pub fn total_quota(&self) -> u32 {
        self.quotas.iter().map(|(_, q)| q).sum()
    }
}
