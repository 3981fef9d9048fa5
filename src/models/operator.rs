//! Operator availability model.
//!
//! An operator is a worker who can staff desks. Availability is fixed
//! for the whole scheduling run: the slots the operator can work, the
//! slots they prefer, and the desks they are competent for.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::SlotId;

/// Default daily working-hour cap.
pub const DEFAULT_MAX_WORK_HOURS_PER_DAY: f64 = 8.0;
/// Default rest between shifts.
pub const DEFAULT_MIN_REST_HOURS: f64 = 11.0;

/// Availability and competence of one operator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorAvailability {
    /// Unique operator name.
    pub operator_name: String,
    /// Slots the operator can work.
    pub available_slots: BTreeSet<SlotId>,
    /// Slots the operator would rather work.
    pub preferred_slots: BTreeSet<SlotId>,
    /// Desks the operator is competent for.
    pub competent_desks: BTreeSet<String>,
    /// Home desk, ranked first when the operator is competent for it.
    pub home_desk: Option<String>,
    /// Daily working-hour cap.
    pub max_work_hours_per_day: f64,
    /// Minimum rest between shifts.
    pub min_rest_hours_between_shifts: f64,
}

impl OperatorAvailability {
    /// Creates an operator with no availability.
    pub fn new(operator_name: impl Into<String>) -> Self {
        Self {
            operator_name: operator_name.into(),
            available_slots: BTreeSet::new(),
            preferred_slots: BTreeSet::new(),
            competent_desks: BTreeSet::new(),
            home_desk: None,
            max_work_hours_per_day: DEFAULT_MAX_WORK_HOURS_PER_DAY,
            min_rest_hours_between_shifts: DEFAULT_MIN_REST_HOURS,
        }
    }

    /// Adds available slots.
    pub fn with_available(mut self, slots: impl IntoIterator<Item = SlotId>) -> Self {
        self.available_slots.extend(slots);
        self
    }

    /// Marks every hour in `[start_hour, end_hour)` as available.
    ///
    /// Hours outside 0..=23 are ignored.
    pub fn with_hours(mut self, start_hour: u32, end_hour: u32) -> Self {
        self.available_slots
            .extend((start_hour..end_hour).filter_map(|h| SlotId::new(h).ok()));
        self
    }

    /// Adds preferred slots.
    pub fn with_preferred(mut self, slots: impl IntoIterator<Item = SlotId>) -> Self {
        self.preferred_slots.extend(slots);
        self
    }

    /// Adds a competent desk.
    pub fn with_desk(mut self, desk: impl Into<String>) -> Self {
        self.competent_desks.insert(desk.into());
        self
    }

    /// Adds several competent desks.
    pub fn with_desks<I, S>(mut self, desks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.competent_desks.extend(desks.into_iter().map(Into::into));
        self
    }

    /// Sets the home desk.
    pub fn with_home_desk(mut self, desk: impl Into<String>) -> Self {
        self.home_desk = Some(desk.into());
        self
    }

    /// Sets the daily working-hour cap.
    pub fn with_max_work_hours(mut self, hours: f64) -> Self {
        self.max_work_hours_per_day = hours;
        self
    }

    /// Sets the minimum rest between shifts.
    pub fn with_min_rest_hours(mut self, hours: f64) -> Self {
        self.min_rest_hours_between_shifts = hours;
        self
    }

    #[inline]
    pub fn can_work_slot(&self, slot: SlotId) -> bool {
        self.available_slots.contains(&slot)
    }

    #[inline]
    pub fn prefers_slot(&self, slot: SlotId) -> bool {
        self.preferred_slots.contains(&slot)
    }

    #[inline]
    pub fn can_work_desk(&self, desk: &str) -> bool {
        self.competent_desks.contains(desk)
    }
}
