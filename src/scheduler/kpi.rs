//! Roster quality metrics (KPIs).
//!
//! Computes coverage and workload indicators from a finished schedule
//! and the demand it was built for.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Required seats | Sum of desk requirements over all days and slots |
//! | Filled seats | Sum of min(assigned, required) per desk, slot and day |
//! | Fill rate | Filled / required |
//! | Total shortage | Unfilled seats left by the resolver |
//! | Hours by operator | Worked hours, break seats excluded |
//! | Break count | Break-desk seats |
//! | Hard / soft violations | Failing constraints by kind |
//!
//! # Reference
//! Ernst et al. (2004), "Staff scheduling and rostering", §2 (demand
//! modelling and coverage)

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::models::{headcounts, AssignmentType, DeskRequirement, Schedule, SlotCalendar};

/// Roster performance indicators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleKpi {
    /// Seats demanded by the desk list.
    pub total_required: u32,
    /// Demanded seats that were staffed.
    pub filled: u32,
    /// `filled / total_required` (1.0 when nothing is required).
    pub fill_rate: f64,
    /// Unfilled seats reported by the resolver.
    pub total_shortage: u32,
    /// Unfilled seats per desk.
    pub shortage_by_desk: BTreeMap<String, u32>,
    /// Worked hours per operator.
    pub hours_by_operator: BTreeMap<String, f64>,
    /// Break-desk seats.
    pub break_count: usize,
    /// Failing hard constraints.
    pub hard_violations: usize,
    /// Failing soft constraints.
    pub soft_violations: usize,
}

impl ScheduleKpi {
    /// Computes KPIs for a schedule.
    ///
    /// # Arguments
    /// * `schedule` - The finished schedule.
    /// * `desks` - The demand it was built for.
    /// * `calendar` - Slot definitions, for durations.
    pub fn calculate(schedule: &Schedule, desks: &[DeskRequirement], calendar: &SlotCalendar) -> Self {
        let dates: BTreeSet<NaiveDate> = schedule
            .assignments
            .iter()
            .map(|a| a.date())
            .chain(schedule.shortages.iter().map(|s| s.date))
            .collect();
        let counts = headcounts(&schedule.assignments);

        let mut total_required = 0;
        let mut filled = 0;
        for &date in &dates {
            for slot in calendar.slot_ids() {
                for desk in desks {
                    let required = desk.requirement_for(slot);
                    let assigned = counts
                        .get(&(date, slot, desk.desk_name.as_str()))
                        .copied()
                        .unwrap_or(0);
                    total_required += required;
                    filled += assigned.min(required);
                }
            }
        }

        let mut shortage_by_desk = BTreeMap::new();
        for s in &schedule.shortages {
            *shortage_by_desk.entry(s.desk_name.clone()).or_insert(0) += s.missing();
        }

        let mut hours_by_operator = BTreeMap::new();
        let mut break_count = 0;
        for a in &schedule.assignments {
            if a.assignment_type() == AssignmentType::Break {
                break_count += 1;
                continue;
            }
            *hours_by_operator
                .entry(a.operator_name().to_string())
                .or_insert(0.0) += calendar.duration_hours(a.slot());
        }

        let hard_violations = schedule.violations.iter().filter(|v| v.is_hard).count();

        Self {
            total_required,
            filled,
            fill_rate: if total_required == 0 {
                1.0
            } else {
                f64::from(filled) / f64::from(total_required)
            },
            total_shortage: schedule.total_missing(),
            shortage_by_desk,
            hours_by_operator,
            break_count,
            hard_violations,
            soft_violations: schedule.violations.len() - hard_violations,
        }
    }

    /// Whether the schedule has no hard violations and reaches the fill rate.
    pub fn meets_thresholds(&self, min_fill_rate: f64) -> bool {
        self.hard_violations == 0 && self.fill_rate >= min_fill_rate
    }
}
