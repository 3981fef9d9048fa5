//! Schedule (solution) model.
//!
//! A schedule is the flat assignment list produced by a run, plus the
//! shortages the resolver could not fill and the rule violations found
//! afterwards. Shortages and violations are data, never errors.
//!
//! The occupancy table and operator timetable are pure projections of
//! the assignment list for display and export.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::{Assignment, SlotCalendar, SlotId};

/// A complete multi-day roster.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    /// All assignments, in generation order (day, then slot).
    pub assignments: Vec<Assignment>,
    /// Desks left understaffed after shortage resolution.
    pub shortages: Vec<Shortage>,
    /// Rule violations detected on the finished roster.
    pub violations: Vec<Violation>,
}

/// Unmet demand for one desk in one slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortage {
    /// Day of the shortage.
    pub date: NaiveDate,
    /// Understaffed slot.
    pub slot: SlotId,
    /// Understaffed desk.
    pub desk_name: String,
    /// Required headcount.
    pub required: u32,
    /// Headcount actually assigned.
    pub assigned: u32,
}

impl Shortage {
    /// Number of unfilled seats.
    #[inline]
    pub fn missing(&self) -> u32 {
        self.required.saturating_sub(self.assigned)
    }
}

/// A failed rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Configuration key of the rule (e.g. `max_weekly_hours`).
    pub constraint: String,
    /// Human-readable rule description.
    pub description: String,
    /// Whether the rule blocks acceptance of the schedule.
    pub is_hard: bool,
    /// Penalty contributed to the violation score.
    pub score: f64,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the schedule has no hard violations.
    pub fn is_acceptable(&self) -> bool {
        !self.violations.iter().any(|v| v.is_hard)
    }

    /// Whether every desk was fully staffed.
    pub fn is_fully_staffed(&self) -> bool {
        self.shortages.is_empty()
    }

    /// Sum of violation scores.
    pub fn violation_score(&self) -> f64 {
        self.violations.iter().map(|v| v.score).sum()
    }

    /// Total unfilled seats.
    pub fn total_missing(&self) -> u32 {
        self.shortages.iter().map(Shortage::missing).sum()
    }

    /// All assignments of one operator, in generation order.
    pub fn for_operator(&self, operator_name: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.operator_name() == operator_name)
            .collect()
    }

    /// All assignments on one desk.
    pub fn for_desk(&self, desk_name: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.desk_name() == desk_name)
            .collect()
    }

    /// All assignments in one slot of one day.
    pub fn for_slot(&self, date: NaiveDate, slot: SlotId) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.date() == date && a.slot() == slot)
            .collect()
    }

    /// Hours an operator works on a date. Break seats are not counted.
    pub fn work_hours(&self, operator_name: &str, date: NaiveDate, calendar: &SlotCalendar) -> f64 {
        worked_hours(&self.assignments, operator_name, date, calendar)
    }

    /// Desk × slot occupancy for one day.
    pub fn occupancy(&self, date: NaiveDate, desks: &[String]) -> OccupancyTable {
        OccupancyTable::build(&self.assignments, date, desks)
    }

    /// Operator × slot timetable for one day.
    pub fn timetable(&self, date: NaiveDate) -> OperatorTimetable {
        OperatorTimetable::build(&self.assignments, date)
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }
}

/// Desk × slot → operators, for a single day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OccupancyTable {
    /// Day the table describes.
    pub date: Option<NaiveDate>,
    /// Desk name → slot → operator names (in assignment order).
    pub cells: BTreeMap<String, BTreeMap<SlotId, Vec<String>>>,
}

impl OccupancyTable {
    /// Projects assignments of `date` onto a desk × slot grid.
    ///
    /// Desks listed in `desks` appear even if empty.
    pub fn build(assignments: &[Assignment], date: NaiveDate, desks: &[String]) -> Self {
        let mut cells: BTreeMap<String, BTreeMap<SlotId, Vec<String>>> = desks
            .iter()
            .map(|d| (d.clone(), BTreeMap::new()))
            .collect();
        for a in assignments.iter().filter(|a| a.date() == date) {
            cells
                .entry(a.desk_name().to_string())
                .or_default()
                .entry(a.slot())
                .or_default()
                .push(a.operator_name().to_string());
        }
        Self {
            date: Some(date),
            cells,
        }
    }

    /// Operators on a desk during a slot.
    pub fn operators_at(&self, desk_name: &str, slot: SlotId) -> &[String] {
        self.cells
            .get(desk_name)
            .and_then(|row| row.get(&slot))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Headcount on a desk during a slot.
    pub fn count(&self, desk_name: &str, slot: SlotId) -> usize {
        self.operators_at(desk_name, slot).len()
    }
}

/// Operator × slot → desk, for a single day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OperatorTimetable {
    /// Operator name → slot → desk name.
    pub rows: BTreeMap<String, BTreeMap<SlotId, String>>,
}

impl OperatorTimetable {
    /// Projects assignments of `date` onto an operator × slot grid.
    pub fn build(assignments: &[Assignment], date: NaiveDate) -> Self {
        let mut rows: BTreeMap<String, BTreeMap<SlotId, String>> = BTreeMap::new();
        for a in assignments.iter().filter(|a| a.date() == date) {
            rows.entry(a.operator_name().to_string())
                .or_default()
                .insert(a.slot(), a.desk_name().to_string());
        }
        Self { rows }
    }

    /// Desk an operator holds during a slot.
    pub fn desk_at(&self, operator_name: &str, slot: SlotId) -> Option<&str> {
        self.rows
            .get(operator_name)
            .and_then(|row| row.get(&slot))
            .map(String::as_str)
    }
}

/// Non-break hours of one operator on one date.
pub(crate) fn worked_hours(
    assignments: &[Assignment],
    operator_name: &str,
    date: NaiveDate,
    calendar: &SlotCalendar,
) -> f64 {
    assignments
        .iter()
        .filter(|a| a.operator_name() == operator_name && a.date() == date && !a.is_break())
        .map(|a| calendar.duration_hours(a.slot()))
        .sum()
}

/// Counts assignments per (date, slot, desk).
pub(crate) fn headcounts(assignments: &[Assignment]) -> HashMap<(NaiveDate, SlotId, &str), u32> {
    let mut counts = HashMap::new();
    for a in assignments {
        *counts.entry((a.date(), a.slot(), a.desk_name())).or_insert(0) += 1;
    }
    counts
}
