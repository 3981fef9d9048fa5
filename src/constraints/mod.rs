//! Labor-rule constraint engine.
//!
//! A [`Constraint`] pairs one [`Rule`] with its description, hard/soft
//! flag and penalty weight. Rules form a closed set; evaluation
//! dispatches on the variant.
//!
//! # Components
//! - [`rules`]: per-rule evaluation and remediation helpers
//! - [`ConstraintValidator`]: evaluates a rule list with a result cache
//! - [`ConstraintParser`]: builds rules from `key = value` text
//! - [`ConstraintConfig`]: builds rules from TOML settings
//!
//! # Reference
//! Ernst et al. (2004), "Staff scheduling and rostering: A review of
//! applications, methods and models", EJOR 153(1)

mod config;
mod parser;
pub mod rules;
mod validator;

pub use config::ConstraintConfig;
pub use parser::{ConstraintParser, ParseMode};
pub use rules::{apply_breaks, BreakProposal};
pub use validator::{ConstraintValidator, ValidationCache};

use serde::{Deserialize, Serialize};

use crate::models::{Assignment, OperatorAvailability, SlotCalendar, DEFAULT_BREAK_DESK};

/// The rule a constraint checks, with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Rule {
    /// Rest between shifts on consecutive days must reach `min_hours`.
    MinRestHours { min_hours: f64 },

    /// At most `max_days` calendar-consecutive working days.
    MaxConsecutiveDays { max_days: u32 },

    /// At most `max_hours` worked per Monday-based week.
    MaxWeeklyHours { max_hours: f64 },

    /// At most `max_shifts` nights worked per Monday-based week.
    MaxNightShiftsPerWeek { max_shifts: u32 },

    /// No work on the day after a night shift.
    RequiredDayOffAfterNight,

    /// A slot of `threshold_hours` or longer must be followed by at
    /// least `break_hours` before the next same-day slot.
    RequiredBreakAfterLongShift {
        threshold_hours: f64,
        break_hours: f64,
    },

    /// After `max_slots` worked slots in a row the next assignment must
    /// be on `break_desk`.
    RequiredBreakAfterConsecutiveSlots { max_slots: u32, break_desk: String },
}

impl Rule {
    /// Configuration key of the rule.
    pub fn key(&self) -> &'static str {
        match self {
            Rule::MinRestHours { .. } => "min_rest_hours",
            Rule::MaxConsecutiveDays { .. } => "max_consecutive_days",
            Rule::MaxWeeklyHours { .. } => "max_weekly_hours",
            Rule::MaxNightShiftsPerWeek { .. } => "max_night_shifts_per_week",
            Rule::RequiredDayOffAfterNight => "required_day_off_after_night",
            Rule::RequiredBreakAfterLongShift { .. } => "required_break_after_long_shift",
            Rule::RequiredBreakAfterConsecutiveSlots { .. } => {
                "required_break_after_consecutive_slots"
            }
        }
    }

    fn describe(&self) -> String {
        match self {
            Rule::MinRestHours { min_hours } => format!("Minimum rest: {min_hours}h"),
            Rule::MaxConsecutiveDays { max_days } => {
                format!("Max consecutive days: {max_days}")
            }
            Rule::MaxWeeklyHours { max_hours } => format!("Max weekly hours: {max_hours}h"),
            Rule::MaxNightShiftsPerWeek { max_shifts } => {
                format!("Max night shifts per week: {max_shifts}")
            }
            Rule::RequiredDayOffAfterNight => "Day off after night shift".to_string(),
            Rule::RequiredBreakAfterLongShift {
                threshold_hours,
                break_hours,
            } => format!("{break_hours}h break after a shift of {threshold_hours}h or more"),
            Rule::RequiredBreakAfterConsecutiveSlots {
                max_slots,
                break_desk,
            } => format!("'{break_desk}' required after {max_slots} consecutive slots"),
        }
    }
}

/// A configured rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    /// Rule and parameters.
    pub rule: Rule,
    /// Human-readable description.
    pub description: String,
    /// Hard constraints block acceptance of a schedule.
    pub is_hard: bool,
    /// Penalty added to the violation score when the rule fails.
    pub weight: f64,
}

impl Constraint {
    /// Creates a hard constraint with weight 1.0 and a generated description.
    pub fn new(rule: Rule) -> Self {
        Self {
            description: rule.describe(),
            rule,
            is_hard: true,
            weight: 1.0,
        }
    }

    pub fn min_rest_hours(min_hours: f64) -> Self {
        Self::new(Rule::MinRestHours { min_hours })
    }

    pub fn max_consecutive_days(max_days: u32) -> Self {
        Self::new(Rule::MaxConsecutiveDays { max_days })
    }

    pub fn max_weekly_hours(max_hours: f64) -> Self {
        Self::new(Rule::MaxWeeklyHours { max_hours })
    }

    pub fn max_night_shifts_per_week(max_shifts: u32) -> Self {
        Self::new(Rule::MaxNightShiftsPerWeek { max_shifts })
    }

    pub fn required_day_off_after_night() -> Self {
        Self::new(Rule::RequiredDayOffAfterNight)
    }

    pub fn required_break_after_long_shift(threshold_hours: f64, break_hours: f64) -> Self {
        Self::new(Rule::RequiredBreakAfterLongShift {
            threshold_hours,
            break_hours,
        })
    }

    pub fn required_break_after_consecutive_slots(
        max_slots: u32,
        break_desk: impl Into<String>,
    ) -> Self {
        Self::new(Rule::RequiredBreakAfterConsecutiveSlots {
            max_slots,
            break_desk: break_desk.into(),
        })
    }

    /// Makes the constraint soft with the given penalty weight.
    pub fn soft(mut self, weight: f64) -> Self {
        self.is_hard = false;
        self.weight = weight;
        self
    }

    /// Overrides the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Configuration key of the underlying rule.
    #[inline]
    pub fn name(&self) -> &'static str {
        self.rule.key()
    }

    /// Break desk and slot limit, if this is the consecutive-slot rule.
    pub fn consecutive_break(&self) -> Option<(u32, &str)> {
        match &self.rule {
            Rule::RequiredBreakAfterConsecutiveSlots {
                max_slots,
                break_desk,
            } => Some((*max_slots, break_desk.as_str())),
            _ => None,
        }
    }

    /// Whether the assignments satisfy this constraint.
    pub fn validate(
        &self,
        assignments: &[Assignment],
        operators: &[OperatorAvailability],
        calendar: &SlotCalendar,
    ) -> bool {
        match &self.rule {
            Rule::MinRestHours { min_hours } => {
                rules::min_rest_hours(assignments, operators, calendar, *min_hours)
            }
            Rule::MaxConsecutiveDays { max_days } => {
                rules::max_consecutive_days(assignments, operators, *max_days)
            }
            Rule::MaxWeeklyHours { max_hours } => {
                rules::max_weekly_hours(assignments, operators, calendar, *max_hours)
            }
            Rule::MaxNightShiftsPerWeek { max_shifts } => {
                rules::max_night_shifts_per_week(assignments, operators, calendar, *max_shifts)
            }
            Rule::RequiredDayOffAfterNight => {
                rules::required_day_off_after_night(assignments, operators, calendar)
            }
            Rule::RequiredBreakAfterLongShift {
                threshold_hours,
                break_hours,
            } => rules::required_break_after_long_shift(
                assignments,
                operators,
                calendar,
                *threshold_hours,
                *break_hours,
            ),
            Rule::RequiredBreakAfterConsecutiveSlots { max_slots, .. } => {
                rules::required_break_after_consecutive_slots(assignments, operators, *max_slots)
            }
        }
    }

    /// 0.0 if satisfied, otherwise the weight.
    pub fn violation_score(
        &self,
        assignments: &[Assignment],
        operators: &[OperatorAvailability],
        calendar: &SlotCalendar,
    ) -> f64 {
        if self.validate(assignments, operators, calendar) {
            0.0
        } else {
            self.weight
        }
    }

    /// Break-desk seats that would satisfy the consecutive-slot rule.
    ///
    /// Empty for every other rule.
    pub fn required_break_assignments(
        &self,
        assignments: &[Assignment],
        operators: &[OperatorAvailability],
        calendar: &SlotCalendar,
    ) -> Vec<Assignment> {
        match self.consecutive_break() {
            Some((max_slots, break_desk)) => rules::required_break_assignments(
                assignments,
                operators,
                calendar,
                max_slots,
                break_desk,
            ),
            None => Vec::new(),
        }
    }

    /// Break placements for long-shift breaches.
    ///
    /// Empty for every other rule.
    pub fn break_proposals(
        &self,
        assignments: &[Assignment],
        operators: &[OperatorAvailability],
        calendar: &SlotCalendar,
    ) -> Vec<BreakProposal> {
        match &self.rule {
            Rule::RequiredBreakAfterLongShift {
                threshold_hours,
                break_hours,
            } => rules::long_shift_break_proposals(
                assignments,
                operators,
                calendar,
                *threshold_hours,
                *break_hours,
            ),
            _ => Vec::new(),
        }
    }
}

/// The rule set used when none is configured.
pub fn default_constraints() -> Vec<Constraint> {
    vec![
        Constraint::max_consecutive_days(6),
        Constraint::max_weekly_hours(40.0),
        Constraint::max_night_shifts_per_week(2),
        Constraint::required_break_after_long_shift(5.0, 1.0),
        Constraint::required_break_after_consecutive_slots(5, DEFAULT_BREAK_DESK),
    ]
}

/// First consecutive-slot break rule in a list.
pub fn break_rule(constraints: &[Constraint]) -> Option<(u32, &str)> {
    constraints.iter().find_map(Constraint::consecutive_break)
}
