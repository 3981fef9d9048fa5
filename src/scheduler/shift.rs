//! Slot-by-slot shift scheduler.
//!
//! # Algorithm
//!
//! For each day, in order, and each calendar slot, in order:
//! 1. Drop operators who would exceed their daily hours or start
//!    before their rest after the previous day is over. Flag operators
//!    who must rest (consecutive-slot rule).
//! 2. Build the slot's quotas, sizing the break desk to the flagged count.
//! 3. Match operators to desks by deferred acceptance.
//! 4. Repair understaffed desks.
//!
//! After the last day, the concatenated assignments are checked against
//! every constraint, multi-day rules included.
//!
//! # Complexity
//! O(D · S · (n · d · q + h)) for D days, S slots per day, n operators,
//! d desks, quota q and history length h.

use chrono::{Duration, NaiveDate};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

use crate::constraints::rules::rest_hours;
use crate::constraints::{default_constraints, Constraint, ConstraintValidator};
use crate::matching::{BreakTracker, ShortageResolver, SlotContext, SlotMatcher};
use crate::models::{
    worked_hours, Assignment, DeskRequirement, OperatorAvailability, Schedule, SlotCalendar, SlotId,
};
use crate::validation::validate_input;

/// Tolerance for fractional-hour limits.
const HOURS_EPSILON: f64 = 1e-9;

/// Input container for a staffing run.
#[derive(Debug, Clone, Default)]
pub struct ScheduleRequest {
    /// Operator roster.
    pub operators: Vec<OperatorAvailability>,
    /// Desks and their per-slot headcounts.
    pub desks: Vec<DeskRequirement>,
    /// Days to staff. Each day runs once, in chronological order.
    pub dates: Vec<NaiveDate>,
}

impl ScheduleRequest {
    /// Creates a request with no dates.
    pub fn new(operators: Vec<OperatorAvailability>, desks: Vec<DeskRequirement>) -> Self {
        Self {
            operators,
            desks,
            dates: Vec::new(),
        }
    }

    /// Adds one day.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.dates.push(date);
        self
    }

    /// Adds `days` consecutive days starting at `start`.
    pub fn with_days(mut self, start: NaiveDate, days: u32) -> Self {
        self.dates
            .extend((0..days).map(|i| start + Duration::days(i64::from(i))));
        self
    }
}

/// Staffs desks slot by slot and validates the result.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use desk_roster::models::{DeskRequirement, OperatorAvailability, SlotCalendar, SlotId};
/// use desk_roster::scheduler::{ScheduleRequest, ShiftScheduler};
///
/// let slots: Vec<SlotId> = (9..12).map(|h| SlotId::new(h).unwrap()).collect();
/// let operators = vec![
///     OperatorAvailability::new("Alice").with_hours(9, 12).with_desk("Front"),
/// ];
/// let desks = vec![DeskRequirement::new("Front").with_requirements(slots, 1)];
/// let request = ScheduleRequest::new(operators, desks)
///     .with_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
///
/// let mut scheduler = ShiftScheduler::new(SlotCalendar::hourly(9, 12).unwrap());
/// let schedule = scheduler.schedule(&request);
/// assert_eq!(schedule.assignment_count(), 3);
/// assert!(schedule.is_fully_staffed());
/// ```
#[derive(Debug, Clone)]
pub struct ShiftScheduler {
    validator: ConstraintValidator,
    tracker: Option<BreakTracker>,
    matcher: SlotMatcher,
    resolver: ShortageResolver,
}

impl ShiftScheduler {
    /// Creates a scheduler with the default constraint set.
    pub fn new(calendar: SlotCalendar) -> Self {
        Self::with_constraints(default_constraints(), calendar)
    }

    /// Creates a scheduler with the given constraints.
    ///
    /// An empty list falls back to the default constraint set.
    pub fn with_constraints(constraints: Vec<Constraint>, calendar: SlotCalendar) -> Self {
        let validator = ConstraintValidator::new(constraints, calendar);
        let tracker = BreakTracker::from_constraints(validator.constraints());
        Self {
            validator,
            tracker,
            matcher: SlotMatcher::new(),
            resolver: ShortageResolver::new(),
        }
    }

    /// The active constraints.
    pub fn constraints(&self) -> &[Constraint] {
        self.validator.constraints()
    }

    /// The slot calendar.
    pub fn calendar(&self) -> &SlotCalendar {
        self.validator.calendar()
    }

    /// The validator, including its cache.
    pub fn validator(&self) -> &ConstraintValidator {
        &self.validator
    }

    /// The consecutive-slot break desk, if that rule is active.
    pub fn break_desk(&self) -> Option<&str> {
        self.tracker.as_ref().map(BreakTracker::break_desk)
    }

    /// Staffs every slot of one day.
    ///
    /// `history` holds earlier assignments; it feeds break counting and
    /// the rest check against the previous day. The returned schedule
    /// holds this day's assignments and shortages and no violations.
    pub fn schedule_day(
        &self,
        date: NaiveDate,
        operators: &[OperatorAvailability],
        desks: &[DeskRequirement],
        history: &[Assignment],
    ) -> Schedule {
        let mut seen = history.to_vec();
        let mut day = Schedule::new();

        for slot in self.calendar().slot_ids() {
            let fit: Vec<&OperatorAvailability> = operators
                .iter()
                .filter(|op| op.can_work_slot(slot))
                .filter(|op| self.within_limits(op, &seen, date, slot))
                .collect();
            let flagged: BTreeSet<String> = match &self.tracker {
                Some(t) => t
                    .break_required(&seen, operators, date, slot)
                    .into_iter()
                    .filter(|name| fit.iter().any(|op| op.operator_name == *name))
                    .collect(),
                None => BTreeSet::new(),
            };
            let ctx = SlotContext::new(
                date,
                slot,
                fit.iter().copied(),
                desks,
                self.break_desk(),
                flagged,
            );
            let matched = self.matcher.match_slot(&ctx);
            let resolved = self.resolver.resolve(&ctx, matched);
            debug!(
                %date,
                %slot,
                required = ctx.total_quota(),
                assigned = resolved.assignments.len(),
                moves = resolved.moves.len(),
                "slot staffed"
            );
            seen.extend(resolved.assignments.iter().cloned());
            day.assignments.extend(resolved.assignments);
            day.shortages.extend(resolved.shortages);
        }
        day
    }

    /// Whether one more seat at `slot` keeps the operator within their
    /// daily hour cap and their rest after the previous day.
    fn within_limits(
        &self,
        op: &OperatorAvailability,
        worked: &[Assignment],
        date: NaiveDate,
        slot: SlotId,
    ) -> bool {
        let calendar = self.calendar();
        let name = op.operator_name.as_str();
        let today = worked_hours(worked, name, date, calendar);
        if today + calendar.duration_hours(slot) > op.max_work_hours_per_day + HOURS_EPSILON {
            debug!(operator = name, %date, %slot, hours = today, "daily hour cap reached");
            return false;
        }

        let Some(previous) = date.pred_opt() else {
            return true;
        };
        let last_end = worked
            .iter()
            .filter(|a| a.operator_name() == name && a.date() == previous && !a.is_break())
            .map(|a| calendar.end_hours(a.slot()))
            .fold(None, |latest: Option<f64>, end| Some(latest.map_or(end, |l| l.max(end))));
        match last_end {
            Some(end) => {
                let rest = rest_hours(end, calendar.start_hours(slot));
                let rested = rest + HOURS_EPSILON >= op.min_rest_hours_between_shifts;
                if !rested {
                    debug!(operator = name, %date, %slot, rest, "still resting");
                }
                rested
            }
            None => true,
        }
    }

    /// Staffs every requested day once, in chronological order, then
    /// validates the result.
    ///
    /// A day named twice in the request is staffed once. The validation
    /// cache is cleared before and after the run.
    pub fn schedule(&mut self, request: &ScheduleRequest) -> Schedule {
        self.validator.clear_cache();
        if let Err(errors) = validate_input(
            &request.operators,
            &request.desks,
            self.calendar(),
            self.break_desk(),
        ) {
            for e in &errors {
                warn!(kind = ?e.kind, "{}", e.message);
            }
        }

        let mut dates = BTreeSet::new();
        for &date in &request.dates {
            if !dates.insert(date) {
                warn!(%date, "day requested more than once, staffing it once");
            }
        }

        let mut schedule = Schedule::new();
        for date in dates {
            let day = self.schedule_day(
                date,
                &request.operators,
                &request.desks,
                &schedule.assignments,
            );
            info!(
                %date,
                assignments = day.assignments.len(),
                shortages = day.shortages.len(),
                "day scheduled"
            );
            schedule.assignments.extend(day.assignments);
            schedule.shortages.extend(day.shortages);
        }

        schedule.violations = self
            .validator
            .violation_reports(&schedule.assignments, &request.operators);
        for v in schedule.violations.iter().filter(|v| v.is_hard) {
            warn!(constraint = %v.constraint, "{}", v.description);
        }
        self.validator.clear_cache();
        schedule
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::rules;
    use crate::models::SlotId;
    use crate::validation::validate_assignments;
    use std::collections::HashMap;

    fn slot(h: u32) -> SlotId {
        SlotId::new(h).unwrap()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn hours(from: u32, to: u32) -> Vec<SlotId> {
        (from..to).map(slot).collect()
    }

    fn assert_quota_respected(schedule: &Schedule, desks: &[DeskRequirement]) {
        let mut counts: HashMap<(NaiveDate, SlotId, &str), u32> = HashMap::new();
        for a in &schedule.assignments {
            *counts.entry((a.date(), a.slot(), a.desk_name())).or_insert(0) += 1;
        }
        for ((_, s, desk), n) in counts {
            if let Some(d) = desks.iter().find(|d| d.desk_name == desk) {
                assert!(n <= d.requirement_for(s), "{desk} over quota at {s}");
            }
        }
    }

    #[test]
    fn test_minimal_matching() {
        let operators = vec![
            OperatorAvailability::new("Alice").with_hours(9, 12).with_desks(["A", "B"]),
            OperatorAvailability::new("Bob").with_hours(9, 12).with_desks(["A", "B"]),
        ];
        let desks = vec![
            DeskRequirement::new("A").with_requirements(hours(9, 12), 1),
            DeskRequirement::new("B").with_requirements(hours(9, 12), 1),
        ];
        let request = ScheduleRequest::new(operators, desks.clone()).with_date(date(1));
        let mut scheduler = ShiftScheduler::new(SlotCalendar::hourly(9, 12).unwrap());
        let schedule = scheduler.schedule(&request);

        assert_eq!(schedule.assignment_count(), 6);
        assert!(schedule.is_fully_staffed());
        assert!(validate_assignments(&schedule.assignments).is_ok());
        assert_quota_respected(&schedule, &desks);
    }

    #[test]
    fn test_forced_break() {
        let operators = vec![OperatorAvailability::new("Solo").with_hours(9, 18).with_desk("A")];
        let desks = vec![DeskRequirement::new("A").with_requirements(hours(9, 18), 1)];
        let constraints = vec![Constraint::required_break_after_consecutive_slots(3, "break")];
        let request = ScheduleRequest::new(operators.clone(), desks).with_date(date(1));
        let mut scheduler = ShiftScheduler::with_constraints(constraints, SlotCalendar::default());
        let schedule = scheduler.schedule(&request);

        let timetable = schedule.timetable(date(1));
        assert_eq!(timetable.desk_at("Solo", slot(11)), Some("A"));
        assert_eq!(timetable.desk_at("Solo", slot(12)), Some("break"));
        assert_eq!(timetable.desk_at("Solo", slot(13)), Some("A"));

        // Counter is back to zero right after the break.
        let tracker = BreakTracker::new(3, "break");
        assert_eq!(
            tracker.consecutive_count(&schedule.assignments, "Solo", date(1), slot(13)),
            0
        );
        assert!(schedule.is_acceptable());
        // A's seat at h12 stays empty.
        assert!(schedule
            .shortages
            .iter()
            .any(|s| s.slot == slot(12) && s.desk_name == "A"));
    }

    #[test]
    fn test_shortage_with_idle_operator() {
        let operators = vec![
            OperatorAvailability::new("Alice").with_hours(9, 10).with_desk("A"),
            OperatorAvailability::new("Bob").with_hours(9, 10).with_desk("B"),
            OperatorAvailability::new("Carol").with_hours(9, 10).with_desk("B"),
        ];
        let desks = vec![
            DeskRequirement::new("A").with_requirement(slot(9), 2),
            DeskRequirement::new("B").with_requirement(slot(9), 1),
        ];
        let request = ScheduleRequest::new(operators, desks.clone()).with_date(date(1));
        let mut scheduler = ShiftScheduler::new(SlotCalendar::hourly(9, 10).unwrap());
        let schedule = scheduler.schedule(&request);

        let table = schedule.occupancy(date(1), &["A".to_string(), "B".to_string()]);
        assert_eq!(table.operators_at("A", slot(9)), ["Alice"]);
        assert_eq!(table.count("B", slot(9)), 1);
        assert_eq!(schedule.shortages.len(), 1);
        assert_eq!(schedule.shortages[0].missing(), 1);
        assert_quota_respected(&schedule, &desks);
    }

    #[test]
    fn test_multi_day_run_is_consistent() {
        let operators: Vec<OperatorAvailability> = ["Ann", "Ben", "Cid", "Dot"]
            .iter()
            .map(|n| {
                OperatorAvailability::new(*n)
                    .with_hours(9, 18)
                    .with_desks(["A", "B"])
            })
            .collect();
        let desks = vec![
            DeskRequirement::new("A").with_requirements(hours(9, 18), 2),
            DeskRequirement::new("B").with_requirements(hours(9, 18), 1),
        ];
        let request = ScheduleRequest::new(operators.clone(), desks.clone()).with_days(date(1), 3);
        let mut scheduler = ShiftScheduler::new(SlotCalendar::default());
        let schedule = scheduler.schedule(&request);

        assert!(validate_assignments(&schedule.assignments).is_ok());
        assert_quota_respected(&schedule, &desks);
        assert!(rules::required_break_after_consecutive_slots(
            &schedule.assignments,
            &operators,
            5
        ));
        assert!(scheduler.validator().cache().is_empty());
        let days: std::collections::BTreeSet<NaiveDate> =
            schedule.assignments.iter().map(Assignment::date).collect();
        assert_eq!(days.len(), 3);
    }

    #[test]
    fn test_violations_reported() {
        let operators = vec![OperatorAvailability::new("Solo").with_hours(9, 18).with_desk("A")];
        let desks = vec![DeskRequirement::new("A").with_requirements(hours(9, 18), 1)];
        let constraints = vec![
            Constraint::max_weekly_hours(10.0).soft(0.5),
            Constraint::max_consecutive_days(1),
        ];
        let request = ScheduleRequest::new(operators, desks).with_days(date(1), 2);
        let mut scheduler = ShiftScheduler::with_constraints(constraints, SlotCalendar::default());
        let schedule = scheduler.schedule(&request);

        // Default cap of 8 hours a day leaves h17 open
        assert_eq!(schedule.assignment_count(), 16);
        assert!(scheduler.break_desk().is_none());
        assert_eq!(schedule.violations.len(), 2);
        assert!(!schedule.is_acceptable());
        assert!((schedule.violation_score() - 1.5).abs() < 1e-10);
    }

    #[test]
    fn test_repeated_date_staffed_once() {
        let operators = vec![OperatorAvailability::new("Solo").with_hours(9, 12).with_desk("A")];
        let desks = vec![DeskRequirement::new("A").with_requirements(hours(9, 12), 1)];
        let request = ScheduleRequest::new(operators, desks)
            .with_date(date(2))
            .with_date(date(1))
            .with_date(date(2));
        let mut scheduler = ShiftScheduler::new(SlotCalendar::hourly(9, 12).unwrap());
        let schedule = scheduler.schedule(&request);

        assert_eq!(schedule.assignment_count(), 6);
        assert!(validate_assignments(&schedule.assignments).is_ok());
        assert_eq!(schedule.assignments[0].date(), date(1));
        assert_eq!(schedule.assignments[5].date(), date(2));
    }

    #[test]
    fn test_daily_hour_cap() {
        let operators = vec![OperatorAvailability::new("Solo")
            .with_hours(9, 18)
            .with_desk("A")
            .with_max_work_hours(2.0)];
        let desks = vec![DeskRequirement::new("A").with_requirements(hours(9, 18), 1)];
        let constraints = vec![Constraint::max_weekly_hours(100.0)];
        let request = ScheduleRequest::new(operators, desks).with_date(date(1));
        let mut scheduler = ShiftScheduler::with_constraints(constraints, SlotCalendar::default());
        let schedule = scheduler.schedule(&request);

        assert_eq!(schedule.assignment_count(), 2);
        assert!((schedule.work_hours("Solo", date(1), scheduler.calendar()) - 2.0).abs() < 1e-10);
        assert_eq!(schedule.total_missing(), 7);
    }

    #[test]
    fn test_rest_after_previous_day() {
        let operators = vec![OperatorAvailability::new("Solo")
            .with_hours(9, 18)
            .with_desk("A")
            .with_max_work_hours(24.0)
            .with_min_rest_hours(20.0)];
        let desks = vec![DeskRequirement::new("A").with_requirements(hours(9, 18), 1)];
        let constraints = vec![Constraint::max_weekly_hours(100.0)];
        let request = ScheduleRequest::new(operators, desks).with_days(date(1), 2);
        let mut scheduler = ShiftScheduler::with_constraints(constraints, SlotCalendar::default());
        let schedule = scheduler.schedule(&request);

        // Day 1 ends at 18:00; 20 hours later is 14:00
        let day2 = schedule.timetable(date(2));
        assert_eq!(day2.desk_at("Solo", slot(13)), None);
        assert_eq!(day2.desk_at("Solo", slot(14)), Some("A"));
        assert_eq!(schedule.for_operator("Solo").len(), 9 + 4);
    }

    #[test]
    fn test_request_days() {
        let r = ScheduleRequest::default().with_days(date(30), 3);
        assert_eq!(r.dates.len(), 3);
        assert_eq!(r.dates[2], NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }
}
