//! Per-rule evaluation.
//!
//! Every check works on one operator's assignments at a time, sorted by
//! (date, slot). Operators missing from the roster are not checked.
//! A seat is a break exactly when it is typed [`AssignmentType::Break`](crate::models::AssignmentType::Break)
//! (see [`Assignment::is_break`]). Breaks never count as worked hours
//! or night work, and they are what resets the consecutive-slot count.
//! The break desk's name only says where new break seats go.
//!
//! # Reference
//! - EU Working Time Directive 2003/88/EC (daily rest, weekly limits,
//!   night work)
//! - Burke et al. (2004), "The State of the Art of Nurse Rostering",
//!   J. Scheduling 7(6), §3 (coverage and work regulation constraints)

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::models::{Assignment, OperatorAvailability, SlotCalendar, SlotId};

/// A suggested break produced by the long-shift rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakProposal {
    /// Operator who needs the break.
    pub operator_name: String,
    /// Day of the break.
    pub date: NaiveDate,
    /// Hour the break should start, inside the operating window.
    pub hour: u32,
    /// Human-readable reason.
    pub reason: String,
}

/// Assignments of each rostered operator, chronologically sorted.
pub(crate) fn by_operator<'a>(
    assignments: &'a [Assignment],
    operators: &'a [OperatorAvailability],
) -> Vec<(&'a str, Vec<&'a Assignment>)> {
    let mut grouped: HashMap<&str, Vec<&Assignment>> = HashMap::new();
    for a in assignments {
        grouped.entry(a.operator_name()).or_default().push(a);
    }
    operators
        .iter()
        .filter_map(|op| {
            let mut list = grouped.remove(op.operator_name.as_str())?;
            list.sort_by_key(|a| a.when());
            Some((op.operator_name.as_str(), list))
        })
        .collect()
}

#[inline]
fn is_work(a: &Assignment) -> bool {
    !a.is_break()
}

/// Monday of the week containing `date`.
#[inline]
pub(crate) fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Rest between two shifts on consecutive days must reach `min_hours`.
pub(crate) fn min_rest_hours(
    assignments: &[Assignment],
    operators: &[OperatorAvailability],
    calendar: &SlotCalendar,
    min_hours: f64,
) -> bool {
    for (_, list) in by_operator(assignments, operators) {
        let work: Vec<&Assignment> = list.into_iter().filter(|a| is_work(a)).collect();
        for pair in work.windows(2) {
            let (cur, next) = (pair[0], pair[1]);
            if next.date() - cur.date() != Duration::days(1) {
                continue;
            }
            let rest = rest_hours(calendar.end_hours(cur.slot()), calendar.start_hours(next.slot()));
            if rest < min_hours {
                return false;
            }
        }
    }
    true
}

/// Hours from `end` on one day to `start` on the next.
#[inline]
pub(crate) fn rest_hours(end: f64, start: f64) -> f64 {
    24.0 - end + start
}

/// Longest run of calendar-consecutive working dates.
pub(crate) fn longest_date_run(dates: &BTreeSet<NaiveDate>) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;
    for &d in dates {
        run = match prev {
            Some(p) if d - p == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        prev = Some(d);
    }
    longest
}

/// No operator works more than `max_days` calendar-consecutive days.
pub(crate) fn max_consecutive_days(
    assignments: &[Assignment],
    operators: &[OperatorAvailability],
    max_days: u32,
) -> bool {
    by_operator(assignments, operators).into_iter().all(|(_, list)| {
        let dates: BTreeSet<NaiveDate> =
            list.iter().filter(|a| is_work(a)).map(|a| a.date()).collect();
        longest_date_run(&dates) <= max_days
    })
}

/// Worked hours per Monday-based week stay within `max_hours`.
pub(crate) fn max_weekly_hours(
    assignments: &[Assignment],
    operators: &[OperatorAvailability],
    calendar: &SlotCalendar,
    max_hours: f64,
) -> bool {
    by_operator(assignments, operators).into_iter().all(|(_, list)| {
        let mut weekly: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for a in list.into_iter().filter(|a| is_work(a)) {
            *weekly.entry(week_start(a.date())).or_insert(0.0) += calendar.duration_hours(a.slot());
        }
        weekly.values().all(|&h| h <= max_hours)
    })
}

/// Nights worked per Monday-based week stay within `max_shifts`.
///
/// A night is a date with at least one night slot.
pub(crate) fn max_night_shifts_per_week(
    assignments: &[Assignment],
    operators: &[OperatorAvailability],
    calendar: &SlotCalendar,
    max_shifts: u32,
) -> bool {
    by_operator(assignments, operators).into_iter().all(|(_, list)| {
        let nights: BTreeSet<NaiveDate> = list
            .iter()
            .filter(|a| is_work(a) && calendar.is_night(a.slot()))
            .map(|a| a.date())
            .collect();
        let mut weekly: BTreeMap<NaiveDate, u32> = BTreeMap::new();
        for d in nights {
            *weekly.entry(week_start(d)).or_insert(0) += 1;
        }
        weekly.values().all(|&n| n <= max_shifts)
    })
}

/// No work on the day after a night slot.
pub(crate) fn required_day_off_after_night(
    assignments: &[Assignment],
    operators: &[OperatorAvailability],
    calendar: &SlotCalendar,
) -> bool {
    by_operator(assignments, operators).into_iter().all(|(_, list)| {
        let work_dates: HashSet<NaiveDate> =
            list.iter().filter(|a| is_work(a)).map(|a| a.date()).collect();
        list.iter()
            .filter(|a| is_work(a) && calendar.is_night(a.slot()))
            .all(|a| !work_dates.contains(&(a.date() + Duration::days(1))))
    })
}

/// Gap in hours between the end of `cur` and the start of `next`.
fn gap_hours(calendar: &SlotCalendar, cur: SlotId, next: SlotId) -> f64 {
    let cur_end = calendar.end_hours(cur);
    let next_start = calendar.start_hours(next);
    if cur_end <= next_start {
        next_start - cur_end
    } else {
        (24.0 - cur_end) + next_start
    }
}

/// Long slots followed by a same-day shift with too short a gap.
///
/// Yields `(operator, long shift, following shift)` triples.
fn long_shift_breaches<'a>(
    assignments: &'a [Assignment],
    operators: &'a [OperatorAvailability],
    calendar: &'a SlotCalendar,
    threshold_hours: f64,
    break_hours: f64,
) -> Vec<(&'a str, &'a Assignment, &'a Assignment)> {
    let mut out = Vec::new();
    for (name, list) in by_operator(assignments, operators) {
        let work: Vec<&Assignment> = list.into_iter().filter(|a| is_work(a)).collect();
        for pair in work.windows(2) {
            let (cur, next) = (pair[0], pair[1]);
            if cur.date() != next.date() || calendar.duration_hours(cur.slot()) < threshold_hours {
                continue;
            }
            if gap_hours(calendar, cur.slot(), next.slot()) < break_hours {
                out.push((name, cur, next));
            }
        }
    }
    out
}

/// A long slot must be followed by at least `break_hours` of rest.
pub(crate) fn required_break_after_long_shift(
    assignments: &[Assignment],
    operators: &[OperatorAvailability],
    calendar: &SlotCalendar,
    threshold_hours: f64,
    break_hours: f64,
) -> bool {
    long_shift_breaches(assignments, operators, calendar, threshold_hours, break_hours).is_empty()
}

/// Break placements for every long-shift breach.
///
/// The break goes to the middle of the span from the long shift's start
/// to the following shift's end, clamped to the calendar's slot hours.
pub(crate) fn long_shift_break_proposals(
    assignments: &[Assignment],
    operators: &[OperatorAvailability],
    calendar: &SlotCalendar,
    threshold_hours: f64,
    break_hours: f64,
) -> Vec<BreakProposal> {
    let lo = calendar.opening_hour();
    let hi = calendar.last_slot_hour().max(lo);
    long_shift_breaches(assignments, operators, calendar, threshold_hours, break_hours)
        .into_iter()
        .map(|(name, cur, next)| {
            let work_start = calendar.start_hours(cur.slot());
            let work_end = calendar.end_hours(next.slot());
            let mid = (work_start + ((work_end - work_start) / 2.0).floor()).floor() as u32;
            BreakProposal {
                operator_name: name.to_string(),
                date: cur.date(),
                hour: mid.clamp(lo, hi),
                reason: format!(
                    "{:.1}h shift at {} needs a {:.1}h break",
                    calendar.duration_hours(cur.slot()),
                    cur.slot(),
                    break_hours
                ),
            }
        })
        .collect()
}

/// After `max_slots` worked slots in a row the next assignment must be
/// a break.
///
/// A break resets the counter. Reaching the limit also resets
/// it, so a single missing break is reported once.
pub(crate) fn required_break_after_consecutive_slots(
    assignments: &[Assignment],
    operators: &[OperatorAvailability],
    max_slots: u32,
) -> bool {
    for (_, list) in by_operator(assignments, operators) {
        let mut count = 0u32;
        for (i, a) in list.iter().enumerate() {
            if a.is_break() {
                count = 0;
                continue;
            }
            count += 1;
            if count >= max_slots {
                if let Some(next) = list.get(i + 1) {
                    if !next.is_break() {
                        return false;
                    }
                }
                count = 0;
            }
        }
    }
    true
}

/// Break-desk seats that bring an operator sequence into compliance.
///
/// Each break lands in the calendar slot right after the limit is
/// reached. When the limit falls on the day's last slot, the operator's
/// next assignment is turned into a break instead. Applying the result
/// with [`apply_breaks`] always satisfies
/// [`required_break_after_consecutive_slots`].
pub(crate) fn required_break_assignments(
    assignments: &[Assignment],
    operators: &[OperatorAvailability],
    calendar: &SlotCalendar,
    max_slots: u32,
    break_desk: &str,
) -> Vec<Assignment> {
    let mut breaks = Vec::new();
    for (name, list) in by_operator(assignments, operators) {
        // Seats already forced onto the break desk by an earlier proposal.
        let mut forced: HashSet<(NaiveDate, SlotId)> = HashSet::new();
        let mut count = 0u32;
        for (i, a) in list.iter().enumerate() {
            if a.is_break() || forced.contains(&a.when()) {
                count = 0;
                continue;
            }
            count += 1;
            if count < max_slots {
                continue;
            }
            count = 0;
            let following = list.get(i + 1).map(|n| n.when());
            let target = match (calendar.next_after(a.slot()), following) {
                (Some(slot), Some(n)) => Some((a.date(), slot).min(n)),
                (Some(slot), None) => Some((a.date(), slot)),
                (None, n) => n,
            };
            let Some((date, slot)) = target else {
                continue;
            };
            let occupant = list.iter().find(|n| n.when() == (date, slot));
            if occupant.is_some_and(|n| n.is_break()) {
                continue;
            }
            if let Ok(seat) = Assignment::break_seat(name, break_desk, slot, date) {
                forced.insert((date, slot));
                breaks.push(seat);
            }
        }
    }
    breaks
}

/// Merges break seats into an assignment list.
///
/// A break replaces any seat the operator already holds in that slot.
pub fn apply_breaks(assignments: &[Assignment], breaks: &[Assignment]) -> Vec<Assignment> {
    let replaced: HashSet<(&str, SlotId, NaiveDate)> = breaks.iter().map(Assignment::key).collect();
    let mut merged: Vec<Assignment> = assignments
        .iter()
        .filter(|a| !replaced.contains(&a.key()))
        .cloned()
        .collect();
    merged.extend(breaks.iter().cloned());
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssignmentType;

    fn date(d: u32) -> NaiveDate {
        // 2024-01-01 is a Monday
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn slot(h: u32) -> SlotId {
        SlotId::new(h).unwrap()
    }

    fn work(op: &str, h: u32, d: u32) -> Assignment {
        Assignment::new(op, "Desk A", slot(h), date(d)).unwrap()
    }

    fn rest(op: &str, h: u32, d: u32) -> Assignment {
        Assignment::break_seat(op, "break", slot(h), date(d)).unwrap()
    }

    fn roster(names: &[&str]) -> Vec<OperatorAvailability> {
        names.iter().map(|n| OperatorAvailability::new(*n)).collect()
    }

    fn full_day_calendar() -> SlotCalendar {
        SlotCalendar::hourly(0, 24).unwrap()
    }

    #[test]
    fn test_week_start_is_monday() {
        assert_eq!(week_start(date(1)), date(1));
        assert_eq!(week_start(date(7)), date(1));
        assert_eq!(week_start(date(8)), date(8));
    }

    #[test]
    fn test_min_rest_hours() {
        let cal = full_day_calendar();
        let ops = roster(&["A"]);
        // h21 ends at 22, next day h06 starts: 8 hours rest
        let short = vec![work("A", 21, 1), work("A", 6, 2)];
        assert!(!min_rest_hours(&short, &ops, &cal, 11.0));
        // h17 ends at 18, next day h09: 15 hours
        let ok = vec![work("A", 17, 1), work("A", 9, 2)];
        assert!(min_rest_hours(&ok, &ops, &cal, 11.0));
        // Same hour next day is a full 24 hours
        let day_apart = vec![work("A", 8, 1), work("A", 9, 2)];
        assert!(min_rest_hours(&day_apart, &ops, &cal, 23.0));
        // Non-adjacent dates are not checked
        let gap = vec![work("A", 23, 1), work("A", 0, 3)];
        assert!(min_rest_hours(&gap, &ops, &cal, 11.0));
    }

    #[test]
    fn test_max_consecutive_days_counts_dates_once() {
        let ops = roster(&["A"]);
        let mut a = Vec::new();
        for d in 1..=4 {
            a.push(work("A", 9, d));
            a.push(work("A", 10, d));
        }
        assert!(max_consecutive_days(&a, &ops, 4));
        assert!(!max_consecutive_days(&a, &ops, 3));
    }

    #[test]
    fn test_longest_date_run_with_gap() {
        let dates: BTreeSet<NaiveDate> = [1, 2, 4, 5, 6].into_iter().map(date).collect();
        assert_eq!(longest_date_run(&dates), 3);
        assert_eq!(longest_date_run(&BTreeSet::new()), 0);
    }

    #[test]
    fn test_max_weekly_hours_by_week() {
        let cal = SlotCalendar::default();
        let ops = roster(&["A"]);
        // 9 hours on Sunday (week 1) and 9 on Monday (week 2)
        let mut a: Vec<Assignment> = (9..18).map(|h| work("A", h, 7)).collect();
        a.extend((9..18).map(|h| work("A", h, 8)));
        assert!(max_weekly_hours(&a, &ops, &cal, 9.0));
        assert!(!max_weekly_hours(&a, &ops, &cal, 8.0));
    }

    #[test]
    fn test_breaks_do_not_count_as_hours() {
        let cal = SlotCalendar::default();
        let ops = roster(&["A"]);
        let a = vec![work("A", 9, 1), rest("A", 10, 1), work("A", 11, 1)];
        assert!(max_weekly_hours(&a, &ops, &cal, 2.0));
    }

    #[test]
    fn test_night_shifts_per_week() {
        let cal = full_day_calendar();
        let ops = roster(&["A"]);
        let a = vec![
            work("A", 22, 1),
            work("A", 23, 1),
            work("A", 22, 3),
            work("A", 22, 5),
        ];
        assert!(max_night_shifts_per_week(&a, &ops, &cal, 3));
        assert!(!max_night_shifts_per_week(&a, &ops, &cal, 2));
    }

    #[test]
    fn test_day_off_after_night() {
        let cal = full_day_calendar();
        let ops = roster(&["A"]);
        assert!(!required_day_off_after_night(
            &[work("A", 22, 1), work("A", 14, 2)],
            &ops,
            &cal
        ));
        assert!(required_day_off_after_night(
            &[work("A", 22, 1), work("A", 14, 3)],
            &ops,
            &cal
        ));
    }

    #[test]
    fn test_unrostered_operator_ignored() {
        let cal = full_day_calendar();
        let a = vec![work("Ghost", 22, 1), work("Ghost", 14, 2)];
        assert!(required_day_off_after_night(&a, &roster(&["A"]), &cal));
    }

    fn long_slot_calendar() -> SlotCalendar {
        use crate::models::TimeSlot;
        use chrono::NaiveTime;
        let t = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
        SlotCalendar::new(vec![
            TimeSlot::new(slot(9), t(9), t(15), 6.0).unwrap(),
            TimeSlot::hourly(15).unwrap(),
            TimeSlot::hourly(16).unwrap(),
            TimeSlot::hourly(17).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_break_after_long_shift() {
        let cal = long_slot_calendar();
        let ops = roster(&["A"]);
        let tight = vec![work("A", 9, 1), work("A", 15, 1)];
        assert!(!required_break_after_long_shift(&tight, &ops, &cal, 5.0, 1.0));
        let spaced = vec![work("A", 9, 1), work("A", 16, 1)];
        assert!(required_break_after_long_shift(&spaced, &ops, &cal, 5.0, 1.0));
        let short_only = vec![work("A", 15, 1), work("A", 16, 1)];
        assert!(required_break_after_long_shift(&short_only, &ops, &cal, 5.0, 1.0));
    }

    #[test]
    fn test_long_shift_proposal_is_clamped() {
        let cal = long_slot_calendar();
        let ops = roster(&["A"]);
        let tight = vec![work("A", 9, 1), work("A", 15, 1)];
        let proposals = long_shift_break_proposals(&tight, &ops, &cal, 5.0, 1.0);
        assert_eq!(proposals.len(), 1);
        // span 9..16, midpoint 12
        assert_eq!(proposals[0].hour, 12);
        assert_eq!(proposals[0].operator_name, "A");
        assert!(proposals[0].hour >= cal.opening_hour());
        assert!(proposals[0].hour <= cal.last_slot_hour());
    }

    #[test]
    fn test_consecutive_slots_reset_on_break() {
        let ops = roster(&["A"]);
        let mut a: Vec<Assignment> = (9..12).map(|h| work("A", h, 1)).collect();
        a.push(rest("A", 12, 1));
        a.extend((13..16).map(|h| work("A", h, 1)));
        assert!(required_break_after_consecutive_slots(&a, &ops, 3));
    }

    #[test]
    fn test_break_is_decided_by_seat_type() {
        let cal = SlotCalendar::default();
        let ops = roster(&["A"]);
        let untyped = Assignment::new("A", "break", slot(10), date(1)).unwrap();
        let a = vec![work("A", 9, 1), untyped, work("A", 11, 1)];
        // Worked time for every rule alike
        assert!(!required_break_after_consecutive_slots(&a, &ops, 2));
        assert!(!max_weekly_hours(&a, &ops, &cal, 2.0));

        let b = vec![work("A", 9, 1), rest("A", 10, 1), work("A", 11, 1)];
        assert!(required_break_after_consecutive_slots(&b, &ops, 1));
        assert!(max_weekly_hours(&b, &ops, &cal, 2.0));
    }

    #[test]
    fn test_consecutive_slots_violation() {
        let ops = roster(&["A"]);
        let a: Vec<Assignment> = (9..13).map(|h| work("A", h, 1)).collect();
        assert!(!required_break_after_consecutive_slots(&a, &ops, 3));
        // Exactly the limit with nothing after is fine
        let a: Vec<Assignment> = (9..12).map(|h| work("A", h, 1)).collect();
        assert!(required_break_after_consecutive_slots(&a, &ops, 3));
    }

    #[test]
    fn test_required_breaks_round_trip() {
        let cal = SlotCalendar::default();
        let ops = roster(&["A", "B"]);
        let mut a: Vec<Assignment> = (9..18).map(|h| work("A", h, 1)).collect();
        a.extend((9..18).map(|h| work("A", h, 2)));
        a.extend((9..14).map(|h| work("B", h, 1)));
        assert!(!required_break_after_consecutive_slots(&a, &ops, 3));

        let breaks = required_break_assignments(&a, &ops, &cal, 3, "break");
        assert!(!breaks.is_empty());
        assert!(breaks
            .iter()
            .all(|b| b.assignment_type() == AssignmentType::Break));

        let merged = apply_breaks(&a, &breaks);
        assert!(required_break_after_consecutive_slots(&merged, &ops, 3));
        // Replacement, not duplication
        let keys: HashSet<_> = merged.iter().map(Assignment::key).collect();
        assert_eq!(keys.len(), merged.len());
    }

    #[test]
    fn test_required_break_at_day_end_replaces_next_seat() {
        let cal = SlotCalendar::default();
        let ops = roster(&["A"]);
        // Limit reached at h17, the last slot; next seat is day 2 h09
        let mut a: Vec<Assignment> = (15..18).map(|h| work("A", h, 1)).collect();
        a.push(work("A", 9, 2));
        let breaks = required_break_assignments(&a, &ops, &cal, 3, "break");
        assert_eq!(breaks.len(), 1);
        assert_eq!(breaks[0].when(), (date(2), slot(9)));
        let merged = apply_breaks(&a, &breaks);
        assert_eq!(merged.len(), 4);
        assert!(required_break_after_consecutive_slots(&merged, &ops, 3));
    }

    #[test]
    fn test_compliant_sequence_needs_no_breaks() {
        let cal = SlotCalendar::default();
        let ops = roster(&["A"]);
        let a = vec![work("A", 9, 1), work("A", 10, 1), rest("A", 11, 1), work("A", 12, 1)];
        assert!(required_break_assignments(&a, &ops, &cal, 2, "break").is_empty());
    }
}
