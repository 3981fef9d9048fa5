//! Shift scheduling and KPI evaluation.
//!
//! # Algorithm
//!
//! `ShiftScheduler` staffs each day slot by slot: break flagging,
//! deferred acceptance, then shortage repair. It is greedy and
//! deterministic. Demand that cannot be met is reported, not forced.
//!
//! # KPI
//!
//! `ScheduleKpi` computes coverage (fill rate, shortage by desk) and
//! workload (hours by operator, breaks, violations).
//!
//! # References
//!
//! - Roth & Sotomayor (1990), "Two-Sided Matching"
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of
//!   applications, methods and models"

mod kpi;
mod shift;

pub use kpi::ScheduleKpi;
pub use shift::{ScheduleRequest, ShiftScheduler};
