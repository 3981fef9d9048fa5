//! Slot-by-slot desk staffing.
//!
//! Assigns operators to desks across the fixed slots of a working day,
//! meeting per-desk headcounts where possible and respecting labor rules
//! (rest time, consecutive days, weekly hours, night work, breaks).
//!
//! # Modules
//!
//! - **`models`**: Domain types (`SlotId`, `TimeSlot`, `SlotCalendar`,
//!   `OperatorAvailability`, `DeskRequirement`, `Assignment`, `Schedule`)
//! - **`constraints`**: Labor rules, the cached validator, the text
//!   parser and TOML settings
//! - **`matching`**: Break tracking, deferred acceptance, shortage repair
//! - **`scheduler`**: Multi-day orchestration and KPIs
//! - **`validation`**: Input integrity checks (duplicate names, unknown
//!   desks, slots outside the calendar)
//!
//! # Logging
//!
//! The crate emits `tracing` events and never installs a subscriber.
//!
//! # References
//!
//! - Gale & Shapley (1962), "College Admissions and the Stability of Marriage"
//! - Ernst et al. (2004), "Staff scheduling and rostering: A review of
//!   applications, methods and models"

pub mod constraints;
pub mod error;
pub mod matching;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use constraints::{default_constraints, Constraint, ConstraintValidator, Rule};
pub use error::{ConfigError, ModelError};
pub use scheduler::{ScheduleKpi, ScheduleRequest, ShiftScheduler};
