//! Desk-staffing domain models.
//!
//! Provides the shared vocabulary of a staffing run: time slots and the
//! daily calendar, operator availability, desk headcount requirements,
//! assignments, and the finished schedule.
//!
//! # Domain Mappings
//!
//! | desk-roster | Contact center | Retail | Hospital |
//! |-------------|----------------|--------|----------|
//! | Operator | Agent | Clerk | Nurse |
//! | Desk | Queue/Skill | Counter | Ward station |
//! | Slot | Interval | Hour | Shift block |
//! | Break desk | Aux/Break state | Break room | Rest period |

mod assignment;
mod calendar;
mod desk;
mod operator;
mod schedule;
mod slot;

pub use assignment::{Assignment, AssignmentType};
pub use calendar::{SlotCalendar, DEFAULT_CLOSING_HOUR, DEFAULT_OPENING_HOUR};
pub use desk::{DeskRequirement, DEFAULT_BREAK_DESK};
pub use operator::{OperatorAvailability, DEFAULT_MAX_WORK_HOURS_PER_DAY, DEFAULT_MIN_REST_HOURS};
pub use schedule::{OccupancyTable, OperatorTimetable, Schedule, Shortage, Violation};
pub use slot::{SlotId, SlotKind, TimeSlot};

pub(crate) use schedule::{headcounts, worked_hours};
