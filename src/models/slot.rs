//! Time slot identity and definition.
//!
//! A slot is identified by the hour of day it starts in. The label
//! (`h09`, `h17`, ...) is derived from the hour, never parsed back
//! for business logic.

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ModelError;

/// Hour-of-day slot identifier (0..=23).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct SlotId(u8);

impl SlotId {
    /// Creates a slot id for the given hour.
    pub fn new(hour: u32) -> Result<Self, ModelError> {
        if hour > 23 {
            return Err(ModelError::InvalidSlotHour(hour));
        }
        Ok(Self(hour as u8))
    }

    /// Parses a `hNN` label.
    pub fn parse(label: &str) -> Result<Self, ModelError> {
        let malformed = || ModelError::MalformedSlotLabel(label.to_string());
        let digits = label.strip_prefix('h').ok_or_else(malformed)?;
        if digits.is_empty() || digits.len() > 2 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(malformed());
        }
        let hour: u32 = digits.parse().map_err(|_| malformed())?;
        Self::new(hour)
    }

    /// Starting hour of the slot.
    #[inline]
    pub fn hour(&self) -> u32 {
        u32::from(self.0)
    }

    /// Display label (`h09`).
    pub fn label(&self) -> String {
        format!("h{:02}", self.0)
    }

    /// Whether the slot falls in night hours (22:00-06:59).
    #[inline]
    pub fn is_night_hour(&self) -> bool {
        self.0 >= 22 || self.0 <= 6
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "h{:02}", self.0)
    }
}

impl TryFrom<u32> for SlotId {
    type Error = ModelError;

    fn try_from(hour: u32) -> Result<Self, Self::Error> {
        Self::new(hour)
    }
}

impl From<SlotId> for u32 {
    fn from(slot: SlotId) -> Self {
        slot.hour()
    }
}

/// Slot classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotKind {
    /// Regular daytime slot.
    #[default]
    Day,
    /// Designated night slot, regardless of its hour.
    Night,
}

/// A fixed interval of the working day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TimeSlotRecord")]
pub struct TimeSlot {
    /// Slot identifier.
    pub id: SlotId,
    /// Classification tag.
    pub kind: SlotKind,
    /// Start time.
    pub start_time: NaiveTime,
    /// End time. May be earlier than `start_time` for slots crossing midnight.
    pub end_time: NaiveTime,
    /// Length in hours (always > 0).
    pub duration_hours: f64,
}

impl TimeSlot {
    /// Creates a slot, rejecting non-positive durations.
    pub fn new(
        id: SlotId,
        start_time: NaiveTime,
        end_time: NaiveTime,
        duration_hours: f64,
    ) -> Result<Self, ModelError> {
        if duration_hours.is_nan() || duration_hours <= 0.0 {
            return Err(ModelError::NonPositiveDuration {
                slot: id.label(),
                hours: duration_hours,
            });
        }
        Ok(Self {
            id,
            kind: SlotKind::Day,
            start_time,
            end_time,
            duration_hours,
        })
    }

    /// One-hour slot starting at `hour`.
    pub fn hourly(hour: u32) -> Result<Self, ModelError> {
        let id = SlotId::new(hour)?;
        let start = NaiveTime::from_hms_opt(hour, 0, 0).ok_or(ModelError::InvalidSlotHour(hour))?;
        let end = NaiveTime::from_hms_opt((hour + 1) % 24, 0, 0)
            .ok_or(ModelError::InvalidSlotHour(hour))?;
        Self::new(id, start, end, 1.0)
    }

    /// Sets the slot kind.
    pub fn with_kind(mut self, kind: SlotKind) -> Self {
        self.kind = kind;
        self
    }

    /// Start as fractional hours since midnight.
    pub fn start_hours(&self) -> f64 {
        fractional_hours(self.start_time)
    }

    /// End as fractional hours since the start day's midnight.
    ///
    /// Exceeds 24.0 for slots crossing midnight.
    pub fn end_hours(&self) -> f64 {
        self.start_hours() + self.duration_hours
    }

    /// Whether this slot counts as a night shift.
    pub fn is_night(&self) -> bool {
        self.kind == SlotKind::Night || self.id.is_night_hour()
    }

    /// Whether two slots overlap within the same day.
    pub fn overlaps(&self, other: &Self) -> bool {
        !(self.end_time <= other.start_time || other.end_time <= self.start_time)
    }
}

/// Unchecked wire form, validated on deserialization.
#[derive(Deserialize)]
struct TimeSlotRecord {
    id: SlotId,
    #[serde(default)]
    kind: SlotKind,
    start_time: NaiveTime,
    end_time: NaiveTime,
    duration_hours: f64,
}

impl TryFrom<TimeSlotRecord> for TimeSlot {
    type Error = ModelError;

    fn try_from(r: TimeSlotRecord) -> Result<Self, Self::Error> {
        Ok(Self::new(r.id, r.start_time, r.end_time, r.duration_hours)?.with_kind(r.kind))
    }
}

fn fractional_hours(t: NaiveTime) -> f64 {
    f64::from(t.hour()) + f64::from(t.minute()) / 60.0 + f64::from(t.second()) / 3600.0
}
