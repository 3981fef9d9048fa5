//! Daily slot calendar.
//!
//! Defines the ordered slots of a working day. Every simulated day uses
//! the same calendar; slots are matched strictly in calendar order.
//!
//! # Default
//! One-hour slots from 09:00 to 18:00 (`h09`..=`h17`, 9 slots).

use serde::{Deserialize, Serialize};

use super::{SlotId, TimeSlot};
use crate::error::ModelError;

/// Default opening hour.
pub const DEFAULT_OPENING_HOUR: u32 = 9;
/// Default closing hour (exclusive).
pub const DEFAULT_CLOSING_HOUR: u32 = 18;

/// Ordered slots of one working day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SlotCalendarRecord")]
pub struct SlotCalendar {
    slots: Vec<TimeSlot>,
}

impl SlotCalendar {
    /// Builds a calendar from slots, sorting them by start hour.
    ///
    /// Rejects duplicate slot ids.
    pub fn new(mut slots: Vec<TimeSlot>) -> Result<Self, ModelError> {
        slots.sort_by_key(|s| s.id);
        for pair in slots.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(ModelError::DuplicateSlot(pair[0].id.label()));
            }
        }
        Ok(Self { slots })
    }

    /// One-hour slots covering `[opening_hour, closing_hour)`.
    pub fn hourly(opening_hour: u32, closing_hour: u32) -> Result<Self, ModelError> {
        let slots = (opening_hour..closing_hour)
            .map(TimeSlot::hourly)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(slots)
    }

    /// All slots in chronological order.
    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    /// Slot ids in chronological order.
    pub fn slot_ids(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.slots.iter().map(|s| s.id)
    }

    /// Number of slots per day.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the calendar has no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Looks up a slot definition.
    pub fn get(&self, id: SlotId) -> Option<&TimeSlot> {
        self.slots.iter().find(|s| s.id == id)
    }

    /// Whether the calendar defines this slot.
    pub fn contains(&self, id: SlotId) -> bool {
        self.get(id).is_some()
    }

    /// First slot of the day.
    pub fn first(&self) -> Option<SlotId> {
        self.slots.first().map(|s| s.id)
    }

    /// The slot immediately after `id` on the same day.
    pub fn next_after(&self, id: SlotId) -> Option<SlotId> {
        self.slots.iter().map(|s| s.id).find(|&s| s > id)
    }

    /// Hour the first slot starts.
    pub fn opening_hour(&self) -> u32 {
        self.first().map(|s| s.hour()).unwrap_or(DEFAULT_OPENING_HOUR)
    }

    /// Hour the last slot starts.
    ///
    /// This is the latest hour a break can be placed at.
    pub fn last_slot_hour(&self) -> u32 {
        self.slots
            .last()
            .map(|s| s.id.hour())
            .unwrap_or(DEFAULT_CLOSING_HOUR - 1)
    }

    /// Hour the last slot ends, rounded up.
    pub fn closing_hour(&self) -> u32 {
        self.slots
            .last()
            .map(|s| s.end_hours().ceil() as u32)
            .unwrap_or(DEFAULT_CLOSING_HOUR)
    }

    /// Slot length in hours. Unknown slots count as one hour.
    pub fn duration_hours(&self, id: SlotId) -> f64 {
        self.get(id).map(|s| s.duration_hours).unwrap_or(1.0)
    }

    /// Slot start in hours since midnight.
    pub fn start_hours(&self, id: SlotId) -> f64 {
        self.get(id)
            .map(|s| s.start_hours())
            .unwrap_or(f64::from(id.hour()))
    }

    /// Slot end in hours since the start day's midnight.
    pub fn end_hours(&self, id: SlotId) -> f64 {
        self.get(id)
            .map(|s| s.end_hours())
            .unwrap_or(f64::from(id.hour()) + 1.0)
    }

    /// Whether a slot counts as night work.
    pub fn is_night(&self, id: SlotId) -> bool {
        self.get(id).map(|s| s.is_night()).unwrap_or(id.is_night_hour())
    }
}

#[derive(Deserialize)]
struct SlotCalendarRecord {
    slots: Vec<TimeSlot>,
}

impl TryFrom<SlotCalendarRecord> for SlotCalendar {
    type Error = ModelError;

    fn try_from(r: SlotCalendarRecord) -> Result<Self, Self::Error> {
        Self::new(r.slots)
    }
}

impl Default for SlotCalendar {
    fn default() -> Self {
        let slots = (DEFAULT_OPENING_HOUR..DEFAULT_CLOSING_HOUR)
            .filter_map(|h| TimeSlot::hourly(h).ok())
            .collect();
        Self { slots }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SlotKind;

    fn slot(h: u32) -> SlotId {
        SlotId::new(h).unwrap()
    }

    #[test]
    fn test_default_calendar() {
        let cal = SlotCalendar::default();
        assert_eq!(cal.len(), 9);
        assert_eq!(cal.first(), Some(slot(9)));
        assert_eq!(cal.last_slot_hour(), 17);
        assert_eq!(cal.opening_hour(), 9);
        assert_eq!(cal.closing_hour(), 18);
        let labels: Vec<String> = cal.slot_ids().map(|s| s.label()).collect();
        assert_eq!(labels.first().map(String::as_str), Some("h09"));
        assert_eq!(labels.last().map(String::as_str), Some("h17"));
    }

    #[test]
    fn test_next_after() {
        let cal = SlotCalendar::default();
        assert_eq!(cal.next_after(slot(9)), Some(slot(10)));
        assert_eq!(cal.next_after(slot(17)), None);
        // Outside the calendar: next defined slot
        assert_eq!(cal.next_after(slot(3)), Some(slot(9)));
    }

    #[test]
    fn test_sorted_and_deduplicated() {
        let cal = SlotCalendar::new(vec![
            TimeSlot::hourly(11).unwrap(),
            TimeSlot::hourly(10).unwrap(),
        ])
        .unwrap();
        assert_eq!(cal.first(), Some(slot(10)));

        let dup = SlotCalendar::new(vec![
            TimeSlot::hourly(10).unwrap(),
            TimeSlot::hourly(10).unwrap(),
        ]);
        assert!(matches!(dup, Err(ModelError::DuplicateSlot(_))));
    }

    #[test]
    fn test_deserialize_rejects_duplicates() {
        let cal = SlotCalendar::hourly(9, 11).unwrap();
        let json = serde_json::to_string(&cal).unwrap();
        assert_eq!(serde_json::from_str::<SlotCalendar>(&json).unwrap(), cal);

        let slot = serde_json::to_string(&TimeSlot::hourly(9).unwrap()).unwrap();
        let dup = format!(r#"{{"slots":[{slot},{slot}]}}"#);
        assert!(serde_json::from_str::<SlotCalendar>(&dup).is_err());
    }

    #[test]
    fn test_durations_and_fallbacks() {
        let cal = SlotCalendar::hourly(9, 12).unwrap();
        assert_eq!(cal.duration_hours(slot(9)), 1.0);
        assert_eq!(cal.duration_hours(slot(20)), 1.0);
        assert_eq!(cal.start_hours(slot(20)), 20.0);
        assert_eq!(cal.end_hours(slot(20)), 21.0);
    }

    #[test]
    fn test_night_lookup() {
        let cal = SlotCalendar::new(vec![
            TimeSlot::hourly(12).unwrap().with_kind(SlotKind::Night),
            TimeSlot::hourly(13).unwrap(),
        ])
        .unwrap();
        assert!(cal.is_night(slot(12)));
        assert!(!cal.is_night(slot(13)));
        assert!(cal.is_night(slot(23)));
    }
}
