//! Operator-desk-slot assignment.
//!
//! Assignments are immutable values. Moving an operator to another desk
//! produces a new assignment that replaces the old one in its owning
//! collection.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::SlotId;
use crate::error::ModelError;

/// Kind of seat an assignment represents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignmentType {
    /// Ordinary working seat.
    #[default]
    Regular,
    /// Work beyond the operator's normal hours.
    Overtime,
    /// Emergency cover.
    Emergency,
    /// Seat on the break desk.
    Break,
}

/// One operator staffing one desk during one slot of one day.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "AssignmentRecord")]
pub struct Assignment {
    operator_name: String,
    desk_name: String,
    slot: SlotId,
    date: NaiveDate,
    assignment_type: AssignmentType,
}

impl Assignment {
    /// Creates a regular assignment.
    ///
    /// Fails if the operator or desk name is empty.
    pub fn new(
        operator_name: impl Into<String>,
        desk_name: impl Into<String>,
        slot: SlotId,
        date: NaiveDate,
    ) -> Result<Self, ModelError> {
        let operator_name = operator_name.into();
        let desk_name = desk_name.into();
        if operator_name.trim().is_empty() {
            return Err(ModelError::EmptyOperatorName);
        }
        if desk_name.trim().is_empty() {
            return Err(ModelError::EmptyDeskName);
        }
        Ok(Self {
            operator_name,
            desk_name,
            slot,
            date,
            assignment_type: AssignmentType::Regular,
        })
    }

    /// Creates an assignment from a `hNN` slot label.
    pub fn from_label(
        operator_name: impl Into<String>,
        desk_name: impl Into<String>,
        slot_label: &str,
        date: NaiveDate,
    ) -> Result<Self, ModelError> {
        let slot = SlotId::parse(slot_label)?;
        Self::new(operator_name, desk_name, slot, date)
    }

    /// Creates a break-desk assignment.
    pub fn break_seat(
        operator_name: impl Into<String>,
        break_desk: impl Into<String>,
        slot: SlotId,
        date: NaiveDate,
    ) -> Result<Self, ModelError> {
        Ok(Self::new(operator_name, break_desk, slot, date)?.with_type(AssignmentType::Break))
    }

    /// Sets the assignment type.
    pub fn with_type(mut self, assignment_type: AssignmentType) -> Self {
        self.assignment_type = assignment_type;
        self
    }

    /// Same operator, slot and date on a different desk.
    ///
    /// The desk name is taken from an existing desk list, so it is
    /// never empty.
    pub fn moved_to(&self, desk_name: &str, assignment_type: AssignmentType) -> Self {
        Self {
            operator_name: self.operator_name.clone(),
            desk_name: desk_name.to_string(),
            slot: self.slot,
            date: self.date,
            assignment_type,
        }
    }

    #[inline]
    pub fn operator_name(&self) -> &str {
        &self.operator_name
    }

    #[inline]
    pub fn desk_name(&self) -> &str {
        &self.desk_name
    }

    #[inline]
    pub fn slot(&self) -> SlotId {
        self.slot
    }

    #[inline]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[inline]
    pub fn assignment_type(&self) -> AssignmentType {
        self.assignment_type
    }

    /// Whether this seat is a break. Break seats are never worked time.
    #[inline]
    pub fn is_break(&self) -> bool {
        self.assignment_type == AssignmentType::Break
    }

    /// Chronological sort key.
    #[inline]
    pub fn when(&self) -> (NaiveDate, SlotId) {
        (self.date, self.slot)
    }

    /// Uniqueness key: an operator holds at most one desk per slot per day.
    pub fn key(&self) -> (&str, SlotId, NaiveDate) {
        (&self.operator_name, self.slot, self.date)
    }
}

/// Unchecked wire form, validated on deserialization.
#[derive(Deserialize)]
struct AssignmentRecord {
    operator_name: String,
    desk_name: String,
    slot: SlotId,
    date: NaiveDate,
    #[serde(default)]
    assignment_type: AssignmentType,
}

impl TryFrom<AssignmentRecord> for Assignment {
    type Error = ModelError;

    fn try_from(r: AssignmentRecord) -> Result<Self, Self::Error> {
        Ok(Self::new(r.operator_name, r.desk_name, r.slot, r.date)?.with_type(r.assignment_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_assignment_accessors() {
        let slot = SlotId::new(9).unwrap();
        let a = Assignment::new("Alice", "Desk A", slot, date()).unwrap();
        assert_eq!(a.operator_name(), "Alice");
        assert_eq!(a.desk_name(), "Desk A");
        assert_eq!(a.slot(), slot);
        assert_eq!(a.date(), date());
        assert_eq!(a.assignment_type(), AssignmentType::Regular);
    }

    #[test]
    fn test_empty_names_rejected() {
        let slot = SlotId::new(9).unwrap();
        assert_eq!(
            Assignment::new("", "Desk A", slot, date()),
            Err(ModelError::EmptyOperatorName)
        );
        assert_eq!(
            Assignment::new("Alice", "  ", slot, date()),
            Err(ModelError::EmptyDeskName)
        );
    }

    #[test]
    fn test_empty_slot_label_rejected() {
        assert!(matches!(
            Assignment::from_label("Alice", "Desk A", "", date()),
            Err(ModelError::MalformedSlotLabel(_))
        ));
        let a = Assignment::from_label("Alice", "Desk A", "h10", date()).unwrap();
        assert_eq!(a.slot().hour(), 10);
    }

    #[test]
    fn test_moved_to_keeps_identity() {
        let slot = SlotId::new(9).unwrap();
        let a = Assignment::new("Alice", "Desk A", slot, date()).unwrap();
        let b = a.moved_to("Desk B", AssignmentType::Regular);
        assert_eq!(a.key(), b.key());
        assert_eq!(b.desk_name(), "Desk B");
        assert_eq!(a.desk_name(), "Desk A");
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"{"operator_name":"","desk_name":"Desk A","slot":9,"date":"2024-01-01"}"#;
        assert!(serde_json::from_str::<Assignment>(json).is_err());

        let json = r#"{"operator_name":"Alice","desk_name":"Desk A","slot":9,"date":"2024-01-01"}"#;
        let a: Assignment = serde_json::from_str(json).unwrap();
        assert_eq!(a.assignment_type(), AssignmentType::Regular);
    }

    #[test]
    fn test_break_seat() {
        let slot = SlotId::new(12).unwrap();
        let a = Assignment::break_seat("Alice", "break", slot, date()).unwrap();
        assert_eq!(a.assignment_type(), AssignmentType::Break);
    }
}
