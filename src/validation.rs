//! Input validation for staffing runs.
//!
//! Checks structural integrity of the roster and desk list before
//! scheduling, and the uniqueness invariant of generated assignments.
//! Detects:
//! - Empty or duplicate operator and desk names
//! - A caller desk clashing with the break desk
//! - Competence for desks that do not exist
//! - Requirements for slots outside the calendar
//! - Preferred slots the operator is not available for
//! - An operator holding two seats in one slot
//!
//! Problems are collected, not fail-fast: the caller sees all of them.

use std::collections::HashSet;

use crate::models::{Assignment, DeskRequirement, OperatorAvailability, SlotCalendar};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// An operator or desk has an empty name.
    EmptyName,
    /// Two entities share the same name.
    DuplicateName,
    /// A caller-supplied desk uses the break desk's name.
    ReservedDeskName,
    /// An operator is competent for a desk that doesn't exist.
    UnknownDesk,
    /// A requirement or availability refers to a slot outside the calendar.
    SlotOutsideCalendar,
    /// A preferred slot is not among the available slots.
    PreferredNotAvailable,
    /// An operator holds two seats in the same slot of the same day.
    DuplicateAssignment,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the roster and desk list of a staffing run.
///
/// Checks:
/// 1. Operator and desk names are non-empty and unique
/// 2. No caller desk is named like the break desk
/// 3. Competent desks exist in the desk list
/// 4. Requirements only name calendar slots
/// 5. Preferred slots are available slots
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    operators: &[OperatorAvailability],
    desks: &[DeskRequirement],
    calendar: &SlotCalendar,
    break_desk: Option<&str>,
) -> ValidationResult {
    let mut errors = Vec::new();

    let mut desk_names = HashSet::new();
    for d in desks {
        if d.desk_name.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyName,
                "Desk with empty name",
            ));
        }
        if !desk_names.insert(d.desk_name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateName,
                format!("Duplicate desk name: {}", d.desk_name),
            ));
        }
        if Some(d.desk_name.as_str()) == break_desk {
            errors.push(ValidationError::new(
                ValidationErrorKind::ReservedDeskName,
                format!("Desk '{}' clashes with the break desk", d.desk_name),
            ));
        }
        for (slot, _) in d.required_count_per_slot.iter().filter(|(_, n)| **n > 0) {
            if !calendar.contains(*slot) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::SlotOutsideCalendar,
                    format!("Desk '{}' requires staff at {slot}, outside the calendar", d.desk_name),
                ));
            }
        }
    }

    let mut operator_names = HashSet::new();
    for op in operators {
        if op.operator_name.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyName,
                "Operator with empty name",
            ));
        }
        if !operator_names.insert(op.operator_name.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateName,
                format!("Duplicate operator name: {}", op.operator_name),
            ));
        }
        for desk in &op.competent_desks {
            if !desk_names.contains(desk.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::UnknownDesk,
                    format!(
                        "Operator '{}' is competent for unknown desk '{}'",
                        op.operator_name, desk
                    ),
                ));
            }
        }
        for slot in op.preferred_slots.difference(&op.available_slots) {
            errors.push(ValidationError::new(
                ValidationErrorKind::PreferredNotAvailable,
                format!(
                    "Operator '{}' prefers {slot} but is not available then",
                    op.operator_name
                ),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks that no operator holds two seats in one slot of one day.
pub fn validate_assignments(assignments: &[Assignment]) -> ValidationResult {
    let mut seen = HashSet::new();
    let errors: Vec<ValidationError> = assignments
        .iter()
        .filter(|a| !seen.insert(a.key()))
        .map(|a| {
            ValidationError::new(
                ValidationErrorKind::DuplicateAssignment,
                format!(
                    "Operator '{}' holds two seats at {} on {}",
                    a.operator_name(),
                    a.slot(),
                    a.date()
                ),
            )
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SlotId;
    use chrono::NaiveDate;

    fn slot(h: u32) -> SlotId {
        SlotId::new(h).unwrap()
    }

    fn sample_desks() -> Vec<DeskRequirement> {
        vec![
            DeskRequirement::new("Front").with_requirements([slot(9), slot(10)], 1),
            DeskRequirement::new("Phone").with_requirement(slot(9), 2),
        ]
    }

    fn sample_operators() -> Vec<OperatorAvailability> {
        vec![
            OperatorAvailability::new("Alice")
                .with_hours(9, 12)
                .with_preferred([slot(9)])
                .with_desks(["Front", "Phone"]),
            OperatorAvailability::new("Bob").with_hours(9, 18).with_desk("Phone"),
        ]
    }

    fn kinds(result: ValidationResult) -> Vec<ValidationErrorKind> {
        result.unwrap_err().into_iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_valid_input() {
        let cal = SlotCalendar::default();
        assert!(validate_input(&sample_operators(), &sample_desks(), &cal, Some("break")).is_ok());
    }

    #[test]
    fn test_duplicate_names() {
        let cal = SlotCalendar::default();
        let mut ops = sample_operators();
        ops.push(OperatorAvailability::new("Alice"));
        let mut desks = sample_desks();
        desks.push(DeskRequirement::new("Front"));
        let k = kinds(validate_input(&ops, &desks, &cal, None));
        assert_eq!(
            k.iter()
                .filter(|k| **k == ValidationErrorKind::DuplicateName)
                .count(),
            2
        );
    }

    #[test]
    fn test_reserved_and_unknown_desks() {
        let cal = SlotCalendar::default();
        let mut desks = sample_desks();
        desks.push(DeskRequirement::new("break"));
        let mut ops = sample_operators();
        ops.push(OperatorAvailability::new("Carol").with_desk("Back office"));
        let k = kinds(validate_input(&ops, &desks, &cal, Some("break")));
        assert!(k.contains(&ValidationErrorKind::ReservedDeskName));
        assert!(k.contains(&ValidationErrorKind::UnknownDesk));
    }

    #[test]
    fn test_slot_and_preference_checks() {
        let cal = SlotCalendar::default();
        let desks = vec![DeskRequirement::new("Night").with_requirement(slot(23), 1)];
        let ops = vec![OperatorAvailability::new("Dan")
            .with_hours(9, 10)
            .with_preferred([slot(15)])];
        let k = kinds(validate_input(&ops, &desks, &cal, None));
        assert_eq!(
            k,
            vec![
                ValidationErrorKind::SlotOutsideCalendar,
                ValidationErrorKind::PreferredNotAvailable
            ]
        );
    }

    #[test]
    fn test_empty_names() {
        let cal = SlotCalendar::default();
        let k = kinds(validate_input(
            &[OperatorAvailability::new(" ")],
            &[DeskRequirement::new("")],
            &cal,
            None,
        ));
        assert_eq!(k.len(), 2);
        assert!(k.iter().all(|k| *k == ValidationErrorKind::EmptyName));
    }

    #[test]
    fn test_duplicate_assignment() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let a = vec![
            Assignment::new("Alice", "Front", slot(9), d).unwrap(),
            Assignment::new("Alice", "Phone", slot(9), d).unwrap(),
            Assignment::new("Alice", "Phone", slot(10), d).unwrap(),
        ];
        let errors = validate_assignments(&a).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::DuplicateAssignment);
        assert!(validate_assignments(&a[1..]).is_ok());
    }
}
