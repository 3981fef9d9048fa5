//! Cached constraint evaluation.
//!
//! The validator owns its rule list, the slot calendar used for
//! durations, and an explicit [`ValidationCache`]. Results are memoized
//! per assignment set; callers clear the cache between independent runs.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use tracing::{debug, trace};

use super::{default_constraints, Constraint};
use crate::models::{Assignment, OperatorAvailability, SlotCalendar, Violation};

/// Per-constraint pass/fail results keyed by a hash of the inputs.
#[derive(Debug, Clone, Default)]
pub struct ValidationCache {
    entries: HashMap<u64, Vec<bool>>,
    hits: usize,
    misses: usize,
}

impl ValidationCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash of every (date, slot, operator, desk, type) tuple, in list
    /// order, plus the roster names.
    pub fn key(assignments: &[Assignment], operators: &[OperatorAvailability]) -> u64 {
        let mut hasher = DefaultHasher::new();
        assignments.len().hash(&mut hasher);
        for a in assignments {
            (a.date(), a.slot(), a.operator_name(), a.desk_name(), a.assignment_type())
                .hash(&mut hasher);
        }
        for op in operators {
            op.operator_name.hash(&mut hasher);
        }
        hasher.finish()
    }

    fn get(&mut self, key: u64) -> Option<Vec<bool>> {
        let found = self.entries.get(&key).cloned();
        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        found
    }

    fn insert(&mut self, key: u64, results: Vec<bool>) {
        self.entries.insert(key, results);
    }

    /// Drops all cached results and resets the counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Number of cached assignment sets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cache hits since the last clear.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Cache misses since the last clear.
    pub fn misses(&self) -> usize {
        self.misses
    }
}

/// Evaluates a constraint list against assignment sets.
#[derive(Debug, Clone)]
pub struct ConstraintValidator {
    constraints: Vec<Constraint>,
    calendar: SlotCalendar,
    cache: ValidationCache,
}

impl ConstraintValidator {
    /// Creates a validator. An empty list is replaced by
    /// [`default_constraints`].
    pub fn new(constraints: Vec<Constraint>, calendar: SlotCalendar) -> Self {
        let constraints = if constraints.is_empty() {
            debug!("no constraints configured, using defaults");
            default_constraints()
        } else {
            constraints
        };
        Self {
            constraints,
            calendar,
            cache: ValidationCache::new(),
        }
    }

    /// The active constraints.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// The calendar used for slot durations and times.
    pub fn calendar(&self) -> &SlotCalendar {
        &self.calendar
    }

    /// The result cache.
    pub fn cache(&self) -> &ValidationCache {
        &self.cache
    }

    /// Pass/fail per constraint, in list order.
    fn results(&mut self, assignments: &[Assignment], operators: &[OperatorAvailability]) -> Vec<bool> {
        let key = ValidationCache::key(assignments, operators);
        if let Some(hit) = self.cache.get(key) {
            trace!(key, "validation cache hit");
            return hit;
        }
        let results: Vec<bool> = self
            .constraints
            .iter()
            .map(|c| c.validate(assignments, operators, &self.calendar))
            .collect();
        trace!(key, assignments = assignments.len(), "validated");
        self.cache.insert(key, results.clone());
        results
    }

    /// Constraint name → satisfied, in list order.
    pub fn validate_all(
        &mut self,
        assignments: &[Assignment],
        operators: &[OperatorAvailability],
    ) -> Vec<(&'static str, bool)> {
        let results = self.results(assignments, operators);
        self.constraints
            .iter()
            .zip(results)
            .map(|(c, ok)| (c.name(), ok))
            .collect()
    }

    /// Names of failing constraints, in list order.
    ///
    /// Stops at the first failing hard constraint; soft failures do not
    /// stop the scan.
    pub fn get_violations(
        &mut self,
        assignments: &[Assignment],
        operators: &[OperatorAvailability],
    ) -> Vec<&'static str> {
        let results = self.results(assignments, operators);
        let mut names = Vec::new();
        for (c, ok) in self.constraints.iter().zip(results) {
            if ok {
                continue;
            }
            names.push(c.name());
            if c.is_hard {
                break;
            }
        }
        names
    }

    /// A report for every failing constraint.
    pub fn violation_reports(
        &mut self,
        assignments: &[Assignment],
        operators: &[OperatorAvailability],
    ) -> Vec<Violation> {
        let results = self.results(assignments, operators);
        self.constraints
            .iter()
            .zip(results)
            .filter(|(_, ok)| !ok)
            .map(|(c, _)| Violation {
                constraint: c.name().to_string(),
                description: c.description.clone(),
                is_hard: c.is_hard,
                score: c.weight,
            })
            .collect()
    }

    /// Sum of the weights of all failing constraints.
    pub fn total_violation_score(
        &mut self,
        assignments: &[Assignment],
        operators: &[OperatorAvailability],
    ) -> f64 {
        let results = self.results(assignments, operators);
        self.constraints
            .iter()
            .zip(results)
            .filter(|(_, ok)| !ok)
            .map(|(c, _)| c.weight)
            .sum()
    }

    /// Whether any hard constraint fails.
    pub fn has_hard_violation(
        &mut self,
        assignments: &[Assignment],
        operators: &[OperatorAvailability],
    ) -> bool {
        let results = self.results(assignments, operators);
        self.constraints
            .iter()
            .zip(results)
            .any(|(c, ok)| c.is_hard && !ok)
    }

    /// Drops all cached results.
    pub fn clear_cache(&mut self) {
        debug!(entries = self.cache.len(), "clearing validation cache");
        self.cache.clear();
    }
}
