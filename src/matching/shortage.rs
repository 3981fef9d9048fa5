//! Post-match shortage repair.
//!
//! # Algorithm
//!
//! Three ordered phases, all bounded by the slot's quotas:
//! 1. **Idle to shortage**: each idle operator (roster order) takes the
//!    first understaffed desk (desk order) they are eligible for.
//! 2. **Chained reassignment**: a remaining idle operator takes a seat
//!    whose holder can move to another understaffed desk. One hop only.
//! 3. **Surplus to shortage**: holders on overstaffed desks move to
//!    understaffed desks they are eligible for.
//!
//! Assignments are replaced in the slot's list, never edited in place.
//! Demand that cannot be met is returned as [`Shortage`] records.
//!
//! # Reference
//! Ahuja, Magnanti & Orlin (1993), "Network Flows", §12.3 (augmenting
//! paths in bipartite matching; phase 2 is a depth-one augmentation)

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

use super::SlotContext;
use crate::models::{Assignment, AssignmentType, OperatorAvailability, Shortage};

/// Resolver phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    IdleToShortage,
    ChainedReassignment,
    SurplusToShortage,
}

/// One change made by the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverMove {
    pub phase: Phase,
    pub operator_name: String,
    /// Desk left, or `None` for an idle operator.
    pub from: Option<String>,
    pub to: String,
}

/// Result of resolving one slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// The slot's assignments after repair.
    pub assignments: Vec<Assignment>,
    /// Desks still understaffed.
    pub shortages: Vec<Shortage>,
    /// Changes in the order they were made.
    pub moves: Vec<ResolverMove>,
}

/// Repairs understaffed desks after matching.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShortageResolver;

impl ShortageResolver {
    pub fn new() -> Self {
        Self
    }

    /// Runs all three phases on one slot's assignments.
    pub fn resolve(&self, ctx: &SlotContext<'_>, assignments: Vec<Assignment>) -> Resolution {
        let mut run = Run {
            ctx,
            assignments,
            moves: Vec::new(),
        };
        run.idle_to_shortage();
        run.chained_reassignment();
        run.surplus_to_shortage();

        let shortages = run.shortages();
        for s in &shortages {
            warn!(
                date = %s.date,
                slot = %s.slot,
                desk = %s.desk_name,
                required = s.required,
                assigned = s.assigned,
                "desk left understaffed"
            );
        }
        Resolution {
            assignments: run.assignments,
            shortages,
            moves: run.moves,
        }
    }
}

struct Run<'c, 'a> {
    ctx: &'c SlotContext<'a>,
    assignments: Vec<Assignment>,
    moves: Vec<ResolverMove>,
}

impl<'a> Run<'_, 'a> {
    fn count(&self, desk: &str) -> u32 {
        self.assignments
            .iter()
            .filter(|a| a.desk_name() == desk)
            .count() as u32
    }

    /// Required minus assigned, if positive.
    fn shortage(&self, desk: &str) -> u32 {
        self.ctx.quota(desk).saturating_sub(self.count(desk))
    }

    /// Assigned minus required, if positive.
    fn surplus(&self, desk: &str) -> u32 {
        self.count(desk).saturating_sub(self.ctx.quota(desk))
    }

    fn idle(&self) -> Vec<&'a OperatorAvailability> {
        let seated: HashSet<&str> = self.assignments.iter().map(|a| a.operator_name()).collect();
        self.ctx
            .operators
            .iter()
            .copied()
            .filter(|op| !seated.contains(op.operator_name.as_str()))
            .collect()
    }

    fn seat_kind(&self, desk: &str) -> AssignmentType {
        if self.ctx.is_break_desk(desk) {
            AssignmentType::Break
        } else {
            AssignmentType::Regular
        }
    }

    /// First understaffed desk (desk order) the operator is eligible for.
    fn short_desk_for(&self, op: &OperatorAvailability, except: Option<&str>) -> Option<String> {
        self.ctx
            .quotas
            .iter()
            .map(|(desk, _)| desk.as_str())
            .filter(|&desk| Some(desk) != except)
            .find(|&desk| self.shortage(desk) > 0 && self.ctx.is_eligible(op, desk))
            .map(str::to_string)
    }

    fn seat(&mut self, phase: Phase, op: &OperatorAvailability, desk: &str) {
        match Assignment::new(op.operator_name.as_str(), desk, self.ctx.slot, self.ctx.date) {
            Ok(a) => {
                let kind = self.seat_kind(desk);
                self.assignments.push(a.with_type(kind));
                self.record(phase, &op.operator_name, None, desk);
            }
            Err(e) => warn!(desk, error = %e, "dropping malformed seat"),
        }
    }

    fn relocate(&mut self, phase: Phase, idx: usize, desk: &str) {
        let kind = self.seat_kind(desk);
        let moved = self.assignments[idx].moved_to(desk, kind);
        let old = std::mem::replace(&mut self.assignments[idx], moved);
        self.record(phase, old.operator_name(), Some(old.desk_name()), desk);
    }

    fn record(&mut self, phase: Phase, operator: &str, from: Option<&str>, to: &str) {
        debug!(
            ?phase,
            slot = %self.ctx.slot,
            operator,
            from = from.unwrap_or("-"),
            to,
            "resolver move"
        );
        self.moves.push(ResolverMove {
            phase,
            operator_name: operator.to_string(),
            from: from.map(str::to_string),
            to: to.to_string(),
        });
    }

    fn idle_to_shortage(&mut self) {
        for op in self.idle() {
            if let Some(desk) = self.short_desk_for(op, None) {
                self.seat(Phase::IdleToShortage, op, &desk);
            }
        }
    }

    fn chained_reassignment(&mut self) {
        for op in self.idle() {
            let chain = self.assignments.iter().enumerate().find_map(|(idx, held)| {
                if !self.ctx.is_eligible(op, held.desk_name()) {
                    return None;
                }
                let donor = self.ctx.operator(held.operator_name())?;
                let target = self.short_desk_for(donor, Some(held.desk_name()))?;
                Some((idx, held.desk_name().to_string(), target))
            });
            if let Some((idx, vacated, target)) = chain {
                self.relocate(Phase::ChainedReassignment, idx, &target);
                self.seat(Phase::ChainedReassignment, op, &vacated);
            }
        }
    }

    fn surplus_to_shortage(&mut self) {
        loop {
            let bridge = self.assignments.iter().enumerate().find_map(|(idx, held)| {
                if self.surplus(held.desk_name()) == 0 {
                    return None;
                }
                let op = self.ctx.operator(held.operator_name())?;
                let target = self.short_desk_for(op, Some(held.desk_name()))?;
                Some((idx, target))
            });
            match bridge {
                Some((idx, target)) => self.relocate(Phase::SurplusToShortage, idx, &target),
                None => break,
            }
        }
    }

    fn shortages(&self) -> Vec<Shortage> {
        self.ctx
            .quotas
            .iter()
            .filter_map(|(desk, required)| {
                let assigned = self.count(desk);
                (assigned < *required).then(|| Shortage {
                    date: self.ctx.date,
                    slot: self.ctx.slot,
                    desk_name: desk.clone(),
                    required: *required,
                    assigned,
                })
            })
            .collect()
    }
}
