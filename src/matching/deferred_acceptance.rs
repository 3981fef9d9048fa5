//! Deferred acceptance for one slot.
//!
//! # Algorithm
//!
//! Operators propose, desks hold.
//! 1. Each free operator proposes to its best desk not yet tried.
//! 2. A desk with spare quota holds the proposal. A full desk compares
//!    the proposer with its weakest holder and rejects the weaker one.
//! 3. Rejected operators return to the free pool.
//! 4. Stop when every operator is held or has tried every desk.
//!
//! # Preferences
//! - Operator: home desk first (if competent), then competent desks in
//!   desk order. Break-required operators list only the break desk.
//! - Desk: operators who prefer the slot first, then by name.
//!
//! # Complexity
//! O(n · d · q) for n operators, d desks and quota q per desk.
//!
//! # Reference
//! - Gale & Shapley (1962), "College Admissions and the Stability of
//!   Marriage", American Mathematical Monthly 69(1)
//! - Roth & Sotomayor (1990), "Two-Sided Matching", Ch. 5 (many-to-one)

use std::collections::VecDeque;
use tracing::{debug, warn};

use super::SlotContext;
use crate::models::{Assignment, AssignmentType, OperatorAvailability};

/// Runs deferred acceptance for a slot.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotMatcher;

impl SlotMatcher {
    pub fn new() -> Self {
        Self
    }

    /// How a desk ranks an operator: lower is better. Every desk uses
    /// the same order, slot preference first, then name.
    #[inline]
    pub fn operator_rank_at_desk<'o>(
        ctx: &SlotContext<'_>,
        op: &'o OperatorAvailability,
    ) -> (bool, &'o str) {
        (!op.prefers_slot(ctx.slot), op.operator_name.as_str())
    }

    /// Desks an operator will propose to, best first.
    ///
    /// Only eligible desks with a positive quota are listed.
    pub fn operator_preferences(ctx: &SlotContext<'_>, op: &OperatorAvailability) -> Vec<usize> {
        let mut prefs: Vec<usize> = ctx
            .quotas
            .iter()
            .enumerate()
            .filter(|(_, (desk, quota))| *quota > 0 && ctx.is_eligible(op, desk))
            .map(|(i, _)| i)
            .collect();
        if let Some(home) = op.home_desk.as_deref() {
            if let Some(pos) = prefs.iter().position(|&i| ctx.quotas[i].0 == home) {
                let d = prefs.remove(pos);
                prefs.insert(0, d);
            }
        }
        prefs
    }

    /// Matches available operators to desks.
    ///
    /// Returns one assignment per held proposal, grouped by desk in
    /// desk order. Operators left unmatched get no assignment.
    pub fn match_slot(&self, ctx: &SlotContext<'_>) -> Vec<Assignment> {
        let ops = &ctx.operators;
        let rank = |i: usize| Self::operator_rank_at_desk(ctx, ops[i]);
        let prefs: Vec<Vec<usize>> = ops
            .iter()
            .map(|op| Self::operator_preferences(ctx, op))
            .collect();
        let mut next = vec![0usize; ops.len()];
        let mut held: Vec<Vec<usize>> = vec![Vec::new(); ctx.quotas.len()];
        let mut free: VecDeque<usize> = (0..ops.len()).collect();
        let mut proposals = 0usize;

        while let Some(o) = free.pop_front() {
            let Some(&d) = prefs[o].get(next[o]) else {
                continue;
            };
            next[o] += 1;
            proposals += 1;

            let quota = ctx.quotas[d].1 as usize;
            if held[d].len() < quota {
                held[d].push(o);
                continue;
            }
            let holders = &held[d];
            let weakest = (0..holders.len()).max_by_key(|&pos| rank(holders[pos]));
            match weakest {
                Some(pos) if rank(o) < rank(held[d][pos]) => {
                    let rejected = std::mem::replace(&mut held[d][pos], o);
                    free.push_back(rejected);
                }
                _ => free.push_back(o),
            }
        }

        let mut out = Vec::new();
        for (d, holders) in held.iter_mut().enumerate() {
            holders.sort_by_key(|&i| rank(i));
            let desk = ctx.quotas[d].0.as_str();
            let kind = if ctx.is_break_desk(desk) {
                AssignmentType::Break
            } else {
                AssignmentType::Regular
            };
            for &o in holders.iter() {
                match Assignment::new(ops[o].operator_name.as_str(), desk, ctx.slot, ctx.date) {
                    Ok(a) => out.push(a.with_type(kind)),
                    Err(e) => warn!(desk, error = %e, "dropping malformed seat"),
                }
            }
        }
        debug!(
            date = %ctx.date,
            slot = %ctx.slot,
            operators = ops.len(),
            proposals,
            matched = out.len(),
            "deferred acceptance finished"
        );
        out
    }
}
