//! Branching heuristics: which variable to split on next
//!
//! Heuristics are injected into the search engine and may keep state across
//! conflicts.  Selection is deterministic: scores tie-break towards the
//! lowest variable id, never towards iteration order of a hash table.

use crate::data::*;
use crate::formula::{Assignment, Formula};
use crate::vec_map::VecMap;
use tinyvec::TinyVec;

pub trait Heuristic {
    /// Pick an unassigned variable to branch on.  `None` only when every
    /// variable is assigned.
    fn select_variable(&mut self, formula: &Formula, assignment: &Assignment) -> Option<VarId>;

    /// Called with the decision variable whose branch just failed
    fn on_conflict(&mut self, var: VarId);
}

/// BOHM scoring: variables in small unresolved clauses dominate, and
/// negative occurrences outweigh positive ones
///
/// Each unsatisfied clause contributes `weight * (alpha*pos + beta*neg)` per
/// variable, where `weight = 2^(5 - size)` for clauses with at most 5
/// unassigned literals and 1 beyond that.
#[derive(Debug, Clone)]
pub struct Bohm {
    alpha: u64,
    beta: u64,
}

impl Bohm {
    pub fn new(alpha: u64, beta: u64) -> Self {
        Self { alpha, beta }
    }
}

impl Default for Bohm {
    fn default() -> Self {
        Self::new(1, 2)
    }
}

impl Heuristic for Bohm {
    fn select_variable(&mut self, formula: &Formula, assignment: &Assignment) -> Option<VarId> {
        let mut scores: VecMap<VarId, u64> =
            VecMap::new(vec![0; formula.num_vars() as usize]);
        let mut scored = false;

        for clause in formula.clauses() {
            if assignment.clause_value(clause) == True {
                continue;
            }

            // (variable, positive, negative) occurrence counts among the
            // unassigned literals of this clause
            let mut occurrences: TinyVec<[(u32, u64, u64); 6]> = TinyVec::new();
            for &lit in &clause[..] {
                if assignment.is_assigned(lit.var_id()) {
                    continue;
                }
                let var = lit.var_id().0;
                let slot = match occurrences.iter().position(|entry| entry.0 == var) {
                    Some(slot) => slot,
                    None => {
                        occurrences.push((var, 0, 0));
                        occurrences.len() - 1
                    }
                };
                if lit.is_negated() {
                    occurrences[slot].2 += 1;
                } else {
                    occurrences[slot].1 += 1;
                }
            }
            if occurrences.is_empty() {
                continue;
            }

            let size: u64 = occurrences.iter().map(|&(_, pos, neg)| pos + neg).sum();
            let weight = if size <= 5 { 1u64 << (5 - size) } else { 1 };
            for &(var, pos, neg) in &occurrences[..] {
                scores[VarId::new(var)] += weight * (self.alpha * pos + self.beta * neg);
                scored = true;
            }
        }

        if !scored {
            // nothing left to resolve; any unassigned variable will do
            return assignment.first_unassigned();
        }

        let mut best: Option<(VarId, u64)> = None;
        for (i, &score) in scores.inner.iter().enumerate() {
            if score == 0 {
                continue;
            }
            let var = VarId::new(i as u32);
            debug_assert!(!assignment.is_assigned(var));
            match best {
                Some((_, top)) if top >= score => (),
                _ => best = Some((var, score)),
            }
        }
        best.map(|(var, _)| var).or_else(|| assignment.first_unassigned())
    }

    fn on_conflict(&mut self, _var: VarId) {}
}

/// How often `Activity` halves every score
const DECAY_INTERVAL: u64 = 256;

/// Conflict-count driven activity scores
///
/// Each conflict bumps the failed decision variable; every 256 conflicts
/// all scores are halved so recent conflicts dominate.  There is no clause
/// feedback: the engine learns nothing, so conflict counts are the only
/// signal.
#[derive(Debug, Clone)]
pub struct Activity {
    scores: VecMap<VarId, f64>,
    conflicts: u64,
}

impl Activity {
    pub fn new(num_vars: u32) -> Self {
        Self {
            scores: VecMap::new(vec![0.0; num_vars as usize]),
            conflicts: 0,
        }
    }

    pub fn score(&self, var: VarId) -> f64 {
        self.scores[var]
    }
}

impl Heuristic for Activity {
    fn select_variable(&mut self, _formula: &Formula, assignment: &Assignment) -> Option<VarId> {
        let mut best: Option<(VarId, f64)> = None;
        for (i, &score) in self.scores.inner.iter().enumerate() {
            let var = VarId::new(i as u32);
            if assignment.is_assigned(var) {
                continue;
            }
            match best {
                Some((_, top)) if top >= score => (),
                _ => best = Some((var, score)),
            }
        }
        best.map(|(var, _)| var)
    }

    fn on_conflict(&mut self, var: VarId) {
        self.scores[var] += 1.0;
        self.conflicts += 1;
        if self.conflicts % DECAY_INTERVAL == 0 {
            for score in self.scores.values_mut() {
                *score *= 0.5;
            }
        }
    }
}
