//! Rule-based DPLL: an alternative engine driven by explicit transition
//! rules over the trail
//!
//! The state is `(trail, formula, decision stack)` and one rule fires per
//! step, in a fixed priority order:
//!
//!  - *Backtrack* / *Fail*: on a falsified clause, pop the most recent
//!    decision `l`, truncate the trail to its position, and re-assert `-l`
//!    as a propagated literal -- a single flip, no second decision frame.
//!    With no decision left, the formula is unsatisfiable.
//!  - *UnitPropagate*: assert the one unassigned literal of a clause whose
//!    other literals are all false.
//!  - *Decide*: assert the first literal in clause order whose variable is
//!    wholly unassigned.
//!
//! When no rule applies the trail satisfies every clause and the search
//! stops with sat.

use crate::data::*;
use crate::engine::Stats;
use crate::formula::{Assignment, Formula, Trail};
use log::debug;

pub struct TransitionSolver<'a> {
    formula: &'a Formula,
    assignment: Assignment,
    trail: Trail,
    stats: Stats,
}

impl<'a> TransitionSolver<'a> {
    pub fn new(formula: &'a Formula) -> Self {
        let assignment = Assignment::new(formula.num_vars());
        Self {
            formula,
            assignment,
            trail: Trail::new(),
            stats: Stats::default(),
        }
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn solve(&mut self) -> Verdict {
        loop {
            if self.formula.has_falsified_clause(&self.assignment) {
                self.stats.conflicts += 1;
                match self.trail.pop_decision(&mut self.assignment) {
                    Some(lit) => {
                        self.trail.push_propagated(!lit, &mut self.assignment);
                        continue;
                    }
                    None => {
                        debug!("fail rule fired after {} conflicts", self.stats.conflicts);
                        return Verdict::Unsat;
                    }
                }
            }

            if let Some(lit) = self.unit_literal() {
                self.trail.push_propagated(lit, &mut self.assignment);
                self.stats.propagations += 1;
                continue;
            }

            if let Some(lit) = self.decision_literal() {
                self.trail.push_decision(lit, &mut self.assignment);
                self.stats.decisions += 1;
                continue;
            }

            break;
        }

        // no rule applies and nothing is falsified: the trail is a witness.
        // variables that appear in no clause still need a value
        let pending: Vec<VarId> = self.assignment.unassigned_vars().collect();
        for var in pending {
            self.assignment.assign(!Literal::new(var));
        }
        match self.assignment.to_model() {
            Some(model) => Verdict::Sat(model),
            None => Verdict::Unknown(UnknownReason::InternalError),
        }
    }

    /// The forced literal of some unit clause, if any
    fn unit_literal(&self) -> Option<Literal> {
        'clauses: for clause in self.formula.clauses() {
            let mut unit = None;
            let mut unassigned = 0;
            for &lit in &clause[..] {
                match self.assignment.literal_value(lit) {
                    True => continue 'clauses,
                    False => (),
                    Unknown => {
                        unassigned += 1;
                        unit = Some(lit);
                    }
                }
            }
            if unassigned == 1 {
                return unit;
            }
        }
        None
    }

    /// The first literal in clause order whose variable is unassigned
    fn decision_literal(&self) -> Option<Literal> {
        for clause in self.formula.clauses() {
            for &lit in &clause[..] {
                if !self.assignment.is_assigned(lit.var_id()) {
                    return Some(lit);
                }
            }
        }
        None
    }
}
