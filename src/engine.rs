//! The recursive DPLL search engine
//!
//! Composes the propagation engine with an injected branching heuristic and
//! restart policy.  The clause set is shared by every branch; a branch only
//! mutates the assignment/trail, and a failed branch is undone by truncating
//! the trail back to the mark taken at its decision.

use crate::data::*;
use crate::formula::{Assignment, Formula, Trail};
use crate::heuristic::Heuristic;
use crate::propagate;
use crate::restart::RestartPolicy;
use log::{debug, trace};

/// Counters from one solve
#[derive(Debug, Default, Clone, Copy)]
pub struct Stats {
    pub decisions: u64,
    pub conflicts: u64,
    pub propagations: u64,
}

/// The main state for the solver
pub struct Solver {
    formula: Formula,
    assignment: Assignment,
    trail: Trail,
    heuristic: Box<dyn Heuristic>,
    restarts: Box<dyn RestartPolicy>,
    stats: Stats,
}

impl Solver {
    pub fn new(
        formula: Formula,
        heuristic: Box<dyn Heuristic>,
        restarts: Box<dyn RestartPolicy>,
    ) -> Self {
        let assignment = Assignment::new(formula.num_vars());
        Self {
            formula,
            assignment,
            trail: Trail::new(),
            heuristic,
            restarts,
            stats: Stats::default(),
        }
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    /// Solve the SAT problem!
    ///
    /// Intended to be called once; the search state is not reset between
    /// calls.
    pub fn solve(&mut self) -> Verdict {
        debug_assert!(self.trail.is_empty());

        let verdict = match self.search() {
            Ok(true) => {
                // variables the search never had to touch are don't-cares;
                // the model must still be total, so fix them
                let pending: Vec<VarId> = self.assignment.unassigned_vars().collect();
                for var in pending {
                    self.assignment.assign(!Literal::new(var));
                }
                match self.assignment.to_model() {
                    Some(model) => Verdict::Sat(model),
                    None => Verdict::Unknown(UnknownReason::InternalError),
                }
            }
            Ok(false) => Verdict::Unsat,
            Err(reason) => Verdict::Unknown(reason),
        };

        debug!(
            "solve finished: {} after {} decisions, {} conflicts, {} propagations",
            verdict, self.stats.decisions, self.stats.conflicts, self.stats.propagations
        );
        verdict
    }

    /// Explore the branch rooted at the current trail.  `Ok(true)` means the
    /// assignment satisfies the formula, `Ok(false)` that the branch is
    /// exhausted (or abandoned by the restart policy).
    fn search(&mut self) -> Result<bool, UnknownReason> {
        match propagate::unit_propagate(&self.formula, &mut self.assignment, &mut self.trail) {
            Ok(forced) => self.stats.propagations += forced as u64,
            Err(Conflict) => return Ok(false),
        }
        propagate::pure_literal_eliminate(&self.formula, &mut self.assignment, &mut self.trail);

        if self.formula.is_satisfied(&self.assignment) {
            return Ok(true);
        }
        if self.formula.has_falsified_clause(&self.assignment) {
            return Ok(false);
        }

        if self
            .restarts
            .should_restart(self.stats.conflicts, self.stats.decisions)
        {
            trace!(
                "restart due, abandoning branch at depth {}",
                self.trail.decision_count()
            );
            return Ok(false);
        }

        let var = match self
            .heuristic
            .select_variable(&self.formula, &self.assignment)
        {
            Some(var) => var,
            // the heuristic owes us a variable whenever one is unassigned
            None => return Err(UnknownReason::InternalError),
        };

        self.stats.decisions += 1;
        for &negated in &[false, true] {
            let lit = if negated {
                !Literal::new(var)
            } else {
                Literal::new(var)
            };
            let mark = self.trail.mark();
            self.trail.push_decision(lit, &mut self.assignment);

            if self.search()? {
                return Ok(true);
            }

            self.trail.truncate(mark, &mut self.assignment);
            self.stats.conflicts += 1;
            self.heuristic.on_conflict(var);
        }
        self.restarts.on_conflict();

        Ok(false)
    }
}
