//! Random k-SAT instance generation for benchmarking
//!
//! Clause counts are sampled around the 3-SAT phase transition (about 4.26
//! clauses per variable), where random instances are hardest.  Duplicate
//! clauses are suppressed under a canonical key, with a bounded number of
//! draws so dense parameter choices can't loop forever.

use crate::data::{Clause, Literal, VarId};
use crate::formula::Formula;
use indexmap::IndexSet;
use log::trace;
use rand::seq::index;
use rand::Rng;
use tinyvec::TinyVec;

/// Phase-transition clause/variable ratio for 3-SAT
pub const PHASE_TRANSITION_RATIO: f64 = 4.26;
/// Half-width of the band the per-formula ratio is drawn from
pub const RATIO_SPREAD: f64 = 0.8;

/// How many draws a single formula gets, per requested clause
const ATTEMPTS_PER_CLAUSE: usize = 10;

/// The key under which duplicate clauses are detected: literals sorted by
/// `(variable, polarity)`, negative before positive
pub fn canonicalize(clause: &Clause) -> Clause {
    let mut canon = clause.clone();
    canon.sort_by_key(|lit| (lit.var_id(), !lit.is_negated()));
    canon
}

/// Generate up to `num_clauses` distinct random clauses of `clause_size`
/// literals over `num_vars` variables.
///
/// May come up short: once the attempt budget is spent the clauses drawn so
/// far are returned, so asking for more distinct clauses than exist still
/// terminates.
pub fn random_clauses(
    rng: &mut impl Rng,
    num_vars: u32,
    num_clauses: usize,
    clause_size: usize,
) -> Vec<Clause> {
    assert!(
        clause_size <= num_vars as usize,
        "cannot draw {} distinct variables out of {}",
        clause_size,
        num_vars
    );

    let mut clauses = Vec::with_capacity(num_clauses);
    let mut seen: IndexSet<Clause> = IndexSet::with_capacity(num_clauses);

    let max_attempts = num_clauses * ATTEMPTS_PER_CLAUSE;
    let mut attempts = 0;
    while clauses.len() < num_clauses && attempts < max_attempts {
        attempts += 1;

        let mut clause: Clause = TinyVec::new();
        for var in index::sample(rng, num_vars as usize, clause_size) {
            let lit = Literal::new(VarId::new(var as u32));
            clause.push(if rng.gen::<bool>() { lit } else { !lit });
        }

        if seen.insert(canonicalize(&clause)) {
            clauses.push(clause);
        }
    }

    if clauses.len() < num_clauses {
        trace!(
            "attempt budget exhausted at {} of {} clauses",
            clauses.len(),
            num_clauses
        );
    }
    clauses
}

/// Sample a clause count for `num_vars` variables: a ratio drawn around the
/// phase transition, clamped to the [3.5, 5.5] band
pub fn sample_num_clauses(rng: &mut impl Rng, num_vars: u32) -> usize {
    let ratio = rng
        .gen_range(PHASE_TRANSITION_RATIO - RATIO_SPREAD..PHASE_TRANSITION_RATIO + RATIO_SPREAD)
        .clamp(3.5, 5.5);
    (ratio * num_vars as f64) as usize
}

/// A complete random instance
pub fn random_formula(
    rng: &mut impl Rng,
    num_vars: u32,
    num_clauses: usize,
    clause_size: usize,
) -> Formula {
    Formula::new(
        num_vars,
        random_clauses(rng, num_vars, num_clauses, clause_size),
    )
}
