//! Fixpoint propagation over the formula model
//!
//! Both routines leave the trail untouched when invoked at a fixpoint, so
//! re-running them is always safe.

use crate::data::*;
use crate::formula::{Assignment, Formula, Trail};
use crate::vec_map::VecMap;
use log::trace;

/// Run unit propagation to a fixpoint.
///
/// A clause with no true literal and exactly one unassigned literal forces
/// that literal.  Returns the number of literals forced, or `Err(Conflict)`
/// as soon as some clause has every literal false (an empty clause counts).
pub fn unit_propagate(
    formula: &Formula,
    assignment: &mut Assignment,
    trail: &mut Trail,
) -> Result<usize, Conflict> {
    let mut forced = 0;
    let mut changed = true;
    while changed {
        changed = false;
        'clauses: for clause in formula.clauses() {
            let mut unit = None;
            let mut unassigned = 0;
            for &lit in &clause[..] {
                match assignment.literal_value(lit) {
                    True => continue 'clauses,
                    False => (),
                    Unknown => {
                        unassigned += 1;
                        unit = Some(lit);
                    }
                }
            }
            match (unassigned, unit) {
                (0, _) => return Err(Conflict),
                (1, Some(lit)) => {
                    trace!("unit clause forces {:?}", lit);
                    trail.push_propagated(lit, assignment);
                    forced += 1;
                    changed = true;
                }
                _ => (),
            }
        }
    }
    Ok(forced)
}

/// Assert every pure literal: an unassigned variable occurring with a single
/// polarity across the not-yet-satisfied clauses.
///
/// Returns the number of variables fixed.
pub fn pure_literal_eliminate(
    formula: &Formula,
    assignment: &mut Assignment,
    trail: &mut Trail,
) -> usize {
    let num_vars = formula.num_vars() as usize;
    let mut pos = VecMap::new(vec![false; num_vars]);
    let mut neg = VecMap::new(vec![false; num_vars]);

    for clause in formula.clauses() {
        if assignment.clause_value(clause) == True {
            continue;
        }
        for &lit in &clause[..] {
            if assignment.is_assigned(lit.var_id()) {
                continue;
            }
            if lit.is_negated() {
                neg[lit.var_id()] = true;
            } else {
                pos[lit.var_id()] = true;
            }
        }
    }

    let mut fixed = 0;
    for i in 0..num_vars {
        let var = VarId::new(i as u32);
        if pos[var] != neg[var] {
            let lit = if pos[var] {
                Literal::new(var)
            } else {
                !Literal::new(var)
            };
            trace!("pure literal {:?}", lit);
            trail.push_propagated(lit, assignment);
            fixed += 1;
        }
    }
    fixed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formula::Source;

    fn formula(num_vars: u32, clauses: &[&[i32]]) -> Formula {
        Formula::new(
            num_vars,
            clauses
                .iter()
                .map(|lits| lits.iter().map(|&l| Literal::from_dimacs(l)).collect())
                .collect(),
        )
    }

    #[test]
    fn propagates_a_chain_to_fixpoint() {
        let formula = formula(3, &[&[1], &[-1, 2], &[-2, 3]]);
        let mut assignment = Assignment::new(3);
        let mut trail = Trail::new();

        let forced = unit_propagate(&formula, &mut assignment, &mut trail).unwrap();
        assert_eq!(forced, 3);
        assert_eq!(assignment.var_value(VarId::new(0)), True);
        assert_eq!(assignment.var_value(VarId::new(1)), True);
        assert_eq!(assignment.var_value(VarId::new(2)), True);
        assert!(trail.entries().iter().all(|&(_, src)| src == Source::Propagated));
    }

    #[test]
    fn conflicting_units_report_conflict() {
        let formula = formula(1, &[&[1], &[-1]]);
        let mut assignment = Assignment::new(1);
        let mut trail = Trail::new();
        assert!(unit_propagate(&formula, &mut assignment, &mut trail).is_err());
    }

    #[test]
    fn empty_clause_is_a_conflict() {
        let formula = formula(1, &[&[]]);
        let mut assignment = Assignment::new(1);
        let mut trail = Trail::new();
        assert!(unit_propagate(&formula, &mut assignment, &mut trail).is_err());
    }

    #[test]
    fn propagation_is_idempotent_at_fixpoint() {
        let formula = formula(3, &[&[1], &[-1, 2], &[2, 3]]);
        let mut assignment = Assignment::new(3);
        let mut trail = Trail::new();

        unit_propagate(&formula, &mut assignment, &mut trail).unwrap();
        let len = trail.len();
        let forced = unit_propagate(&formula, &mut assignment, &mut trail).unwrap();
        assert_eq!(forced, 0);
        assert_eq!(trail.len(), len);
    }

    #[test]
    fn pure_literals_are_asserted() {
        // 1 occurs only positively, 3 only negatively, 2 both ways
        let formula = formula(3, &[&[1, 2], &[1, -2], &[-3, 2]]);
        let mut assignment = Assignment::new(3);
        let mut trail = Trail::new();

        let fixed = pure_literal_eliminate(&formula, &mut assignment, &mut trail);
        assert_eq!(fixed, 2);
        assert_eq!(assignment.var_value(VarId::new(0)), True);
        assert!(!assignment.is_assigned(VarId::new(1)));
        assert_eq!(assignment.var_value(VarId::new(2)), False);
    }

    #[test]
    fn pure_elimination_is_idempotent_at_fixpoint() {
        let formula = formula(2, &[&[1, 2], &[1, -2]]);
        let mut assignment = Assignment::new(2);
        let mut trail = Trail::new();

        assert_eq!(pure_literal_eliminate(&formula, &mut assignment, &mut trail), 1);
        // every clause is now satisfied, so 2 no longer counts as occurring
        assert_eq!(pure_literal_eliminate(&formula, &mut assignment, &mut trail), 0);
        assert_eq!(trail.len(), 1);
    }

    #[test]
    fn satisfied_clauses_do_not_pin_polarities() {
        // with 1 assigned true, the only live clause sees 2 negatively
        let formula = formula(2, &[&[1, 2], &[-2]]);
        let mut assignment = Assignment::new(2);
        let mut trail = Trail::new();
        trail.push_propagated(Literal::from_dimacs(1), &mut assignment);

        pure_literal_eliminate(&formula, &mut assignment, &mut trail);
        assert_eq!(assignment.var_value(VarId::new(1)), False);
    }
}
