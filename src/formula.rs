//! The formula model: an immutable clause set, plus the assignment and
//! trail that track the one branch the search is currently exploring
//!
//! The clause set is fixed for the whole solve.  Branches never copy it;
//! everything a branch changes lives in the [`Assignment`] and [`Trail`],
//! and is undone by truncating the trail to a saved mark.

use crate::data::*;
use crate::vec_map::VecMap;

/// A CNF problem instance
#[derive(Debug, Clone)]
pub struct Formula {
    num_vars: u32,
    clauses: Vec<Clause>,
}

impl Formula {
    pub fn new(num_vars: u32, clauses: Vec<Clause>) -> Self {
        debug_assert!(clauses
            .iter()
            .flat_map(|clause| clause.iter())
            .all(|lit| lit.var_id().0 < num_vars));
        Self { num_vars, clauses }
    }

    #[inline]
    pub fn num_vars(&self) -> u32 {
        self.num_vars
    }

    #[inline]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Every clause has at least one true literal
    pub fn is_satisfied(&self, assignment: &Assignment) -> bool {
        self.clauses
            .iter()
            .all(|clause| assignment.clause_value(clause) == True)
    }

    /// Some clause has every literal false
    pub fn has_falsified_clause(&self, assignment: &Assignment) -> bool {
        self.clauses
            .iter()
            .any(|clause| assignment.clause_value(clause) == False)
    }
}

/// A partial mapping from variables to truth values
///
/// Holds at most one polarity per variable; `assign` requires the variable
/// to be unassigned
#[derive(Debug, Clone)]
pub struct Assignment {
    values: VecMap<VarId, VarState>,
    assigned: u32,
}

impl Assignment {
    pub fn new(num_vars: u32) -> Self {
        Self {
            values: VecMap::new(vec![Unknown; num_vars as usize]),
            assigned: 0,
        }
    }

    #[inline]
    pub fn num_vars(&self) -> u32 {
        self.values.len() as u32
    }

    #[inline]
    pub fn var_value(&self, var: VarId) -> VarState {
        self.values[var]
    }

    #[inline]
    pub fn is_assigned(&self, var: VarId) -> bool {
        self.values[var] != Unknown
    }

    /// The value of a literal under this assignment
    #[inline]
    pub fn literal_value(&self, lit: Literal) -> VarState {
        if lit.is_negated() {
            !self.values[lit.var_id()]
        } else {
            self.values[lit.var_id()]
        }
    }

    /// Make this literal true.  Its variable must be unassigned.
    pub fn assign(&mut self, lit: Literal) {
        debug_assert_eq!(self.values[lit.var_id()], Unknown);
        self.values[lit.var_id()] = if lit.is_negated() { False } else { True };
        self.assigned += 1;
    }

    pub fn unassign(&mut self, var: VarId) {
        debug_assert_ne!(self.values[var], Unknown);
        self.values[var] = Unknown;
        self.assigned -= 1;
    }

    pub fn is_total(&self) -> bool {
        self.assigned as usize == self.values.len()
    }

    pub fn unassigned_vars(&self) -> impl Iterator<Item = VarId> + '_ {
        self.values
            .inner
            .iter()
            .enumerate()
            .filter(|&(_, &state)| state == Unknown)
            .map(|(i, _)| VarId::new(i as u32))
    }

    pub fn first_unassigned(&self) -> Option<VarId> {
        self.unassigned_vars().next()
    }

    /// `True` if some literal is true, `False` if all are false, `Unknown`
    /// otherwise
    pub fn clause_value(&self, clause: &[Literal]) -> VarState {
        let mut result = False;
        for &lit in clause {
            match self.literal_value(lit) {
                False => (),
                True => return True,
                Unknown => result = Unknown,
            }
        }
        result
    }

    /// The total model, or `None` if some variable is still unassigned
    pub fn to_model(&self) -> Option<VecMap<VarId, bool>> {
        if !self.is_total() {
            return None;
        }
        Some(VecMap::new(
            self.values.inner.iter().map(|&state| state == True).collect(),
        ))
    }
}

/// Why a literal landed on the trail
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Source {
    Decision,
    Propagated,
}

/// Chronological record of assignment events
///
/// Decision positions are indexed separately, so taking a mark is O(1) and
/// backtracking is a truncation rather than a scan for values
#[derive(Debug, Clone, Default)]
pub struct Trail {
    entries: Vec<(Literal, Source)>,
    decisions: Vec<usize>,
}

impl Trail {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn entries(&self) -> &[(Literal, Source)] {
        &self.entries
    }

    #[inline]
    pub fn decision_count(&self) -> usize {
        self.decisions.len()
    }

    /// A position to truncate back to later
    #[inline]
    pub fn mark(&self) -> usize {
        self.entries.len()
    }

    pub fn push_decision(&mut self, lit: Literal, assignment: &mut Assignment) {
        self.decisions.push(self.entries.len());
        self.entries.push((lit, Source::Decision));
        assignment.assign(lit);
    }

    pub fn push_propagated(&mut self, lit: Literal, assignment: &mut Assignment) {
        self.entries.push((lit, Source::Propagated));
        assignment.assign(lit);
    }

    /// Undo every assignment made at or after `mark`
    pub fn truncate(&mut self, mark: usize, assignment: &mut Assignment) {
        for &(lit, _) in &self.entries[mark..] {
            assignment.unassign(lit.var_id());
        }
        self.entries.truncate(mark);
        while matches!(self.decisions.last(), Some(&d) if d >= mark) {
            self.decisions.pop();
        }
    }

    /// Undo through the most recent decision and return its literal
    pub fn pop_decision(&mut self, assignment: &mut Assignment) -> Option<Literal> {
        let idx = *self.decisions.last()?;
        let lit = self.entries[idx].0;
        self.truncate(idx, assignment);
        Some(lit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clause(lits: &[i32]) -> Clause {
        lits.iter().map(|&l| Literal::from_dimacs(l)).collect()
    }

    #[test]
    fn clause_evaluation() {
        let mut assignment = Assignment::new(3);
        assignment.assign(Literal::from_dimacs(1));
        assert_eq!(assignment.clause_value(&clause(&[1, 2])), True);
        assert_eq!(assignment.clause_value(&clause(&[-1, 2])), Unknown);
        assert_eq!(assignment.clause_value(&clause(&[-1])), False);
        assert_eq!(assignment.clause_value(&[]), False);
    }

    #[test]
    fn formula_predicates() {
        let formula = Formula::new(2, vec![clause(&[1, 2]), clause(&[-1])]);
        let mut assignment = Assignment::new(2);
        assert!(!formula.is_satisfied(&assignment));
        assert!(!formula.has_falsified_clause(&assignment));

        assignment.assign(Literal::from_dimacs(1));
        assert!(formula.has_falsified_clause(&assignment));

        assignment.unassign(VarId::new(0));
        assignment.assign(Literal::from_dimacs(-1));
        assignment.assign(Literal::from_dimacs(2));
        assert!(formula.is_satisfied(&assignment));
    }

    #[test]
    fn trail_truncation_restores_assignment() {
        let mut assignment = Assignment::new(4);
        let mut trail = Trail::new();

        trail.push_propagated(Literal::from_dimacs(1), &mut assignment);
        let mark = trail.mark();
        trail.push_decision(Literal::from_dimacs(2), &mut assignment);
        trail.push_propagated(Literal::from_dimacs(-3), &mut assignment);
        assert_eq!(trail.decision_count(), 1);

        trail.truncate(mark, &mut assignment);
        assert_eq!(trail.len(), 1);
        assert_eq!(trail.decision_count(), 0);
        assert_eq!(assignment.var_value(VarId::new(0)), True);
        assert!(!assignment.is_assigned(VarId::new(1)));
        assert!(!assignment.is_assigned(VarId::new(2)));
    }

    #[test]
    fn pop_decision_returns_the_choice() {
        let mut assignment = Assignment::new(3);
        let mut trail = Trail::new();

        trail.push_decision(Literal::from_dimacs(1), &mut assignment);
        trail.push_propagated(Literal::from_dimacs(2), &mut assignment);
        trail.push_decision(Literal::from_dimacs(-3), &mut assignment);

        assert_eq!(trail.pop_decision(&mut assignment), Some(Literal::from_dimacs(-3)));
        assert_eq!(trail.len(), 2);
        assert_eq!(trail.pop_decision(&mut assignment), Some(Literal::from_dimacs(1)));
        assert!(trail.is_empty());
        assert_eq!(trail.pop_decision(&mut assignment), None);
    }

    #[test]
    fn model_requires_totality() {
        let mut assignment = Assignment::new(2);
        assert!(assignment.to_model().is_none());
        assignment.assign(Literal::from_dimacs(1));
        assignment.assign(Literal::from_dimacs(-2));
        let model = assignment.to_model().unwrap();
        assert!(model[VarId::new(0)]);
        assert!(!model[VarId::new(1)]);
    }
}
