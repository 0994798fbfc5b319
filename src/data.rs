//! Some helper datatypes

use crate::vec_map::{NumericId, VecMap};
use std::fmt::{self, Debug, Display, Formatter};
use std::ops::Not;
use tinyvec::TinyVec;

/// The error raised when the current branch falsifies a clause and
/// backtracking is needed
#[derive(Copy, Clone, Debug)]
pub struct Conflict;

/// A variable ID
///
/// All variable ids are less than 2^31
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VarId(pub u32);

impl VarId {
    #[inline]
    pub fn new(id: u32) -> Self {
        assert!(id < 1 << 31);
        Self(id)
    }
}

impl NumericId for VarId {
    #[inline]
    fn to_index(self) -> usize {
        self.0 as usize
    }
}

/// A literal is either a variable or the negation of a variable
///
/// They are encoded in 32 bits using a 31-bit numerical id, plus a flag for
/// whether they're negated
#[derive(Copy, Clone, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct Literal {
    inner: u32,
}

impl Debug for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_negated() {
            write!(f, "Literal(neg {:?})", self.var_id())
        } else {
            write!(f, "Literal({:?})", self.var_id())
        }
    }
}

impl Not for Literal {
    type Output = Self;

    fn not(self) -> Self {
        Self {
            inner: self.inner ^ 1,
        }
    }
}

/// Required for `TinyVec`.  Please don't use.
impl Default for Literal {
    fn default() -> Self {
        Self { inner: 0 }
    }
}

impl Literal {
    /// Make a new (non-negated) literal with the given ID.
    #[inline]
    pub fn new(id: VarId) -> Self {
        Self { inner: id.0 << 1 }
    }

    #[inline]
    pub fn var_id(self) -> VarId {
        VarId(self.inner >> 1)
    }

    #[inline]
    pub fn is_negated(self) -> bool {
        self.inner & 1 != 0
    }

    /// Convert from the 1-indexed signed representation used by DIMACS.
    /// `lit` must be non-zero.
    #[inline]
    pub fn from_dimacs(lit: i32) -> Self {
        debug_assert!(lit != 0);
        if lit < 0 {
            !Self::new(VarId::new((-lit - 1) as u32))
        } else {
            Self::new(VarId::new((lit - 1) as u32))
        }
    }

    /// Convert to the 1-indexed signed representation used by DIMACS
    #[inline]
    pub fn to_dimacs(self) -> i32 {
        let var = self.var_id().0 as i32 + 1;
        if self.is_negated() {
            -var
        } else {
            var
        }
    }
}

/// A clause is the disjunction (OR) of a bunch of literals
// The number 6 chosen bc it's the most a TinyVec can store in 32 bytes
// (on x86_64, given that Literal is 4 bytes)
pub type Clause = TinyVec<[Literal; 6]>;

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum VarState {
    False,
    True,
    /// Hasn't been assigned yet
    Unknown,
}
pub use VarState::*;

impl Not for VarState {
    type Output = VarState;

    fn not(self) -> Self::Output {
        match self {
            False => True,
            True => False,
            Unknown => Unknown,
        }
    }
}

/// Why a solve failed to produce a definite answer
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UnknownReason {
    ParseError,
    Timeout,
    InternalError,
}

impl Display for UnknownReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnknownReason::ParseError => "parse_error",
            UnknownReason::Timeout => "timeout",
            UnknownReason::InternalError => "internal_error",
        };
        write!(f, "{}", s)
    }
}

/// The outcome of one solve
///
/// `Sat` carries a total model: every variable of the formula gets a value,
/// including the don't-cares
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Sat(VecMap<VarId, bool>),
    Unsat,
    Unknown(UnknownReason),
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Sat(_) => "sat",
            Verdict::Unsat => "unsat",
            Verdict::Unknown(_) => "unknown",
        }
    }

    pub fn is_sat(&self) -> bool {
        matches!(self, Verdict::Sat(_))
    }

    pub fn is_unsat(&self) -> bool {
        matches!(self, Verdict::Unsat)
    }
}

impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_encoding() {
        let lit = Literal::new(VarId::new(3));
        assert_eq!(lit.var_id(), VarId(3));
        assert!(!lit.is_negated());
        assert!((!lit).is_negated());
        assert_eq!(!!lit, lit);
    }

    #[test]
    fn dimacs_conversion() {
        assert_eq!(Literal::from_dimacs(1), Literal::new(VarId::new(0)));
        assert_eq!(Literal::from_dimacs(-1), !Literal::new(VarId::new(0)));
        assert_eq!(Literal::from_dimacs(5).to_dimacs(), 5);
        assert_eq!(Literal::from_dimacs(-42).to_dimacs(), -42);
    }

    #[test]
    fn var_state_negation() {
        assert_eq!(!True, False);
        assert_eq!(!False, True);
        assert_eq!(!Unknown, Unknown);
    }

    #[test]
    fn verdict_display() {
        assert_eq!(Verdict::Unsat.to_string(), "unsat");
        assert_eq!(Verdict::Unknown(UnknownReason::Timeout).to_string(), "unknown");
        assert_eq!(UnknownReason::Timeout.to_string(), "timeout");
        assert_eq!(UnknownReason::ParseError.to_string(), "parse_error");
    }
}
