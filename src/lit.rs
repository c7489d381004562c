//! Literals, variables and clause references.
//!
//! A literal packs a variable index and a sign into one `u32`, the same
//! encoding `splr` uses for its `Lit` type (`2*var + sign`). A handful of
//! sentinel values outside the range of any real variable stand in for
//! "undefined", "eliminated" and the two fixed truth values.

use std::fmt;
use std::ops::Not;

/// Variable index. Variables are numbered from zero.
pub type Var = u32;

/// A literal: a variable together with a sign (`false` = positive).
///
/// `value = 2*var + sign_bit`. Four sentinels sit above any real literal
/// value and are distinguished by `proper()`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lit(u32);

impl Lit {
    /// Construct the literal for `var` with the given sign (`true` = negated).
    #[inline]
    pub fn new(var: Var, sign: bool) -> Lit {
        Lit(2 * var + sign as u32)
    }

    /// The dummy "no literal" sentinel.
    #[inline]
    pub const fn undef() -> Lit {
        Lit(u32::MAX)
    }

    /// Fixed-true sentinel.
    #[inline]
    pub const fn one() -> Lit {
        Lit(u32::MAX - 1)
    }

    /// Fixed-false sentinel.
    #[inline]
    pub const fn zero() -> Lit {
        Lit(u32::MAX - 2)
    }

    /// The "this variable has been eliminated" sentinel.
    #[inline]
    pub const fn elim() -> Lit {
        Lit(u32::MAX - 3)
    }

    /// The fixed truth value corresponding to `sign` (`one()` if positive).
    #[inline]
    pub fn fixed(sign: bool) -> Lit {
        if sign {
            Lit::zero()
        } else {
            Lit::one()
        }
    }

    /// `true` for a real literal over a real variable (not a sentinel).
    #[inline]
    pub fn proper(self) -> bool {
        self.0 <= (u32::MAX >> 1)
    }

    /// `true` for `one()` or `zero()`.
    #[inline]
    pub fn fixed_value(self) -> bool {
        self.0 == Lit::one().0 || self.0 == Lit::zero().0
    }

    #[inline]
    pub fn var(self) -> Var {
        debug_assert!(self.proper());
        self.0 >> 1
    }

    #[inline]
    pub fn sign(self) -> bool {
        (self.0 & 1) != 0
    }

    #[inline]
    pub fn neg(self) -> Lit {
        Lit(self.0 ^ 1)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Map a signed DIMACS integer (nonzero) to a literal: `k>0` → `var k-1`
    /// positive, `k<0` → `var -k-1` negated.
    pub fn from_dimacs(x: i64) -> Lit {
        debug_assert_ne!(x, 0);
        if x > 0 {
            Lit::new((x - 1) as Var, false)
        } else {
            Lit::new((-x - 1) as Var, true)
        }
    }

    pub fn to_dimacs(self) -> i64 {
        debug_assert!(self.proper());
        if self.sign() {
            -(self.var() as i64) - 1
        } else {
            self.var() as i64 + 1
        }
    }
}

impl Not for Lit {
    type Output = Lit;
    #[inline]
    fn not(self) -> Lit {
        self.neg()
    }
}

impl fmt::Debug for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if *self == Lit::undef() {
            write!(f, "undef")
        } else if *self == Lit::one() {
            write!(f, "T")
        } else if *self == Lit::zero() {
            write!(f, "F")
        } else if *self == Lit::elim() {
            write!(f, "elim")
        } else {
            write!(f, "{}", self.to_dimacs())
        }
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A 31-bit reference into a [`crate::clause::ClauseStorage`] arena.
/// The top bit is reserved so `Reason` and watch entries can tag it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CRef(u32);

/// Largest value a `CRef` may legally take; the arena refuses to grow past it.
pub const CREF_MAX: u32 = u32::MAX >> 1;

impl CRef {
    #[inline]
    pub fn new(val: u32) -> CRef {
        debug_assert!(val <= CREF_MAX);
        CRef(val)
    }

    #[inline]
    pub const fn undef() -> CRef {
        CRef(u32::MAX)
    }

    #[inline]
    pub fn proper(self) -> bool {
        self.0 <= CREF_MAX
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for CRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.proper() {
            write!(f, "CRef({})", self.0)
        } else {
            write!(f, "CRef(undef)")
        }
    }
}

/// Why a literal ended up on the trail.
///
/// Packed the same way as the original: MSB clear + value = the other
/// literal of a binary reason, MSB set + value = a `CRef` long-clause
/// reason, all-ones = undefined (decision or level-0 unit).
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Reason(u32);

const REASON_LONG_BIT: u32 = 1 << 31;

impl Reason {
    #[inline]
    pub const fn undef() -> Reason {
        Reason(u32::MAX)
    }

    #[inline]
    pub fn binary(other: Lit) -> Reason {
        debug_assert!(other.proper());
        Reason(other.raw())
    }

    #[inline]
    pub fn long(cref: CRef) -> Reason {
        debug_assert!(cref.proper());
        Reason(cref.raw() | REASON_LONG_BIT)
    }

    #[inline]
    pub fn is_undef(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub fn is_binary(self) -> bool {
        self.0 != u32::MAX && (self.0 & REASON_LONG_BIT) == 0
    }

    #[inline]
    pub fn is_long(self) -> bool {
        self.0 != u32::MAX && (self.0 & REASON_LONG_BIT) != 0
    }

    #[inline]
    pub fn lit(self) -> Lit {
        debug_assert!(self.is_binary());
        Lit::from_raw(self.0 & !REASON_LONG_BIT)
    }

    #[inline]
    pub fn cref(self) -> CRef {
        debug_assert!(self.is_long());
        CRef::new(self.0 & !REASON_LONG_BIT)
    }
}

impl fmt::Debug for Reason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_undef() {
            write!(f, "Reason(undef)")
        } else if self.is_binary() {
            write!(f, "Reason(bin {:?})", self.lit())
        } else {
            write!(f, "Reason(long {:?})", self.cref())
        }
    }
}

// internal helper, not part of the public Lit API surface above
impl Lit {
    #[inline]
    fn from_raw(v: u32) -> Lit {
        Lit(v)
    }
}

/// Color of a clause, tracking whether removing it could change satisfiability.
///
/// `Blue` clauses are logically entailed by the original problem (original
/// clauses, equivalence rules, resolvents from elimination); `Green` clauses
/// are redundant (learnt clauses, hyper-binary resolvents) and may be
/// dropped at will. `Black` marks a clause as a tombstone pending physical
/// reclamation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Color {
    Blue,
    Green,
    Black,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimacs_roundtrip() {
        for k in [-5i64, -1, 1, 5, 42] {
            let l = Lit::from_dimacs(k);
            assert_eq!(l.to_dimacs(), k);
        }
    }

    #[test]
    fn negation_flips_sign_only() {
        let a = Lit::new(3, false);
        assert_eq!(a.neg().var(), 3);
        assert!(a.neg().sign());
        assert_eq!(a.neg().neg(), a);
    }

    #[test]
    fn sentinels_are_not_proper() {
        assert!(!Lit::undef().proper());
        assert!(!Lit::one().proper());
        assert!(!Lit::zero().proper());
        assert!(!Lit::elim().proper());
        assert!(Lit::new(0, false).proper());
    }

    #[test]
    fn reason_tagging() {
        let r1 = Reason::binary(Lit::new(2, true));
        assert!(r1.is_binary());
        assert_eq!(r1.lit(), Lit::new(2, true));

        let r2 = Reason::long(CRef::new(17));
        assert!(r2.is_long());
        assert_eq!(r2.cref().index(), 17);

        assert!(Reason::undef().is_undef());
    }
}
