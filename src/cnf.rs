//! The problem container: fixed units, binary clauses and long clauses.
//!
//! Grounded on `original_source/src/sat/cnf.h`. `Cnf` owns three tiers of
//! clauses stored by arity for efficiency: a `contradiction` flag for the
//! trivial-UNSAT case, a vector of forced units, an adjacency-list style
//! table of binary implications (`bins[lit]` holds every `other` such that
//! `(lit, other)` is a clause), and a [`crate::clause::ClauseStorage`] arena
//! for everything of length 3 or more.

use crate::clause::ClauseStorage;
use crate::lit::{Lit, Var};
use log::trace;

/// A CNF formula over a fixed number of variables, tiered by clause arity.
#[derive(Clone)]
pub struct Cnf {
    pub num_vars: u32,
    /// Set once an empty clause has been derived; the formula is UNSAT.
    pub contradiction: bool,
    /// Unary clauses (forced literals), deduplicated by variable.
    pub units: Vec<Lit>,
    /// `bins[l]` lists every literal `r` with a binary clause `(l, r)`
    /// present (`¬l → r`). Symmetric: `r` also appears in `bins[r.neg()]`...
    /// actually stored as `bins[l.neg()]` containing `r` per `(l ∨ r)`.
    pub bins: Vec<Vec<Lit>>,
    pub clauses: ClauseStorage,
}

impl Cnf {
    pub fn new(num_vars: u32) -> Cnf {
        Cnf {
            num_vars,
            contradiction: false,
            units: Vec::new(),
            bins: vec![Vec::new(); 2 * num_vars as usize],
            clauses: ClauseStorage::new(),
        }
    }

    #[inline]
    pub fn num_lits(&self) -> usize {
        2 * self.num_vars as usize
    }

    pub fn all_lits(&self) -> impl Iterator<Item = Lit> {
        (0..2 * self.num_vars).map(|raw| Lit::new(raw / 2, raw % 2 == 1))
    }

    pub fn all_vars(&self) -> impl Iterator<Item = Var> {
        0..self.num_vars
    }

    /// Record the empty clause: the formula becomes permanently UNSAT.
    pub fn add_empty(&mut self) {
        trace!(target: "dawnsat::cnf", "adding empty clause");
        self.contradiction = true;
    }

    /// Add a unit clause `(a)`. Detects a fixed-point contradiction against
    /// an already-forced opposite unit.
    pub fn add_unary(&mut self, a: Lit) {
        if self.contradiction {
            return;
        }
        if self.units.contains(&a.neg()) {
            self.add_empty();
            return;
        }
        if !self.units.contains(&a) {
            self.units.push(a);
        }
    }

    /// Add a binary clause `(a ∨ b)`, recording both implication directions.
    pub fn add_binary(&mut self, a: Lit, b: Lit) {
        if self.contradiction {
            return;
        }
        if a == b.neg() {
            return; // tautology
        }
        if a == b {
            self.add_unary(a);
            return;
        }
        self.bins[a.neg().raw() as usize].push(b);
        self.bins[b.neg().raw() as usize].push(a);
    }

    /// Add a clause of arity ≥ 3 to the long-clause arena.
    pub fn add_long(&mut self, lits: &[Lit], redundant: bool) {
        if self.contradiction {
            return;
        }
        match self.clauses.add_clause(lits, redundant) {
            Some(_) => {}
            None => panic!("clause arena exceeded address space"),
        }
    }

    /// Add a clause of any arity, dispatching to the right tier after
    /// removing duplicate literals and detecting in-clause tautologies.
    pub fn add_clause(&mut self, lits: &[Lit], redundant: bool) {
        let mut buf: Vec<Lit> = lits.to_vec();
        buf.sort_unstable();
        buf.dedup();
        for w in buf.windows(2) {
            if w[0] == w[1].neg() {
                return; // tautological clause, drop silently
            }
        }
        match buf.len() {
            0 => self.add_empty(),
            1 => self.add_unary(buf[0]),
            2 => self.add_binary(buf[0], buf[1]),
            _ => self.add_long(&buf, redundant),
        }
    }

    /// Like [`Cnf::add_clause`], but never asserts on internal precondition
    /// violations (e.g. a clause containing `Lit::one()`/`Lit::zero()` from
    /// a bit-blaster); used by `gen`/`sha256` front ends feeding in gate
    /// encodings that may already be partially fixed.
    pub fn add_clause_safe(&mut self, lits: &[Lit]) {
        let mut buf = Vec::with_capacity(lits.len());
        for &l in lits {
            if l == Lit::one() {
                return; // clause satisfied by a fixed-true literal
            }
            if l == Lit::zero() {
                continue; // drop a fixed-false literal
            }
            buf.push(l);
        }
        self.add_clause(&buf, false);
    }

    // -- gate helpers, used by the sha256 bit-blaster ---------------------

    /// Encode `out <-> (a AND b)` by adding the three defining clauses.
    pub fn add_and(&mut self, out: Lit, a: Lit, b: Lit) {
        self.add_clause_safe(&[out.neg(), a]);
        self.add_clause_safe(&[out.neg(), b]);
        self.add_clause_safe(&[out, a.neg(), b.neg()]);
    }

    /// Encode `out <-> (a OR b)`.
    pub fn add_or(&mut self, out: Lit, a: Lit, b: Lit) {
        self.add_clause_safe(&[out, a.neg()]);
        self.add_clause_safe(&[out, b.neg()]);
        self.add_clause_safe(&[out.neg(), a, b]);
    }

    /// Encode `out <-> (a XOR b)`.
    pub fn add_xor(&mut self, out: Lit, a: Lit, b: Lit) {
        self.add_clause_safe(&[out.neg(), a, b]);
        self.add_clause_safe(&[out.neg(), a.neg(), b.neg()]);
        self.add_clause_safe(&[out, a.neg(), b]);
        self.add_clause_safe(&[out, a, b.neg()]);
    }

    /// Encode `out <-> (a XOR b XOR c)`, the three-input parity gate used by
    /// the SHA-256 round functions.
    pub fn add_xor3(&mut self, out: Lit, a: Lit, b: Lit, c: Lit) {
        for &(sa, sb, sc, so) in &[
            (false, false, false, false),
            (false, false, true, true),
            (false, true, false, true),
            (false, true, true, false),
            (true, false, false, true),
            (true, false, true, false),
            (true, true, false, false),
            (true, true, true, true),
        ] {
            // clause forbidding (a=sa, b=sb, c=sc, out=!so)
            self.add_clause_safe(&[
                if sa { a } else { a.neg() },
                if sb { b } else { b.neg() },
                if sc { c } else { c.neg() },
                if so { out.neg() } else { out },
            ]);
        }
    }

    /// Encode `out <-> majority(a, b, c)`.
    pub fn add_maj(&mut self, out: Lit, a: Lit, b: Lit, c: Lit) {
        self.add_clause_safe(&[out.neg(), a, b]);
        self.add_clause_safe(&[out.neg(), a, c]);
        self.add_clause_safe(&[out.neg(), b, c]);
        self.add_clause_safe(&[out, a.neg(), b.neg()]);
        self.add_clause_safe(&[out, a.neg(), c.neg()]);
        self.add_clause_safe(&[out, b.neg(), c.neg()]);
    }

    /// Encode `out <-> choose(a, b, c) = (a AND b) OR (!a AND c)`.
    pub fn add_choose(&mut self, out: Lit, a: Lit, b: Lit, c: Lit) {
        self.add_clause_safe(&[out.neg(), a.neg(), b]);
        self.add_clause_safe(&[out.neg(), a, c]);
        self.add_clause_safe(&[out, a.neg(), b.neg()]);
        self.add_clause_safe(&[out, a, c.neg()]);
        self.add_clause_safe(&[out, b.neg(), c.neg()]);
        self.add_clause_safe(&[out.neg(), a.neg(), a, b, c]); // redundant strengthening, harmless
    }

    pub fn num_units(&self) -> usize {
        self.units.len()
    }

    pub fn num_bins(&self) -> usize {
        self.bins.iter().map(|v| v.len()).sum::<usize>() / 2
    }

    pub fn num_long(&self) -> usize {
        self.clauses.len()
    }

    /// Translate every clause tier through `trans` (indexed by old literal's
    /// raw value), producing a formula over `new_var_count` variables.
    /// `trans[l]` is the new literal that `l` maps to, or one of the fixed
    /// sentinels `Lit::one()`/`Lit::zero()` if `l` has been forced, or
    /// `Lit::elim()` if `l`'s variable no longer appears at all.
    ///
    /// Returns the renumbered formula; the caller is responsible for
    /// recording `trans` on a reconstruction stack before discarding the
    /// old variable numbering (see [`crate::reconstruction::Reconstruction`]).
    pub fn renumber(&self, trans: &[Lit], new_var_count: u32) -> Cnf {
        let mut out = Cnf::new(new_var_count);
        if self.contradiction {
            out.add_empty();
            return out;
        }

        let map = |l: Lit| -> Lit { trans[l.raw() as usize] };

        for &u in &self.units {
            let t = map(u);
            if t == Lit::zero() {
                out.add_empty();
                return out;
            } else if t != Lit::one() {
                out.add_unary(t);
            }
        }

        // `bins[a.neg()]` holds every `b` with clause `(a, b)` present.
        for raw in 0..self.bins.len() {
            let a_neg = Lit::new((raw / 2) as u32, raw % 2 == 1);
            let a = a_neg.neg();
            for &b in &self.bins[raw] {
                if a > b {
                    continue; // each binary clause is indexed from both ends; visit once
                }
                let ta = map(a);
                let tb = map(b);
                if ta == Lit::one() || tb == Lit::one() {
                    continue; // clause satisfied
                }
                if ta == Lit::zero() && tb == Lit::zero() {
                    out.add_empty();
                    return out;
                } else if ta == Lit::zero() {
                    out.add_unary(tb);
                } else if tb == Lit::zero() {
                    out.add_unary(ta);
                } else {
                    out.add_binary(ta, tb);
                }
            }
        }

        for cref in self.clauses.iter() {
            let cl = self.clauses.lits(cref);
            let irred = self.clauses.get(cref).irred();
            let mut buf = Vec::with_capacity(cl.len());
            let mut sat = false;
            for &l in cl {
                let t = map(l);
                if t == Lit::one() {
                    sat = true;
                    break;
                } else if t != Lit::zero() {
                    buf.push(t);
                }
            }
            if !sat {
                out.add_clause(&buf, !irred);
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l(v: u32, s: bool) -> Lit {
        Lit::new(v, s)
    }

    #[test]
    fn unit_contradiction_detected() {
        let mut cnf = Cnf::new(2);
        cnf.add_unary(l(0, false));
        cnf.add_unary(l(0, true));
        assert!(cnf.contradiction);
    }

    #[test]
    fn tautological_clause_dropped() {
        let mut cnf = Cnf::new(2);
        cnf.add_clause(&[l(0, false), l(0, true), l(1, false)], false);
        assert!(!cnf.contradiction);
        assert_eq!(cnf.num_long(), 0);
        assert_eq!(cnf.num_bins(), 0);
        assert_eq!(cnf.num_units(), 0);
    }

    #[test]
    fn binary_clause_indexed_both_ways() {
        let mut cnf = Cnf::new(2);
        cnf.add_binary(l(0, false), l(1, true));
        assert_eq!(cnf.num_bins(), 1);
        assert!(cnf.bins[l(0, true).raw() as usize].contains(&l(1, true)));
        assert!(cnf.bins[l(1, false).raw() as usize].contains(&l(0, false)));
    }

    #[test]
    fn and_gate_forces_conjunction() {
        let mut cnf = Cnf::new(3);
        let out = l(0, false);
        let a = l(1, false);
        let b = l(2, false);
        cnf.add_and(out, a, b);
        cnf.add_unary(a);
        cnf.add_unary(b);
        // out is forced true only via clause (out, !a, !b) once a,b are units;
        // here we just check the raw clauses were recorded without crashing.
        assert!(cnf.num_long() + cnf.num_bins() + cnf.num_units() > 0);
    }
}
