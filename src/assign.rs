//! Three-valued assignment, trail, watch lists and unit propagation.
//!
//! Grounded on `original_source/src/sat/propengine.h` and `propengine.cpp`.
//! `PropEngine` there keeps two propagation paths — a cheap binary-only
//! sweep and a full sweep that also walks watch lists for long clauses —
//! and this module keeps the same split (`propagate_binary` /
//! `propagate_full`) since probing and vivification only ever need the
//! binary-only variant on their light engine (see `src/probe.rs`).

use crate::cnf::Cnf;
use crate::lit::{CRef, Lit, Reason, Var};

/// Either end of a falsified clause, recorded without copying long clauses
/// out of the arena.
#[derive(Clone, Copy)]
pub enum Conflict {
    Binary(Lit, Lit),
    Long(CRef),
}

/// Trail-based CDCL propagation state: current assignment, per-variable
/// reason, decision-level marks and long-clause watch lists.
pub struct PropEngine<'a> {
    pub cnf: &'a mut Cnf,
    /// `None` = unassigned, `Some(sign)` = assigned with that sign (`false`
    /// = true literal assigned, matching `Lit::sign()`'s convention).
    assign: Vec<Option<bool>>,
    reason: Vec<Reason>,
    trail_pos: Vec<u32>,
    pub trail: Vec<Lit>,
    /// Index into `trail` where each decision level began.
    mark: Vec<u32>,
    /// Watch lists for long clauses only; binary clauses are propagated
    /// directly from `cnf.bins` and need no watch bookkeeping.
    watches: Vec<Vec<CRef>>,
    pub conflict: Option<Conflict>,
}

impl<'a> PropEngine<'a> {
    pub fn new(cnf: &'a mut Cnf) -> PropEngine<'a> {
        let n = cnf.num_vars as usize;
        let mut p = PropEngine {
            cnf,
            assign: vec![None; n],
            reason: vec![Reason::undef(); n],
            trail_pos: vec![u32::MAX; n],
            trail: Vec::new(),
            mark: vec![0],
            watches: vec![Vec::new(); cnf.num_lits()],
            conflict: None,
        };
        p.init_watches();
        p
    }

    fn init_watches(&mut self) {
        for cref in self.cnf.clauses.iter() {
            self.watch_clause(cref);
        }
    }

    /// Register watches for a clause added to the arena after this engine
    /// was constructed (e.g. a freshly learnt clause).
    pub fn watch_clause(&mut self, cref: CRef) {
        let lits = self.cnf.clauses.lits(cref);
        if lits.len() >= 2 {
            self.watches[lits[0].raw() as usize].push(cref);
            self.watches[lits[1].raw() as usize].push(cref);
        }
    }

    #[inline]
    pub fn level(&self) -> usize {
        self.mark.len() - 1
    }

    #[inline]
    pub fn value(&self, l: Lit) -> Option<bool> {
        self.assign[l.var() as usize].map(|s| s == l.sign())
    }

    #[inline]
    pub fn is_assigned(&self, l: Lit) -> bool {
        self.assign[l.var() as usize].is_some()
    }

    #[inline]
    pub fn reason(&self, v: Var) -> Reason {
        self.reason[v as usize]
    }

    #[inline]
    pub fn trail_pos(&self, v: Var) -> u32 {
        self.trail_pos[v as usize]
    }

    /// Assign `x` true with the given reason. `x` must be currently
    /// unassigned.
    pub fn set(&mut self, x: Lit, r: Reason) {
        debug_assert!(self.assign[x.var() as usize].is_none());
        self.assign[x.var() as usize] = Some(x.sign());
        self.reason[x.var() as usize] = r;
        self.trail_pos[x.var() as usize] = self.trail.len() as u32;
        self.trail.push(x);
    }

    /// Propagate using only binary clauses (a plain BFS over `cnf.bins`),
    /// stopping at the first conflict.
    pub fn propagate_binary(&mut self, start: usize) {
        let mut i = start;
        while i < self.trail.len() {
            let x = self.trail[i];
            for &y in &self.cnf.bins[x.raw() as usize] {
                match self.value(y) {
                    Some(true) => continue,
                    Some(false) => {
                        self.conflict = Some(Conflict::Binary(x.neg(), y));
                        return;
                    }
                    None => self.set(y, Reason::binary(x.neg())),
                }
            }
            i += 1;
        }
    }

    /// Full propagation: binary clauses first, then long-clause watch
    /// lists, matching `PropEngine::propagateFull`'s order.
    pub fn propagate_full(&mut self, start: usize) {
        self.propagate_binary(start);
        if self.conflict.is_some() {
            return;
        }
        let mut i = start;
        while i < self.trail.len() {
            let x = self.trail[i];
            let false_lit = x.neg();
            let mut j = 0;
            // swap-remove-in-place walk over the watch list for `false_lit`
            while j < self.watches[false_lit.raw() as usize].len() {
                let cref = self.watches[false_lit.raw() as usize][j];
                if self.propagate_clause(cref, false_lit) {
                    j += 1;
                } else {
                    self.watches[false_lit.raw() as usize].swap_remove(j);
                }
                if self.conflict.is_some() {
                    return;
                }
            }
            i += 1;
        }
    }

    /// Try to re-establish the watch invariant for `cref` after `false_lit`
    /// became false. Returns `true` if `cref` should stay on `false_lit`'s
    /// watch list (no replacement literal was found).
    ///
    /// The clause's first two literals are always its two watched
    /// literals; when `false_lit` sits at index 0 it is swapped to index 1
    /// first, exactly as `PropEngine::propagateFull`'s `c[0]==y.neg()` swap
    /// does, so the scan below only ever needs to special-case index 0.
    fn propagate_clause(&mut self, cref: CRef, false_lit: Lit) -> bool {
        if self.cnf.clauses.lits(cref)[0] == false_lit {
            self.cnf.clauses.swap_lits(cref, 0, 1);
        }
        let c0 = self.cnf.clauses.lits(cref)[0];
        if self.value(c0) == Some(true) {
            return true; // already satisfied via the other watch
        }
        let size = self.cnf.clauses.lits(cref).len();
        for k in 2..size {
            let lk = self.cnf.clauses.lits(cref)[k];
            if self.value(lk) != Some(false) {
                self.cnf.clauses.swap_lits(cref, 1, k);
                self.watches[lk.raw() as usize].push(cref);
                return false;
            }
        }
        match self.value(c0) {
            Some(false) => {
                self.conflict = Some(Conflict::Long(cref));
                true
            }
            None => {
                self.set(c0, Reason::long(cref));
                true
            }
            Some(true) => true,
        }
    }

    /// Open a new decision level.
    pub fn push_mark(&mut self) {
        self.mark.push(self.trail.len() as u32);
    }

    /// Assign `x` as a new decision and propagate its consequences.
    pub fn branch(&mut self, x: Lit) {
        self.push_mark();
        let start = self.trail.len();
        self.set(x, Reason::undef());
        self.propagate_full(start);
    }

    /// Pop back to decision level `target_level`, undoing every
    /// assignment made since.
    pub fn unroll(&mut self, target_level: usize) {
        debug_assert!(target_level <= self.level());
        let cut = self.mark[target_level + 1..target_level + 2]
            .first()
            .copied()
            .unwrap_or(self.trail.len() as u32);
        while self.trail.len() as u32 > cut {
            let x = self.trail.pop().unwrap();
            self.assign[x.var() as usize] = None;
            self.trail_pos[x.var() as usize] = u32::MAX;
        }
        self.mark.truncate(target_level + 1);
        self.conflict = None;
    }

    /// Conflict clause literals, materialized into a fresh vector (binary
    /// conflicts are synthesized; long ones borrow directly from the arena
    /// then copy so the caller can mutate the trail while holding them).
    pub fn conflict_lits(&self) -> Vec<Lit> {
        match self.conflict.expect("conflict_lits called without a conflict") {
            Conflict::Binary(a, b) => vec![a, b],
            Conflict::Long(cref) => self.cnf.clauses.lits(cref).to_vec(),
        }
    }

    pub fn num_vars(&self) -> u32 {
        self.cnf.num_vars
    }

    /// Trail index at which decision level `level` begins (`mark[level]`).
    pub fn trail_pos_of_level_start(&self, level: usize) -> u32 {
        self.mark[level]
    }

    /// The decision level a (currently assigned) variable was set at.
    pub fn level_of(&self, v: Var) -> usize {
        let pos = self.trail_pos[v as usize];
        debug_assert!(pos != u32::MAX);
        match self.mark.binary_search(&pos) {
            Ok(i) => i,
            Err(i) => i - 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lit::Lit;

    fn l(v: u32, s: bool) -> Lit {
        Lit::new(v, s)
    }

    #[test]
    fn binary_unit_propagation() {
        let mut cnf = Cnf::new(2);
        cnf.add_binary(l(0, true), l(1, false)); // x0 -> x1
        let mut p = PropEngine::new(&mut cnf);
        p.branch(l(0, false));
        assert!(p.conflict.is_none());
        assert_eq!(p.value(l(1, false)), Some(true));
    }

    #[test]
    fn binary_conflict_detected() {
        let mut cnf = Cnf::new(2);
        cnf.add_binary(l(0, true), l(1, false)); // x0 -> x1
        cnf.add_binary(l(0, true), l(1, true)); // x0 -> !x1
        let mut p = PropEngine::new(&mut cnf);
        p.branch(l(0, false));
        assert!(p.conflict.is_some());
    }

    #[test]
    fn long_clause_propagates_last_literal() {
        let mut cnf = Cnf::new(3);
        cnf.add_long(&[l(0, true), l(1, true), l(2, false)], false);
        let mut p = PropEngine::new(&mut cnf);
        p.branch(l(0, false));
        p.branch(l(1, false));
        assert!(p.conflict.is_none());
        assert_eq!(p.value(l(2, false)), Some(true));
    }

    #[test]
    fn unroll_restores_previous_level() {
        let mut cnf = Cnf::new(2);
        cnf.add_binary(l(0, true), l(1, false));
        let mut p = PropEngine::new(&mut cnf);
        p.branch(l(0, false));
        assert_eq!(p.level(), 1);
        p.unroll(0);
        assert_eq!(p.level(), 0);
        assert!(!p.is_assigned(l(0, false)));
        assert!(!p.is_assigned(l(1, false)));
    }
}
