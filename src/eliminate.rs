//! Bounded variable elimination, blocked-clause elimination and
//! pure-literal elimination.
//!
//! Grounded on `original_source/src/sat/elimination.cpp`. Eliminating a
//! variable `v` replaces every clause mentioning it with the resolvents
//! of each positive/negative pair, dropping `v` entirely; a guard on
//! occurrence-list size keeps this from blowing up the formula, and every
//! removed clause is recorded on the [`crate::reconstruction::Reconstruction`]
//! stack (pivoted on `v`) so a model can be lifted back afterwards. A
//! variable can occur in both the long-clause arena and `cnf.bins`, so
//! occurrence lists carry both shapes rather than just `CRef`s.

use crate::cnf::Cnf;
use crate::lit::{CRef, Lit, Var};
use crate::reconstruction::Reconstruction;
use log::info;

const OCC_LIMIT: usize = 10;

/// One clause mentioning a pivot variable, filed under whichever of that
/// variable's two literals the clause carries. A long clause lives in the
/// arena and is addressed by `CRef`; a binary clause has no arena entry at
/// all, so it's represented by just its other literal — the pivot's own
/// literal is implied by which occurrence list (`pos`/`neg`) it's filed
/// under.
#[derive(Clone, Copy)]
enum Occ {
    Long(CRef),
    Binary(Lit),
}

impl Occ {
    /// `true` if this occurrence has already been removed from the
    /// formula. `pivot_lit` is the literal this occurrence was filed
    /// under (the pivot's own polarity in this clause).
    fn removed(self, cnf: &Cnf, pivot_lit: Lit) -> bool {
        match self {
            Occ::Long(cref) => cnf.clauses.get(cref).removed(),
            Occ::Binary(other) => !cnf.bins[pivot_lit.neg().raw() as usize].contains(&other),
        }
    }

    /// This occurrence's clause literals.
    fn lits(self, cnf: &Cnf, pivot_lit: Lit) -> Vec<Lit> {
        match self {
            Occ::Long(cref) => cnf.clauses.lits(cref).to_vec(),
            Occ::Binary(other) => vec![pivot_lit, other],
        }
    }
}

/// Physically delete binary clause `(a ∨ b)` from both of its entries in
/// `cnf.bins`.
fn remove_binary(cnf: &mut Cnf, a: Lit, b: Lit) {
    cnf.bins[a.neg().raw() as usize].retain(|&x| x != b);
    cnf.bins[b.neg().raw() as usize].retain(|&x| x != a);
}

/// `true` if resolving clauses `a` and `b` over their shared, oppositely
/// signed variable produces a tautology (some other variable appears with
/// both signs across the two clauses).
fn resolvent_is_tautological(a: &[Lit], b: &[Lit], pivot: Var) -> bool {
    for &la in a {
        if la.var() == pivot {
            continue;
        }
        for &lb in b {
            if lb.var() == pivot {
                continue;
            }
            if la.var() == lb.var() && la != lb {
                return true;
            }
        }
    }
    false
}

fn resolvent(a: &[Lit], b: &[Lit], pivot: Var) -> Vec<Lit> {
    let mut out: Vec<Lit> = a
        .iter()
        .chain(b.iter())
        .copied()
        .filter(|l| l.var() != pivot)
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

struct Occurrences {
    pos: Vec<Vec<Occ>>,
    neg: Vec<Vec<Occ>>,
}

impl Occurrences {
    fn build(cnf: &Cnf) -> Occurrences {
        let n = cnf.num_vars as usize;
        let mut pos = vec![Vec::new(); n];
        let mut neg = vec![Vec::new(); n];
        for cref in cnf.clauses.iter() {
            for &l in cnf.clauses.lits(cref) {
                if l.sign() {
                    neg[l.var() as usize].push(Occ::Long(cref));
                } else {
                    pos[l.var() as usize].push(Occ::Long(cref));
                }
            }
        }
        for v in 0..n as u32 {
            // `bins[Lit::new(v, true).raw()]` holds every `other` with
            // clause `(v, other)` present — a positive occurrence of `v`.
            for &other in &cnf.bins[Lit::new(v, true).raw() as usize] {
                pos[v as usize].push(Occ::Binary(other));
            }
            // symmetrically, `bins[Lit::new(v, false).raw()]` holds every
            // `other` with clause `(!v, other)` present.
            for &other in &cnf.bins[Lit::new(v, false).raw() as usize] {
                neg[v as usize].push(Occ::Binary(other));
            }
        }
        Occurrences { pos, neg }
    }
}

/// Score a candidate elimination: `None` if the variable should not be
/// eliminated (score would only grow the formula), `Some(new_clause_count)`
/// otherwise, alongside the would-be resolvents (so a second pass isn't
/// needed to actually perform the elimination).
fn try_eliminate_var(cnf: &Cnf, occ: &Occurrences, v: Var) -> Option<Vec<Vec<Lit>>> {
    let p = &occ.pos[v as usize];
    let n = &occ.neg[v as usize];
    if p.is_empty() || n.is_empty() {
        return Some(Vec::new()); // pure literal, handled separately, but
                                  // harmless to report zero resolvents here
    }
    if p.len() > OCC_LIMIT && n.len() > OCC_LIMIT {
        return None;
    }

    let p_lit = Lit::new(v, false);
    let n_lit = Lit::new(v, true);

    let mut resolvents = Vec::new();
    for &po in p {
        if po.removed(cnf, p_lit) {
            continue;
        }
        let a = po.lits(cnf, p_lit);
        for &no in n {
            if no.removed(cnf, n_lit) {
                continue;
            }
            let b = no.lits(cnf, n_lit);
            if resolvent_is_tautological(&a, &b, v) {
                continue;
            }
            resolvents.push(resolvent(&a, &b, v));
        }
    }

    if resolvents.len() > p.len() + n.len() {
        None // growth guard: elimination would add more clauses than it removes
    } else {
        Some(resolvents)
    }
}

/// Run one bounded-variable-elimination sweep over every variable not yet
/// eliminated, recording each removal on `recon`. Returns every variable
/// eliminated this sweep, so the caller can renumber them out of the
/// formula entirely.
pub fn run_bve(cnf: &mut Cnf, recon: &mut Reconstruction, eliminated: &mut Vec<bool>) -> Vec<Var> {
    let mut newly_eliminated = Vec::new();
    for v in 0..cnf.num_vars {
        if eliminated[v as usize] || cnf.contradiction {
            continue;
        }
        let occ = Occurrences::build(cnf);
        let resolvents = match try_eliminate_var(cnf, &occ, v) {
            Some(r) => r,
            None => continue,
        };

        let p = &occ.pos[v as usize];
        let n = &occ.neg[v as usize];
        if p.is_empty() && n.is_empty() {
            continue; // variable does not occur at all
        }

        let p_lit = Lit::new(v, false);
        let n_lit = Lit::new(v, true);

        // record reconstruction rules for every removed clause, pivoted on
        // the polarity of `v` that clause carries, then remove it —
        // whether it lives in the arena or as a binary adjacency entry
        for &po in p {
            if po.removed(cnf, p_lit) {
                continue;
            }
            recon.add_rule(po.lits(cnf, p_lit), p_lit);
            match po {
                Occ::Long(cref) => cnf.clauses.set_removed(cref),
                Occ::Binary(other) => remove_binary(cnf, p_lit, other),
            }
        }
        for &no in n {
            if no.removed(cnf, n_lit) {
                continue;
            }
            recon.add_rule(no.lits(cnf, n_lit), n_lit);
            match no {
                Occ::Long(cref) => cnf.clauses.set_removed(cref),
                Occ::Binary(other) => remove_binary(cnf, n_lit, other),
            }
        }

        for r in resolvents {
            cnf.add_clause(&r, true);
        }
        eliminated[v as usize] = true;
        newly_eliminated.push(v);
    }
    info!(
        target: "dawnsat::eliminate",
        "BVE eliminated {} variables",
        newly_eliminated.len()
    );
    newly_eliminated
}

/// Pure-literal elimination: any variable occurring with only one polarity
/// can be fixed to satisfy every clause it appears in.
pub fn run_pure_literal(cnf: &mut Cnf, eliminated: &mut Vec<bool>) -> usize {
    let occ = Occurrences::build(cnf);
    let mut count = 0;
    for v in 0..cnf.num_vars {
        if eliminated[v as usize] {
            continue;
        }
        let has_pos = !occ.pos[v as usize].is_empty();
        let has_neg = !occ.neg[v as usize].is_empty();
        if has_pos != has_neg {
            cnf.add_unary(Lit::new(v, !has_pos));
            eliminated[v as usize] = true;
            count += 1;
        }
    }
    count
}

/// A clause is blocked on literal `l` if every resolvent of it against a
/// clause containing `l.neg()` is tautological; such a clause can be
/// removed without affecting satisfiability (its absence is covered by
/// the existing assignment freedom on `l`'s variable).
pub fn run_bce(cnf: &mut Cnf, recon: &mut Reconstruction) -> usize {
    let occ = Occurrences::build(cnf);
    let mut removed = 0;
    for cref in cnf.clauses.iter().collect::<Vec<_>>() {
        if cnf.clauses.get(cref).removed() {
            continue;
        }
        let lits = cnf.clauses.lits(cref).to_vec();
        for &l in &lits {
            let opposite_lit = l.neg();
            let opposite = if l.sign() {
                &occ.pos[l.var() as usize]
            } else {
                &occ.neg[l.var() as usize]
            };
            let blocked = opposite.iter().all(|&other| {
                if other.removed(cnf, opposite_lit) {
                    return true;
                }
                resolvent_is_tautological(&lits, &other.lits(cnf, opposite_lit), l.var())
            });
            if blocked {
                recon.add_rule(lits.clone(), l);
                cnf.clauses.set_removed(cref);
                removed += 1;
                break;
            }
        }
    }
    info!(target: "dawnsat::eliminate", "BCE removed {} clauses", removed);
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l(v: u32, s: bool) -> Lit {
        Lit::new(v, s)
    }

    #[test]
    fn bve_removes_eliminated_variable_clauses() {
        let mut cnf = Cnf::new(3);
        cnf.add_long(&[l(0, false), l(1, false)], false);
        cnf.add_long(&[l(0, true), l(2, false)], false);
        let mut recon = Reconstruction::new(3);
        let mut eliminated = vec![false; 3];
        let newly = run_bve(&mut cnf, &mut recon, &mut eliminated);
        assert_eq!(newly, vec![0]);
        assert!(eliminated[0]);
        for cref in cnf.clauses.iter() {
            assert!(!cnf.clauses.lits(cref).iter().any(|l| l.var() == 0));
        }
    }

    #[test]
    fn bve_resolves_virtual_binary_occurrence() {
        // v occurs positively only in a long clause, negatively only in a
        // binary clause: the required resolvent (a v c v d) must be
        // generated and the binary clause must not survive v's removal.
        let mut cnf = Cnf::new(4);
        let v = 1;
        cnf.add_long(&[l(0, false), l(v, false), l(2, false)], false); // a v v v c
        cnf.add_binary(l(v, true), l(3, false)); // !v v d
        let mut recon = Reconstruction::new(4);
        let mut eliminated = vec![false; 4];
        let newly = run_bve(&mut cnf, &mut recon, &mut eliminated);
        assert_eq!(newly, vec![v]);
        assert!(cnf.bins[l(v, false).raw() as usize].is_empty());
        assert!(cnf.bins[l(v, true).raw() as usize].is_empty());
        let mut found = false;
        for cref in cnf.clauses.iter() {
            let lits = cnf.clauses.lits(cref);
            assert!(!lits.iter().any(|x| x.var() == v));
            if lits.len() == 3
                && lits.contains(&l(0, false))
                && lits.contains(&l(2, false))
                && lits.contains(&l(3, false))
            {
                found = true;
            }
        }
        assert!(found, "resolvent (a v c v d) must survive elimination");
    }

    #[test]
    fn pure_literal_forces_unit() {
        let mut cnf = Cnf::new(2);
        cnf.add_long(&[l(0, false), l(1, false)], false);
        cnf.add_long(&[l(0, false), l(1, true)], false);
        let mut eliminated = vec![false; 2];
        let n = run_pure_literal(&mut cnf, &mut eliminated);
        assert_eq!(n, 1);
        assert!(cnf.units.contains(&l(0, false)));
    }
}
