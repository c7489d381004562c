//! Failed-literal probing with hyper-binary resolution.
//!
//! Grounded on `original_source/src/sat/probing.{h,cpp}`: only root
//! literals (those with no binary clauses pointing into them, i.e. no
//! existing implication forces them) are tried. Probing a literal `p`
//! that leads to a conflict means `¬p` is implied by the formula and is
//! added as a unit; a probe that survives produces, for every literal `x`
//! propagated as a consequence of `p`, the valid binary clause `(¬p ∨ x)`
//! — a cheap stand-in for full hyper-binary resolution, which derives the
//! same clauses by resolving away the propagation chain's intermediate
//! clauses instead of simply reading the trail.

use crate::assign::PropEngine;
use crate::cnf::Cnf;
use crate::lit::Lit;
use log::info;

pub struct ProbeConfig {
    pub hyper_binary_resolution: bool,
    pub max_tries: usize,
}

impl Default for ProbeConfig {
    fn default() -> ProbeConfig {
        ProbeConfig {
            hyper_binary_resolution: true,
            max_tries: usize::MAX,
        }
    }
}

/// `true` if `lit` has no literal in its own binary clauses pointing at it
/// that would make it a non-root, i.e. this variable is sensible to try
/// probing before its neighbours.
fn is_probe_root(cnf: &Cnf, lit: Lit) -> bool {
    cnf.bins[lit.neg().raw() as usize].is_empty()
}

/// Run one sweep of failed-literal probing. Returns the number of units
/// derived (failed literals) plus hyper-binary clauses added.
pub fn run_probing(cnf: &mut Cnf, config: &ProbeConfig) -> usize {
    let mut derived = 0;
    let mut tries = 0;
    let candidates: Vec<Lit> = cnf
        .all_lits()
        .filter(|&l| is_probe_root(cnf, l))
        .collect();

    for p in candidates {
        if tries >= config.max_tries || cnf.contradiction {
            break;
        }
        if p.var() as u32 >= cnf.num_vars {
            continue;
        }
        tries += 1;

        let mut engine = PropEngine::new(cnf);
        if engine.is_assigned(p) {
            continue;
        }
        engine.branch(p);
        if engine.conflict.is_some() {
            drop(engine);
            cnf.add_unary(p.neg());
            derived += 1;
            continue;
        }

        if config.hyper_binary_resolution {
            let trail_snapshot: Vec<Lit> = engine.trail[1..].to_vec();
            drop(engine);
            for x in trail_snapshot {
                if x.var() == p.var() {
                    continue;
                }
                if !cnf.bins[p.raw() as usize].contains(&x) {
                    cnf.add_binary(p.neg(), x);
                    derived += 1;
                }
            }
        }
    }

    info!(target: "dawnsat::probe", "probing derived {} facts", derived);
    derived
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l(v: u32, s: bool) -> Lit {
        Lit::new(v, s)
    }

    #[test]
    fn probing_finds_failed_literal() {
        let mut cnf = Cnf::new(2);
        // x0 -> x1, x0 -> !x1  => x0 is a failed literal
        cnf.add_binary(l(0, true), l(1, false));
        cnf.add_binary(l(0, true), l(1, true));
        let derived = run_probing(&mut cnf, &ProbeConfig::default());
        assert!(derived >= 1);
        assert!(cnf.units.contains(&l(0, true)));
    }

    #[test]
    fn probing_survives_consistent_formula() {
        let mut cnf = Cnf::new(2);
        cnf.add_binary(l(0, true), l(1, false));
        run_probing(&mut cnf, &ProbeConfig::default());
        assert!(!cnf.contradiction);
    }
}
