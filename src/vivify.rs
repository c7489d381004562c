//! Clause vivification: shrink a clause by propagating the negation of
//! its other literals and seeing how much of it was actually needed.
//!
//! Grounded on `original_source/src/sat/vivification.cpp`. For a clause
//! `(l0 ∨ l1 ∨ ... ∨ lk)`, propagating `¬l0, ¬l1, ..., ¬l(i-1)` and
//! hitting a conflict before reaching `li` means the clause is implied by
//! a prefix and can be truncated there; propagating all the way through
//! without conflict but then finding `¬li` itself forces a conflict means
//! `li` was forced and the whole tail can be dropped.

use crate::assign::PropEngine;
use crate::cnf::Cnf;
use crate::interrupt::Interrupt;
use crate::lit::{CRef, Lit};
use log::info;

fn vivify_clause(cnf: &mut Cnf, lits: &[Lit]) -> Option<Vec<Lit>> {
    let mut buf = lits.to_vec();
    let mut changed = false;
    let mut i = 0;
    while i < buf.len() {
        let mut engine = PropEngine::new(cnf);
        engine.push_mark();
        let negated_tail: Vec<Lit> = buf[i + 1..].to_vec();
        let start = engine.trail.len();
        for &t in &negated_tail {
            if engine.conflict.is_some() {
                break;
            }
            if engine.value(t.neg()) == Some(true) {
                continue;
            }
            if engine.value(t.neg()) == Some(false) {
                engine.conflict = Some(crate::assign::Conflict::Binary(t, t));
                break;
            }
            engine.set(t.neg(), crate::lit::Reason::undef());
        }
        if engine.conflict.is_none() {
            engine.propagate_full(start);
        }

        if engine.conflict.is_some() {
            drop(engine);
            // everything from i..end was unnecessary; truncate here
            changed = true;
            buf.truncate(i);
            break;
        }
        drop(engine);
        i += 1;
    }
    if changed {
        Some(buf)
    } else {
        None
    }
}

pub struct VivifyConfig {
    pub irred_only: bool,
    /// Polled at the top of the per-clause loop; set by the CLI's signal
    /// handler.
    pub interrupt: Option<Interrupt>,
}

impl Default for VivifyConfig {
    fn default() -> VivifyConfig {
        VivifyConfig {
            irred_only: true,
            interrupt: None,
        }
    }
}

/// Vivify every long clause (optionally only irredundant ones). Returns
/// the number of clauses shortened.
pub fn run_vivification(cnf: &mut Cnf, config: &VivifyConfig) -> usize {
    let mut shortened = 0;
    let targets: Vec<CRef> = cnf.clauses.iter().collect();
    for cref in targets {
        if let Some(intr) = &config.interrupt {
            if intr.is_set() {
                break;
            }
        }
        if cnf.clauses.get(cref).removed() {
            continue;
        }
        if config.irred_only && !cnf.clauses.get(cref).irred() {
            continue;
        }
        let lits = cnf.clauses.lits(cref).to_vec();
        if let Some(new_lits) = vivify_clause(cnf, &lits) {
            shortened += 1;
            let irred = cnf.clauses.get(cref).irred();
            cnf.clauses.set_removed(cref);
            if new_lits.is_empty() {
                cnf.add_empty();
            } else {
                cnf.add_clause(&new_lits, !irred);
            }
        }
    }
    info!(target: "dawnsat::vivify", "vivification shortened {} clauses", shortened);
    shortened
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l(v: u32, s: bool) -> Lit {
        Lit::new(v, s)
    }

    #[test]
    fn redundant_tail_literal_is_dropped() {
        // (x0 v x1 v x2), with x0 -> x1 as a binary clause makes x2
        // redundant whenever x0 is false and x1 is false is impossible,
        // so propagating !x1 alone after !x0 already conflicts via the
        // binary clause, truncating the tail.
        let mut cnf = Cnf::new(3);
        cnf.add_binary(l(0, false), l(1, false)); // !x0 -> x1
        cnf.add_long(&[l(0, false), l(1, false), l(2, false)], false);
        let shortened = run_vivification(
            &mut cnf,
            &VivifyConfig {
                irred_only: false,
                interrupt: None,
            },
        );
        assert!(shortened >= 1);
    }
}
