//! First-UIP conflict analysis.
//!
//! Grounded on `original_source/src/sat/propengine.cpp`'s `analyzeConflict`:
//! literals touching the conflict are pushed into a max-priority-queue
//! keyed by trail position, so the most recently assigned literal is
//! always resolved next. A literal is frozen into the learnt clause once
//! the queue only contains literals from strictly lower decision levels
//! than the current one; everything else gets resolved away via its
//! reason clause.

use crate::assign::{Conflict, PropEngine};
use crate::lit::{Lit, Reason};
use std::collections::BinaryHeap;

#[derive(Clone, Copy, Eq, PartialEq)]
struct QueueItem {
    trail_pos: u32,
    lit: Lit,
}

impl Ord for QueueItem {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.trail_pos.cmp(&other.trail_pos)
    }
}
impl PartialOrd for QueueItem {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Result of analyzing one conflict: the learnt clause (asserting literal
/// first is not guaranteed here — callers reorder so the highest-level
/// literal sits at index 1 for clause-watch purposes) and the level to
/// backtrack to.
pub struct Analysis {
    pub learnt: Vec<Lit>,
    pub backtrack_level: usize,
}

/// Analyze the current conflict in `p`, bumping variable activity for
/// every literal resolved over via `bump`. `p.level()` must be > 0.
pub fn analyze(p: &PropEngine, mut bump: impl FnMut(Lit)) -> Analysis {
    let conflict_lits = p.conflict_lits();
    let mut queue: BinaryHeap<QueueItem> = BinaryHeap::new();
    let mut in_queue = vec![false; p.num_vars() as usize];
    let mut learnt = Vec::new();

    // first trail index belonging to the conflict's (highest) decision level
    let current_level_start = p.trail_pos_of_level_start(p.level());
    // how many literals currently enqueued belong to the conflict level;
    // the queue's max-trail-pos ordering guarantees every current-level
    // literal is popped before any lower-level one, so this reaches zero
    // exactly when the first UIP is popped.
    let mut pending_at_current_level = 0u32;

    let mut push_lit = |l: Lit,
                        queue: &mut BinaryHeap<QueueItem>,
                        in_queue: &mut [bool],
                        pending: &mut u32,
                        bump: &mut dyn FnMut(Lit)| {
        let v = l.var() as usize;
        if !in_queue[v] {
            in_queue[v] = true;
            bump(l);
            if p.trail_pos(l.var()) >= current_level_start {
                *pending += 1;
            }
            queue.push(QueueItem {
                trail_pos: p.trail_pos(l.var()),
                lit: l,
            });
        }
    };

    for &l in &conflict_lits {
        push_lit(
            l,
            &mut queue,
            &mut in_queue,
            &mut pending_at_current_level,
            &mut bump,
        );
    }

    let uip = loop {
        let top = queue
            .pop()
            .expect("conflict analysis ran out of literals before reaching a UIP");
        in_queue[top.lit.var() as usize] = false;

        if top.trail_pos >= current_level_start {
            pending_at_current_level -= 1;
            if pending_at_current_level == 0 {
                break top.lit; // this was the last current-level literal: the UIP
            }
        } else {
            // already below the conflict level: part of the learnt clause
            // as-is, no further resolution needed
            learnt.push(top.lit);
            continue;
        }

        let reason = p.reason(top.lit.var());
        if reason.is_binary() {
            push_lit(
                reason.lit(),
                &mut queue,
                &mut in_queue,
                &mut pending_at_current_level,
                &mut bump,
            );
        } else if reason.is_long() {
            let lits = p.cnf.clauses.lits(reason.cref())[1..].to_vec();
            for l in lits {
                push_lit(
                    l,
                    &mut queue,
                    &mut in_queue,
                    &mut pending_at_current_level,
                    &mut bump,
                );
            }
        }
    };

    // `uip` becomes the asserting literal, always at index 0; every
    // remaining queued item is a lower-level literal already collected
    // above via the `else` arm, or still pending drainage below.
    while let Some(top) = queue.pop() {
        learnt.push(top.lit);
    }
    learnt.insert(0, uip);

    let backtrack_level = compute_backtrack_level(p, &learnt);
    Analysis {
        learnt,
        backtrack_level,
    }
}

fn compute_backtrack_level(p: &PropEngine, learnt: &[Lit]) -> usize {
    if learnt.len() <= 1 {
        return 0;
    }
    let second_highest_pos = learnt[1..]
        .iter()
        .map(|&l| p.trail_pos(l.var()))
        .max()
        .unwrap_or(0);
    for level in (0..p.level()).rev() {
        if p.trail_pos_of_level_start(level + 1) <= second_highest_pos {
            return level + 1;
        }
    }
    0
}

/// On-the-fly clause minimization: drop any literal from `learnt` whose
/// reason is already implied by the other literals still in the clause
/// (direct, non-recursive form — checks only that every antecedent of a
/// candidate literal is itself in `learnt`).
pub fn minimize(p: &PropEngine, learnt: &mut Vec<Lit>) {
    if learnt.len() <= 1 {
        return;
    }
    let in_learnt: std::collections::HashSet<Lit> = learnt.iter().copied().collect();
    let mut keep = vec![true; learnt.len()];
    for (i, &l) in learnt.iter().enumerate() {
        if i == 0 {
            continue; // never drop the asserting literal
        }
        let reason = p.reason(l.var());
        let redundant = if reason.is_binary() {
            in_learnt.contains(&reason.lit().neg())
        } else if reason.is_long() {
            p.cnf.clauses.lits(reason.cref())[1..]
                .iter()
                .all(|&a| in_learnt.contains(&a.neg()))
        } else {
            false
        };
        if redundant {
            keep[i] = false;
        }
    }
    let mut j = 0;
    for i in 0..learnt.len() {
        if keep[i] {
            learnt[j] = learnt[i];
            j += 1;
        }
    }
    learnt.truncate(j);
}

/// Glue (literal-block distance): number of distinct decision levels
/// represented among a clause's literals. Lower is considered a better
/// (more reusable) learnt clause.
pub fn glue(p: &PropEngine, lits: &[Lit]) -> u32 {
    let mut levels: Vec<usize> = lits
        .iter()
        .filter(|&&l| p.trail_pos(l.var()) != u32::MAX)
        .map(|&l| p.level_of(l.var()))
        .collect();
    levels.sort_unstable();
    levels.dedup();
    levels.len() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cnf::Cnf;

    fn l(v: u32, s: bool) -> Lit {
        Lit::new(v, s)
    }

    #[test]
    fn learns_unit_from_binary_chain_conflict() {
        // x0 -> x1, x0 -> !x1  : branching x0 should conflict and learn !x0
        let mut cnf = Cnf::new(2);
        cnf.add_binary(l(0, true), l(1, false));
        cnf.add_binary(l(0, true), l(1, true));
        let mut p = PropEngine::new(&mut cnf);
        p.branch(l(0, false));
        assert!(p.conflict.is_some());
        let a = analyze(&p, |_| {});
        assert_eq!(a.learnt, vec![l(0, true)]);
        assert_eq!(a.backtrack_level, 0);
    }
}
