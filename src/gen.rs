//! Random instance generators.
//!
//! Grounded on `original_source/src/commands/gen.cpp` (random 3-SAT, built
//! by first fixing a random solution, then generating clauses satisfied
//! by it so the instance is guaranteed SAT) and `gen_hard.cpp`
//! (group/partition "at-most-one, at-least-one" structured instances,
//! the pigeonhole-like family used for hard UNSAT benchmarks).

use crate::cnf::Cnf;
use crate::lit::Lit;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Default clause/variable ratio at the 3-SAT phase transition.
pub const DEFAULT_RATIO_3SAT: f64 = 4.26;

/// Generate a random 3-SAT instance over `num_vars` variables at the
/// given clause/variable ratio, guaranteed satisfiable by construction:
/// a random solution is fixed first, then every generated clause is
/// required to be satisfied by it.
pub fn gen_3sat(num_vars: u32, ratio: f64, seed: u64) -> Cnf {
    let mut rng = StdRng::seed_from_u64(seed);
    let solution: Vec<bool> = (0..num_vars).map(|_| rng.gen_bool(0.5)).collect();
    let num_clauses = (num_vars as f64 * ratio).round() as u32;

    let mut cnf = Cnf::new(num_vars);
    for _ in 0..num_clauses {
        loop {
            let mut vars = [0u32; 3];
            for slot in vars.iter_mut() {
                *slot = rng.gen_range(0..num_vars);
            }
            if vars[0] == vars[1] || vars[1] == vars[2] || vars[0] == vars[2] {
                continue; // resample degenerate clauses (repeated variable)
            }
            let satisfying_idx = rng.gen_range(0..3);
            let lits: Vec<Lit> = vars
                .iter()
                .enumerate()
                .map(|(i, &v)| {
                    let want_true = i == satisfying_idx;
                    Lit::new(v, want_true != solution[v as usize])
                })
                .collect();
            cnf.add_clause(&lits, false);
            break;
        }
    }
    cnf
}

/// Generate a structured "at-most-one-per-group, at-least-one-per-partition"
/// instance: `num_groups` disjoint groups of `group_size` boolean
/// variables each, every group required to pick exactly one member, with
/// groups further partitioned pigeonhole-style to force a conflict.
///
/// With `num_groups > group_size` this reproduces the pigeonhole
/// principle (`num_groups` pigeons into `group_size` holes) and is
/// unsatisfiable; with `num_groups <= group_size` it is satisfiable.
pub fn gen_hard(num_groups: u32, group_size: u32, seed: u64) -> Cnf {
    let mut rng = StdRng::seed_from_u64(seed);
    let num_vars = num_groups * group_size;
    let mut cnf = Cnf::new(num_vars);

    let var_at = |g: u32, s: u32| g * group_size + s;

    let mut groups: Vec<u32> = (0..num_groups).collect();
    groups.shuffle(&mut rng);

    for &g in &groups {
        add_min_one_clause(&mut cnf, (0..group_size).map(|s| var_at(g, s)));
        add_max_one_clause(&mut cnf, (0..group_size).map(|s| var_at(g, s)));
    }
    // partition constraint: every "hole" s is claimed by at most one group
    for s in 0..group_size {
        add_max_one_clause(&mut cnf, (0..num_groups).map(|g| var_at(g, s)));
    }
    cnf
}

fn add_min_one_clause(cnf: &mut Cnf, vars: impl Iterator<Item = u32>) {
    let lits: Vec<Lit> = vars.map(|v| Lit::new(v, false)).collect();
    cnf.add_clause(&lits, false);
}

fn add_max_one_clause(cnf: &mut Cnf, vars: impl Iterator<Item = u32>) {
    let vars: Vec<u32> = vars.collect();
    for i in 0..vars.len() {
        for j in (i + 1)..vars.len() {
            cnf.add_binary(Lit::new(vars[i], true), Lit::new(vars[j], true));
        }
    }
}

/// Generate a CNF encoding a balanced binary tree of random gates
/// (AND/OR/XOR) `depth` levels deep, rooted at variable 0 and forced true
/// — a circuit-shaped instance rather than a uniformly random one.
pub fn gen_circuit(depth: u32, seed: u64) -> Cnf {
    let mut rng = StdRng::seed_from_u64(seed);
    let leaves = 1u32 << depth;
    let total_vars = 2 * leaves; // rough upper bound on internal + leaf vars
    let mut cnf = Cnf::new(total_vars);
    let mut next_var = leaves;

    let mut layer: Vec<u32> = (0..leaves).collect();
    while layer.len() > 1 {
        let mut next_layer = Vec::with_capacity(layer.len() / 2);
        for pair in layer.chunks(2) {
            let out = next_var;
            next_var += 1;
            let a = Lit::new(pair[0], false);
            let b = Lit::new(*pair.get(1).unwrap_or(&pair[0]), false);
            match rng.gen_range(0..3) {
                0 => cnf.add_and(Lit::new(out, false), a, b),
                1 => cnf.add_or(Lit::new(out, false), a, b),
                _ => cnf.add_xor(Lit::new(out, false), a, b),
            }
            next_layer.push(out);
        }
        layer = next_layer;
    }
    cnf.add_unary(Lit::new(layer[0], false));
    cnf
}

/// Pigeonhole principle instance `PHP(pigeons, holes)`, used by the test
/// suite rather than exposed as its own CLI subcommand: `pigeons` into
/// `holes` each claiming exactly one hole, unsatisfiable whenever
/// `pigeons > holes`.
pub fn gen_pigeonhole(pigeons: u32, holes: u32) -> Cnf {
    let num_vars = pigeons * holes;
    let var_at = |p: u32, h: u32| p * holes + h;
    let mut cnf = Cnf::new(num_vars);
    for p in 0..pigeons {
        add_min_one_clause(&mut cnf, (0..holes).map(|h| var_at(p, h)));
    }
    for h in 0..holes {
        add_max_one_clause(&mut cnf, (0..pigeons).map(|p| var_at(p, h)));
    }
    cnf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{SearchConfig, SearchResult, Searcher};

    #[test]
    fn random_3sat_is_satisfiable_by_construction() {
        let mut cnf = gen_3sat(30, 3.0, 42);
        let mut s = Searcher::new(&mut cnf, 1.05);
        assert_eq!(s.run(&SearchConfig::default()), SearchResult::Sat);
    }

    #[test]
    fn pigeonhole_php_4_3_is_unsat() {
        let mut cnf = gen_pigeonhole(4, 3);
        let mut s = Searcher::new(&mut cnf, 1.05);
        assert_eq!(s.run(&SearchConfig::default()), SearchResult::Unsat);
    }

    #[test]
    fn pigeonhole_php_3_3_is_satisfiable() {
        let mut cnf = gen_pigeonhole(3, 3);
        let mut s = Searcher::new(&mut cnf, 1.05);
        assert_eq!(s.run(&SearchConfig::default()), SearchResult::Sat);
    }
}
