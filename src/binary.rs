//! Structure in the binary-implication graph: strongly connected
//! components (for equivalent-literal substitution), a topological order,
//! and reachability stamps used to find and drop transitively implied
//! binary clauses.
//!
//! Grounded on `original_source/src/sat/scc.{h,cpp}` and
//! `original_source/src/sat/binary.{h,cpp}`.

use crate::cnf::Cnf;
use crate::lit::Lit;

/// Tarjan's algorithm over the implication graph `l -> bins[l]`, run
/// iteratively (an explicit stack, not recursion, since the graph can be
/// as deep as the variable count).
///
/// Returns, for `2n` literals, the component id of each literal such that
/// `comp[l] == comp[l.neg()].neg_of_component()` is not guaranteed in the
/// raw Tarjan numbering — callers use [`equivalent_literals`] instead,
/// which already canonicalizes components into a literal substitution.
struct Tarjan<'a> {
    cnf: &'a Cnf,
    index: Vec<i64>,
    lowlink: Vec<i64>,
    on_stack: Vec<bool>,
    stack: Vec<Lit>,
    comp: Vec<i32>,
    next_index: i64,
    next_comp: i32,
    contradiction: bool,
}

enum Frame {
    Enter(Lit),
    Finish(Lit),
    Child(Lit, usize), // parent literal, next neighbour index to resume at
}

impl<'a> Tarjan<'a> {
    fn new(cnf: &'a Cnf) -> Tarjan<'a> {
        let n = cnf.num_lits();
        Tarjan {
            cnf,
            index: vec![-1; n],
            lowlink: vec![-1; n],
            on_stack: vec![false; n],
            stack: Vec::new(),
            comp: vec![-1; n],
            next_index: 0,
            next_comp: 0,
            contradiction: false,
        }
    }

    fn run(&mut self) {
        for raw in 0..self.cnf.num_lits() as u32 {
            let l = Lit::new(raw / 2, raw % 2 == 1);
            if self.index[l.raw() as usize] == -1 {
                self.dfs(l);
            }
            if self.contradiction {
                return;
            }
        }
    }

    fn dfs(&mut self, start: Lit) {
        let mut work = vec![Frame::Enter(start)];
        while let Some(frame) = work.pop() {
            match frame {
                Frame::Enter(v) => {
                    let vi = v.raw() as usize;
                    if self.index[vi] != -1 {
                        continue;
                    }
                    self.index[vi] = self.next_index;
                    self.lowlink[vi] = self.next_index;
                    self.next_index += 1;
                    self.stack.push(v);
                    self.on_stack[vi] = true;
                    work.push(Frame::Finish(v));
                    work.push(Frame::Child(v, 0));
                }
                Frame::Child(v, idx) => {
                    let neighbours = &self.cnf.bins[v.raw() as usize];
                    if idx >= neighbours.len() {
                        continue;
                    }
                    let w = neighbours[idx];
                    work.push(Frame::Child(v, idx + 1));
                    let wi = w.raw() as usize;
                    if self.index[wi] == -1 {
                        work.push(Frame::Enter(w));
                    } else if self.on_stack[wi] {
                        let vi = v.raw() as usize;
                        self.lowlink[vi] = self.lowlink[vi].min(self.index[wi]);
                    }
                }
                Frame::Finish(v) => {
                    let vi = v.raw() as usize;
                    // propagate lowlink from any children processed above
                    for &w in &self.cnf.bins[vi] {
                        let wi = w.raw() as usize;
                        if self.on_stack[wi] {
                            self.lowlink[vi] = self.lowlink[vi].min(self.lowlink[wi]);
                        }
                    }
                    if self.lowlink[vi] == self.index[vi] {
                        let id = self.next_comp;
                        self.next_comp += 1;
                        loop {
                            let w = self.stack.pop().unwrap();
                            let wi = w.raw() as usize;
                            self.on_stack[wi] = false;
                            self.comp[wi] = id;
                            if w == v {
                                break;
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Run SCC analysis over the binary-implication graph and build a literal
/// substitution collapsing each equivalence class to one representative
/// literal (the smallest variable, preferring the positive phase).
///
/// Returns `None` if a literal and its negation landed in the same
/// component (the formula is unsatisfiable), otherwise the translation
/// table indexed by raw literal value, plus the number of distinct
/// variables remaining.
pub fn equivalent_literals(cnf: &Cnf) -> Option<(Vec<Lit>, u32)> {
    let mut t = Tarjan::new(cnf);
    t.run();
    if t.contradiction {
        return None;
    }
    for raw in 0..cnf.num_lits() as u32 {
        let l = Lit::new(raw / 2, raw % 2 == 1);
        if t.comp[l.raw() as usize] == t.comp[l.neg().raw() as usize] {
            return None; // l <-> !l
        }
    }

    // For each literal, find the smallest literal in its component — this
    // is used only to decide, per complementary pair of components, which
    // side becomes the new variable's positive phase.
    let num_comps = t.next_comp as usize;
    let mut min_lit: Vec<Option<Lit>> = vec![None; num_comps];
    for raw in 0..cnf.num_lits() as u32 {
        let l = Lit::new(raw / 2, raw % 2 == 1);
        let c = t.comp[l.raw() as usize] as usize;
        match min_lit[c] {
            None => min_lit[c] = Some(l),
            Some(cur) if l < cur => min_lit[c] = Some(l),
            _ => {}
        }
    }

    // Assign one fresh variable per complementary pair of components,
    // giving the positive phase to whichever side of the pair owns the
    // smaller minimum literal.
    let mut new_var_of: Vec<Option<(u32, bool)>> = vec![None; num_comps];
    let mut next_var = 0u32;
    for c in 0..num_comps {
        if new_var_of[c].is_some() {
            continue;
        }
        let neg_c = t.comp[min_lit[c].unwrap().neg().raw() as usize] as usize;
        let nv = next_var;
        next_var += 1;
        let c_is_positive = min_lit[c].unwrap() < min_lit[neg_c].unwrap();
        new_var_of[c] = Some((nv, !c_is_positive));
        new_var_of[neg_c] = Some((nv, c_is_positive));
    }

    let mut trans = vec![Lit::undef(); cnf.num_lits()];
    for raw in 0..cnf.num_lits() as u32 {
        let l = Lit::new(raw / 2, raw % 2 == 1);
        let c = t.comp[l.raw() as usize] as usize;
        let (nv, negated) = new_var_of[c].unwrap();
        trans[l.raw() as usize] = Lit::new(nv, negated);
    }

    Some((trans, next_var))
}

/// A topological order over the literals of `cnf`'s implication graph
/// (`l` appears before every `w` reachable from `l`), computed by an
/// iterative reverse-postorder DFS. Returns `None` if the graph has a
/// cycle — i.e. SCC collapsing should be run first.
pub fn topological_order(cnf: &Cnf) -> Option<Vec<Lit>> {
    let n = cnf.num_lits();
    let mut visited = vec![false; n];
    let mut on_path = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut valid = true;

    for raw in 0..n as u32 {
        let start = Lit::new(raw / 2, raw % 2 == 1);
        if visited[start.raw() as usize] {
            continue;
        }
        let mut stack: Vec<(Lit, usize)> = vec![(start, 0)];
        on_path[start.raw() as usize] = true;
        visited[start.raw() as usize] = true;
        while let Some(&mut (v, ref mut idx)) = stack.last_mut() {
            let neighbours = &cnf.bins[v.raw() as usize];
            if *idx < neighbours.len() {
                let w = neighbours[*idx];
                *idx += 1;
                let wi = w.raw() as usize;
                if on_path[wi] {
                    valid = false;
                } else if !visited[wi] {
                    visited[wi] = true;
                    on_path[wi] = true;
                    stack.push((w, 0));
                }
            } else {
                on_path[v.raw() as usize] = false;
                order.push(v);
                stack.pop();
            }
        }
    }
    if !valid {
        return None;
    }
    order.reverse();
    Some(order)
}

/// Reachability stamps (`start`/`end` DFS timestamps) over an acyclic
/// implication graph, allowing an O(1) `has_path` query via interval
/// containment, as in `original_source/src/sat/binary.h`'s `Stamps`.
pub struct Stamps {
    start: Vec<i32>,
    end: Vec<i32>,
}

impl Stamps {
    pub fn compute(cnf: &Cnf, topo: &[Lit]) -> Stamps {
        let n = cnf.num_lits();
        let mut start = vec![-1; n];
        let mut end = vec![-1; n];
        let mut time = 0;
        for &root in topo {
            if start[root.raw() as usize] != -1 {
                continue;
            }
            let mut stack: Vec<(Lit, usize)> = vec![(root, 0)];
            start[root.raw() as usize] = time;
            time += 1;
            while let Some(&mut (v, ref mut idx)) = stack.last_mut() {
                let neighbours = &cnf.bins[v.raw() as usize];
                if *idx < neighbours.len() {
                    let w = neighbours[*idx];
                    *idx += 1;
                    if start[w.raw() as usize] == -1 {
                        start[w.raw() as usize] = time;
                        time += 1;
                        stack.push((w, 0));
                    }
                } else {
                    end[v.raw() as usize] = time;
                    time += 1;
                    stack.pop();
                }
            }
        }
        Stamps { start, end }
    }

    /// `true` if `a` can reach `b` in the implication graph (including
    /// `a == b`).
    pub fn has_path(&self, a: Lit, b: Lit) -> bool {
        let ai = a.raw() as usize;
        let bi = b.raw() as usize;
        self.start[ai] <= self.start[bi] && self.end[bi] <= self.end[ai]
    }
}

/// Drop every binary clause `(a, b)` that is implied by some other path
/// `a -> ... -> b` of length ≥ 2 in the implication graph (transitive
/// reduction). Returns the number of clauses removed.
pub fn transitive_binary_reduction(cnf: &mut Cnf) -> usize {
    let topo = match topological_order(cnf) {
        Some(t) => t,
        None => return 0, // caller should have run SCC first
    };
    let stamps = Stamps::compute(cnf, &topo);
    let mut removed = 0;
    for &a in &topo {
        let neg_a = a.neg();
        let mut keep = Vec::new();
        for &b in cnf.bins[neg_a.raw() as usize].clone().iter() {
            let implied_another_way = cnf.bins[neg_a.raw() as usize]
                .iter()
                .any(|&c| c != b && stamps.has_path(c, b));
            if implied_another_way {
                removed += 1;
            } else {
                keep.push(b);
            }
        }
        cnf.bins[neg_a.raw() as usize] = keep;
    }
    // the structure above only drops the `(neg_a -> b)` direction; also
    // drop the mirrored `(neg_b -> a)` entries so both adjacency lists
    // stay consistent.
    for raw in 0..cnf.num_lits() {
        let l = Lit::new((raw / 2) as u32, raw % 2 == 1);
        cnf.bins[raw].retain(|&other| cnf.bins[other.neg().raw() as usize].contains(&l));
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l(v: u32, s: bool) -> Lit {
        Lit::new(v, s)
    }

    #[test]
    fn equivalence_chain_collapses() {
        let mut cnf = Cnf::new(3);
        // x0 <-> x1 <-> x2
        cnf.add_binary(l(0, true), l(1, false));
        cnf.add_binary(l(0, false), l(1, true));
        cnf.add_binary(l(1, true), l(2, false));
        cnf.add_binary(l(1, false), l(2, true));
        let (trans, new_vars) = equivalent_literals(&cnf).unwrap();
        assert_eq!(new_vars, 1);
        let r0 = trans[l(0, false).raw() as usize];
        let r1 = trans[l(1, false).raw() as usize];
        let r2 = trans[l(2, false).raw() as usize];
        assert_eq!(r0.var(), r1.var());
        assert_eq!(r1.var(), r2.var());
    }

    #[test]
    fn contradictory_equivalence_detected() {
        let mut cnf = Cnf::new(1);
        // x0 <-> !x0
        cnf.add_binary(l(0, true), l(0, true));
        cnf.add_binary(l(0, false), l(0, false));
        assert!(equivalent_literals(&cnf).is_none());
    }

    #[test]
    fn topo_order_respects_edges() {
        let mut cnf = Cnf::new(2);
        cnf.add_binary(l(0, true), l(1, false)); // !x0 -> x1
        let topo = topological_order(&cnf).unwrap();
        let pos_neg0 = topo.iter().position(|&x| x == l(0, true)).unwrap();
        let pos_1 = topo.iter().position(|&x| x == l(1, false)).unwrap();
        assert!(pos_neg0 < pos_1);
    }
}
