//! The reconstruction stack: undoes every simplification that drops
//! variables, by recording how to re-derive their value from the literals
//! still present once a satisfying assignment for the simplified formula
//! is known.
//!
//! Grounded on `original_source/src/sat/reconstruction.{h,cpp}` (earlier
//! `extender.h` names the same idea `Extender`). Each eliminated variable
//! contributes one or more clauses with that variable as the first
//! literal ("pivot"); applying rules in reverse order and forcing the
//! pivot true whenever its rule is not already satisfied by the other
//! literals reproduces a model of the original formula.

use crate::lit::{Lit, Var};

/// One recorded rule: `lits[0]` is the pivot literal, the rest are the
/// clause's other literals at the time the rule was recorded (in *outer*,
/// pre-simplification variable numbering).
struct Rule {
    lits: Vec<Lit>,
}

pub struct Reconstruction {
    rules: Vec<Rule>,
    /// Maps an inner (current, post-simplification) variable back to its
    /// outer (original) variable. Extended lazily as new inner variables
    /// are introduced by renumbering.
    to_outer: Vec<Var>,
}

impl Reconstruction {
    pub fn new(num_vars: u32) -> Reconstruction {
        Reconstruction {
            rules: Vec::new(),
            to_outer: (0..num_vars).collect(),
        }
    }

    /// Record a rule with an explicit pivot: `clause` must contain `pivot`
    /// or its negation; the rule is stored with `pivot` moved to the
    /// front. Var numbers in `clause` are already in outer numbering.
    pub fn add_rule(&mut self, mut clause: Vec<Lit>, pivot: Lit) {
        let idx = clause
            .iter()
            .position(|&l| l == pivot)
            .expect("pivot literal must appear in its own rule");
        clause.swap(0, idx);
        self.rules.push(Rule { lits: clause });
    }

    /// Record a forced unit `lit` (outer numbering) as its own one-literal
    /// rule.
    pub fn add_unit(&mut self, lit: Lit) {
        self.rules.push(Rule { lits: vec![lit] });
    }

    /// Record `a <-> b` as two binary rules, used when SCC substitution
    /// drops `b`'s variable in favor of `a`.
    pub fn add_equivalence(&mut self, a: Lit, b: Lit) {
        self.add_rule(vec![a, b.neg()], b.neg());
        self.add_rule(vec![a.neg(), b], b);
    }

    /// Extend the inner->outer map after a renumbering that introduces
    /// `new_count` inner variables, given the map from each new inner
    /// variable to the outer variable it carries forward (variables that
    /// are genuinely fresh, if any, must be appended by the caller before
    /// this call).
    pub fn renumber(&mut self, new_to_outer: Vec<Var>) {
        self.to_outer = new_to_outer;
    }

    pub fn outer_of(&self, inner: Var) -> Var {
        self.to_outer[inner as usize]
    }

    /// Lift an inner model (indexed by inner variable, `true`/`false`) to a
    /// full outer model by applying every recorded rule in reverse order.
    pub fn extend(&self, inner_model: &[bool], outer_var_count: u32) -> Vec<bool> {
        // Any outer variable never mentioned by the inner formula (i.e.
        // eliminated, or otherwise untouched by inner_model) starts out
        // false, matching `Reconstruction::operator()`'s "fill unassigned
        // false" step; rules below then force pivots as needed.
        let mut outer = vec![false; outer_var_count as usize];
        for (inner_var, &val) in inner_model.iter().enumerate() {
            let ov = self.to_outer[inner_var];
            outer[ov as usize] = val;
        }

        for rule in self.rules.iter().rev() {
            let satisfied = rule.lits[1..].iter().any(|&l| lit_value(&outer, l));
            if !satisfied {
                let pivot = rule.lits[0];
                outer[pivot.var() as usize] = !pivot.sign();
            }
        }
        outer
    }
}

fn lit_value(outer: &[bool], l: Lit) -> bool {
    outer[l.var() as usize] != l.sign()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn l(v: u32, s: bool) -> Lit {
        Lit::new(v, s)
    }

    #[test]
    fn unit_rule_forces_pivot() {
        let mut r = Reconstruction::new(1);
        r.add_unit(l(0, true)); // forces x0 = false
        let model = r.extend(&[], 1);
        assert_eq!(model[0], false);
    }

    #[test]
    fn equivalence_rule_propagates_value() {
        // a <-> b, with a already fixed true in the inner model (var 0 is a)
        let mut r = Reconstruction::new(2);
        r.add_equivalence(l(0, false), l(1, false)); // a <-> b, b eliminated
        let model = r.extend(&[true], 2);
        assert_eq!(model[0], true);
        assert_eq!(model[1], true);
    }

    #[test]
    fn bve_style_rule_only_forces_when_unsatisfied() {
        // pivot v was eliminated; rule (v, a, b) should force v true only
        // if neither a nor b already satisfies it.
        let mut r = Reconstruction::new(3);
        r.add_rule(vec![l(0, false), l(1, false), l(2, false)], l(0, false));
        let satisfied_model = r.extend(&[false, true, false], 3);
        assert_eq!(satisfied_model[0], false); // a already true via lit 1

        let mut r2 = Reconstruction::new(3);
        r2.add_rule(vec![l(0, false), l(1, false), l(2, false)], l(0, false));
        let unsatisfied_model = r2.extend(&[false, false, false], 3);
        assert_eq!(unsatisfied_model[0], true); // forced, nothing else satisfies it
    }
}
