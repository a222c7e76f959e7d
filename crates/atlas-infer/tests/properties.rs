//! Property-based invariants (SPEC_FULL.md §8) over small generated
//! problems: bounded variable count and constraint count so shrinking stays
//! fast, atoms drawn from a two-element domain with equality-only
//! unification.

use std::collections::BTreeMap;

use atlas_infer::{AtomUnifier, Constraint, Direction, FormKind, InferenceError, Problem, RelationKind, Type, Var};
use proptest::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Atom {
    Int,
    Bool,
}

#[derive(Debug, Clone, PartialEq)]
struct AtomMismatch;

#[derive(Debug, Clone, Copy)]
struct TrivialAtoms;

impl AtomUnifier for TrivialAtoms {
    type Atom = Atom;
    type Error = AtomMismatch;

    fn unify_eq(&self, a: &Atom, b: &Atom) -> Result<Atom, AtomMismatch> {
        if a == b {
            Ok(*a)
        } else {
            Err(AtomMismatch)
        }
    }

    fn unify_asym(&self, _dir: Direction, lower: &Atom, upper: &Atom) -> Result<Atom, AtomMismatch> {
        self.unify_eq(lower, upper)
    }

    fn unify_lte(&self, lower: &Atom, upper: &Atom) -> Result<(Atom, Atom), AtomMismatch> {
        self.unify_eq(lower, upper).map(|a| (a, a))
    }
}

fn atom_strategy() -> impl Strategy<Value = Atom> {
    prop_oneof![Just(Atom::Int), Just(Atom::Bool)]
}

fn var_strategy(bound: u32) -> impl Strategy<Value = Var> {
    (0..bound).prop_map(Var::new)
}

/// A small, bounded constraint: either a `Bound` or an `Equality`/`Lte`
/// `Relation`, over at most 4 variables and 2 atoms.
#[derive(Debug, Clone)]
enum SmallConstraint {
    Bound(Var, Atom),
    Relation(Var, RelationKind, Var),
}

fn small_constraint_strategy() -> impl Strategy<Value = SmallConstraint> {
    prop_oneof![
        (var_strategy(4), atom_strategy()).prop_map(|(v, a)| SmallConstraint::Bound(v, a)),
        (var_strategy(4), var_strategy(4)).prop_map(|(v1, v2)| SmallConstraint::Relation(
            v1,
            RelationKind::Equality,
            v2
        )),
        (var_strategy(4), var_strategy(4)).prop_map(|(v1, v2)| SmallConstraint::Relation(
            v1,
            RelationKind::Inequality(Direction::Lte),
            v2
        )),
    ]
}

fn build_problem(constraints: &[SmallConstraint]) -> Problem<TrivialAtoms, String> {
    let mut p = Problem::new(TrivialAtoms);
    for c in constraints {
        let built = match *c {
            SmallConstraint::Bound(v, a) => Constraint::bound(v, Type::Atom(a)),
            SmallConstraint::Relation(v1, kind, v2) => Constraint::relation(v1, kind, v2),
        };
        p.push(built);
    }
    p
}

proptest! {
    /// Invariant 1 (determinism): solving the same problem twice gives the
    /// same result.
    #[test]
    fn determinism(constraints in prop::collection::vec(small_constraint_strategy(), 0..8)) {
        let r1 = atlas_infer::solve(build_problem(&constraints));
        let r2 = atlas_infer::solve(build_problem(&constraints));
        match (r1, r2) {
            (Ok(s1), Ok(s2)) => {
                for v in 0..4u32 {
                    prop_assert_eq!(s1.get(Var::new(v)), s2.get(Var::new(v)));
                }
            }
            (Err(_), Err(_)) => {}
            _ => prop_assert!(false, "solve was non-deterministic on the same input"),
        }
    }

    /// Invariant 4 (equality collapse): asserting both `Lte` and `Gte`
    /// between the same pair behaves exactly like one `Equality` constraint.
    #[test]
    fn equality_collapse(v1 in var_strategy(4), v2 in var_strategy(4), a in atom_strategy(), b in atom_strategy()) {
        let mut via_both_inequalities = Problem::new(TrivialAtoms);
        via_both_inequalities.push(Constraint::bound(v1, Type::Atom(a)));
        via_both_inequalities.push(Constraint::bound(v2, Type::Atom(b)));
        via_both_inequalities.push(Constraint::relation(v1, RelationKind::Inequality(Direction::Lte), v2));
        via_both_inequalities.push(Constraint::relation(v1, RelationKind::Inequality(Direction::Gte), v2));

        let mut via_equality = Problem::new(TrivialAtoms);
        via_equality.push(Constraint::bound(v1, Type::Atom(a)));
        via_equality.push(Constraint::bound(v2, Type::Atom(b)));
        via_equality.push(Constraint::relation(v1, RelationKind::Equality, v2));

        let r1 = atlas_infer::solve(via_both_inequalities);
        let r2 = atlas_infer::solve(via_equality);
        match (r1, r2) {
            (Ok(s1), Ok(s2)) => {
                prop_assert_eq!(s1.get(v1), s2.get(v1));
                prop_assert_eq!(s1.get(v2), s2.get(v2));
            }
            (Err(InferenceError::Inference { .. }), Err(InferenceError::Inference { .. })) => {}
            _ => prop_assert!(false, "Lte+Gte and Equality disagreed on satisfiability"),
        }
    }

    /// Invariant 3 (recursion rejection): a variable formulated in terms of
    /// itself is always rejected, regardless of what else is in the problem.
    #[test]
    fn self_referential_formulation_always_rejected(
        extra in prop::collection::vec(small_constraint_strategy(), 0..4)
    ) {
        let mut p = build_problem(&extra);
        let x = Var::new(0);
        let y = Var::new(1);
        p.push(Constraint::formulation(x, FormKind::AppOf, x, y));

        let result = atlas_infer::solve(p);
        prop_assert!(matches!(result, Err(InferenceError::RecursiveType)));
    }

    /// Invariant 6 (idempotence): feeding a solved problem's own solution
    /// back in as `Bound` constraints reproduces the same solution.
    #[test]
    fn idempotent_on_its_own_solution(constraints in prop::collection::vec(small_constraint_strategy(), 0..6)) {
        let Ok(solution) = atlas_infer::solve(build_problem(&constraints)) else {
            return Ok(());
        };

        let mut resolved: BTreeMap<u32, Option<Type<Atom, String>>> = BTreeMap::new();
        for v in 0..4u32 {
            resolved.insert(v, solution.get(Var::new(v)));
        }

        let mut replay = Problem::new(TrivialAtoms);
        for (&idx, bound) in &resolved {
            if let Some(t) = bound {
                replay.push(Constraint::bound(Var::new(idx), t.clone()));
            }
        }

        let replayed = atlas_infer::solve(replay).expect("replaying a solution must not fail");
        for v in 0..4u32 {
            prop_assert_eq!(replayed.get(Var::new(v)), resolved[&v].clone());
        }
    }
}
