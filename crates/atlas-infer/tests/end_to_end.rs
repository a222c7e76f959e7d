//! End-to-end scenarios over a trivial two-atom domain (`Int`/`Bool`) with
//! equality-only atomic unification, mirroring the scenarios this engine
//! was validated against during design.

use atlas_infer::{AtomUnifier, Constraint, Direction, InferenceError, Problem, SpecialBounds, Type, Var};
use pretty_assertions::assert_eq;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Atom {
    Int,
    Bool,
}

#[derive(Debug, Clone, PartialEq)]
struct AtomMismatch {
    left: Atom,
    right: Atom,
}

struct TrivialAtoms;

impl AtomUnifier for TrivialAtoms {
    type Atom = Atom;
    type Error = AtomMismatch;

    fn unify_eq(&self, a: &Atom, b: &Atom) -> Result<Atom, AtomMismatch> {
        if a == b {
            Ok(*a)
        } else {
            Err(AtomMismatch { left: *a, right: *b })
        }
    }

    fn unify_asym(&self, _dir: Direction, lower: &Atom, upper: &Atom) -> Result<Atom, AtomMismatch> {
        self.unify_eq(lower, upper)
    }

    fn unify_lte(&self, lower: &Atom, upper: &Atom) -> Result<(Atom, Atom), AtomMismatch> {
        self.unify_eq(lower, upper).map(|a| (a, a))
    }
}

fn problem() -> Problem<TrivialAtoms, String> {
    Problem::new(TrivialAtoms)
}

#[test]
fn scenario_a_bound_app_of_two_atoms() {
    let mut p = problem();
    let x = Var::new(0);
    p.push(Constraint::bound(
        x,
        Type::App(Some(Box::new(Type::Atom(Atom::Int))), Some(Box::new(Type::Atom(Atom::Bool)))),
    ));

    let solution = atlas_infer::solve(p).unwrap();
    assert_eq!(
        solution.get(x),
        Some(Type::App(
            Some(Box::new(Type::Atom(Atom::Int))),
            Some(Box::new(Type::Atom(Atom::Bool)))
        ))
    );
}

#[test]
fn scenario_b_equality_relation_propagates() {
    let mut p = problem();
    let (x, y) = (Var::new(0), Var::new(1));
    p.push(Constraint::bound(x, Type::Atom(Atom::Int)));
    p.push(Constraint::relation(x, atlas_infer::RelationKind::Equality, y));

    let solution = atlas_infer::solve(p).unwrap();
    assert_eq!(solution.get(x), Some(Type::Atom(Atom::Int)));
    assert_eq!(solution.get(y), Some(Type::Atom(Atom::Int)));
}

#[test]
fn scenario_c_tuple_formulation_assembles_from_parts() {
    let mut p = problem();
    let (w, a, b) = (Var::new(0), Var::new(1), Var::new(2));
    p.push(Constraint::formulation(w, atlas_infer::FormKind::TupleOf, a, b));
    p.push(Constraint::bound(a, Type::Atom(Atom::Int)));
    p.push(Constraint::bound(b, Type::Atom(Atom::Bool)));

    let solution = atlas_infer::solve(p).unwrap();
    assert_eq!(
        solution.get(w),
        Some(Type::Tuple(
            SpecialBounds::neutral(),
            Some(Box::new(Type::Atom(Atom::Int))),
            Some(Box::new(Type::Atom(Atom::Bool)))
        ))
    );
}

#[test]
fn scenario_d_func_splits_into_components() {
    let mut p = problem();
    let (f, arg, inter, ret) = (Var::new(0), Var::new(1), Var::new(2), Var::new(3));
    p.push(Constraint::bound(
        f,
        Type::Func(
            SpecialBounds::neutral(),
            Some(Box::new(Type::Atom(Atom::Int))),
            None,
            Some(Box::new(Type::Atom(Atom::Bool))),
        ),
    ));
    p.push(Constraint::func(f, arg, inter, ret));

    let solution = atlas_infer::solve(p).unwrap();
    assert_eq!(solution.get(arg), Some(Type::Atom(Atom::Int)));
    assert_eq!(solution.get(ret), Some(Type::Atom(Atom::Bool)));
    assert_eq!(solution.get(inter), None);
}

#[test]
fn scenario_e_interaction_seeds_lo_row_with_param_var() {
    let mut p = problem();
    let (v, param) = (Var::new(0), Var::new(1));
    p.push(Constraint::interaction(v, "Read".to_string(), vec![param]));
    p.push(Constraint::bound(param, Type::Atom(Atom::Int)));

    let solution = atlas_infer::solve(p).unwrap();
    match solution.get(v) {
        Some(Type::Interaction(row)) => {
            let params = row.lo.get("Read").expect("Read entry present");
            assert_eq!(params.as_slice(), &[param]);
        }
        other => panic!("expected an interaction row, got {other:?}"),
    }
    assert_eq!(solution.get(param), Some(Type::Atom(Atom::Int)));
}

#[test]
fn scenario_f_conflicting_bounds_error() {
    let mut p = problem();
    let x = Var::new(0);
    p.push(Constraint::bound(x, Type::App(Some(Box::new(Type::Atom(Atom::Int))), None)));
    p.push(Constraint::bound(
        x,
        Type::Tuple(SpecialBounds::neutral(), Some(Box::new(Type::Atom(Atom::Int))), None),
    ));

    let err = atlas_infer::solve(p).unwrap_err();
    match err {
        InferenceError::Inference { constraint, .. } => {
            assert!(matches!(constraint, Constraint::Bound(v, _) if v == x));
        }
        other => panic!("expected InferenceError::Inference, got {other:?}"),
    }
}

#[test]
fn scenario_g_self_referential_formulation_is_recursive() {
    let mut p = problem();
    let (x, y) = (Var::new(0), Var::new(1));
    p.push(Constraint::formulation(x, atlas_infer::FormKind::AppOf, x, y));

    let err = atlas_infer::solve(p).unwrap_err();
    assert!(matches!(err, InferenceError::RecursiveType));
}
