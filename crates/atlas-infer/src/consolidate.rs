//! The Constraint Consolidator: folds a flat list of raw constraints into
//! per-kind buckets the rest of the engine can iterate without re-parsing.

use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};

use crate::constraint::{Constraint, FormKind, RelationKind};
use crate::error::InferenceError;
use crate::types::{ParamVec, Type};
use crate::unify::{unify_eq, AtomUnifier};
use crate::var::{OrderedPair, Var};

/// Constraints sorted into the shape each enforcer expects, plus the
/// initial bound map seeded purely from `Bound` constraints.
pub(crate) struct Consolidated<A, I: Eq + Hash + Ord + Clone> {
    pub bounds: IndexMap<Var, Option<Type<A, I>>>,
    pub relations: IndexMap<(Var, Var), RelationKind>,
    pub formulations: Vec<(Var, FormKind, Var, Var)>,
    pub funcs: Vec<(Var, Var, Var, Var)>,
    pub interactions: Vec<(Var, I, ParamVec)>,
    pub interaction_diffs: Vec<(Var, IndexSet<I>, Var)>,
    pub vars: IndexSet<Var>,
}

/// Two identical relations between the same pair are kept as-is; a
/// differing pair (`Lte` vs. `Gte`, or either vs. `Equality`) is upgraded to
/// `Equality` since together they pin the pair down exactly.
fn merge_relation(existing: RelationKind, new: RelationKind) -> RelationKind {
    match (existing, new) {
        (RelationKind::Equality, _) | (_, RelationKind::Equality) => RelationKind::Equality,
        (RelationKind::Inequality(d1), RelationKind::Inequality(d2)) if d1 == d2 => {
            RelationKind::Inequality(d1)
        }
        _ => RelationKind::Equality,
    }
}

pub(crate) fn consolidate<U, I>(
    constraints: Vec<Constraint<U::Atom, I>>,
    atom_unifier: &U,
) -> Result<Consolidated<U::Atom, I>, InferenceError<U::Atom, I, U::Error>>
where
    U: AtomUnifier,
    I: Eq + Hash + Ord + Clone + std::fmt::Debug,
{
    let mut out = Consolidated {
        bounds: IndexMap::new(),
        relations: IndexMap::new(),
        formulations: Vec::new(),
        funcs: Vec::new(),
        interactions: Vec::new(),
        interaction_diffs: Vec::new(),
        vars: IndexSet::new(),
    };

    for c in constraints {
        match c {
            Constraint::Bound(v, t) => {
                out.vars.insert(v);
                let existing = out.bounds.shift_remove(&v).unwrap_or(None);
                let merged = unify_eq(atom_unifier, existing, Some(t.clone()))
                    .map_err(|e| InferenceError::inference(Constraint::Bound(v, t), e))?;
                out.bounds.insert(v, merged);
            }
            Constraint::Relation(v1, kind, v2) => {
                out.vars.insert(v1);
                out.vars.insert(v2);
                let pair = OrderedPair::new(v1, v2);
                let canonical = if pair.flipped { kind.flip() } else { kind };
                out.relations
                    .entry(pair.as_tuple())
                    .and_modify(|existing| *existing = merge_relation(*existing, canonical))
                    .or_insert(canonical);
            }
            Constraint::Formulation { whole, form, a, b } => {
                out.vars.insert(whole);
                out.vars.insert(a);
                out.vars.insert(b);
                out.formulations.push((whole, form, a, b));
            }
            Constraint::Func { f, arg, inter, ret } => {
                out.vars.insert(f);
                out.vars.insert(arg);
                out.vars.insert(inter);
                out.vars.insert(ret);
                out.funcs.push((f, arg, inter, ret));
            }
            Constraint::Interaction { v, i, params } => {
                out.vars.insert(v);
                for p in &params {
                    out.vars.insert(*p);
                }
                out.interactions.push((v, i, ParamVec::from_vec(params)));
            }
            Constraint::InteractionDifference {
                whole,
                inters,
                rest,
            } => {
                out.vars.insert(whole);
                out.vars.insert(rest);
                out.interaction_diffs.push((whole, inters, rest));
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unify::Direction;

    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    struct IntAtom(i32);

    #[derive(Clone, Debug, PartialEq)]
    struct Mismatch;

    struct EqOnly;

    impl AtomUnifier for EqOnly {
        type Atom = IntAtom;
        type Error = Mismatch;

        fn unify_eq(&self, a: &IntAtom, b: &IntAtom) -> Result<IntAtom, Mismatch> {
            if a == b {
                Ok(*a)
            } else {
                Err(Mismatch)
            }
        }

        fn unify_asym(&self, _dir: Direction, lower: &IntAtom, upper: &IntAtom) -> Result<IntAtom, Mismatch> {
            self.unify_eq(lower, upper)
        }

        fn unify_lte(&self, lower: &IntAtom, upper: &IntAtom) -> Result<(IntAtom, IntAtom), Mismatch> {
            self.unify_eq(lower, upper).map(|a| (a, a))
        }
    }

    #[test]
    fn bound_constraints_merge_by_unification() {
        let cs = vec![
            Constraint::Bound(Var(0), Type::Atom(IntAtom(1))),
            Constraint::Bound(Var(0), Type::Atom(IntAtom(1))),
        ];
        let out = consolidate::<_, String>(cs, &EqOnly).unwrap();
        assert_eq!(out.bounds.get(&Var(0)), Some(&Some(Type::Atom(IntAtom(1)))));
    }

    #[test]
    fn conflicting_bounds_error() {
        let cs = vec![
            Constraint::Bound(Var(0), Type::Atom(IntAtom(1))),
            Constraint::Bound(Var(0), Type::Atom(IntAtom(2))),
        ];
        let out = consolidate::<_, String>(cs, &EqOnly);
        assert!(out.is_err());
    }

    #[test]
    fn relation_pairs_canonicalize_regardless_of_argument_order() {
        let cs = vec![Constraint::Relation(
            Var(5),
            RelationKind::Inequality(Direction::Lte),
            Var(2),
        )];
        let out = consolidate::<_, String>(cs, &EqOnly).unwrap();
        let kind = out.relations.get(&(Var(2), Var(5))).unwrap();
        assert_eq!(*kind, RelationKind::Inequality(Direction::Gte));
    }

    #[test]
    fn conflicting_inequalities_upgrade_to_equality() {
        let cs = vec![
            Constraint::Relation(Var(0), RelationKind::Inequality(Direction::Lte), Var(1)),
            Constraint::Relation(Var(1), RelationKind::Inequality(Direction::Lte), Var(0)),
        ];
        let out = consolidate::<_, String>(cs, &EqOnly).unwrap();
        assert_eq!(out.relations.get(&(Var(0), Var(1))), Some(&RelationKind::Equality));
    }
}
