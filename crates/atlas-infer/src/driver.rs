//! Driver glue (SPEC_FULL.md §4.5): assembles the consolidated constraints
//! into a concrete enforcer list, runs the generic worklist solver, and
//! projects the final `Var -> Option<Type>` solution.

use std::hash::Hash;

use indexmap::IndexMap;

use crate::consolidate::consolidate;
use crate::constraint::{Constraint, RelationKind};
use crate::enforce::{self, TypeEnforcer};
use crate::error::InferenceError;
use crate::recursion::check_acyclic;
use crate::types::Type;
use crate::unify::{unify_eq, AtomUnifier};
use crate::var::Var;
use crate::worklist;

pub(crate) fn solve<U, I>(
    constraints: Vec<Constraint<U::Atom, I>>,
    atom_unifier: &U,
) -> Result<IndexMap<Var, Option<Type<U::Atom, I>>>, InferenceError<U::Atom, I, U::Error>>
where
    U: AtomUnifier,
    U::Atom: Clone + std::fmt::Debug,
    U::Error: Clone + std::fmt::Debug + PartialEq,
    I: Eq + Hash + Ord + Clone + std::fmt::Debug,
{
    let consolidated = consolidate(constraints, atom_unifier)?;

    if check_acyclic(&consolidated).is_err() {
        return Err(InferenceError::RecursiveType);
    }

    let all_vars = consolidated.vars.clone();

    let mut enforcers: Vec<TypeEnforcer<'_, U::Atom, I, U::Error>> = Vec::new();
    for (&(v1, v2), &kind) in &consolidated.relations {
        enforcers.push(enforce::relation::enforcer(atom_unifier, v1, kind, v2));
    }
    for (whole, form, a, b) in &consolidated.formulations {
        enforcers.push(enforce::formulation::enforcer(atom_unifier, *whole, *form, *a, *b));
    }
    for (f, arg, inter, ret) in &consolidated.funcs {
        enforcers.push(enforce::func::enforcer(atom_unifier, *f, *arg, *inter, *ret));
    }
    for (v, i, params) in &consolidated.interactions {
        enforcers.push(enforce::interaction::enforcer(atom_unifier, *v, i.clone(), params.clone()));
    }
    for (whole, inters, rest) in &consolidated.interaction_diffs {
        enforcers.push(enforce::interaction_difference::enforcer(
            atom_unifier,
            *whole,
            inters.clone(),
            *rest,
        ));
    }

    let initial_values: Vec<(Var, Option<Type<U::Atom, I>>)> =
        consolidated.bounds.iter().map(|(v, t)| (*v, t.clone())).collect();

    let merge = |v: Var, old: Option<Type<U::Atom, I>>, new: Option<Type<U::Atom, I>>| {
        unify_eq(atom_unifier, old, new)
            .map_err(|e| InferenceError::inference(Constraint::Relation(v, RelationKind::Equality, v), e))
    };

    let result = worklist::run(initial_values, None, &enforcers, merge)?;

    let mut solution = IndexMap::new();
    for v in all_vars {
        solution.insert(v, result.get(&v).cloned().unwrap_or(None));
    }
    Ok(solution)
}
