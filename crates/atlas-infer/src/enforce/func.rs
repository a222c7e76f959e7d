//! Enforcer for `Func(f, (arg, inter, ret))` constraints.
//!
//! A symmetric three-way version of the `Formulation` enforcer, kept as its
//! own module rather than folded into `formulation` (DESIGN.md Open
//! Question 1 / SPEC_FULL.md §9's open question on `Func` redundancy).

use std::hash::Hash;

use crate::constraint::Constraint;
use crate::error::{InferenceError, TypeError};
use crate::types::{func_components, join_func, FuncSplitOutcome};
use crate::unify::{unify_eq, AtomUnifier};
use crate::var::Var;
use crate::worklist::ChangeStatus;

use super::{Bound, TypeEnforcer};

fn merge_component<U, I>(
    u: &U,
    part: Bound<U::Atom, I>,
    part_changed: ChangeStatus,
    var_bound: Bound<U::Atom, I>,
    var_changed: ChangeStatus,
) -> Result<Option<Bound<U::Atom, I>>, TypeError<U::Atom, I, U::Error>>
where
    U: AtomUnifier,
    I: Eq + Hash + Ord + Clone + std::fmt::Debug,
{
    match (part_changed, var_changed) {
        (ChangeStatus::Unchanged, ChangeStatus::Unchanged) => Ok(None),
        (ChangeStatus::Changed, ChangeStatus::Unchanged) => Ok(Some(part)),
        (ChangeStatus::Unchanged, ChangeStatus::Changed) => Ok(None),
        (ChangeStatus::Changed, ChangeStatus::Changed) => Ok(Some(unify_eq(u, part, var_bound)?)),
    }
}

pub(crate) fn enforcer<'a, U, I>(
    u: &'a U,
    f: Var,
    arg: Var,
    inter: Var,
    ret: Var,
) -> TypeEnforcer<'a, U::Atom, I, U::Error>
where
    U: AtomUnifier,
    U::Atom: Clone + 'a,
    U::Error: 'a,
    I: Eq + Hash + Ord + Clone + std::fmt::Debug + 'a,
{
    Box::new(move |query| {
        let (f_bound, f_changed) = query(f);
        let (arg_bound, arg_changed) = query(arg);
        let (inter_bound, inter_changed) = query(inter);
        let (ret_bound, ret_changed) = query(ret);

        if f_changed == ChangeStatus::Unchanged
            && arg_changed == ChangeStatus::Unchanged
            && inter_changed == ChangeStatus::Unchanged
            && ret_changed == ChangeStatus::Unchanged
        {
            return Ok(Vec::new());
        }

        let (part_arg, part_inter, part_ret) = match func_components(&f_bound) {
            FuncSplitOutcome::Parts(pa, pi, pr) => (pa, pi, pr),
            FuncSplitOutcome::Mismatch => {
                return Err(InferenceError::NotFunction { var: f, bound: f_bound })
            }
        };

        let label = |e| InferenceError::inference(Constraint::Func { f, arg, inter, ret }, e);

        let arg_update =
            merge_component(u, part_arg, f_changed, arg_bound.clone(), arg_changed).map_err(label)?;
        let inter_update =
            merge_component(u, part_inter, f_changed, inter_bound.clone(), inter_changed).map_err(label)?;
        let ret_update =
            merge_component(u, part_ret, f_changed, ret_bound.clone(), ret_changed).map_err(label)?;

        let mut updates = Vec::new();
        if let Some(ref v) = arg_update {
            updates.push((arg, v.clone()));
        }
        if let Some(ref v) = inter_update {
            updates.push((inter, v.clone()));
        }
        if let Some(ref v) = ret_update {
            updates.push((ret, v.clone()));
        }

        if arg_changed == ChangeStatus::Changed
            || inter_changed == ChangeStatus::Changed
            || ret_changed == ChangeStatus::Changed
        {
            let resolved_arg = arg_update.unwrap_or(arg_bound);
            let resolved_inter = inter_update.unwrap_or(inter_bound);
            let resolved_ret = ret_update.unwrap_or(ret_bound);
            updates.push((f, Some(join_func(resolved_arg, resolved_inter, resolved_ret))));
        }

        Ok(updates)
    })
}
