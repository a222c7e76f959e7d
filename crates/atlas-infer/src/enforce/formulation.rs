//! Enforcer for `Formulation(whole, form, a, b)` constraints.

use std::hash::Hash;

use crate::error::{InferenceError, TypeError};
use crate::types::{join_formulation, split_formulation, FormKind, SplitOutcome};
use crate::unify::{unify_eq, AtomUnifier};
use crate::var::Var;
use crate::worklist::ChangeStatus;

use super::{Bound, TypeEnforcer};

/// Reconcile one structural component: the part `whole` implies (if `whole`
/// changed) against the component variable's own bound (if it changed).
/// Returns `None` when the component needs no update of its own.
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
    whole: Var,
    form: FormKind,
    a: Var,
    b: Var,
) -> TypeEnforcer<'a, U::Atom, I, U::Error>
where
    U: AtomUnifier,
    U::Atom: Clone + 'a,
    U::Error: 'a,
    I: Eq + Hash + Ord + Clone + std::fmt::Debug + 'a,
{
    Box::new(move |query| {
        let (whole_bound, whole_changed) = query(whole);
        let (a_bound, a_changed) = query(a);
        let (b_bound, b_changed) = query(b);

        if whole_changed == ChangeStatus::Unchanged
            && a_changed == ChangeStatus::Unchanged
            && b_changed == ChangeStatus::Unchanged
        {
            return Ok(Vec::new());
        }

        let (part_a, part_b) = match split_formulation(&whole_bound, form) {
            SplitOutcome::Parts(pa, pb) => (pa, pb),
            SplitOutcome::Mismatch => {
                return Err(InferenceError::FormMismatch {
                    var: whole,
                    form,
                    bound: whole_bound,
                })
            }
        };

        let a_update = merge_component(u, part_a, whole_changed, a_bound.clone(), a_changed)
            .map_err(|e| InferenceError::inference(crate::constraint::Constraint::Formulation { whole, form, a, b }, e))?;
        let b_update = merge_component(u, part_b, whole_changed, b_bound.clone(), b_changed)
            .map_err(|e| InferenceError::inference(crate::constraint::Constraint::Formulation { whole, form, a, b }, e))?;

        let mut updates = Vec::new();
        if let Some(ref v) = a_update {
            updates.push((a, v.clone()));
        }
        if let Some(ref v) = b_update {
            updates.push((b, v.clone()));
        }

        if a_changed == ChangeStatus::Changed || b_changed == ChangeStatus::Changed {
            let resolved_a = a_update.unwrap_or(a_bound);
            let resolved_b = b_update.unwrap_or(b_bound);
            updates.push((whole, Some(join_formulation(form, resolved_a, resolved_b))));
        }

        Ok(updates)
    })
}
