//! Enforcer for `Interaction(v, i, params)` constraints: asserts that the
//! synthetic row `{i -> params}` (with `hi = everything`) is a lower bound
//! of `v`.

use std::hash::Hash;

use indexmap::IndexMap;

use crate::constraint::Constraint;
use crate::error::{InferenceError, TypeError};
use crate::types::{ComplementSet, InteractionRow, ParamVec, Type};
use crate::unify::{unify_lte, AtomUnifier};
use crate::var::Var;
use crate::worklist::ChangeStatus;

use super::TypeEnforcer;

pub(crate) fn enforcer<'a, U, I>(u: &'a U, v: Var, i: I, params: ParamVec) -> TypeEnforcer<'a, U::Atom, I, U::Error>
where
    U: AtomUnifier,
    U::Atom: Clone + 'a,
    U::Error: 'a,
    I: Eq + Hash + Ord + Clone + std::fmt::Debug + 'a,
{
    Box::new(move |query| {
        let (v_bound, v_changed) = query(v);

        let existing_params = match &v_bound {
            None => None,
            Some(Type::Interaction(row)) => row.lo.get(&i).cloned(),
            Some(_) => {
                return Err(InferenceError::NotInteraction { var: v, bound: v_bound });
            }
        };

        // Cross-occurrence aliasing: if `v` already carries an entry for
        // this interaction tag (from another `Interaction` constraint on
        // the same `v`), its parameter variables and ours name the same
        // conceptual positions and must agree. Arity disagreement is a
        // structural error; agreement is propagated by writing each of our
        // params' current bound onto the existing position (and vice
        // versa), letting equality close over subsequent rounds.
        let mut updates = Vec::new();
        if let Some(existing) = &existing_params {
            if existing.len() != params.len() {
                let err = TypeError::InteractionArity {
                    inter: i.clone(),
                    expected: existing.len(),
                    found: params.len(),
                };
                return Err(InferenceError::inference(
                    Constraint::Interaction {
                        v,
                        i: i.clone(),
                        params: params.to_vec(),
                    },
                    err,
                ));
            }
            for (mine, theirs) in params.iter().zip(existing.iter()) {
                if mine != theirs {
                    let (theirs_val, _) = query(*theirs);
                    let (mine_val, _) = query(*mine);
                    if theirs_val.is_some() {
                        updates.push((*mine, theirs_val));
                    }
                    if mine_val.is_some() {
                        updates.push((*theirs, mine_val));
                    }
                }
            }
        }

        match v_changed {
            ChangeStatus::Unchanged => {
                let merged_row = match &v_bound {
                    None => {
                        let mut lo = IndexMap::new();
                        lo.insert(i.clone(), params.clone());
                        InteractionRow::new(lo, ComplementSet::everything())
                    }
                    Some(Type::Interaction(row)) => {
                        let mut lo = row.lo.clone();
                        lo.insert(i.clone(), params.clone());
                        InteractionRow::new(lo, row.hi.clone())
                    }
                    Some(_) => unreachable!("NotInteraction already returned above"),
                };
                updates.push((v, Some(Type::Interaction(merged_row))));
                Ok(updates)
            }
            ChangeStatus::Changed => {
                let mut lo = IndexMap::new();
                lo.insert(i.clone(), params.clone());
                let synthetic = Some(Type::Interaction(InteractionRow::new(lo, ComplementSet::everything())));

                let (_, refined_upper) = unify_lte(u, synthetic, v_bound).map_err(|e| {
                    InferenceError::inference(
                        Constraint::Interaction {
                            v,
                            i: i.clone(),
                            params: params.to_vec(),
                        },
                        e,
                    )
                })?;
                updates.push((v, refined_upper));
                Ok(updates)
            }
        }
    })
}
