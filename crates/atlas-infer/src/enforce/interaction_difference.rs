//! Enforcer for `InteractionDifference(whole, inters, rest)` constraints:
//! maintains the invariant `rest = whole \ inters`.

use std::hash::Hash;

use indexmap::IndexSet;

use crate::constraint::Constraint;
use crate::error::InferenceError;
use crate::types::{ComplementSet, InteractionRow, Type};
use crate::unify::{unify_eq, AtomUnifier};
use crate::var::Var;
use crate::worklist::ChangeStatus;

use super::TypeEnforcer;

pub(crate) fn enforcer<'a, U, I>(
    u: &'a U,
    whole: Var,
    inters: IndexSet<I>,
    rest: Var,
) -> TypeEnforcer<'a, U::Atom, I, U::Error>
where
    U: AtomUnifier,
    U::Atom: Clone + 'a,
    U::Error: 'a,
    I: Eq + Hash + Ord + Clone + std::fmt::Debug + 'a,
{
    Box::new(move |query| {
        let (whole_bound, whole_changed) = query(whole);
        let (rest_bound, rest_changed) = query(rest);

        if whole_changed == ChangeStatus::Unchanged && rest_changed == ChangeStatus::Unchanged {
            return Ok(Vec::new());
        }

        let whole_row = match &whole_bound {
            None => None,
            Some(Type::Interaction(r)) => Some(r.clone()),
            Some(_) => {
                return Err(InferenceError::NotInteraction {
                    var: whole,
                    bound: whole_bound.clone(),
                })
            }
        };
        let rest_row = match &rest_bound {
            None => None,
            Some(Type::Interaction(r)) => Some(r.clone()),
            Some(_) => {
                return Err(InferenceError::NotInteraction {
                    var: rest,
                    bound: rest_bound.clone(),
                })
            }
        };

        let check_disjoint = |var: Var, row: &InteractionRow<I>| -> Result<(), InferenceError<U::Atom, I, U::Error>> {
            if row.contains_any(&inters) {
                Err(InferenceError::InteractionCantContain {
                    var,
                    inters: inters.clone(),
                    bound: Type::Interaction(row.clone()),
                })
            } else {
                Ok(())
            }
        };

        let mut updates = Vec::new();

        match (whole_changed, rest_changed) {
            (ChangeStatus::Changed, ChangeStatus::Unchanged) => {
                if let Some(wr) = &whole_row {
                    let rest_prime = wr.subtract(&inters);
                    updates.push((rest, Some(Type::Interaction(rest_prime))));
                }
            }
            (ChangeStatus::Unchanged, ChangeStatus::Changed) => {
                if let Some(rr) = &rest_row {
                    check_disjoint(rest, rr)?;
                    let base = whole_row.clone().unwrap_or_else(InteractionRow::top);
                    let mut lo = base.lo.clone();
                    rr.transfer_into(&mut lo);
                    let hi = base.hi.union(&rr.hi);
                    updates.push((whole, Some(Type::Interaction(InteractionRow::new(lo, hi)))));
                }
            }
            (ChangeStatus::Changed, ChangeStatus::Changed) => {
                if let (Some(wr), Some(rr)) = (&whole_row, &rest_row) {
                    let whole_sub = wr.subtract(&inters);
                    let rest_prime = unify_eq(
                        u,
                        Some(Type::Interaction(whole_sub)),
                        Some(Type::Interaction(rr.clone())),
                    )
                    .map_err(|e| {
                        InferenceError::inference(
                            Constraint::InteractionDifference {
                                whole,
                                inters: inters.clone(),
                                rest,
                            },
                            e,
                        )
                    })?;

                    if let Some(Type::Interaction(rp)) = &rest_prime {
                        check_disjoint(rest, rp)?;
                        let mut lo = rp.lo.clone();
                        for (k, v) in &wr.lo {
                            lo.insert(k.clone(), v.clone());
                        }
                        let included_inters = ComplementSet::Included(inters.clone());
                        let hi = wr.hi.intersection(&included_inters.union(&rp.hi));
                        updates.push((whole, Some(Type::Interaction(InteractionRow::new(lo, hi)))));
                    }
                    updates.push((rest, rest_prime));
                }
            }
            (ChangeStatus::Unchanged, ChangeStatus::Unchanged) => unreachable!("handled above"),
        }

        Ok(updates)
    })
}
