//! Enforcer for `Relation(v1, rel, v2)` constraints.

use std::hash::Hash;

use crate::constraint::{Constraint, RelationKind};
use crate::error::InferenceError;
use crate::unify::{unify_asym, unify_lte, AtomUnifier, Direction};
use crate::var::Var;
use crate::worklist::ChangeStatus;

use super::{enforce_eq, TypeEnforcer};

/// Build the enforcer for one consolidated `(v1, v2) -> kind` relation.
///
/// `v1`/`v2` are already canonicalized by the consolidator (`v1 <= v2` by
/// `Var` order), but the *relation* itself may point either way
/// (`Inequality(Lte)` means `v1 <= v2`; `Inequality(Gte)` means `v1 >= v2`,
/// i.e. `v2 <= v1`), so equality and both inequality orientations are
/// handled here.
pub(crate) fn enforcer<'a, U, I>(u: &'a U, v1: Var, kind: RelationKind, v2: Var) -> TypeEnforcer<'a, U::Atom, I, U::Error>
where
    U: AtomUnifier,
    U::Atom: 'a,
    U::Error: 'a,
    I: Eq + Hash + Ord + Clone + std::fmt::Debug + 'a,
{
    Box::new(move |query| {
        let (b1, c1) = query(v1);
        let (b2, c2) = query(v2);
        if c1 == ChangeStatus::Unchanged && c2 == ChangeStatus::Unchanged {
            return Ok(Vec::new());
        }

        let label = |e| InferenceError::inference(Constraint::Relation(v1, kind, v2), e);

        match kind {
            RelationKind::Equality => enforce_eq(u, (v1, b1, c1), (v2, b2, c2)).map_err(label),
            RelationKind::Inequality(dir) => {
                // Normalize to (lower, upper) so both Lte and Gte share one
                // codepath; `Gte` means `v1 >= v2`, i.e. `v2 <= v1`.
                let (lower_var, lower, lower_changed, upper_var, upper, upper_changed) = match dir {
                    Direction::Lte => (v1, b1, c1, v2, b2, c2),
                    Direction::Gte => (v2, b2, c2, v1, b1, c1),
                };

                match (lower_changed, upper_changed) {
                    (ChangeStatus::Changed, ChangeStatus::Unchanged) => {
                        let new_upper = unify_asym(u, Direction::Lte, lower, upper).map_err(label)?;
                        Ok(vec![(upper_var, new_upper)])
                    }
                    (ChangeStatus::Unchanged, ChangeStatus::Changed) => {
                        let new_lower = unify_asym(u, Direction::Gte, upper, lower).map_err(label)?;
                        Ok(vec![(lower_var, new_lower)])
                    }
                    _ => {
                        let (l, up) = unify_lte(u, lower, upper).map_err(label)?;
                        Ok(vec![(lower_var, l), (upper_var, up)])
                    }
                }
            }
        }
    })
}
