//! One enforcer constructor per constraint family (SPEC_FULL.md §4.4).
//!
//! Each constructor closes over a single consolidated constraint instance
//! and the atomic unifier, producing a `worklist::Enforcer` the driver can
//! drop straight into its enforcer list.

use std::hash::Hash;

use crate::error::{InferenceError, TypeError};
use crate::types::Type;
use crate::unify::{unify_eq, AtomUnifier};
use crate::var::Var;
use crate::worklist::{ChangeStatus, Enforcer};

pub(crate) mod formulation;
pub(crate) mod func;
pub(crate) mod interaction;
pub(crate) mod interaction_difference;
pub(crate) mod relation;

/// A bound in the propagation driver's map: `None` means unknown.
pub(crate) type Bound<A, I> = Option<Type<A, I>>;

/// The concrete `Enforcer` this crate's driver deals in.
pub(crate) type TypeEnforcer<'a, A, I, E> = Enforcer<'a, Var, Bound<A, I>, InferenceError<A, I, E>>;

/// The `enforceEQ` helper SPEC_FULL.md §4.4 calls out for `Formulation` and
/// `Func`: given two (var, bound, change-status) sides of an equality,
/// propagate whichever side changed, or unify both if they both did.
pub(crate) fn enforce_eq<U, I>(
    u: &U,
    x: (Var, Bound<U::Atom, I>, ChangeStatus),
    y: (Var, Bound<U::Atom, I>, ChangeStatus),
) -> Result<Vec<(Var, Bound<U::Atom, I>)>, TypeError<U::Atom, I, U::Error>>
where
    U: AtomUnifier,
    I: Eq + Hash + Ord + Clone + std::fmt::Debug,
{
    let (x_var, x_val, x_changed) = x;
    let (y_var, y_val, y_changed) = y;
    match (x_changed, y_changed) {
        (ChangeStatus::Unchanged, ChangeStatus::Unchanged) => Ok(Vec::new()),
        (ChangeStatus::Changed, ChangeStatus::Unchanged) => Ok(vec![(y_var, x_val)]),
        (ChangeStatus::Unchanged, ChangeStatus::Changed) => Ok(vec![(x_var, y_val)]),
        (ChangeStatus::Changed, ChangeStatus::Changed) => {
            let merged = unify_eq(u, x_val, y_val)?;
            Ok(vec![(x_var, merged.clone()), (y_var, merged)])
        }
    }
}
