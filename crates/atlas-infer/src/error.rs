//! The engine's single error currency.

use std::hash::Hash;

use indexmap::IndexSet;
use thiserror::Error;

use crate::constraint::{Constraint, FormKind};
use crate::types::Type;
use crate::var::Var;

/// A unification failure, lifted from the caller's atomic unifier or raised
/// by the structural unifier itself.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypeError<A, I, E>
where
    A: Clone + std::fmt::Debug,
    I: Eq + Hash + Ord + Clone + std::fmt::Debug,
    E: Clone + std::fmt::Debug + PartialEq,
{
    /// The caller's atomic unifier rejected two atoms.
    #[error("atomic unifier rejected the pair: {0:?}")]
    Atom(E),
    /// Two structurally incompatible, concrete shapes were required to
    /// unify.
    #[error("incompatible types: {0:?} vs {1:?}")]
    Mismatch(Type<A, I>, Type<A, I>),
    /// Two interaction rows required the same interaction tag with
    /// differently-sized parameter lists.
    #[error("interaction {inter:?} has conflicting parameter arity: {expected} vs {found}")]
    InteractionArity {
        inter: I,
        expected: usize,
        found: usize,
    },
}

/// Every way `solve` can fail.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InferenceError<A, I, E>
where
    A: Clone + std::fmt::Debug,
    I: Eq + Hash + Ord + Clone + std::fmt::Debug,
    E: Clone + std::fmt::Debug + PartialEq,
{
    /// The structural-larger-than graph has a cycle: some constraint set
    /// would demand an infinite type.
    #[error("recursive type: constraints form a structural cycle")]
    RecursiveType,

    /// Enforcing `constraint` required a unification that failed.
    #[error("failed to enforce {constraint:?}: {source}")]
    Inference {
        constraint: Constraint<A, I>,
        source: TypeError<A, I, E>,
    },

    /// `var`'s bound is not shaped the way `form` demands, and is not
    /// `Never`/unknown.
    #[error("{var} is constrained to be {form} but holds {bound:?}")]
    FormMismatch {
        var: Var,
        form: FormKind,
        bound: Option<Type<A, I>>,
    },

    /// `var` is constrained by a `Func` constraint but holds a non-function,
    /// non-`Never`, non-unknown bound.
    #[error("{var} is constrained to be a function but holds {bound:?}")]
    NotFunction { var: Var, bound: Option<Type<A, I>> },

    /// `var` is constrained by an `Interaction` constraint but holds a
    /// non-interaction, non-unknown bound.
    #[error("{var} is constrained to be an interaction row but holds {bound:?}")]
    NotInteraction { var: Var, bound: Option<Type<A, I>> },

    /// `var`'s `rest` bound (from an `InteractionDifference` constraint)
    /// contains an interaction the difference says it must not.
    #[error("{var} cannot contain {inters:?} but holds {bound:?}")]
    InteractionCantContain {
        var: Var,
        inters: IndexSet<I>,
        bound: Type<A, I>,
    },
}

impl<A, I, E> InferenceError<A, I, E>
where
    A: Clone + std::fmt::Debug,
    I: Eq + Hash + Ord + Clone + std::fmt::Debug,
    E: Clone + std::fmt::Debug + PartialEq,
{
    pub(crate) fn inference(constraint: Constraint<A, I>, source: TypeError<A, I, E>) -> Self {
        InferenceError::Inference { constraint, source }
    }
}
