//! A constraint-based type inference engine: feed it a set of typing
//! constraints over caller-supplied type variables, get back either a
//! per-variable inferred type or a structured [`InferenceError`].
//!
//! The engine is generic over the caller's atom type (leaf/primitive
//! types, unified via [`AtomUnifier`]) and interaction-tag type (the keys
//! of an effect row). It performs no I/O and reads no configuration; it is
//! a pure function of its [`Problem`].

#![forbid(unsafe_code)]

use std::fmt;
use std::hash::Hash;

use indexmap::IndexMap;

mod consolidate;
mod driver;
mod enforce;
mod recursion;
mod worklist;

mod constraint;
mod error;
mod types;
mod unify;
mod var;

pub use constraint::{Constraint, RelationKind};
pub use error::{InferenceError, TypeError};
pub use types::{ComplementSet, FormKind, InteractionRow, ParamVec, SpecialBounds, Type};
pub use unify::{AtomUnifier, Direction};
pub use var::{OrderedPair, Var};

/// A fully specified inference problem: the constraints to solve, and the
/// caller's unifier for atomic (leaf) types.
pub struct Problem<U, I>
where
    U: AtomUnifier,
    I: Eq + Hash + Ord + Clone,
{
    pub constraints: Vec<Constraint<U::Atom, I>>,
    pub atom_unifier: U,
}

impl<U, I> Problem<U, I>
where
    U: AtomUnifier,
    I: Eq + Hash + Ord + Clone,
{
    pub fn new(atom_unifier: U) -> Self {
        Problem {
            constraints: Vec::new(),
            atom_unifier,
        }
    }

    pub fn with_constraints(atom_unifier: U, constraints: Vec<Constraint<U::Atom, I>>) -> Self {
        Problem {
            constraints,
            atom_unifier,
        }
    }

    pub fn push(&mut self, constraint: Constraint<U::Atom, I>) {
        self.constraints.push(constraint);
    }
}

/// The solved bound map: every variable mentioned anywhere in the problem
/// maps to its inferred type, or `None` if it was never pinned down.
#[derive(Debug, Clone)]
pub struct Solution<A, I: Eq + Hash + Ord + Clone> {
    bounds: IndexMap<Var, Option<Type<A, I>>>,
}

impl<A: Clone, I: Eq + Hash + Ord + Clone> Solution<A, I> {
    /// The inferred type for `v`, or `None` if `v` was never constrained
    /// (or is not part of this problem at all).
    pub fn get(&self, v: Var) -> Option<Type<A, I>> {
        self.bounds.get(&v).cloned().flatten()
    }

    /// Iterate over every variable this solution has an entry for.
    pub fn vars(&self) -> impl Iterator<Item = Var> + '_ {
        self.bounds.keys().copied()
    }
}

/// Solve `problem`, returning the inferred bound for every mentioned
/// variable, or the first [`InferenceError`] encountered.
pub fn solve<U, I>(problem: Problem<U, I>) -> Result<Solution<U::Atom, I>, InferenceError<U::Atom, I, U::Error>>
where
    U: AtomUnifier,
    U::Atom: Clone + fmt::Debug,
    U::Error: Clone + fmt::Debug + PartialEq,
    I: Eq + Hash + Ord + Clone + fmt::Debug,
{
    let bounds = driver::solve(problem.constraints, &problem.atom_unifier)?;
    Ok(Solution { bounds })
}
