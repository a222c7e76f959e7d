//! The raw, pre-consolidation constraint language.

use std::hash::Hash;

use indexmap::IndexSet;

use crate::types::Type;
use crate::unify::Direction;
use crate::var::Var;

pub use crate::types::FormKind;

/// How two variables relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    Equality,
    Inequality(Direction),
}

impl RelationKind {
    /// Flip this relation to describe the swapped pair: `Equality` is its
    /// own flip; `Inequality(Lte) <-> Inequality(Gte)`.
    pub fn flip(self) -> Self {
        match self {
            RelationKind::Equality => RelationKind::Equality,
            RelationKind::Inequality(dir) => RelationKind::Inequality(dir.flip()),
        }
    }
}

/// One raw typing constraint, as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint<A, I: Eq + Hash + Ord + Clone> {
    /// `v` must have type `t`.
    Bound(Var, Type<A, I>),
    /// `v1 rel v2`.
    Relation(Var, RelationKind, Var),
    /// `whole` is `form(a, b)`.
    Formulation {
        whole: Var,
        form: FormKind,
        a: Var,
        b: Var,
    },
    /// `f` is `Func(_, arg, inter, ret)`.
    Func {
        f: Var,
        arg: Var,
        inter: Var,
        ret: Var,
    },
    /// Interaction `i` with parameters `params` is a lower bound of `v`.
    Interaction { v: Var, i: I, params: Vec<Var> },
    /// `rest = whole \ inters`.
    InteractionDifference {
        whole: Var,
        inters: IndexSet<I>,
        rest: Var,
    },
}

impl<A, I: Eq + Hash + Ord + Clone> Constraint<A, I> {
    pub fn bound(v: Var, t: Type<A, I>) -> Self {
        Constraint::Bound(v, t)
    }

    pub fn relation(v1: Var, kind: RelationKind, v2: Var) -> Self {
        Constraint::Relation(v1, kind, v2)
    }

    pub fn formulation(whole: Var, form: FormKind, a: Var, b: Var) -> Self {
        Constraint::Formulation { whole, form, a, b }
    }

    pub fn func(f: Var, arg: Var, inter: Var, ret: Var) -> Self {
        Constraint::Func { f, arg, inter, ret }
    }

    pub fn interaction(v: Var, i: I, params: Vec<Var>) -> Self {
        Constraint::Interaction { v, i, params }
    }

    pub fn interaction_difference(whole: Var, inters: IndexSet<I>, rest: Var) -> Self {
        Constraint::InteractionDifference { whole, inters, rest }
    }
}
