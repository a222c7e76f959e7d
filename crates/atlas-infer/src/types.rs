//! Type algebra: the `Type` sum, special bounds, interaction rows, and the
//! structural split/join/subtract helpers the enforcers build on.

use std::fmt;
use std::hash::Hash;

use indexmap::IndexSet;
use smallvec::SmallVec;

use crate::var::Var;

/// Parameter lists attached to an interaction are almost always tiny; avoid
/// heap-allocating the common case.
pub type ParamVec = SmallVec<[Var; 4]>;

/// One structural component of a compound type: either unknown (`None`) or
/// a fully present sub-type.
pub type Slot<A, I> = Option<Box<Type<A, I>>>;

/// Whether a structured type's "corners" (bottom and top) are admissible.
///
/// Propagated by unification (componentwise OR, see `DESIGN.md` Open
/// Question 5), not computed from scratch here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct SpecialBounds {
    pub can_be_never: bool,
    pub can_be_top: bool,
}

impl SpecialBounds {
    pub fn new(can_be_never: bool, can_be_top: bool) -> Self {
        SpecialBounds {
            can_be_never,
            can_be_top,
        }
    }

    /// The neutral element used by `join_formulation`: both corners allowed.
    pub fn neutral() -> Self {
        SpecialBounds::new(true, true)
    }

    /// Permissive merge of two special-bounds records.
    pub fn merge(self, other: Self) -> Self {
        SpecialBounds::new(
            self.can_be_never || other.can_be_never,
            self.can_be_top || other.can_be_top,
        )
    }
}

/// A set of interaction tags expressed as a complement: either exactly `S`
/// (`Included`) or everything except `S` (`Excluded`).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ComplementSet<I: Eq + Hash + Ord + Clone> {
    Included(IndexSet<I>),
    Excluded(IndexSet<I>),
}

impl<I: Eq + Hash + Ord + Clone + fmt::Debug> ComplementSet<I> {
    /// An `Excluded` set with nothing excluded: everything is a member.
    pub fn everything() -> Self {
        ComplementSet::Excluded(IndexSet::new())
    }

    /// An `Included` set with nothing included: no members.
    pub fn nothing() -> Self {
        ComplementSet::Included(IndexSet::new())
    }

    pub fn member(&self, x: &I) -> bool {
        match self {
            ComplementSet::Included(s) => s.contains(x),
            ComplementSet::Excluded(s) => !s.contains(x),
        }
    }

    pub fn union(&self, other: &Self) -> Self {
        match (self, other) {
            (ComplementSet::Included(a), ComplementSet::Included(b)) => {
                ComplementSet::Included(a.union(b).cloned().collect())
            }
            (ComplementSet::Excluded(a), ComplementSet::Excluded(b)) => {
                ComplementSet::Excluded(a.intersection(b).cloned().collect())
            }
            (ComplementSet::Included(inc), ComplementSet::Excluded(exc))
            | (ComplementSet::Excluded(exc), ComplementSet::Included(inc)) => {
                ComplementSet::Excluded(exc.difference(inc).cloned().collect())
            }
        }
    }

    pub fn intersection(&self, other: &Self) -> Self {
        match (self, other) {
            (ComplementSet::Included(a), ComplementSet::Included(b)) => {
                ComplementSet::Included(a.intersection(b).cloned().collect())
            }
            (ComplementSet::Excluded(a), ComplementSet::Excluded(b)) => {
                ComplementSet::Excluded(a.union(b).cloned().collect())
            }
            (ComplementSet::Included(inc), ComplementSet::Excluded(exc))
            | (ComplementSet::Excluded(exc), ComplementSet::Included(inc)) => {
                ComplementSet::Included(inc.difference(exc).cloned().collect())
            }
        }
    }

    /// Remove every member of `drop` from this set (used by
    /// `interaction_subtract`'s `hi` half).
    pub fn excluding(&self, drop: &IndexSet<I>) -> Self {
        self.intersection(&ComplementSet::Excluded(drop.clone()))
    }
}

/// An effect row: `lo` lists interactions that *must* occur along with their
/// parameter variables; `hi` bounds the interactions that *may* occur.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InteractionRow<I: Eq + Hash + Ord + Clone> {
    pub lo: indexmap::IndexMap<I, ParamVec>,
    pub hi: ComplementSet<I>,
}

impl<I: Eq + Hash + Ord + Clone + fmt::Debug> InteractionRow<I> {
    pub fn new(lo: indexmap::IndexMap<I, ParamVec>, hi: ComplementSet<I>) -> Self {
        InteractionRow { lo, hi }
    }

    /// A row with no requirements and no restrictions.
    pub fn top() -> Self {
        InteractionRow {
            lo: indexmap::IndexMap::new(),
            hi: ComplementSet::everything(),
        }
    }

    /// `interactionSubtract(inters, self)`: drop every key in `inters` from
    /// `lo`, and narrow `hi` to also exclude `inters`.
    pub fn subtract(&self, inters: &IndexSet<I>) -> Self {
        let lo = self
            .lo
            .iter()
            .filter(|(k, _)| !inters.contains(*k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        let hi = self.hi.excluding(inters);
        InteractionRow { lo, hi }
    }

    /// Does this row contain (as a lower-bound requirement, or as a
    /// permitted member of `hi`) any interaction in `inters`?
    pub fn contains_any(&self, inters: &IndexSet<I>) -> bool {
        inters.iter().any(|i| self.lo.contains_key(i) || self.hi.member(i))
    }

    /// `transferValues(self, dst)`: copy entries from `self` into `dst`
    /// where `dst` already expects that key (used when widening an unknown
    /// `whole` with a known `rest`).
    pub fn transfer_into(&self, dst: &mut indexmap::IndexMap<I, ParamVec>) {
        for (k, v) in &self.lo {
            dst.entry(k.clone()).or_insert_with(|| v.clone());
        }
    }
}

/// The type algebra. Generic over the caller's atom payload `A` and
/// interaction-tag type `I`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Type<A, I: Eq + Hash + Ord + Clone> {
    /// An atomic (leaf) type, delegated to the caller's atomic unifier.
    Atom(A),
    /// The empty type. Every structural projection of `Never` yields `Never`
    /// on all components.
    Never,
    /// Type application; either side may be unknown.
    App(Slot<A, I>, Slot<A, I>),
    /// A pair, with special-bound flags tracking admissibility of its
    /// bottom/top corners.
    Tuple(SpecialBounds, Slot<A, I>, Slot<A, I>),
    /// A function type: argument, effect/interaction row, and result.
    Func(SpecialBounds, Slot<A, I>, Slot<A, I>, Slot<A, I>),
    /// An effect row.
    Interaction(InteractionRow<I>),
}

/// The named shape a `Formulation` constraint asserts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormKind {
    AppOf,
    TupleOf,
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormKind::AppOf => write!(f, "AppOf"),
            FormKind::TupleOf => write!(f, "TupleOf"),
        }
    }
}

/// Outcome of `split_formulation`: either the two structural parts, or a
/// shape mismatch (the caller attaches the offending `Var`/bound).
pub enum SplitOutcome<A, I: Eq + Hash + Ord + Clone> {
    Parts(Option<Type<A, I>>, Option<Type<A, I>>),
    Mismatch,
}

/// Split `whole` into its two structural parts according to `form`.
///
/// See SPEC_FULL.md §4.4 for the exact per-shape table; `Never` gets a
/// distinct treatment for `AppOf` vs. `TupleOf` (preserved verbatim from the
/// spec, not generalized, since it is explicitly spelled out both ways).
pub fn split_formulation<A: Clone, I: Eq + Hash + Ord + Clone>(
    whole: &Option<Type<A, I>>,
    form: FormKind,
) -> SplitOutcome<A, I> {
    match (form, whole) {
        (_, None) => SplitOutcome::Parts(None, None),
        (FormKind::AppOf, Some(Type::Never)) => SplitOutcome::Parts(Some(Type::Never), None),
        (FormKind::AppOf, Some(Type::App(h, p))) => {
            SplitOutcome::Parts(h.as_deref().cloned(), p.as_deref().cloned())
        }
        (FormKind::TupleOf, Some(Type::Never)) => SplitOutcome::Parts(None, None),
        (FormKind::TupleOf, Some(Type::Tuple(_, x, y))) => {
            SplitOutcome::Parts(x.as_deref().cloned(), y.as_deref().cloned())
        }
        _ => SplitOutcome::Mismatch,
    }
}

/// Rebuild a whole type from its two structural parts according to `form`.
///
/// `TupleOf` reconstructs with the neutral `(true, true)` special bounds;
/// `AppOf` has no special bounds to carry.
pub fn join_formulation<A, I: Eq + Hash + Ord + Clone>(
    form: FormKind,
    a: Option<Type<A, I>>,
    b: Option<Type<A, I>>,
) -> Type<A, I> {
    match form {
        FormKind::AppOf => Type::App(a.map(Box::new), b.map(Box::new)),
        FormKind::TupleOf => Type::Tuple(SpecialBounds::neutral(), a.map(Box::new), b.map(Box::new)),
    }
}

/// Outcome of `func_components`: the three structural parts, or a shape
/// mismatch.
pub enum FuncSplitOutcome<A, I: Eq + Hash + Ord + Clone> {
    Parts(Option<Type<A, I>>, Option<Type<A, I>>, Option<Type<A, I>>),
    Mismatch,
}

/// Split a `Func`-shaped `whole` into `(arg, inter, ret)`.
///
/// `Never` projects to `Never` on every component (DESIGN.md Open Question
/// 4 — the spec states this as the general rule for `Never` but only works
/// out the details for `Formulation`; `Func` has no enforcer-level special
/// case written out, so the general rule is applied literally here).
pub fn func_components<A: Clone, I: Eq + Hash + Ord + Clone>(
    whole: &Option<Type<A, I>>,
) -> FuncSplitOutcome<A, I> {
    match whole {
        None => FuncSplitOutcome::Parts(None, None, None),
        Some(Type::Never) => FuncSplitOutcome::Parts(Some(Type::Never), Some(Type::Never), Some(Type::Never)),
        Some(Type::Func(_, arg, inter, ret)) => FuncSplitOutcome::Parts(
            arg.as_deref().cloned(),
            inter.as_deref().cloned(),
            ret.as_deref().cloned(),
        ),
        _ => FuncSplitOutcome::Mismatch,
    }
}

/// Rebuild a `Func` type from its three structural parts, with neutral
/// `(true, true)` special bounds.
pub fn join_func<A, I: Eq + Hash + Ord + Clone>(
    arg: Option<Type<A, I>>,
    inter: Option<Type<A, I>>,
    ret: Option<Type<A, I>>,
) -> Type<A, I> {
    Type::Func(
        SpecialBounds::neutral(),
        arg.map(Box::new),
        inter.map(Box::new),
        ret.map(Box::new),
    )
}
