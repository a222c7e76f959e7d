//! The lifted unifier: elevates a caller-supplied atomic unifier to operate
//! on `Option<Type<A, I>>`, in both an equality mode and an asymmetric
//! (`Lte`/`Gte`) mode.

use std::hash::Hash;

use indexmap::IndexMap;

use crate::error::TypeError;
use crate::types::{InteractionRow, Type};

/// Which side of an inequality is being refined: `Lte` means "the known
/// side is the lower bound, refine the upper"; `Gte` is the mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Lte,
    Gte,
}

impl Direction {
    pub fn flip(self) -> Self {
        match self {
            Direction::Lte => Direction::Gte,
            Direction::Gte => Direction::Lte,
        }
    }
}

/// The caller-supplied unifier for atomic (leaf) types.
///
/// Implementations must be reflexive and symmetric where implied, and
/// monotone under refinement (SPEC_FULL.md §6).
pub trait AtomUnifier {
    type Atom: Clone + PartialEq + std::fmt::Debug;
    type Error: Clone + std::fmt::Debug + PartialEq;

    fn unify_eq(&self, a: &Self::Atom, b: &Self::Atom) -> Result<Self::Atom, Self::Error>;

    fn unify_asym(
        &self,
        dir: Direction,
        lower: &Self::Atom,
        upper: &Self::Atom,
    ) -> Result<Self::Atom, Self::Error>;

    fn unify_lte(
        &self,
        lower: &Self::Atom,
        upper: &Self::Atom,
    ) -> Result<(Self::Atom, Self::Atom), Self::Error>;
}

type TErr<U, I> = TypeError<<U as AtomUnifier>::Atom, I, <U as AtomUnifier>::Error>;

/// `unifyEQ`: compute a common bound for `x` and `y`. `None` is the
/// identity; two presents recurse structurally; incompatible shapes fail.
pub fn unify_eq<U, I>(
    u: &U,
    x: Option<Type<U::Atom, I>>,
    y: Option<Type<U::Atom, I>>,
) -> Result<Option<Type<U::Atom, I>>, TErr<U, I>>
where
    U: AtomUnifier,
    I: Eq + Hash + Ord + Clone + std::fmt::Debug,
{
    match (x, y) {
        (None, y) => Ok(y),
        (x, None) => Ok(x),
        (Some(a), Some(b)) => unify_eq_some(u, a, b).map(Some),
    }
}

fn unify_eq_some<U, I>(u: &U, a: Type<U::Atom, I>, b: Type<U::Atom, I>) -> Result<Type<U::Atom, I>, TErr<U, I>>
where
    U: AtomUnifier,
    I: Eq + Hash + Ord + Clone + std::fmt::Debug,
{
    match (a, b) {
        (Type::Never, t) | (t, Type::Never) => Ok(t),
        (Type::Atom(a), Type::Atom(b)) => u
            .unify_eq(&a, &b)
            .map(Type::Atom)
            .map_err(TypeError::Atom),
        (Type::App(h1, p1), Type::App(h2, p2)) => {
            let h = unify_eq(u, opt_ty(h1), opt_ty(h2))?;
            let p = unify_eq(u, opt_ty(p1), opt_ty(p2))?;
            Ok(Type::App(h.map(Box::new), p.map(Box::new)))
        }
        (Type::Tuple(sb1, x1, y1), Type::Tuple(sb2, x2, y2)) => {
            let x = unify_eq(u, opt_ty(x1), opt_ty(x2))?;
            let y = unify_eq(u, opt_ty(y1), opt_ty(y2))?;
            Ok(Type::Tuple(sb1.merge(sb2), x.map(Box::new), y.map(Box::new)))
        }
        (Type::Func(sb1, a1, i1, r1), Type::Func(sb2, a2, i2, r2)) => {
            let arg = unify_eq(u, opt_ty(a1), opt_ty(a2))?;
            let inter = unify_eq(u, opt_ty(i1), opt_ty(i2))?;
            let ret = unify_eq(u, opt_ty(r1), opt_ty(r2))?;
            Ok(Type::Func(
                sb1.merge(sb2),
                arg.map(Box::new),
                inter.map(Box::new),
                ret.map(Box::new),
            ))
        }
        (Type::Interaction(r1), Type::Interaction(r2)) => {
            unify_eq_rows(r1, r2).map(Type::Interaction)
        }
        (a, b) => Err(TypeError::Mismatch(a, b)),
    }
}

fn opt_ty<A, I: Eq + Hash + Ord + Clone>(slot: Option<Box<Type<A, I>>>) -> Option<Type<A, I>> {
    slot.map(|b| *b)
}

/// Equality unification of two interaction rows: `lo` maps must agree
/// pointwise (same parameter arity per shared key; the caller's parameter
/// variables themselves are equated later, by the `Interaction` enforcer
/// writing bound updates, not by this pure structural step), and `hi` sets
/// intersect.
fn unify_eq_rows<U, I>(r1: InteractionRow<I>, r2: InteractionRow<I>) -> Result<InteractionRow<I>, TErr<U, I>>
where
    U: AtomUnifier,
    I: Eq + Hash + Ord + Clone + std::fmt::Debug,
{
    let mut lo = IndexMap::new();
    for (k, v1) in &r1.lo {
        if let Some(v2) = r2.lo.get(k) {
            if v1.len() != v2.len() {
                return Err(TypeError::InteractionArity {
                    inter: k.clone(),
                    expected: v1.len(),
                    found: v2.len(),
                });
            }
        }
        lo.insert(k.clone(), v1.clone());
    }
    for (k, v2) in &r2.lo {
        lo.entry(k.clone()).or_insert_with(|| v2.clone());
    }
    let hi = r1.hi.intersection(&r2.hi);
    Ok(InteractionRow::new(lo, hi))
}

/// `unifyAsym(dir, lower, upper)`: refine one side knowing the other.
/// `dir = Lte` means `lower <= upper`; returns the refined `upper`.
/// `dir = Gte` is the mirror (returns the refined `lower`); implemented by
/// swapping the operands and direction.
pub fn unify_asym<U, I>(
    u: &U,
    dir: Direction,
    known: Option<Type<U::Atom, I>>,
    unknown: Option<Type<U::Atom, I>>,
) -> Result<Option<Type<U::Atom, I>>, TErr<U, I>>
where
    U: AtomUnifier,
    I: Eq + Hash + Ord + Clone + std::fmt::Debug,
{
    match dir {
        Direction::Gte => unify_asym(u, Direction::Lte, unknown, known),
        Direction::Lte => match (known, unknown) {
            (None, unknown) => Ok(unknown),
            (known, None) => Ok(known),
            (Some(lower), Some(upper)) => unify_asym_some(u, lower, upper).map(Some),
        },
    }
}

fn unify_asym_some<U, I>(u: &U, lower: Type<U::Atom, I>, upper: Type<U::Atom, I>) -> Result<Type<U::Atom, I>, TErr<U, I>>
where
    U: AtomUnifier,
    I: Eq + Hash + Ord + Clone + std::fmt::Debug,
{
    match (lower, upper) {
        (Type::Never, upper) => Ok(upper),
        (lower, Type::Never) => Err(TypeError::Mismatch(lower, Type::Never)),
        (Type::Atom(a), Type::Atom(b)) => u
            .unify_asym(Direction::Lte, &a, &b)
            .map(Type::Atom)
            .map_err(TypeError::Atom),
        (Type::App(h1, p1), Type::App(h2, p2)) => {
            let h = unify_asym(u, Direction::Lte, opt_ty(h1), opt_ty(h2))?;
            let p = unify_asym(u, Direction::Lte, opt_ty(p1), opt_ty(p2))?;
            Ok(Type::App(h.map(Box::new), p.map(Box::new)))
        }
        (Type::Tuple(sb1, x1, y1), Type::Tuple(sb2, x2, y2)) => {
            let x = unify_asym(u, Direction::Lte, opt_ty(x1), opt_ty(x2))?;
            let y = unify_asym(u, Direction::Lte, opt_ty(y1), opt_ty(y2))?;
            Ok(Type::Tuple(sb1.merge(sb2), x.map(Box::new), y.map(Box::new)))
        }
        (Type::Func(sb1, a1, i1, r1), Type::Func(sb2, a2, i2, r2)) => {
            // Function subtyping: contravariant argument, covariant
            // interaction/result (DESIGN.md Open Question 7).
            let arg = unify_asym(u, Direction::Gte, opt_ty(a1), opt_ty(a2))?;
            let inter = unify_asym(u, Direction::Lte, opt_ty(i1), opt_ty(i2))?;
            let ret = unify_asym(u, Direction::Lte, opt_ty(r1), opt_ty(r2))?;
            Ok(Type::Func(
                sb1.merge(sb2),
                arg.map(Box::new),
                inter.map(Box::new),
                ret.map(Box::new),
            ))
        }
        (Type::Interaction(lo_row), Type::Interaction(hi_row)) => {
            Ok(Type::Interaction(unify_row_asym(lo_row, hi_row)))
        }
        (a, b) => Err(TypeError::Mismatch(a, b)),
    }
}

/// Asymmetric merge for interaction rows (DESIGN.md Open Question 6): a
/// "lower" (more specific) row has a superset `lo` and a subset `hi`. This
/// crate's conservative reading unions `lo` (both sides' requirements
/// survive) and intersects `hi` (the narrower permission wins), the same
/// merge `unifyEQ` on rows performs — sound, if not maximally precise, since
/// no enforcer in SPEC_FULL.md exercises a generic inequality between two
/// independently-bound interaction-typed variables. Infallible: set union
/// and intersection never conflict.
fn unify_row_asym<I: Eq + Hash + Ord + Clone + std::fmt::Debug>(
    lo_row: InteractionRow<I>,
    hi_row: InteractionRow<I>,
) -> InteractionRow<I> {
    let mut lo = lo_row.lo.clone();
    for (k, v) in &hi_row.lo {
        lo.entry(k.clone()).or_insert_with(|| v.clone());
    }
    let hi = lo_row.hi.intersection(&hi_row.hi);
    InteractionRow::new(lo, hi)
}

/// `unifyLTE(x, y)`: returns *both* refined sides of `x <= y`.
pub fn unify_lte<U, I>(
    u: &U,
    lower: Option<Type<U::Atom, I>>,
    upper: Option<Type<U::Atom, I>>,
) -> Result<(Option<Type<U::Atom, I>>, Option<Type<U::Atom, I>>), TErr<U, I>>
where
    U: AtomUnifier,
    I: Eq + Hash + Ord + Clone + std::fmt::Debug,
{
    match (lower, upper) {
        (None, None) => Ok((None, None)),
        (Some(l), None) => Ok((Some(l), None)),
        (None, Some(up)) => Ok((None, Some(up))),
        (Some(l), Some(up)) => unify_lte_some(u, l, up),
    }
}

fn unify_lte_some<U, I>(
    u: &U,
    lower: Type<U::Atom, I>,
    upper: Type<U::Atom, I>,
) -> Result<(Option<Type<U::Atom, I>>, Option<Type<U::Atom, I>>), TErr<U, I>>
where
    U: AtomUnifier,
    I: Eq + Hash + Ord + Clone + std::fmt::Debug,
{
    match (lower, upper) {
        (Type::Never, upper) => Ok((Some(Type::Never), Some(upper))),
        (lower, Type::Never) => Err(TypeError::Mismatch(lower, Type::Never)),
        (Type::Atom(a), Type::Atom(b)) => {
            let (a2, b2) = u.unify_lte(&a, &b).map_err(TypeError::Atom)?;
            Ok((Some(Type::Atom(a2)), Some(Type::Atom(b2))))
        }
        (Type::App(h1, p1), Type::App(h2, p2)) => {
            let (h1r, h2r) = unify_lte(u, opt_ty(h1), opt_ty(h2))?;
            let (p1r, p2r) = unify_lte(u, opt_ty(p1), opt_ty(p2))?;
            Ok((
                Some(Type::App(h1r.map(Box::new), p1r.map(Box::new))),
                Some(Type::App(h2r.map(Box::new), p2r.map(Box::new))),
            ))
        }
        (Type::Tuple(sb1, x1, y1), Type::Tuple(sb2, x2, y2)) => {
            let (x1r, x2r) = unify_lte(u, opt_ty(x1), opt_ty(x2))?;
            let (y1r, y2r) = unify_lte(u, opt_ty(y1), opt_ty(y2))?;
            let sb = sb1.merge(sb2);
            Ok((
                Some(Type::Tuple(sb, x1r.map(Box::new), y1r.map(Box::new))),
                Some(Type::Tuple(sb, x2r.map(Box::new), y2r.map(Box::new))),
            ))
        }
        (Type::Func(sb1, a1, i1, r1), Type::Func(sb2, a2, i2, r2)) => {
            // Contravariant argument: swap operand order, then swap the
            // results back so `a1r`/`a2r` line up with the original sides.
            let (a2r, a1r) = unify_lte(u, opt_ty(a2), opt_ty(a1))?;
            let (i1r, i2r) = unify_lte(u, opt_ty(i1), opt_ty(i2))?;
            let (r1r, r2r) = unify_lte(u, opt_ty(r1), opt_ty(r2))?;
            let sb = sb1.merge(sb2);
            Ok((
                Some(Type::Func(sb, a1r.map(Box::new), i1r.map(Box::new), r1r.map(Box::new))),
                Some(Type::Func(sb, a2r.map(Box::new), i2r.map(Box::new), r2r.map(Box::new))),
            ))
        }
        (Type::Interaction(r1), Type::Interaction(r2)) => {
            let merged = unify_row_asym(r1, r2);
            Ok((Some(Type::Interaction(merged.clone())), Some(Type::Interaction(merged))))
        }
        (a, b) => Err(TypeError::Mismatch(a, b)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, PartialEq, Eq, Debug)]
    enum Atom {
        Int,
        Bool,
    }

    #[derive(Clone, Debug, PartialEq)]
    struct Mismatch;

    struct TrivialAtoms;

    impl AtomUnifier for TrivialAtoms {
        type Atom = Atom;
        type Error = Mismatch;

        fn unify_eq(&self, a: &Atom, b: &Atom) -> Result<Atom, Mismatch> {
            if a == b {
                Ok(*a)
            } else {
                Err(Mismatch)
            }
        }

        fn unify_asym(&self, _dir: Direction, lower: &Atom, upper: &Atom) -> Result<Atom, Mismatch> {
            self.unify_eq(lower, upper)
        }

        fn unify_lte(&self, lower: &Atom, upper: &Atom) -> Result<(Atom, Atom), Mismatch> {
            self.unify_eq(lower, upper).map(|a| (a, a))
        }
    }

    #[test]
    fn unify_eq_none_is_identity() {
        let r = unify_eq::<_, String>(&TrivialAtoms, None, Some(Type::Atom(Atom::Int))).unwrap();
        assert_eq!(r, Some(Type::Atom(Atom::Int)));
    }

    #[test]
    fn unify_eq_never_absorbs() {
        let r = unify_eq::<_, String>(&TrivialAtoms, Some(Type::Never), Some(Type::Atom(Atom::Int))).unwrap();
        assert_eq!(r, Some(Type::Atom(Atom::Int)));
    }

    #[test]
    fn unify_eq_mismatched_atoms_fail() {
        let r = unify_eq::<_, String>(
            &TrivialAtoms,
            Some(Type::Atom(Atom::Int)),
            Some(Type::Atom(Atom::Bool)),
        );
        assert!(r.is_err());
    }

    #[test]
    fn unify_eq_app_recurses() {
        let a: Option<Type<Atom, String>> = Some(Type::App(Some(Box::new(Type::Atom(Atom::Int))), None));
        let b: Option<Type<Atom, String>> = Some(Type::App(None, Some(Box::new(Type::Atom(Atom::Bool)))));
        let r = unify_eq(&TrivialAtoms, a, b).unwrap();
        assert_eq!(
            r,
            Some(Type::App(
                Some(Box::new(Type::Atom(Atom::Int))),
                Some(Box::new(Type::Atom(Atom::Bool)))
            ))
        );
    }
}
