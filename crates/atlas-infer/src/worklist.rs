//! A small, generic round-based fixed-point solver.
//!
//! This is the in-crate implementation of the propagation-driver contract:
//! generic over the variable, value, and error types, with no knowledge of
//! `Type` or any of this crate's other domain types. `driver` builds the
//! `Type`-specific enforcer list this module iterates to a fixed point.

use std::hash::Hash;

use indexmap::{IndexMap, IndexSet};

/// Whether a variable's bound changed since an enforcer last observed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChangeStatus {
    Unchanged,
    Changed,
}

/// What an enforcer sees when it asks for a variable's current value.
pub(crate) type Query<'a, Var, Val> = dyn Fn(Var) -> (Val, ChangeStatus) + 'a;

/// One constraint-family enforcer: reads the current bounds through `Query`
/// and proposes zero or more `(var, new_bound)` updates. `'a` bounds the
/// enforcer's own captures (typically a borrowed atomic unifier), distinct
/// from the `Query`'s per-call lifetime.
pub(crate) type Enforcer<'a, Var, Val, Err> =
    Box<dyn Fn(&Query<'_, Var, Val>) -> Result<Vec<(Var, Val)>, Err> + 'a>;

/// Run every enforcer, round after round, until a round proposes no change
/// or one returns an error. Returns the bound map at the fixed point.
pub(crate) fn run<Var, Val, Err>(
    initial_values: Vec<(Var, Val)>,
    default_val: Val,
    enforcers: &[Enforcer<'_, Var, Val, Err>],
    merge_updates: impl Fn(Var, Val, Val) -> Result<Val, Err>,
) -> Result<IndexMap<Var, Val>, Err>
where
    Var: Copy + Eq + Hash + Ord,
    Val: Clone + PartialEq,
{
    let mut bounds: IndexMap<Var, Val> = IndexMap::new();
    let mut dirty: IndexSet<Var> = IndexSet::new();
    for (v, val) in initial_values {
        bounds.insert(v, val);
        dirty.insert(v);
    }

    // No enforcer in this crate stabilizes in more than a handful of
    // rounds; this bound exists only to catch a non-terminating enforcer in
    // debug builds, per SPEC_FULL.md's "no timeouts, no cancellation" rule
    // for release behavior.
    let max_rounds = (bounds.len() + enforcers.len() + 1) * 64;
    let mut round = 0usize;

    while !dirty.is_empty() {
        debug_assert!(
            round < max_rounds,
            "propagation did not reach a fixed point within the expected round budget"
        );
        round += 1;

        let snapshot_dirty = dirty.clone();
        let snapshot_bounds = bounds.clone();
        let query = |v: Var| -> (Val, ChangeStatus) {
            let val = snapshot_bounds
                .get(&v)
                .cloned()
                .unwrap_or_else(|| default_val.clone());
            let status = if snapshot_dirty.contains(&v) {
                ChangeStatus::Changed
            } else {
                ChangeStatus::Unchanged
            };
            (val, status)
        };

        let mut proposals: IndexMap<Var, Val> = IndexMap::new();
        for enforcer in enforcers {
            for (v, new_val) in enforcer(&query)? {
                let merged = match proposals.shift_remove(&v) {
                    Some(existing) => merge_updates(v, existing, new_val)?,
                    None => new_val,
                };
                proposals.insert(v, merged);
            }
        }

        dirty.clear();
        for (v, proposed) in proposals {
            let current = bounds.get(&v).cloned().unwrap_or_else(|| default_val.clone());
            let merged = merge_updates(v, current.clone(), proposed)?;
            if merged != current {
                bounds.insert(v, merged);
                dirty.insert(v);
            }
        }
    }

    Ok(bounds)
}
