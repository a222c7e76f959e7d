//! The recursion checker: builds the structural-larger-than graph and
//! rejects constraint sets that would demand an infinite type.

use std::hash::Hash;

use indexmap::IndexMap;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::consolidate::Consolidated;
use crate::var::Var;

/// The structural-larger-than graph has a cycle.
pub(crate) struct CycleDetected;

/// Reject `consolidated` if its structural-larger-than graph is cyclic.
///
/// Edges (`u -> v` means "`u` is structurally larger than `v`") come only
/// from `Formulation`, `Func`, `Interaction`, and non-empty
/// `InteractionDifference` constraints; `Bound` and `Relation` contribute
/// none.
pub(crate) fn check_acyclic<A, I: Eq + Hash + Ord + Clone>(
    consolidated: &Consolidated<A, I>,
) -> Result<(), CycleDetected> {
    let mut graph: DiGraph<Var, ()> = DiGraph::new();
    let mut nodes: IndexMap<Var, NodeIndex> = IndexMap::new();

    fn node_of(v: Var, graph: &mut DiGraph<Var, ()>, nodes: &mut IndexMap<Var, NodeIndex>) -> NodeIndex {
        *nodes.entry(v).or_insert_with(|| graph.add_node(v))
    }

    fn add_edge(from: Var, to: Var, graph: &mut DiGraph<Var, ()>, nodes: &mut IndexMap<Var, NodeIndex>) {
        let f = node_of(from, graph, nodes);
        let t = node_of(to, graph, nodes);
        graph.add_edge(f, t, ());
    }

    for &v in &consolidated.vars {
        node_of(v, &mut graph, &mut nodes);
    }

    for (whole, _form, a, b) in &consolidated.formulations {
        add_edge(*whole, *a, &mut graph, &mut nodes);
        add_edge(*whole, *b, &mut graph, &mut nodes);
    }
    for (f, arg, inter, ret) in &consolidated.funcs {
        add_edge(*f, *arg, &mut graph, &mut nodes);
        add_edge(*f, *inter, &mut graph, &mut nodes);
        add_edge(*f, *ret, &mut graph, &mut nodes);
    }
    for (v, _i, params) in &consolidated.interactions {
        for p in params {
            add_edge(*v, *p, &mut graph, &mut nodes);
        }
    }
    for (whole, inters, rest) in &consolidated.interaction_diffs {
        if !inters.is_empty() {
            add_edge(*whole, *rest, &mut graph, &mut nodes);
        }
    }

    match toposort(&graph, None) {
        Ok(_) => Ok(()),
        Err(_cycle) => Err(CycleDetected),
    }
}
