// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Ordering strategies from their `applies_before`/`applies_after` hints.
//!
//! # Algorithm
//!
//! 1. Build the precedence graph: `a -> b` whenever `a` must run before `b`,
//!    from either side's hints. Hints naming unregistered ids are dropped.
//! 2. Reject cycles with a three-color DFS. The reported pair is the first
//!    two strategies on the detected cycle, so `a before b, b before a`
//!    reports `(a, b)` and a strategy that must run before itself reports
//!    itself twice.
//! 3. Emit a topological order with Kahn's algorithm, always taking the ready
//!    strategy with the lowest `(category, id)`. Categories therefore order
//!    strategies wherever the hints leave them free, and the result is
//!    deterministic for a given set.
//!
//! Any order produced respects the transitive closure of the hints.
//!
//! **Time Complexity**: O((V + E) log V)

use crate::errors::{TraversalError, TraversalResult};
use crate::observability::messages::strategy::{CyclicDependencyDetected, StrategiesSorted};
use crate::observability::messages::StructuredLog;
use crate::strategy::StrategyCategory;
use crate::traits::TraversalStrategy;
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashSet};
use std::sync::Arc;

/// Sorts strategies into application order.
pub fn sort_strategies(
    strategies: &[Arc<dyn TraversalStrategy>],
) -> TraversalResult<Vec<Arc<dyn TraversalStrategy>>> {
    let by_id: BTreeMap<&'static str, &Arc<dyn TraversalStrategy>> =
        strategies.iter().map(|s| (s.id(), s)).collect();
    let graph = precedence_graph(&by_id);

    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();
    let mut path = Vec::new();
    for &id in graph.keys() {
        if visited.contains(id) {
            continue;
        }
        if let Some(cycle) = dfs_cycle_detection(id, &graph, &mut visited, &mut rec_stack, &mut path) {
            let first = cycle[0].to_string();
            let second = cycle.get(1).copied().unwrap_or(cycle[0]).to_string();
            CyclicDependencyDetected {
                first: &first,
                second: &second,
                cycle: &cycle,
            }
            .log();
            return Err(TraversalError::CyclicStrategyDependency { first, second });
        }
    }

    let mut in_degree: BTreeMap<&'static str, usize> = graph.keys().map(|id| (*id, 0)).collect();
    for successors in graph.values() {
        for successor in successors {
            if let Some(degree) = in_degree.get_mut(successor) {
                *degree += 1;
            }
        }
    }

    let rank = |id: &'static str| -> (StrategyCategory, &'static str) {
        let category = by_id
            .get(id)
            .map(|s| s.category())
            .unwrap_or(StrategyCategory::Verification);
        (category, id)
    };
    let mut ready: BinaryHeap<Reverse<(StrategyCategory, &'static str)>> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(&id, _)| Reverse(rank(id)))
        .collect();

    let mut sorted = Vec::with_capacity(by_id.len());
    while let Some(Reverse((_, id))) = ready.pop() {
        if let Some(strategy) = by_id.get(id) {
            sorted.push(Arc::clone(strategy));
        }
        if let Some(successors) = graph.get(id) {
            for &successor in successors {
                if let Some(degree) = in_degree.get_mut(successor) {
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push(Reverse(rank(successor)));
                    }
                }
            }
        }
    }

    let order: Vec<&str> = sorted.iter().map(|s| s.id()).collect();
    StrategiesSorted { order: &order }.log();
    Ok(sorted)
}

fn precedence_graph(
    by_id: &BTreeMap<&'static str, &Arc<dyn TraversalStrategy>>,
) -> BTreeMap<&'static str, BTreeSet<&'static str>> {
    let mut graph: BTreeMap<&'static str, BTreeSet<&'static str>> =
        by_id.keys().map(|id| (*id, BTreeSet::new())).collect();
    for (&id, strategy) in by_id.iter() {
        for &later in strategy.applies_before() {
            if by_id.contains_key(later) {
                graph.entry(id).or_default().insert(later);
            }
        }
        for &earlier in strategy.applies_after() {
            if by_id.contains_key(earlier) {
                graph.entry(earlier).or_default().insert(id);
            }
        }
    }
    graph
}

/// Three-color DFS. Returns the cycle as a closed path (`[a, b, a]`) when a
/// back edge to a node on the current recursion stack is found.
fn dfs_cycle_detection(
    node: &'static str,
    graph: &BTreeMap<&'static str, BTreeSet<&'static str>>,
    visited: &mut HashSet<&'static str>,
    rec_stack: &mut HashSet<&'static str>,
    path: &mut Vec<&'static str>,
) -> Option<Vec<&'static str>> {
    visited.insert(node);
    rec_stack.insert(node);
    path.push(node);

    if let Some(neighbors) = graph.get(node) {
        for &neighbor in neighbors {
            if !visited.contains(neighbor) {
                if let Some(cycle) = dfs_cycle_detection(neighbor, graph, visited, rec_stack, path) {
                    return Some(cycle);
                }
            } else if rec_stack.contains(neighbor) {
                let cycle_start = path.iter().position(|x| *x == neighbor).unwrap_or(0);
                let mut cycle = path[cycle_start..].to_vec();
                cycle.push(neighbor);
                return Some(cycle);
            }
        }
    }

    rec_stack.remove(node);
    path.pop();
    None
}
