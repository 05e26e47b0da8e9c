// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::computer::ResultGraph;
use crate::observability::messages::computer::MapReduceCompleted;
use crate::observability::messages::StructuredLog;
use crate::structure::Vertex;
use crate::traits::MapReduce;
use crate::traverser::TraverserSet;
use std::collections::BTreeMap;

/// Runs `job` over every vertex state of a finished computation.
pub fn run_map_reduce<S, J: MapReduce<S>>(job: &J, graph: &ResultGraph<S>) -> J::Output {
    let mut grouped: BTreeMap<J::Key, Vec<J::Value>> = BTreeMap::new();
    for (vertex, state) in graph.iter() {
        job.map(vertex, state, &mut |key: J::Key, value: J::Value| {
            grouped.entry(key).or_default().push(value)
        });
    }
    let reduced: Vec<(J::Key, J::Value)> = grouped
        .into_iter()
        .map(|(key, values)| {
            let value = job.reduce(&key, values);
            (key, value)
        })
        .collect();
    MapReduceCompleted {
        job: std::any::type_name::<J>(),
        vertices: graph.len(),
        keys: reduced.len(),
    }
    .log();
    job.finish(reduced)
}

/// Gathers the traversers halted at every vertex into one set.
#[derive(Debug, Clone, Copy, Default)]
pub struct TraverserMapReduce;

impl MapReduce<TraverserSet> for TraverserMapReduce {
    type Key = ();
    type Value = TraverserSet;
    type Output = TraverserSet;

    fn map(&self, _vertex: &Vertex, state: &TraverserSet, emit: &mut dyn FnMut((), TraverserSet)) {
        if !state.is_empty() {
            emit((), state.clone());
        }
    }

    fn reduce(&self, _key: &(), values: Vec<TraverserSet>) -> TraverserSet {
        let mut merged = TraverserSet::new();
        for set in values {
            merged.extend(set);
        }
        merged
    }

    fn finish(&self, reduced: Vec<((), TraverserSet)>) -> TraverserSet {
        reduced.into_iter().map(|(_, set)| set).next().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::VertexId;
    use crate::traverser::Traverser;
    use crate::structure::Value;

    /// Counts vertices per label.
    struct LabelCount;

    impl MapReduce<u64> for LabelCount {
        type Key = String;
        type Value = u64;
        type Output = Vec<(String, u64)>;

        fn map(&self, vertex: &Vertex, _state: &u64, emit: &mut dyn FnMut(String, u64)) {
            emit(vertex.label.clone(), 1);
        }

        fn reduce(&self, _key: &String, values: Vec<u64>) -> u64 {
            values.into_iter().sum()
        }

        fn finish(&self, reduced: Vec<(String, u64)>) -> Vec<(String, u64)> {
            reduced
        }
    }

    fn graph_of<S>(states: Vec<(Vertex, S)>) -> ResultGraph<S> {
        ResultGraph::from_states(states)
    }

    #[test]
    fn test_reduces_by_key_in_key_order() {
        let graph = graph_of(vec![
            (Vertex::new(1, "person"), 0u64),
            (Vertex::new(2, "software"), 0),
            (Vertex::new(3, "person"), 0),
        ]);
        assert_eq!(
            run_map_reduce(&LabelCount, &graph),
            vec![("person".to_string(), 2), ("software".to_string(), 1)]
        );
    }

    #[test]
    fn test_traverser_map_reduce_merges_bulk() {
        let mut a = TraverserSet::new();
        a.add(Traverser::new(Value::Int(1)));
        let mut b = TraverserSet::new();
        b.add(Traverser::with_bulk(Value::Int(1), 2));
        let graph = graph_of(vec![(Vertex::new(1, "x"), a), (Vertex::new(2, "x"), b)]);
        let halted = run_map_reduce(&TraverserMapReduce, &graph);
        assert_eq!(halted.len(), 1);
        assert_eq!(halted.total_bulk(), 3);
        assert!(graph.state(VertexId(2)).is_some());
    }
}
