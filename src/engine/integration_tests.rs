// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::computer::{
    ComputeSubstrate, ComputeVertex, LocalSubstrate, Memory, MemoryComputeKey, MemoryOperator,
    Messenger, RoundMemory, TraversalComputer, PROCESSED_KEY,
};
use crate::errors::{TraversalError, TraversalResult};
use crate::steps::{MatchAlgorithmKind, P};
use crate::strategy::StrategyRegistry;
use crate::structure::{Graph, InMemoryGraph, Value};
use crate::traits::VertexProgram;
use crate::traversal::{GraphTraversalSource, __};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn source() -> GraphTraversalSource {
    let registry = StrategyRegistry::with_defaults(MatchAlgorithmKind::Count, &[]).unwrap();
    GraphTraversalSource::new(Arc::new(InMemoryGraph::modern()), Arc::new(registry))
}

fn computer() -> TraversalComputer {
    TraversalComputer::new(LocalSubstrate::new(3, 50))
}

#[tokio::test]
async fn test_count_matches_standard_engine() {
    let g = source();
    let standard = g.v(&[]).out(&["created"]).count().to_list().unwrap();

    let job = computer().submit(g.v(&[]).out(&["created"]).count()).unwrap();
    let mut result = job.join().await.unwrap();
    assert_eq!(result.traversal.to_list().unwrap(), standard);
    assert_eq!(standard, vec![Value::Int(4)]);
}

#[tokio::test]
async fn test_two_hops_travel_between_vertices() {
    let g = source();
    let job = computer()
        .submit(g.v(&[1]).out(&[]).out(&[]).values(&["name"]))
        .unwrap();
    let mut result = job.join().await.unwrap();
    let names = result.traversal.to_set().unwrap();
    let expected: BTreeSet<Value> = [Value::str("ripple"), Value::str("lop")].into_iter().collect();
    assert_eq!(names, expected);
    // v1 seeds, then josh, then ripple and lop report back
    assert!(result.memory.iterations() >= 2);
    assert!(matches!(result.memory.get(PROCESSED_KEY), Some(Value::Int(n)) if *n > 0));
}

#[tokio::test]
async fn test_bulk_survives_message_passing() {
    let g = source();
    let job = computer().submit(g.v(&[]).out(&["created"])).unwrap();
    let mut result = job.join().await.unwrap();
    let bulk = result.traversal.to_bulk_set().unwrap();
    assert_eq!(bulk.long_size(), 4);
    assert_eq!(bulk.get(&Value::Vertex(crate::structure::Vertex::new(3, "software"))), 3);
}

#[tokio::test]
async fn test_match_hops_to_pattern_starts() {
    let g = source();
    let patterns = || {
        vec![
            __::as_("a").out(&["knows"]).as_("b"),
            __::as_("b").out(&["created"]).as_("c"),
        ]
    };
    let standard = g.v(&[]).match_all(patterns()).to_set().unwrap();
    assert_eq!(standard.len(), 2);

    let job = computer().submit(g.v(&[]).match_all(patterns())).unwrap();
    let mut result = job.join().await.unwrap();
    assert_eq!(result.traversal.to_set().unwrap(), standard);
}

#[tokio::test]
async fn test_branch_reaching_past_the_star_fails() {
    let g = source();
    let traversal = g
        .v(&[1])
        .coalesce(vec![__::out(&["knows"]).values(&["name"])]);
    let job = computer().submit(traversal).unwrap();
    let err = job.join().await.unwrap_err();
    assert!(matches!(err, TraversalError::IllegalAdjacentAccess { .. }));
}

#[tokio::test]
async fn test_branch_reading_adjacent_labels_fails() {
    let g = source();
    let traversal = g.v(&[1]).union(vec![__::out(&["knows"]).has_label(&["person"])]);
    let job = computer().submit(traversal).unwrap();
    let err = job.join().await.unwrap_err();
    assert!(matches!(err, TraversalError::IllegalAdjacentAccess { .. }));
}

#[tokio::test]
async fn test_unsupported_steps_rejected_at_submit() {
    let g = source();
    let err = computer().submit(g.v(&[]).limit(2)).unwrap_err();
    assert!(matches!(err, TraversalError::ComputerUnsupported { .. }));
    let err = computer().submit(g.inject(vec![Value::Int(1)])).unwrap_err();
    assert!(matches!(err, TraversalError::ComputerUnsupported { .. }));
}

#[tokio::test]
async fn test_iteration_limit_applies_to_traversals() {
    let g = source();
    let tight = TraversalComputer::new(LocalSubstrate::new(2, 1));
    let job = tight.submit(g.v(&[1]).out(&[]).out(&[])).unwrap();
    assert_eq!(
        job.join().await.unwrap_err(),
        TraversalError::MaxIterationsExceeded { limit: 1 }
    );
}

#[test]
fn test_computer_traversal_cannot_be_iterated() {
    let g = source().with_computer();
    let mut traversal = g.v(&[]).count();
    assert_eq!(
        traversal.to_list().unwrap_err(),
        TraversalError::EngineMismatch {
            expected: "standard",
            actual: "computer",
        }
    );
}

/// Misbehaves in a configurable way during its first round.
#[derive(Clone)]
enum Misbehaving {
    UndeclaredKey,
    WrongOperator,
    SetDuringRound,
}

impl VertexProgram for Misbehaving {
    type Message = ();
    type State = ();

    fn memory_compute_keys(&self) -> Vec<MemoryComputeKey> {
        vec![MemoryComputeKey::new("total", MemoryOperator::Incr)]
    }

    fn setup(&self, _memory: &mut Memory) -> TraversalResult<()> {
        Ok(())
    }

    fn execute(
        &mut self,
        _vertex: &mut ComputeVertex<'_, ()>,
        _messenger: &mut Messenger<'_, ()>,
        memory: &mut RoundMemory,
    ) -> TraversalResult<()> {
        match self {
            Misbehaving::UndeclaredKey => memory.incr("elsewhere", Value::Int(1)),
            Misbehaving::WrongOperator => memory.or("total", true),
            Misbehaving::SetDuringRound => memory.set("total", Value::Int(1)),
        }
    }

    fn terminate(&self, _memory: &mut Memory) -> TraversalResult<bool> {
        Ok(true)
    }
}

async fn run(program: Misbehaving) -> TraversalError {
    let graph: Arc<dyn Graph> = Arc::new(InMemoryGraph::modern());
    LocalSubstrate::new(2, 10)
        .run_to_convergence(graph, program, CancellationToken::new())
        .await
        .unwrap_err()
}

#[tokio::test]
async fn test_memory_misuse_fails_the_computation() {
    assert_eq!(
        run(Misbehaving::UndeclaredKey).await,
        TraversalError::UndeclaredMemoryKey {
            key: "elsewhere".into()
        }
    );
    assert!(matches!(
        run(Misbehaving::WrongOperator).await,
        TraversalError::MemoryOperatorMismatch { .. }
    ));
    assert_eq!(
        run(Misbehaving::SetDuringRound).await,
        TraversalError::ConcurrentMemorySet {
            key: "total".into()
        }
    );
}

#[tokio::test]
async fn test_filters_run_locally() {
    let g = source();
    let job = computer()
        .submit(g.v(&[]).has("age", P::gt(30)).values(&["name"]))
        .unwrap();
    let mut result = job.join().await.unwrap();
    let names = result.traversal.to_set().unwrap();
    let expected: BTreeSet<Value> = [Value::str("josh"), Value::str("peter")].into_iter().collect();
    assert_eq!(names, expected);
    assert_eq!(result.memory.iterations(), 0);
}
