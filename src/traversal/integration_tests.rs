// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::Engine;
use crate::errors::{GraphError, GraphResult, TraversalError, TraversalResult};
use crate::steps::{
    BarrierStep, CompareOp, FilterStep, MatchAlgorithmKind, Step, StepKind, WherePredicate, P,
};
use crate::strategy::{StrategyCategory, StrategyRegistry, TraversalStrategies};
use crate::structure::{
    Direction, Edge, EdgeId, ElementIter, ElementRef, Graph, InMemoryGraph, Value, Vertex,
    VertexId,
};
use crate::traits::TraversalStrategy;
use crate::traversal::{GraphTraversalSource, Traversal, __};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn over(graph: impl Graph + 'static) -> GraphTraversalSource {
    let registry = StrategyRegistry::with_defaults(MatchAlgorithmKind::Count, &[]).unwrap();
    GraphTraversalSource::new(Arc::new(graph), Arc::new(registry))
}

fn modern() -> GraphTraversalSource {
    over(InMemoryGraph::modern())
}

fn person(id: u64) -> Value {
    Value::Vertex(Vertex::new(id, "person"))
}

fn names(values: &[&str]) -> BTreeSet<Value> {
    values.iter().map(|n| Value::str(*n)).collect()
}

#[test]
fn test_two_hops_yield_single_result_then_exhaust() {
    let mut graph = InMemoryGraph::new();
    for id in 1..=4 {
        graph.add_vertex(id, "node", vec![]);
    }
    graph.add_edge(10, 1, "next", 2, vec![]).unwrap();
    graph.add_edge(11, 2, "next", 3, vec![]).unwrap();
    graph.add_edge(12, 1, "next", 4, vec![]).unwrap();
    let g = over(graph);

    let mut traversal = g.v(&[1]).out(&[]).out(&[]);
    let result = traversal.next_traverser().unwrap();
    assert_eq!(result.value(), &Value::Vertex(Vertex::new(3, "node")));
    assert_eq!(result.bulk(), 1);
    assert!(!traversal.has_next().unwrap());
    assert_eq!(traversal.next_traverser(), Err(TraversalError::Exhausted));
}

#[test]
fn test_bulk_is_conserved_through_barriers() {
    let g = modern();
    let unrolled = g.v(&[]).both(&[]).to_list().unwrap();
    assert_eq!(unrolled.len(), 12);

    let merged = g.v(&[]).both(&[]).barrier().to_bulk_set().unwrap();
    assert_eq!(merged.long_size(), 12);
    assert!(merged.unique_size() < 12);
    // lop is reached from marko, josh and peter
    assert_eq!(merged.get(&Value::Vertex(Vertex::new(3, "software"))), 3);

    assert_eq!(g.v(&[]).both(&[]).count().to_list().unwrap(), vec![Value::Int(12)]);
}

#[test]
fn test_dedup_is_idempotent() {
    let g = modern();
    let once = g.v(&[]).out(&[]).dedup().to_list().unwrap();
    let twice = g.v(&[]).out(&[]).dedup().dedup().to_list().unwrap();
    assert_eq!(once, twice);
    assert_eq!(once.len(), 4);
}

#[test]
fn test_locked_traversal_rejects_changes() {
    let g = modern();
    let mut traversal = g.v(&[]);
    assert!(traversal.has_next().unwrap());
    assert!(traversal.is_locked());

    let err = traversal
        .add_step(Step::new(StepKind::Filter(FilterStep::Identity)))
        .unwrap_err();
    assert!(matches!(err, TraversalError::LockedTraversal { .. }));

    // builders record the failure and surface it on the next pull
    let mut extended = traversal.out(&[]);
    assert!(matches!(
        extended.next_traverser(),
        Err(TraversalError::LockedTraversal { .. })
    ));
}

#[test]
fn test_match_binds_every_pattern_label() {
    let g = modern();
    let results = g
        .v(&[])
        .match_all(vec![
            __::as_("a").has("name", P::eq("marko")),
            __::as_("a").out(&["knows"]).as_("b"),
        ])
        .to_list()
        .unwrap();
    assert_eq!(results.len(), 2);
    let mut bound_b = BTreeSet::new();
    for result in results {
        let Value::Map(map) = result else {
            panic!("match emits maps, got {:?}", result);
        };
        assert_eq!(map.get(&Value::str("a")), Some(&person(1)));
        bound_b.insert(map.get(&Value::str("b")).cloned().unwrap());
    }
    assert_eq!(bound_b, [person(2), person(4)].into_iter().collect());
}

#[test]
fn test_match_with_greedy_algorithm_agrees_with_count() {
    let registry = StrategyRegistry::with_defaults(MatchAlgorithmKind::Greedy, &[]).unwrap();
    let greedy = GraphTraversalSource::new(Arc::new(InMemoryGraph::modern()), Arc::new(registry));
    let patterns = || {
        vec![
            __::as_("a").out(&["created"]).as_("b"),
            __::as_("b").in_(&["created"]).as_("c"),
        ]
    };
    let by_count = modern().v(&[]).match_all(patterns()).to_set().unwrap();
    let by_greedy = greedy.v(&[]).match_all(patterns()).to_set().unwrap();
    assert_eq!(by_count, by_greedy);
    assert!(!by_count.is_empty());
}

#[test]
fn test_coalesce_takes_first_productive_branch() {
    let g = modern();
    let results = g
        .v(&[1, 2])
        .coalesce(vec![
            __::out(&["created"]).values(&["name"]),
            __::constant("nothing"),
        ])
        .to_list()
        .unwrap();
    assert_eq!(results, vec![Value::str("lop"), Value::str("nothing")]);
}

#[test]
fn test_where_compares_labels() {
    let g = modern();
    let pairs = g
        .v(&[])
        .as_("a")
        .out(&["created"])
        .in_(&["created"])
        .as_("b")
        .where_(WherePredicate::labels("a", CompareOp::Neq, "b"))
        .select(&["a", "b"])
        .count()
        .to_list()
        .unwrap();
    assert_eq!(pairs, vec![Value::Int(6)]);
}

#[test]
fn test_sack_accumulates_edge_weights() {
    let g = modern().with_sack(0);
    let sacks = g
        .v(&[1])
        .out_e(&[])
        .sack_add("weight")
        .sack()
        .to_set()
        .unwrap();
    let expected: BTreeSet<Value> = [0.5, 1.0, 0.4].into_iter().map(Value::float).collect();
    assert_eq!(sacks, expected);
}

#[test]
fn test_group_count_by_label() {
    let g = modern();
    let groups = g.v(&[]).label().group_count().to_list().unwrap();
    let Value::Map(groups) = &groups[0] else {
        panic!("group_count emits a map");
    };
    assert_eq!(groups.get(&Value::str("person")), Some(&Value::Int(4)));
    assert_eq!(groups.get(&Value::str("software")), Some(&Value::Int(2)));
}

#[test]
fn test_store_then_cap() {
    let g = modern();
    let stored = g
        .v(&[])
        .has_label(&["software"])
        .values(&["name"])
        .store("x")
        .cap("x")
        .to_list()
        .unwrap();
    assert_eq!(
        stored,
        vec![Value::List(vec![Value::str("lop"), Value::str("ripple")])]
    );
}

#[test]
fn test_union_concatenates_branches() {
    let g = modern();
    let neighbours = g
        .v(&[4])
        .union(vec![__::out(&[]), __::in_(&[])])
        .values(&["name"])
        .to_set()
        .unwrap();
    assert_eq!(neighbours, names(&["ripple", "lop", "marko"]));
}

#[test]
fn test_incident_edges_fold_into_adjacency() {
    let g = modern();
    let via_edges = g.v(&[1]).out_e(&["knows"]).in_v().values(&["name"]).to_set().unwrap();
    assert_eq!(via_edges, names(&["vadas", "josh"]));
}

#[test]
fn test_anonymous_traversal_cannot_run_alone() {
    let mut anonymous: Traversal = __::out(&[]);
    assert!(matches!(
        anonymous.to_list(),
        Err(TraversalError::Unbound { .. })
    ));
}

#[test]
fn test_engine_defaults_to_standard_on_first_pull() {
    let g = modern();
    let mut traversal = g.v(&[]).count();
    assert_eq!(traversal.engine(), Engine::Unset);
    traversal.iterate().unwrap();
    assert_eq!(traversal.engine(), Engine::Standard);
}

struct FailingGraph;

impl Graph for FailingGraph {
    fn vertices(&self, _ids: &[VertexId]) -> GraphResult<ElementIter<Vertex>> {
        Ok(Box::new(vec![Vertex::new(1, "node")].into_iter()))
    }

    fn edges(&self, _ids: &[EdgeId]) -> GraphResult<ElementIter<Edge>> {
        Ok(Box::new(std::iter::empty()))
    }

    fn vertex_edges(
        &self,
        _vertex: VertexId,
        _direction: Direction,
        _labels: &[String],
    ) -> GraphResult<ElementIter<Edge>> {
        Err(GraphError::Storage("disk on fire".into()))
    }

    fn neighbors(
        &self,
        _vertex: VertexId,
        _direction: Direction,
        _labels: &[String],
    ) -> GraphResult<ElementIter<Vertex>> {
        Err(GraphError::Storage("disk on fire".into()))
    }

    fn properties(&self, _element: &ElementRef, _keys: &[String]) -> GraphResult<Vec<(String, Value)>> {
        Ok(Vec::new())
    }
}

#[test]
fn test_storage_errors_reach_the_caller_unchanged() {
    let g = over(FailingGraph);
    let err = g.v(&[]).out(&[]).to_list().unwrap_err();
    assert_eq!(
        err,
        TraversalError::Storage(GraphError::Storage("disk on fire".into()))
    );

    // iteration reports the failure once, then stops
    let mut results = g.v(&[]).out(&[]);
    assert!(matches!(results.next(), Some(Err(TraversalError::Storage(_)))));
    assert!(results.next().is_none());
}

struct Ordered {
    id: &'static str,
    before: &'static [&'static str],
}

impl TraversalStrategy for Ordered {
    fn id(&self) -> &'static str {
        self.id
    }

    fn category(&self) -> StrategyCategory {
        StrategyCategory::Optimization
    }

    fn applies_before(&self) -> &[&'static str] {
        self.before
    }

    fn apply(&self, _traversal: &mut Traversal, _engine: Engine) -> TraversalResult<()> {
        Ok(())
    }
}

#[test]
fn test_strategy_cycle_is_reported() {
    let err = TraversalStrategies::new(vec![
        Arc::new(Ordered { id: "a", before: &["b"] }),
        Arc::new(Ordered { id: "b", before: &["a"] }),
    ])
    .unwrap_err();
    assert_eq!(
        err,
        TraversalError::CyclicStrategyDependency {
            first: "a".into(),
            second: "b".into(),
        }
    );
}

#[test]
fn test_branch_paths_keep_edges_and_record_each_value_once() {
    let g = modern();
    let direct = g
        .v(&[1])
        .out_e(&["knows"])
        .in_v()
        .path()
        .to_set()
        .unwrap();
    let via_union = g
        .v(&[1])
        .union(vec![__::out_e(&["knows"]).in_v()])
        .path()
        .to_set()
        .unwrap();
    assert_eq!(via_union, direct);
    for path in &via_union {
        let Value::List(objects) = path else {
            panic!("path emits lists, got {:?}", path);
        };
        assert_eq!(objects.len(), 3);
        assert!(matches!(objects[1], Value::Edge(_)));
    }

    let via_coalesce = g
        .v(&[1])
        .coalesce(vec![__::out(&["knows"])])
        .path()
        .to_set()
        .unwrap();
    let hop = g.v(&[1]).out(&["knows"]).path().to_set().unwrap();
    assert_eq!(via_coalesce, hop);
}

#[test]
fn test_bounded_barrier_flushes_before_upstream_is_drained() {
    let g = modern();
    let values: Vec<Value> = (0..100).map(Value::Int).collect();
    let mut traversal = g.inject(values).store("seen");
    traversal
        .add_step(Step::new(StepKind::Barrier(BarrierStep::bounded(10))))
        .unwrap();

    traversal.next_traverser().unwrap();
    let Some(Value::List(seen)) = traversal.side_effects().get("seen") else {
        panic!("store keeps a list");
    };
    assert_eq!(seen.len(), 10);

    // the rest still arrives, batch by batch
    assert_eq!(traversal.to_list().unwrap().len(), 99);
}

/// Counts how many adjacent vertices the engine has pulled from storage.
struct CountingGraph {
    inner: InMemoryGraph,
    pulled: Arc<AtomicUsize>,
}

impl Graph for CountingGraph {
    fn vertices(&self, ids: &[VertexId]) -> GraphResult<ElementIter<Vertex>> {
        self.inner.vertices(ids)
    }

    fn edges(&self, ids: &[EdgeId]) -> GraphResult<ElementIter<Edge>> {
        self.inner.edges(ids)
    }

    fn vertex_edges(
        &self,
        vertex: VertexId,
        direction: Direction,
        labels: &[String],
    ) -> GraphResult<ElementIter<Edge>> {
        self.inner.vertex_edges(vertex, direction, labels)
    }

    fn neighbors(
        &self,
        vertex: VertexId,
        direction: Direction,
        labels: &[String],
    ) -> GraphResult<ElementIter<Vertex>> {
        let pulled = Arc::clone(&self.pulled);
        Ok(Box::new(self.inner.neighbors(vertex, direction, labels)?.inspect(
            move |_| {
                pulled.fetch_add(1, Ordering::SeqCst);
            },
        )))
    }

    fn properties(&self, element: &ElementRef, keys: &[String]) -> GraphResult<Vec<(String, Value)>> {
        self.inner.properties(element, keys)
    }
}

#[test]
fn test_adjacency_is_pulled_one_neighbour_at_a_time() {
    let pulled = Arc::new(AtomicUsize::new(0));
    let g = over(CountingGraph {
        inner: InMemoryGraph::modern(),
        pulled: Arc::clone(&pulled),
    });
    let mut traversal = g.v(&[1]).out(&[]);
    traversal.next_traverser().unwrap();
    assert_eq!(pulled.load(Ordering::SeqCst), 1);
    assert_eq!(traversal.to_list().unwrap().len(), 2);
    assert_eq!(pulled.load(Ordering::SeqCst), 3);
}

#[test]
fn test_where_traversal_filters_on_child_output() {
    let g = modern();
    let creators = g
        .v(&[1])
        .out(&["knows"])
        .where_traversal(__::out(&["created"]))
        .values(&["name"])
        .to_set()
        .unwrap();
    assert_eq!(creators, names(&["josh"]));

    // the child starts from a label and may end anywhere
    let knows_ripple_creator = g
        .v(&[])
        .as_("a")
        .out(&["knows"])
        .as_("b")
        .where_traversal(__::as_("b").out(&["created"]).has("name", P::eq("ripple")))
        .select(&["a"])
        .to_list()
        .unwrap();
    assert_eq!(knows_ripple_creator, vec![person(1)]);
}

#[test]
fn test_dedup_on_labels() {
    let g = modern();
    let created = || g.v(&[]).as_("a").out(&["created"]).as_("b");
    assert_eq!(
        created().dedup_labels(&["a", "b"]).count().to_list().unwrap(),
        vec![Value::Int(4)]
    );
    assert_eq!(
        created().dedup_labels(&["b"]).count().to_list().unwrap(),
        vec![Value::Int(2)]
    );
    // a traverser without the label is dropped rather than keyed on nothing
    assert_eq!(
        g.v(&[]).dedup_labels(&["missing"]).count().to_list().unwrap(),
        vec![Value::Int(0)]
    );
}

#[test]
fn test_match_any_needs_one_pattern() {
    let g = modern();
    let results = g
        .v(&[])
        .match_any(vec![
            __::as_("a").out(&["knows"]).as_("b"),
            __::as_("a").has("name", P::eq("peter")),
        ])
        .to_list()
        .unwrap();
    assert_eq!(results.len(), 3);
    let starts: BTreeSet<Value> = results
        .iter()
        .filter_map(|result| match result {
            Value::Map(map) => map.get(&Value::str("a")).cloned(),
            _ => None,
        })
        .collect();
    assert_eq!(starts, [person(1), person(6)].into_iter().collect());
}

#[test]
fn test_match_dedup_keeps_one_result_per_binding() {
    let g = modern();
    let patterns = || vec![__::as_("a").out(&["created"]).as_("b")];
    assert_eq!(
        g.v(&[]).match_all(patterns()).count().to_list().unwrap(),
        vec![Value::Int(4)]
    );
    assert_eq!(
        g.v(&[])
            .match_all(patterns())
            .match_dedup(&["b"])
            .count()
            .to_list()
            .unwrap(),
        vec![Value::Int(2)]
    );
}

#[test]
fn test_where_predicate_trees() {
    let g = modern();
    // ten (a, b) co-creator pairs: nine through lop, josh with himself through ripple
    let count = |predicate: WherePredicate| {
        g.v(&[])
            .as_("a")
            .out(&["created"])
            .in_(&["created"])
            .as_("b")
            .where_(predicate)
            .count()
            .to_list()
            .unwrap()
    };
    assert_eq!(
        count(WherePredicate::And(vec![
            WherePredicate::labels("a", CompareOp::Neq, "b"),
            WherePredicate::Not(Box::new(WherePredicate::labels("a", CompareOp::Gt, "b"))),
        ])),
        vec![Value::Int(3)]
    );
    assert_eq!(
        count(WherePredicate::Or(vec![
            WherePredicate::labels("a", CompareOp::Lt, "b"),
            WherePredicate::labels("a", CompareOp::Eq, "b"),
        ])),
        vec![Value::Int(7)]
    );
}

#[test]
fn test_match_without_eligible_pattern_fails_at_runtime() {
    let g = modern();
    let err = g
        .v(&[])
        .match_all(vec![
            __::as_("a").out(&["knows"]).as_("b"),
            __::as_("c").out(&[]).as_("d"),
        ])
        .to_list()
        .unwrap_err();
    assert!(matches!(err, TraversalError::IllegalPattern { .. }));
}

#[test]
fn test_reset_runs_the_compiled_pipeline_again() {
    let g = modern();
    let mut traversal = g.v(&[]).out(&[]).dedup();
    let first = traversal.to_list().unwrap();
    assert_eq!(first.len(), 4);
    assert!(traversal.to_list().unwrap().is_empty());

    traversal.reset();
    assert!(traversal.is_locked());
    assert_eq!(traversal.to_list().unwrap(), first);
}
