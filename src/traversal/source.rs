// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::Engine;
use crate::steps::{StartSource, StartStep, Step, StepKind};
use crate::strategy::{StartContext, StrategyRegistry};
use crate::structure::{EdgeId, Graph, Value, VertexId};
use crate::traversal::Traversal;
use crate::traverser::SideEffects;
use std::sync::Arc;

/// Spawns rooted traversals over one graph.
///
/// The registry picks each traversal's strategies from how it starts. Side
/// effects and the sack seed configured here are copied into every
/// traversal spawned afterwards.
#[derive(Clone)]
pub struct GraphTraversalSource {
    graph: Arc<dyn Graph>,
    registry: Arc<StrategyRegistry>,
    side_effects: SideEffects,
    engine: Engine,
}

impl GraphTraversalSource {
    pub fn new(graph: Arc<dyn Graph>, registry: Arc<StrategyRegistry>) -> Self {
        Self {
            graph,
            registry,
            side_effects: SideEffects::new(),
            engine: Engine::Unset,
        }
    }

    pub fn graph(&self) -> &Arc<dyn Graph> {
        &self.graph
    }

    pub fn registry(&self) -> &Arc<StrategyRegistry> {
        &self.registry
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }

    /// Every traverser starts with this sack value.
    pub fn with_sack(mut self, seed: impl Into<Value>) -> Self {
        self.side_effects.set_sack_seed(seed.into());
        self
    }

    pub fn with_side_effect(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.side_effects.set(key, value.into());
        self
    }

    /// Spawned traversals are compiled for the computer engine and must be
    /// submitted to a `TraversalComputer` rather than iterated.
    pub fn with_computer(mut self) -> Self {
        self.engine = Engine::Computer;
        self
    }

    pub fn with_engine(mut self, engine: Engine) -> Self {
        self.engine = engine;
        self
    }

    fn spawn(&self, context: StartContext, source: StartSource) -> Traversal {
        let mut traversal = Traversal::bound(
            Arc::clone(&self.graph),
            self.registry.resolve(context),
            self.side_effects.clone(),
            self.engine,
        );
        if let Err(error) = traversal.add_step(Step::new(StepKind::Start(StartStep::new(source)))) {
            traversal.defer(error);
        }
        traversal
    }

    /// `V(ids)`; every vertex when `ids` is empty.
    pub fn v(&self, ids: &[u64]) -> Traversal {
        let ids = ids.iter().copied().map(VertexId).collect();
        self.spawn(StartContext::Vertex, StartSource::Vertices(ids))
    }

    /// `E(ids)`; every edge when `ids` is empty.
    pub fn e(&self, ids: &[u64]) -> Traversal {
        let ids = ids.iter().copied().map(EdgeId).collect();
        self.spawn(StartContext::Edge, StartSource::Edges(ids))
    }

    pub fn inject(&self, values: Vec<Value>) -> Traversal {
        self.spawn(StartContext::Default, StartSource::Inject(values))
    }
}
