// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Where vertex programs actually run.
//!
//! [`LocalSubstrate`] executes rounds on the tokio blocking pool, one task per
//! vertex partition, and joins every task before the next round starts. Any
//! failing task fails the whole computation.

use crate::engine::computer::{FinalMemory, Memory, MemoryDelta, Messenger, RoundMemory};
use crate::errors::{TraversalError, TraversalResult};
use crate::observability::messages::computer::{
    ComputationConverged, ComputationFailed, ComputationStarted, RoundCompleted,
};
use crate::observability::messages::StructuredLog;
use crate::structure::{Graph, StarGraph, Vertex, VertexId};
use crate::traits::VertexProgram;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// One vertex as seen from inside `execute`.
pub struct ComputeVertex<'a, S> {
    vertex: &'a Vertex,
    graph: StarGraph<'a>,
    state: &'a mut S,
}

impl<'a, S> ComputeVertex<'a, S> {
    pub fn new(vertex: &'a Vertex, graph: &'a dyn Graph, state: &'a mut S) -> Self {
        Self {
            vertex,
            graph: StarGraph::new(graph, vertex.id),
            state,
        }
    }

    pub fn id(&self) -> VertexId {
        self.vertex.id
    }

    pub fn vertex(&self) -> &Vertex {
        self.vertex
    }

    /// The star graph around this vertex. Reads beyond it fail.
    pub fn graph(&self) -> &StarGraph<'a> {
        &self.graph
    }

    pub fn state(&self) -> &S {
        self.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        self.state
    }
}

/// Final per-vertex state of a computation, ordered by vertex id.
#[derive(Debug, Clone)]
pub struct ResultGraph<S> {
    vertices: BTreeMap<VertexId, (Vertex, S)>,
}

impl<S> ResultGraph<S> {
    pub fn from_states(states: impl IntoIterator<Item = (Vertex, S)>) -> Self {
        Self {
            vertices: states.into_iter().map(|(v, s)| (v.id, (v, s))).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn state(&self, vertex: VertexId) -> Option<&S> {
        self.vertices.get(&vertex).map(|(_, state)| state)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Vertex, &S)> {
        self.vertices.values().map(|(vertex, state)| (vertex, state))
    }

    pub fn into_states(self) -> impl Iterator<Item = (Vertex, S)> {
        self.vertices.into_values()
    }
}

/// How messages cross between workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageCodec {
    /// Messages are moved between workers as they are.
    None,
    /// Every message is encoded to JSON and decoded at its destination, the
    /// way it would travel between processes.
    #[default]
    Json,
}

impl MessageCodec {
    fn transfer<M: Serialize + serde::de::DeserializeOwned>(self, message: M) -> TraversalResult<M> {
        match self {
            MessageCodec::None => Ok(message),
            MessageCodec::Json => {
                let bytes = serde_json::to_vec(&message)
                    .map_err(|e| TraversalError::Codec(e.to_string()))?;
                serde_json::from_slice(&bytes).map_err(|e| TraversalError::Codec(e.to_string()))
            }
        }
    }
}

/// Runs a vertex program from setup to termination.
#[async_trait]
pub trait ComputeSubstrate: Send + Sync + 'static {
    async fn run_to_convergence<P: VertexProgram>(
        &self,
        graph: Arc<dyn Graph>,
        program: P,
        cancel: CancellationToken,
    ) -> TraversalResult<(FinalMemory, ResultGraph<P::State>)>;
}

/// An in-process substrate backed by the tokio blocking pool.
#[derive(Debug, Clone)]
pub struct LocalSubstrate {
    workers: usize,
    max_iterations: u32,
    codec: MessageCodec,
}

impl LocalSubstrate {
    pub fn new(workers: usize, max_iterations: u32) -> Self {
        Self {
            workers: workers.max(1),
            max_iterations,
            codec: MessageCodec::default(),
        }
    }

    pub fn with_codec(mut self, codec: MessageCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    async fn converge<P: VertexProgram>(
        &self,
        graph: Arc<dyn Graph>,
        program: P,
        cancel: CancellationToken,
    ) -> TraversalResult<(FinalMemory, ResultGraph<P::State>)> {
        let mut memory = Memory::new(program.memory_compute_keys());
        program.setup(&mut memory)?;

        let mut vertices: BTreeMap<VertexId, (Vertex, P::State)> = graph
            .vertices(&[])?
            .map(|vertex| (vertex.id, (vertex, P::State::default())))
            .collect();
        let mut inbox: HashMap<VertexId, Vec<P::Message>> = HashMap::new();

        ComputationStarted {
            program: std::any::type_name::<P>(),
            vertices: vertices.len(),
            workers: self.workers,
        }
        .log();

        loop {
            if memory.iteration() >= self.max_iterations {
                return Err(TraversalError::MaxIterationsExceeded {
                    limit: self.max_iterations,
                });
            }
            if cancel.is_cancelled() {
                return Err(TraversalError::JobFailed("computation cancelled".into()));
            }

            let mut partitions: Vec<Vec<(Vertex, P::State, Vec<P::Message>)>> =
                (0..self.workers).map(|_| Vec::new()).collect();
            for (index, (id, (vertex, state))) in std::mem::take(&mut vertices).into_iter().enumerate() {
                let incoming = inbox.remove(&id).unwrap_or_default();
                partitions[index % self.workers].push((vertex, state, incoming));
            }
            let dropped = inbox.values().map(Vec::len).sum::<usize>();
            inbox.clear();

            let mut tasks = Vec::new();
            for partition in partitions.into_iter().filter(|p| !p.is_empty()) {
                let program = program.clone();
                let graph = Arc::clone(&graph);
                let round = memory.round();
                tasks.push(tokio::task::spawn_blocking(move || {
                    execute_partition(program, graph, round, partition)
                }));
            }

            let mut first_error = None;
            let mut outgoing = Vec::new();
            let mut deltas = Vec::new();
            for task in tasks {
                match task.await {
                    Ok(Ok(output)) => {
                        for (vertex, state) in output.vertices {
                            vertices.insert(vertex.id, (vertex, state));
                        }
                        outgoing.extend(output.messages);
                        deltas.push(output.delta);
                    }
                    Ok(Err(error)) => {
                        first_error.get_or_insert(error);
                    }
                    Err(join_error) => {
                        first_error.get_or_insert(TraversalError::JobFailed(format!(
                            "worker task failed: {}",
                            join_error
                        )));
                    }
                }
            }
            if let Some(error) = first_error {
                return Err(error);
            }

            for delta in deltas {
                memory.merge(delta)?;
            }
            let messages = outgoing.len();
            for (target, message) in outgoing {
                let message = self.codec.transfer(message)?;
                inbox.entry(target).or_default().push(message);
            }

            RoundCompleted {
                iteration: memory.iteration(),
                messages,
                dropped,
            }
            .log();

            if program.terminate(&mut memory)? {
                break;
            }
            memory.advance();
        }

        let memory = memory.into_final();
        ComputationConverged {
            iterations: memory.iterations(),
        }
        .log();
        Ok((memory, ResultGraph { vertices }))
    }
}

#[async_trait]
impl ComputeSubstrate for LocalSubstrate {
    async fn run_to_convergence<P: VertexProgram>(
        &self,
        graph: Arc<dyn Graph>,
        program: P,
        cancel: CancellationToken,
    ) -> TraversalResult<(FinalMemory, ResultGraph<P::State>)> {
        let result = self.converge(graph, program, cancel).await;
        if let Err(error) = &result {
            ComputationFailed { error }.log();
        }
        result
    }
}

struct PartitionOutput<S, M> {
    vertices: Vec<(Vertex, S)>,
    messages: Vec<(VertexId, M)>,
    delta: MemoryDelta,
}

fn execute_partition<P: VertexProgram>(
    mut program: P,
    graph: Arc<dyn Graph>,
    mut memory: RoundMemory,
    partition: Vec<(Vertex, P::State, Vec<P::Message>)>,
) -> TraversalResult<PartitionOutput<P::State, P::Message>> {
    let mut vertices = Vec::with_capacity(partition.len());
    let mut messages = Vec::new();
    for (vertex, mut state, incoming) in partition {
        {
            let mut compute = ComputeVertex::new(&vertex, &*graph, &mut state);
            let mut messenger = Messenger::new(incoming, &mut messages);
            program.execute(&mut compute, &mut messenger, &mut memory)?;
        }
        vertices.push((vertex, state));
    }
    Ok(PartitionOutput {
        vertices,
        messages,
        delta: memory.into_delta(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::computer::{MemoryComputeKey, MemoryOperator};
    use crate::structure::{Direction, InMemoryGraph, Value};

    /// Counts out-neighbours by sending each one a message in the first round.
    #[derive(Clone)]
    struct InDegree;

    impl VertexProgram for InDegree {
        type Message = u64;
        type State = u64;

        fn memory_compute_keys(&self) -> Vec<MemoryComputeKey> {
            vec![MemoryComputeKey::new("edges", MemoryOperator::Incr)]
        }

        fn setup(&self, memory: &mut Memory) -> TraversalResult<()> {
            memory.set("edges", Value::Int(0))
        }

        fn execute(
            &mut self,
            vertex: &mut ComputeVertex<'_, u64>,
            messenger: &mut Messenger<'_, u64>,
            memory: &mut RoundMemory,
        ) -> TraversalResult<()> {
            if memory.is_initial_iteration() {
                let neighbours: Vec<Vertex> = vertex
                    .graph()
                    .neighbors(vertex.id(), Direction::Out, &[])?
                    .collect();
                for neighbour in neighbours {
                    memory.incr("edges", Value::Int(1))?;
                    messenger.send(neighbour.id, 1);
                }
            } else {
                *vertex.state_mut() += messenger.receive().iter().sum::<u64>();
            }
            Ok(())
        }

        fn terminate(&self, memory: &mut Memory) -> TraversalResult<bool> {
            Ok(memory.iteration() >= 1)
        }
    }

    #[tokio::test]
    async fn test_local_substrate_runs_rounds() {
        let graph: Arc<dyn Graph> = Arc::new(InMemoryGraph::modern());
        let substrate = LocalSubstrate::new(3, 10);
        let (memory, result) = substrate
            .run_to_convergence(graph, InDegree, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(memory.get("edges"), Some(&Value::Int(6)));
        assert_eq!(memory.iterations(), 1);
        assert_eq!(result.len(), 6);
        // lop is created by marko, josh and peter
        assert_eq!(result.state(VertexId(3)), Some(&3));
        assert_eq!(result.state(VertexId(1)), Some(&0));
    }

    #[tokio::test]
    async fn test_codec_does_not_change_results() {
        let graph: Arc<dyn Graph> = Arc::new(InMemoryGraph::modern());
        let plain = LocalSubstrate::new(2, 10).with_codec(MessageCodec::None);
        let (_, result) = plain
            .run_to_convergence(graph, InDegree, CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(result.state(VertexId(3)), Some(&3));
    }

    #[tokio::test]
    async fn test_iteration_limit() {
        let graph: Arc<dyn Graph> = Arc::new(InMemoryGraph::modern());
        let substrate = LocalSubstrate::new(2, 1);
        let err = substrate
            .run_to_convergence(graph, InDegree, CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err, TraversalError::MaxIterationsExceeded { limit: 1 });
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let graph: Arc<dyn Graph> = Arc::new(InMemoryGraph::modern());
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = LocalSubstrate::new(1, 10)
            .run_to_convergence(graph, InDegree, cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, TraversalError::JobFailed(_)));
    }
}
