// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Contracts for bulk-synchronous computations over the graph.

use crate::engine::computer::{ComputeVertex, Memory, MemoryComputeKey, Messenger, RoundMemory};
use crate::errors::TraversalResult;
use crate::structure::Vertex;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A program executed at every vertex, round after round, until it halts.
///
/// Each worker receives its own clone of the program. Within a round a vertex
/// may read its star graph, its own state, the memory snapshot and the
/// messages addressed to it. Everything it writes becomes visible in the
/// next round.
///
/// # Lifecycle
///
/// 1. [`setup`](VertexProgram::setup) once, on the master memory.
/// 2. [`execute`](VertexProgram::execute) for every vertex, in parallel.
/// 3. [`terminate`](VertexProgram::terminate) on the master memory; `true` halts.
///
/// Steps 2 and 3 repeat until halting or the iteration limit is reached.
pub trait VertexProgram: Clone + Send + 'static {
    type Message: Clone + Send + Serialize + DeserializeOwned + 'static;
    type State: Clone + Default + Send + 'static;

    /// Every memory key the program touches, with its merge operator.
    fn memory_compute_keys(&self) -> Vec<MemoryComputeKey>;

    fn setup(&self, memory: &mut Memory) -> TraversalResult<()>;

    fn execute(
        &mut self,
        vertex: &mut ComputeVertex<'_, Self::State>,
        messenger: &mut Messenger<'_, Self::Message>,
        memory: &mut RoundMemory,
    ) -> TraversalResult<()>;

    fn terminate(&self, memory: &mut Memory) -> TraversalResult<bool>;
}

/// A post-processing job over the vertex states of a finished computation.
///
/// `map` runs once per vertex and emits key/value pairs; values sharing a key
/// are combined with `reduce`; `finish` turns the reduced pairs, in key
/// order, into the job's output.
pub trait MapReduce<S> {
    type Key: Ord + Clone;
    type Value;
    type Output;

    fn map(&self, vertex: &Vertex, state: &S, emit: &mut dyn FnMut(Self::Key, Self::Value));

    fn reduce(&self, key: &Self::Key, values: Vec<Self::Value>) -> Self::Value;

    fn finish(&self, reduced: Vec<(Self::Key, Self::Value)>) -> Self::Output;
}
