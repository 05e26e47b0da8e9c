// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::computer::{
    run_map_reduce, ComputeSubstrate, FinalMemory, LocalSubstrate, TraversalVertexProgram,
    TraverserMapReduce,
};
use crate::engine::Engine;
use crate::errors::{TraversalError, TraversalResult};
use crate::observability::messages::computer::JobSubmitted;
use crate::observability::messages::StructuredLog;
use crate::traversal::Traversal;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Executes traversals with the computer engine.
///
/// The traversal is compiled for [`Engine::Computer`] and cut before its
/// first step that needs a global view. The leading part runs as a
/// [`TraversalVertexProgram`]; the halted traversers are collected and the
/// remaining steps are handed back as a standard traversal that continues
/// from them.
pub struct TraversalComputer<S = LocalSubstrate> {
    substrate: Arc<S>,
}

impl<S> Clone for TraversalComputer<S> {
    fn clone(&self) -> Self {
        Self {
            substrate: Arc::clone(&self.substrate),
        }
    }
}

impl<S: ComputeSubstrate> TraversalComputer<S> {
    pub fn new(substrate: S) -> Self {
        Self {
            substrate: Arc::new(substrate),
        }
    }

    pub fn substrate(&self) -> &S {
        &self.substrate
    }

    /// Starts the computation on the current tokio runtime.
    ///
    /// Compilation errors (strategy failures, verification, a traversal
    /// without a graph) are returned here; execution errors come out of the
    /// job.
    pub fn submit(&self, mut traversal: Traversal) -> TraversalResult<ComputerJob> {
        traversal.set_engine(Engine::Computer)?;
        traversal.apply_strategies()?;
        let Some(graph) = traversal.graph().cloned() else {
            return Err(TraversalError::Unbound {
                traversal: traversal.traversal_id(),
            });
        };

        let prefix = traversal.split_prefix();
        JobSubmitted {
            traversal: &traversal.traversal_id(),
            local_steps: prefix.len(),
            remaining_steps: traversal.steps().len(),
        }
        .log();
        let program = TraversalVertexProgram::new(
            prefix,
            traversal.requirements().clone(),
            traversal.side_effects().clone(),
        )?;

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let substrate = Arc::clone(&self.substrate);
        let handle = tokio::spawn(async move {
            let (memory, result) = substrate.run_to_convergence(graph, program, token).await?;
            let halted = run_map_reduce(&TraverserMapReduce, &result);
            traversal.resume_with(halted.into_vec());
            Ok(ComputerResult { memory, traversal })
        });
        Ok(ComputerJob { handle, cancel })
    }
}

/// A running computation.
#[derive(Debug)]
pub struct ComputerJob {
    handle: JoinHandle<TraversalResult<ComputerResult>>,
    cancel: CancellationToken,
}

impl ComputerJob {
    /// Asks the computation to stop before its next round.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn join(self) -> TraversalResult<ComputerResult> {
        match self.handle.await {
            Ok(result) => result,
            Err(join_error) => Err(TraversalError::JobFailed(join_error.to_string())),
        }
    }
}

/// What a finished computation produced.
#[derive(Debug)]
pub struct ComputerResult {
    pub memory: FinalMemory,
    /// The steps after the vertex program, ready to iterate on the standard engine.
    pub traversal: Traversal,
}
