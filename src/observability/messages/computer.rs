// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for computer engine jobs and rounds.

use crate::errors::TraversalError;
use crate::observability::messages::StructuredLog;
use crate::traversal::TraversalId;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A traversal was split and handed to a substrate.
///
/// # Log Level
/// `info!` - Important operational event
pub struct JobSubmitted<'a> {
    pub traversal: &'a TraversalId,
    pub local_steps: usize,
    pub remaining_steps: usize,
}

impl Display for JobSubmitted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Submitted {} to the computer: {} steps as a vertex program, {} after it",
            self.traversal, self.local_steps, self.remaining_steps
        )
    }
}

impl StructuredLog for JobSubmitted<'_> {
    fn log(&self) {
        tracing::info!(
            traversal = %self.traversal,
            local_steps = self.local_steps,
            remaining_steps = self.remaining_steps,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("computer_job", span_name = name, traversal = %self.traversal)
    }
}

/// A vertex program started.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ComputationStarted<'a> {
    pub program: &'a str,
    pub vertices: usize,
    pub workers: usize,
}

impl Display for ComputationStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting {} over {} vertices with {} workers",
            self.program, self.vertices, self.workers
        )
    }
}

impl StructuredLog for ComputationStarted<'_> {
    fn log(&self) {
        tracing::info!(
            program = self.program,
            vertices = self.vertices,
            workers = self.workers,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "computation",
            span_name = name,
            program = self.program,
            workers = self.workers,
        )
    }
}

/// Every vertex finished a round.
///
/// # Log Level
/// `debug!` - Per round
pub struct RoundCompleted {
    pub iteration: u32,
    pub messages: usize,
    /// Messages addressed to vertices the graph does not have.
    pub dropped: usize,
}

impl Display for RoundCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Round {} completed: {} messages sent",
            self.iteration, self.messages
        )?;
        if self.dropped > 0 {
            write!(f, ", {} undeliverable", self.dropped)?;
        }
        Ok(())
    }
}

impl StructuredLog for RoundCompleted {
    fn log(&self) {
        tracing::debug!(
            iteration = self.iteration,
            messages = self.messages,
            dropped = self.dropped,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("round", span_name = name, iteration = self.iteration)
    }
}

/// The program voted to halt.
///
/// # Log Level
/// `info!` - Important operational event
pub struct ComputationConverged {
    pub iterations: u32,
}

impl Display for ComputationConverged {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Computation converged after {} rounds", self.iterations + 1)
    }
}

impl StructuredLog for ComputationConverged {
    fn log(&self) {
        tracing::info!(iterations = self.iterations, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!("computation", span_name = name, iterations = self.iterations)
    }
}

/// The computation stopped with an error.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ComputationFailed<'a> {
    pub error: &'a TraversalError,
}

impl Display for ComputationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Computation failed: {}", self.error)
    }
}

impl StructuredLog for ComputationFailed<'_> {
    fn log(&self) {
        tracing::error!(error = %self.error, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!("computation", span_name = name, error = %self.error)
    }
}

/// A map-reduce job finished over a result graph.
///
/// # Log Level
/// `debug!` - Once per job
pub struct MapReduceCompleted<'a> {
    pub job: &'a str,
    pub vertices: usize,
    pub keys: usize,
}

impl Display for MapReduceCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Map-reduce {} read {} vertices and reduced {} keys",
            self.job, self.vertices, self.keys
        )
    }
}

impl StructuredLog for MapReduceCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            job = self.job,
            vertices = self.vertices,
            keys = self.keys,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("map_reduce", span_name = name, job = self.job)
    }
}
