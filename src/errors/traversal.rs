// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::GraphError;
use crate::structure::{ElementRef, VertexId};
use crate::traversal::TraversalId;

/// Everything that can go wrong while building, compiling or running a traversal.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TraversalError {
    /// The pipeline has no more results. Control signal, not a failure.
    #[error("the traversal has no more results")]
    Exhausted,

    #[error("traversal {traversal} is locked; cannot {operation} step '{step}' after strategies were applied")]
    LockedTraversal {
        traversal: TraversalId,
        operation: &'static str,
        step: String,
    },

    #[error("cyclic strategy dependency between '{first}' and '{second}'")]
    CyclicStrategyDependency { first: String, second: String },

    #[error("illegal pattern in step '{step}': {reason}")]
    IllegalPattern { step: String, reason: String },

    #[error("memory key '{key}' was not declared by the vertex program")]
    UndeclaredMemoryKey { key: String },

    #[error("illegal adjacent access: vertex {home} attempted to read {requested}")]
    IllegalAdjacentAccess { home: VertexId, requested: ElementRef },

    #[error("memory key '{key}' is declared with operator {declared} but was written with {attempted}")]
    MemoryOperatorMismatch {
        key: String,
        declared: &'static str,
        attempted: &'static str,
    },

    #[error("memory key '{key}' cannot be set while vertices execute concurrently")]
    ConcurrentMemorySet { key: String },

    #[error("invalid value for memory key '{key}': {reason}")]
    InvalidMemoryValue { key: String, reason: String },

    #[error("step '{step}' is not supported by the computer engine: {reason}")]
    ComputerUnsupported { step: String, reason: String },

    #[error("label '{label}' uses a reserved prefix")]
    ReservedLabel { label: String },

    #[error("traversal expects the {expected} engine but is configured for {actual}")]
    EngineMismatch {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("step '{step}' does not accept a {modulator} modulator")]
    InvalidModulator {
        step: String,
        modulator: &'static str,
    },

    #[error("traversal {traversal} has no graph and can only run inside a parent step")]
    Unbound { traversal: TraversalId },

    #[error("vertex program did not converge within {limit} iterations")]
    MaxIterationsExceeded { limit: u32 },

    #[error("message codec failure: {0}")]
    Codec(String),

    #[error("computer job failed: {0}")]
    JobFailed(String),

    #[error(transparent)]
    Storage(GraphError),
}

impl From<GraphError> for TraversalError {
    fn from(error: GraphError) -> Self {
        match error {
            GraphError::IllegalAdjacentAccess { home, requested } => {
                TraversalError::IllegalAdjacentAccess { home, requested }
            }
            other => TraversalError::Storage(other),
        }
    }
}

impl TraversalError {
    pub fn is_exhausted(&self) -> bool {
        matches!(self, TraversalError::Exhausted)
    }
}

pub type TraversalResult<T> = Result<T, TraversalError>;
