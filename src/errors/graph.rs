// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::structure::{ElementRef, VertexId};

/// Failures reported by a [`Graph`](crate::structure::Graph) collaborator.
///
/// Asking for ids that do not exist is not an error; it yields an empty
/// sequence.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// I/O or backend failure inside the storage layer.
    #[error("storage error: {0}")]
    Storage(String),

    /// A star-graph view was asked about something outside its home vertex.
    #[error("illegal adjacent access: vertex {home} attempted to read {requested}")]
    IllegalAdjacentAccess { home: VertexId, requested: ElementRef },
}

pub type GraphResult<T> = Result<T, GraphError>;
