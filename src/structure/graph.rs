// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::GraphResult;
use crate::structure::{Direction, Edge, EdgeId, ElementRef, Value, Vertex, VertexId};

/// An owned, lazily consumed sequence handed out by a graph collaborator.
///
/// Sequences are finite and cannot be rewound; ask the graph again to restart.
pub type ElementIter<T> = Box<dyn Iterator<Item = T> + Send>;

/// The narrow storage interface the traversal engine consumes.
///
/// Unknown ids produce an empty sequence rather than an error. Storage
/// failures surface as [`GraphError::Storage`](crate::errors::GraphError)
/// and are propagated by the engine without retry.
pub trait Graph: Send + Sync {
    /// Vertices with the given ids, or every vertex when `ids` is empty.
    fn vertices(&self, ids: &[VertexId]) -> GraphResult<ElementIter<Vertex>>;

    /// Edges with the given ids, or every edge when `ids` is empty.
    fn edges(&self, ids: &[EdgeId]) -> GraphResult<ElementIter<Edge>>;

    /// Edges incident to `vertex` in `direction`, restricted to `labels` when non-empty.
    fn vertex_edges(
        &self,
        vertex: VertexId,
        direction: Direction,
        labels: &[String],
    ) -> GraphResult<ElementIter<Edge>>;

    /// Adjacent vertices reached over edges matching `direction` and `labels`.
    fn neighbors(
        &self,
        vertex: VertexId,
        direction: Direction,
        labels: &[String],
    ) -> GraphResult<ElementIter<Vertex>>;

    /// Property values of an element. Empty `keys` means every property.
    /// A multi-valued key yields one pair per value.
    fn properties(&self, element: &ElementRef, keys: &[String])
        -> GraphResult<Vec<(String, Value)>>;

    /// Label of an element as stored; `None` for an unknown vertex.
    fn label_of(&self, element: &ElementRef) -> GraphResult<Option<String>> {
        Ok(match element {
            ElementRef::Vertex(id) => self
                .vertices(std::slice::from_ref(id))?
                .next()
                .map(|vertex| vertex.label),
            ElementRef::Edge(edge) => Some(edge.label.clone()),
        })
    }
}
