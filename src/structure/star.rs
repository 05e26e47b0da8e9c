// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::{GraphError, GraphResult};
use crate::structure::{
    Direction, Edge, EdgeId, ElementIter, ElementRef, Graph, Value, Vertex, VertexId,
};

/// A view of the graph from a single home vertex.
///
/// The home vertex, its properties, its incident edges (and their properties)
/// and the references to adjacent vertices are visible. Reading anything about
/// an adjacent vertex fails with [`GraphError::IllegalAdjacentAccess`].
pub struct StarGraph<'a> {
    inner: &'a dyn Graph,
    home: VertexId,
}

impl<'a> StarGraph<'a> {
    pub fn new(inner: &'a dyn Graph, home: VertexId) -> Self {
        Self { inner, home }
    }

    pub fn home(&self) -> VertexId {
        self.home
    }

    fn check_vertex(&self, vertex: VertexId) -> GraphResult<()> {
        if vertex == self.home {
            Ok(())
        } else {
            Err(GraphError::IllegalAdjacentAccess {
                home: self.home,
                requested: ElementRef::Vertex(vertex),
            })
        }
    }

    fn check_edge(&self, edge: &Edge) -> GraphResult<()> {
        if edge.is_incident_to(self.home) {
            Ok(())
        } else {
            Err(GraphError::IllegalAdjacentAccess {
                home: self.home,
                requested: ElementRef::Edge(edge.clone()),
            })
        }
    }
}

impl Graph for StarGraph<'_> {
    fn vertices(&self, ids: &[VertexId]) -> GraphResult<ElementIter<Vertex>> {
        if ids.is_empty() {
            // every vertex other than home is out of reach
            return Err(GraphError::IllegalAdjacentAccess {
                home: self.home,
                requested: ElementRef::Vertex(self.home),
            });
        }
        for id in ids {
            self.check_vertex(*id)?;
        }
        self.inner.vertices(ids)
    }

    fn edges(&self, ids: &[EdgeId]) -> GraphResult<ElementIter<Edge>> {
        let found: Vec<Edge> = self.inner.edges(ids)?.collect();
        for edge in &found {
            self.check_edge(edge)?;
        }
        Ok(Box::new(found.into_iter()))
    }

    fn vertex_edges(
        &self,
        vertex: VertexId,
        direction: Direction,
        labels: &[String],
    ) -> GraphResult<ElementIter<Edge>> {
        self.check_vertex(vertex)?;
        self.inner.vertex_edges(vertex, direction, labels)
    }

    fn neighbors(
        &self,
        vertex: VertexId,
        direction: Direction,
        labels: &[String],
    ) -> GraphResult<ElementIter<Vertex>> {
        self.check_vertex(vertex)?;
        self.inner.neighbors(vertex, direction, labels)
    }

    fn properties(
        &self,
        element: &ElementRef,
        keys: &[String],
    ) -> GraphResult<Vec<(String, Value)>> {
        match element {
            ElementRef::Vertex(id) => self.check_vertex(*id)?,
            ElementRef::Edge(edge) => self.check_edge(edge)?,
        }
        self.inner.properties(element, keys)
    }

    /// Vertex values handed out by the star still carry their stored label,
    /// so label reads must come through here to be checked.
    fn label_of(&self, element: &ElementRef) -> GraphResult<Option<String>> {
        match element {
            ElementRef::Vertex(id) => self.check_vertex(*id)?,
            ElementRef::Edge(edge) => self.check_edge(edge)?,
        }
        self.inner.label_of(element)
    }
}
