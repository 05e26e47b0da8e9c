// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a vertex in the graph collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VertexId(pub u64);

/// Identifier of an edge in the graph collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub u64);

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v[{}]", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e[{}]", self.0)
    }
}

/// A reference to a vertex: its id plus its label.
///
/// Properties are not carried; they are read through the [`Graph`](super::Graph)
/// collaborator so that the computer engine can police which vertices a
/// program may look at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Vertex {
    pub id: VertexId,
    pub label: String,
}

impl Vertex {
    pub fn new(id: u64, label: impl Into<String>) -> Self {
        Self {
            id: VertexId(id),
            label: label.into(),
        }
    }
}

/// A reference to an edge together with both of its endpoints.
///
/// Endpoints are full vertex references so that `in_v()`/`out_v()` never
/// need to consult the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub label: String,
    pub out_v: Vertex,
    pub in_v: Vertex,
}

impl Edge {
    /// The endpoint on the far side of `from`.
    pub fn other(&self, from: VertexId) -> &Vertex {
        if self.out_v.id == from {
            &self.in_v
        } else {
            &self.out_v
        }
    }

    pub fn is_incident_to(&self, vertex: VertexId) -> bool {
        self.out_v.id == vertex || self.in_v.id == vertex
    }
}

/// Adjacency direction, relative to the vertex being expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Out,
    In,
    Both,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Out => Direction::In,
            Direction::In => Direction::Out,
            Direction::Both => Direction::Both,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Out => "OUT",
            Direction::In => "IN",
            Direction::Both => "BOTH",
        };
        f.write_str(name)
    }
}

/// Either kind of graph element; the unit that owns properties.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ElementRef {
    Vertex(VertexId),
    Edge(Edge),
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementRef::Vertex(id) => write!(f, "{}", id),
            ElementRef::Edge(edge) => write!(f, "{}", edge.id),
        }
    }
}
