// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Graph-facing types: values, element references and the storage collaborator.

mod element;
mod graph;
mod in_memory;
mod star;
mod value;

pub use element::{Direction, Edge, EdgeId, ElementRef, Vertex, VertexId};
pub use graph::{ElementIter, Graph};
pub use in_memory::InMemoryGraph;
pub use star::StarGraph;
pub use value::{Float, Value};
