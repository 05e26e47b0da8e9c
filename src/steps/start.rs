// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::TraversalResult;
use crate::steps::StepContext;
use crate::structure::{EdgeId, ElementIter, Value, VertexId};
use std::fmt;

/// Where a traversal's initial traversers come from.
#[derive(Debug, Clone, PartialEq)]
pub enum StartSource {
    /// `V(ids)`; every vertex when `ids` is empty.
    Vertices(Vec<VertexId>),
    /// `E(ids)`; every edge when `ids` is empty.
    Edges(Vec<EdgeId>),
    Inject(Vec<Value>),
}

/// Draws from the graph (or injected values) lazily, one value per pull.
pub struct StartStep {
    source: StartSource,
    cursor: Option<ElementIter<Value>>,
    opened: bool,
}

impl StartStep {
    pub fn new(source: StartSource) -> Self {
        Self {
            source,
            cursor: None,
            opened: false,
        }
    }

    pub fn source(&self) -> &StartSource {
        &self.source
    }

    pub fn name(&self) -> String {
        match &self.source {
            StartSource::Vertices(ids) => format!("V({})", ids.len()),
            StartSource::Edges(ids) => format!("E({})", ids.len()),
            StartSource::Inject(values) => format!("inject({})", values.len()),
        }
    }

    pub fn next_value(&mut self, ctx: &mut StepContext<'_>) -> TraversalResult<Option<Value>> {
        if !self.opened {
            self.opened = true;
            let cursor: ElementIter<Value> = match &self.source {
                StartSource::Vertices(ids) => Box::new(ctx.graph.vertices(ids)?.map(Value::Vertex)),
                StartSource::Edges(ids) => Box::new(ctx.graph.edges(ids)?.map(Value::Edge)),
                StartSource::Inject(values) => Box::new(values.clone().into_iter()),
            };
            self.cursor = Some(cursor);
        }
        Ok(self.cursor.as_mut().and_then(Iterator::next))
    }

    pub fn reset(&mut self) {
        self.cursor = None;
        self.opened = false;
    }
}

impl Clone for StartStep {
    /// Clones start unopened; a graph cursor cannot be duplicated.
    fn clone(&self) -> Self {
        Self::new(self.source.clone())
    }
}

impl fmt::Debug for StartStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StartStep")
            .field("source", &self.source)
            .field("opened", &self.opened)
            .finish()
    }
}
