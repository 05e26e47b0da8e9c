// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::TraversalResult;
use crate::steps::Step;
use crate::structure::{Graph, Value, VertexId};
use crate::traverser::{RequirementSet, SideEffects, Traverser};
use std::collections::VecDeque;

/// Execution state handed to every step call.
pub struct StepContext<'a> {
    pub graph: &'a dyn Graph,
    pub side_effects: &'a mut SideEffects,
    pub requirements: &'a RequirementSet,
    /// The vertex executing under the computer engine; `None` in the standard engine.
    pub home: Option<VertexId>,
}

impl<'a> StepContext<'a> {
    pub fn new(
        graph: &'a dyn Graph,
        side_effects: &'a mut SideEffects,
        requirements: &'a RequirementSet,
    ) -> Self {
        Self {
            graph,
            side_effects,
            requirements,
            home: None,
        }
    }

    /// Whether `value` can be processed without leaving the current vertex.
    pub fn is_local(&self, value: &Value) -> bool {
        let Some(home) = self.home else {
            return true;
        };
        match value {
            Value::Vertex(v) => v.id == home,
            Value::Edge(e) => e.is_incident_to(home),
            _ => true,
        }
    }

    /// Label of an element value, `None` for anything else. Under the computer
    /// engine the read goes through the star graph, so only the home vertex and
    /// its incident edges answer.
    pub fn label_of(&self, value: &Value) -> TraversalResult<Option<String>> {
        if self.home.is_none() {
            return Ok(match value {
                Value::Vertex(v) => Some(v.label.clone()),
                Value::Edge(e) => Some(e.label.clone()),
                _ => None,
            });
        }
        match value.as_element() {
            Some(element) => Ok(self.graph.label_of(&element)?),
            None => Ok(None),
        }
    }

    /// A fresh traverser for a start or reducing step.
    pub fn new_traverser(&self, value: Value, bulk: u64) -> Traverser {
        Traverser::start(value, bulk, self.requirements, self.side_effects.sack_seed())
    }
}

/// The upstream half of a pipeline, as seen by the step after it.
///
/// Pulling recurses into the last step of the slice. When the slice is empty
/// the empty-step sentinel answers: it hands out injected starts and then
/// reports exhaustion, never producing anything of its own.
pub struct Upstream<'s> {
    steps: &'s mut [Step],
    starts: &'s mut VecDeque<Traverser>,
}

impl<'s> Upstream<'s> {
    pub fn new(steps: &'s mut [Step], starts: &'s mut VecDeque<Traverser>) -> Self {
        Self { steps, starts }
    }

    pub fn next(&mut self, ctx: &mut StepContext<'_>) -> TraversalResult<Option<Traverser>> {
        match self.steps.split_last_mut() {
            Some((last, rest)) => {
                let mut upstream = Upstream::new(rest, &mut *self.starts);
                last.next(&mut upstream, ctx)
            }
            None => Ok(self.starts.pop_front()),
        }
    }

    pub fn has_next(&mut self, ctx: &mut StepContext<'_>) -> TraversalResult<bool> {
        match self.steps.split_last_mut() {
            Some((last, rest)) => {
                let mut upstream = Upstream::new(rest, &mut *self.starts);
                last.has_next(&mut upstream, ctx)
            }
            None => Ok(!self.starts.is_empty()),
        }
    }
}
