// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::TraversalResult;
use crate::steps::{CoalesceStep, MatchStep, StepContext, StepId};
use crate::structure::{Direction, ElementIter, Value};
use crate::traversal::Traversal;
use crate::traverser::{RequirementSet, Traverser};

/// What an adjacency step hands downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emits {
    Vertices,
    Edges,
}

/// One value in, zero or more out.
#[derive(Debug, Clone)]
pub enum FlatMapStep {
    /// `out/in/both` and `outE/inE/bothE`.
    Vertex {
        direction: Direction,
        edge_labels: Vec<String>,
        emits: Emits,
    },
    /// Property values; every property when `keys` is empty.
    Values(Vec<String>),
    Unfold,
    Coalesce(CoalesceStep),
    Union(Vec<Traversal>),
    Match(Box<MatchStep>),
}

impl FlatMapStep {
    pub fn name(&self) -> String {
        match self {
            FlatMapStep::Vertex {
                direction,
                edge_labels,
                emits,
            } => {
                let suffix = if *emits == Emits::Edges { "E" } else { "" };
                let verb = match direction {
                    Direction::Out => "out",
                    Direction::In => "in",
                    Direction::Both => "both",
                };
                format!("{}{}({})", verb, suffix, edge_labels.join(","))
            }
            FlatMapStep::Values(keys) => format!("values({})", keys.join(",")),
            FlatMapStep::Unfold => "unfold".into(),
            FlatMapStep::Coalesce(c) => format!("coalesce({})", c.branches().len()),
            FlatMapStep::Union(branches) => format!("union({})", branches.len()),
            FlatMapStep::Match(m) => m.name(),
        }
    }

    /// Whether outputs come straight out of a child traversal, whose own
    /// steps already recorded them on the path.
    pub fn is_branch(&self) -> bool {
        matches!(self, FlatMapStep::Coalesce(_) | FlatMapStep::Union(_))
    }

    /// Starts an adjacency hop from `traverser` without materializing it.
    /// `None` for every other kind of flat-map, and for non-vertex input.
    pub fn open(
        &self,
        traverser: &Traverser,
        ctx: &StepContext<'_>,
    ) -> TraversalResult<Option<ElementIter<Value>>> {
        let FlatMapStep::Vertex {
            direction,
            edge_labels,
            emits,
        } = self
        else {
            return Ok(None);
        };
        let Value::Vertex(vertex) = traverser.value() else {
            return Ok(None);
        };
        let items: ElementIter<Value> = match emits {
            Emits::Vertices => Box::new(
                ctx.graph
                    .neighbors(vertex.id, *direction, edge_labels)?
                    .map(Value::Vertex),
            ),
            Emits::Edges => Box::new(
                ctx.graph
                    .vertex_edges(vertex.id, *direction, edge_labels)?
                    .map(Value::Edge),
            ),
        };
        Ok(Some(items))
    }

    pub fn expand(
        &mut self,
        step: StepId,
        traverser: Traverser,
        ctx: &mut StepContext<'_>,
    ) -> TraversalResult<Vec<Traverser>> {
        match self {
            FlatMapStep::Vertex { .. } => Ok(match self.open(&traverser, ctx)? {
                Some(items) => items.map(|value| traverser.split(value)).collect(),
                None => Vec::new(),
            }),
            FlatMapStep::Values(keys) => {
                let Some(element) = traverser.value().as_element() else {
                    return Ok(Vec::new());
                };
                Ok(ctx
                    .graph
                    .properties(&element, keys)?
                    .into_iter()
                    .map(|(_, value)| traverser.split(value))
                    .collect())
            }
            FlatMapStep::Unfold => Ok(match traverser.value() {
                Value::List(items) => items.iter().map(|v| traverser.split(v.clone())).collect(),
                Value::Map(entries) => entries
                    .iter()
                    .map(|(k, v)| traverser.split(Value::List(vec![k.clone(), v.clone()])))
                    .collect(),
                _ => vec![traverser],
            }),
            FlatMapStep::Coalesce(coalesce) => coalesce.expand(&traverser, ctx),
            FlatMapStep::Union(branches) => {
                let mut outputs = Vec::new();
                for branch in branches.iter_mut() {
                    branch.reset();
                    branch.add_start(traverser.clone());
                    outputs.extend(branch.drain_in(ctx)?);
                }
                Ok(outputs)
            }
            FlatMapStep::Match(match_step) => match_step.expand(step, traverser, ctx),
        }
    }

    pub fn requirements(&self) -> RequirementSet {
        match self {
            FlatMapStep::Match(m) => m.requirements(),
            _ => RequirementSet::new(),
        }
    }

    pub fn children(&self) -> Vec<&Traversal> {
        match self {
            FlatMapStep::Coalesce(c) => c.branches().iter().collect(),
            FlatMapStep::Union(branches) => branches.iter().collect(),
            FlatMapStep::Match(m) => m.patterns().iter().map(|p| &p.traversal).collect(),
            _ => Vec::new(),
        }
    }

    pub fn children_mut(&mut self) -> Vec<&mut Traversal> {
        match self {
            FlatMapStep::Coalesce(c) => c.branches_mut().iter_mut().collect(),
            FlatMapStep::Union(branches) => branches.iter_mut().collect(),
            FlatMapStep::Match(m) => m.patterns_mut().iter_mut().map(|p| &mut p.traversal).collect(),
            _ => Vec::new(),
        }
    }

    pub fn reset(&mut self) {
        match self {
            FlatMapStep::Coalesce(c) => c.branches_mut().iter_mut().for_each(Traversal::reset),
            FlatMapStep::Union(branches) => branches.iter_mut().for_each(Traversal::reset),
            FlatMapStep::Match(m) => m.reset(),
            _ => {}
        }
    }
}
