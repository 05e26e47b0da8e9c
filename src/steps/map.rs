// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::TraversalResult;
use crate::steps::{Scoping, StepContext};
use crate::structure::{Direction, Value};
use crate::traverser::{RequirementSet, Traverser, TraverserRequirement};
use std::collections::BTreeMap;

/// One value in, one value out. `None` from [`MapStep::map`] drops the
/// traverser, which only happens when a selected label is unbound.
#[derive(Debug, Clone, PartialEq)]
pub enum MapStep {
    Id,
    Label,
    Constant(Value),
    Select(Scoping),
    Path,
    Sack,
    /// `out_v()` / `in_v()` of an edge.
    EdgeVertex(Direction),
    /// The endpoint of an edge that the traverser did not arrive from.
    OtherVertex,
    /// Property key to list of values.
    ValueMap(Vec<String>),
}

impl MapStep {
    pub fn name(&self) -> String {
        match self {
            MapStep::Id => "id".into(),
            MapStep::Label => "label".into(),
            MapStep::Constant(v) => format!("constant({})", v),
            MapStep::Select(scoping) => format!("select({})", scoping.keys().join(",")),
            MapStep::Path => "path".into(),
            MapStep::Sack => "sack".into(),
            MapStep::EdgeVertex(Direction::Out) => "outV".into(),
            MapStep::EdgeVertex(Direction::In) => "inV".into(),
            MapStep::EdgeVertex(Direction::Both) => "bothV".into(),
            MapStep::OtherVertex => "otherV".into(),
            MapStep::ValueMap(keys) => format!("valueMap({})", keys.join(",")),
        }
    }

    pub fn map(&mut self, traverser: &Traverser, ctx: &mut StepContext<'_>) -> TraversalResult<Option<Value>> {
        let value = traverser.value();
        let mapped = match self {
            MapStep::Id => match value {
                Value::Vertex(v) => Value::Int(v.id.0 as i64),
                Value::Edge(e) => Value::Int(e.id.0 as i64),
                _ => Value::Null,
            },
            MapStep::Label => ctx.label_of(value)?.map(Value::Str).unwrap_or(Value::Null),
            MapStep::Constant(constant) => constant.clone(),
            MapStep::Select(scoping) => return Ok(select(traverser, scoping)),
            MapStep::Path => Value::List(
                traverser
                    .path()
                    .map(|p| p.objects().cloned().collect())
                    .unwrap_or_default(),
            ),
            MapStep::Sack => traverser.sack().cloned().unwrap_or(Value::Null),
            MapStep::EdgeVertex(direction) => match value {
                Value::Edge(e) => match direction {
                    Direction::Out => Value::Vertex(e.out_v.clone()),
                    Direction::In => Value::Vertex(e.in_v.clone()),
                    Direction::Both => Value::List(vec![
                        Value::Vertex(e.out_v.clone()),
                        Value::Vertex(e.in_v.clone()),
                    ]),
                },
                _ => return Ok(None),
            },
            MapStep::OtherVertex => {
                let Value::Edge(edge) = value else {
                    return Ok(None);
                };
                let arrived_from = traverser.path().and_then(|path| {
                    path.objects()
                        .rev()
                        .find_map(|v| v.as_vertex().filter(|v| edge.is_incident_to(v.id)))
                });
                match arrived_from {
                    Some(from) => Value::Vertex(edge.other(from.id).clone()),
                    None => Value::Vertex(edge.in_v.clone()),
                }
            }
            MapStep::ValueMap(keys) => {
                let Some(element) = value.as_element() else {
                    return Ok(None);
                };
                let mut grouped: BTreeMap<Value, Value> = BTreeMap::new();
                for (key, property) in ctx.graph.properties(&element, keys)? {
                    let slot = grouped
                        .entry(Value::Str(key))
                        .or_insert_with(|| Value::List(Vec::new()));
                    if let Value::List(items) = slot {
                        items.push(property);
                    }
                }
                Value::Map(grouped)
            }
        };
        Ok(Some(mapped))
    }

    pub fn requirements(&self) -> RequirementSet {
        match self {
            MapStep::Select(_) => [TraverserRequirement::LabeledPath].into_iter().collect(),
            MapStep::Path | MapStep::OtherVertex => [TraverserRequirement::Path].into_iter().collect(),
            MapStep::Sack => [TraverserRequirement::Sack].into_iter().collect(),
            _ => RequirementSet::new(),
        }
    }
}

fn select(traverser: &Traverser, scoping: &Scoping) -> Option<Value> {
    match scoping.keys() {
        [single] => traverser.labeled(single).cloned(),
        keys => {
            let mut selected = BTreeMap::new();
            for key in keys {
                selected.insert(Value::Str(key.clone()), traverser.labeled(key)?.clone());
            }
            Some(Value::Map(selected))
        }
    }
}
