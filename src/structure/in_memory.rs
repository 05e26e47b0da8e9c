// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! An in-process [`Graph`] backed by ordered maps.
//!
//! Used as the reference collaborator in tests and as the fixture loader for
//! small datasets described in YAML or JSON:
//!
//! ```yaml
//! vertices:
//!   - { id: 1, label: person, properties: { name: marko, age: 29 } }
//! edges:
//!   - { id: 7, out: 1, label: knows, in: 2, properties: { weight: 0.5 } }
//! ```

use crate::errors::{GraphError, GraphResult};
use crate::structure::{
    Direction, Edge, EdgeId, ElementIter, ElementRef, Graph, Value, Vertex, VertexId,
};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone)]
struct VertexRecord {
    vertex: Vertex,
    properties: BTreeMap<String, Vec<Value>>,
}

#[derive(Debug, Clone)]
struct EdgeRecord {
    edge: Edge,
    properties: BTreeMap<String, Vec<Value>>,
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryGraph {
    vertices: BTreeMap<VertexId, VertexRecord>,
    edges: BTreeMap<EdgeId, EdgeRecord>,
    out_edges: HashMap<VertexId, Vec<EdgeId>>,
    in_edges: HashMap<VertexId, Vec<EdgeId>>,
}

#[derive(Debug, Deserialize)]
struct GraphFixture {
    #[serde(default)]
    vertices: Vec<VertexFixture>,
    #[serde(default)]
    edges: Vec<EdgeFixture>,
}

#[derive(Debug, Deserialize)]
struct VertexFixture {
    id: u64,
    label: String,
    #[serde(default)]
    properties: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct EdgeFixture {
    id: u64,
    out: u64,
    label: String,
    #[serde(rename = "in")]
    in_: u64,
    #[serde(default)]
    properties: BTreeMap<String, serde_json::Value>,
}

fn fixture_value(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::float(n.as_f64().unwrap_or_default()),
        },
        serde_json::Value::String(s) => Value::Str(s),
        serde_json::Value::Array(items) => {
            Value::List(items.into_iter().map(fixture_value).collect())
        }
        serde_json::Value::Object(entries) => Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (Value::Str(k), fixture_value(v)))
                .collect(),
        ),
    }
}

fn property_map(properties: Vec<(&str, Value)>) -> BTreeMap<String, Vec<Value>> {
    let mut map: BTreeMap<String, Vec<Value>> = BTreeMap::new();
    for (key, value) in properties {
        map.entry(key.to_string()).or_default().push(value);
    }
    map
}

impl InMemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// The six-vertex "modern" toy graph.
    ///
    /// ```text
    /// marko(1) -knows-> vadas(2), josh(4)
    /// marko(1) -created-> lop(3)
    /// josh(4)  -created-> ripple(5), lop(3)
    /// peter(6) -created-> lop(3)
    /// ```
    pub fn modern() -> Self {
        let mut graph = Self::new();
        graph.add_vertex(1, "person", vec![("name", "marko".into()), ("age", 29.into())]);
        graph.add_vertex(2, "person", vec![("name", "vadas".into()), ("age", 27.into())]);
        graph.add_vertex(3, "software", vec![("name", "lop".into()), ("lang", "java".into())]);
        graph.add_vertex(4, "person", vec![("name", "josh".into()), ("age", 32.into())]);
        graph.add_vertex(5, "software", vec![("name", "ripple".into()), ("lang", "java".into())]);
        graph.add_vertex(6, "person", vec![("name", "peter".into()), ("age", 35.into())]);
        graph.link(7, 1, "knows", 2, vec![("weight", 0.5.into())]);
        graph.link(8, 1, "knows", 4, vec![("weight", 1.0.into())]);
        graph.link(9, 1, "created", 3, vec![("weight", 0.4.into())]);
        graph.link(10, 4, "created", 5, vec![("weight", 1.0.into())]);
        graph.link(11, 4, "created", 3, vec![("weight", 0.4.into())]);
        graph.link(12, 6, "created", 3, vec![("weight", 0.2.into())]);
        graph
    }

    /// Loads a fixture document. YAML is a superset of JSON, so both work.
    pub fn from_fixture_str(document: &str) -> GraphResult<Self> {
        let fixture: GraphFixture = serde_yaml::from_str(document)
            .map_err(|e| GraphError::Storage(format!("invalid graph fixture: {}", e)))?;

        let mut graph = Self::new();
        for v in fixture.vertices {
            let props = v
                .properties
                .into_iter()
                .map(|(k, val)| (k, vec![fixture_value(val)]))
                .collect();
            graph.insert_vertex(v.id, v.label, props);
        }
        for e in fixture.edges {
            let props = e
                .properties
                .into_iter()
                .map(|(k, val)| (k, vec![fixture_value(val)]))
                .collect();
            graph.insert_edge(e.id, e.out, e.label, e.in_, props)?;
        }
        Ok(graph)
    }

    pub fn add_vertex(&mut self, id: u64, label: &str, properties: Vec<(&str, Value)>) -> Vertex {
        self.insert_vertex(id, label.to_string(), property_map(properties))
    }

    /// Adds an edge between two existing vertices.
    pub fn add_edge(
        &mut self,
        id: u64,
        out_v: u64,
        label: &str,
        in_v: u64,
        properties: Vec<(&str, Value)>,
    ) -> GraphResult<Edge> {
        self.insert_edge(id, out_v, label.to_string(), in_v, property_map(properties))
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn insert_vertex(
        &mut self,
        id: u64,
        label: String,
        properties: BTreeMap<String, Vec<Value>>,
    ) -> Vertex {
        let vertex = Vertex {
            id: VertexId(id),
            label,
        };
        self.vertices.insert(
            vertex.id,
            VertexRecord {
                vertex: vertex.clone(),
                properties,
            },
        );
        vertex
    }

    fn insert_edge(
        &mut self,
        id: u64,
        out_v: u64,
        label: String,
        in_v: u64,
        properties: BTreeMap<String, Vec<Value>>,
    ) -> GraphResult<Edge> {
        let endpoint = |graph: &Self, raw: u64| {
            graph
                .vertices
                .get(&VertexId(raw))
                .map(|record| record.vertex.clone())
                .ok_or_else(|| {
                    GraphError::Storage(format!(
                        "edge {} references missing vertex {}",
                        id,
                        VertexId(raw)
                    ))
                })
        };
        let edge = Edge {
            id: EdgeId(id),
            label,
            out_v: endpoint(self, out_v)?,
            in_v: endpoint(self, in_v)?,
        };
        self.out_edges.entry(edge.out_v.id).or_default().push(edge.id);
        self.in_edges.entry(edge.in_v.id).or_default().push(edge.id);
        self.edges.insert(
            edge.id,
            EdgeRecord {
                edge: edge.clone(),
                properties,
            },
        );
        Ok(edge)
    }

    /// Fixture wiring between vertices known to exist.
    fn link(&mut self, id: u64, out_v: u64, label: &str, in_v: u64, props: Vec<(&str, Value)>) {
        if let Err(error) = self.insert_edge(id, out_v, label.to_string(), in_v, property_map(props)) {
            tracing::warn!(%error, "skipping fixture edge");
        }
    }

    fn incident(&self, vertex: VertexId, direction: Direction, labels: &[String]) -> Vec<Edge> {
        let mut ids: Vec<EdgeId> = Vec::new();
        if matches!(direction, Direction::Out | Direction::Both) {
            ids.extend(self.out_edges.get(&vertex).into_iter().flatten());
        }
        if matches!(direction, Direction::In | Direction::Both) {
            ids.extend(self.in_edges.get(&vertex).into_iter().flatten());
        }
        ids.iter()
            .filter_map(|id| self.edges.get(id))
            .map(|record| &record.edge)
            .filter(|edge| labels.is_empty() || labels.iter().any(|l| *l == edge.label))
            .cloned()
            .collect()
    }
}

impl Graph for InMemoryGraph {
    fn vertices(&self, ids: &[VertexId]) -> GraphResult<ElementIter<Vertex>> {
        let found: Vec<Vertex> = if ids.is_empty() {
            self.vertices.values().map(|r| r.vertex.clone()).collect()
        } else {
            ids.iter()
                .filter_map(|id| self.vertices.get(id))
                .map(|r| r.vertex.clone())
                .collect()
        };
        Ok(Box::new(found.into_iter()))
    }

    fn edges(&self, ids: &[EdgeId]) -> GraphResult<ElementIter<Edge>> {
        let found: Vec<Edge> = if ids.is_empty() {
            self.edges.values().map(|r| r.edge.clone()).collect()
        } else {
            ids.iter()
                .filter_map(|id| self.edges.get(id))
                .map(|r| r.edge.clone())
                .collect()
        };
        Ok(Box::new(found.into_iter()))
    }

    fn vertex_edges(
        &self,
        vertex: VertexId,
        direction: Direction,
        labels: &[String],
    ) -> GraphResult<ElementIter<Edge>> {
        Ok(Box::new(self.incident(vertex, direction, labels).into_iter()))
    }

    fn neighbors(
        &self,
        vertex: VertexId,
        direction: Direction,
        labels: &[String],
    ) -> GraphResult<ElementIter<Vertex>> {
        let adjacent: Vec<Vertex> = self
            .incident(vertex, direction, labels)
            .iter()
            .map(|edge| edge.other(vertex).clone())
            .collect();
        Ok(Box::new(adjacent.into_iter()))
    }

    fn properties(
        &self,
        element: &ElementRef,
        keys: &[String],
    ) -> GraphResult<Vec<(String, Value)>> {
        let properties = match element {
            ElementRef::Vertex(id) => self.vertices.get(id).map(|r| &r.properties),
            ElementRef::Edge(edge) => self.edges.get(&edge.id).map(|r| &r.properties),
        };
        let Some(properties) = properties else {
            return Ok(Vec::new());
        };
        Ok(properties
            .iter()
            .filter(|(k, _)| keys.is_empty() || keys.contains(k))
            .flat_map(|(k, values)| values.iter().map(move |v| (k.clone(), v.clone())))
            .collect())
    }
}
