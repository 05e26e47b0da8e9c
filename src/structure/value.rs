// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The payload carried by a traverser.

use crate::structure::{Edge, ElementRef, Vertex};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// An `f64` with a total order so that values can live in sets and map keys.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Float(pub f64);

impl PartialEq for Float {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Float {}

impl PartialOrd for Float {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Float {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for Float {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// Anything a traverser can point at.
///
/// Derived equality is structural. Use [`Value::loosely_equals`] and
/// [`Value::compare`] when numeric coercion between `Int` and `Float` is wanted,
/// as predicates do.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(Float),
    Str(String),
    Vertex(Vertex),
    Edge(Edge),
    List(Vec<Value>),
    Map(#[serde(with = "map_entries")] BTreeMap<Value, Value>),
}

impl Value {
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    pub fn float(f: f64) -> Self {
        Value::Float(Float(f))
    }

    pub fn as_vertex(&self) -> Option<&Vertex> {
        match self {
            Value::Vertex(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_edge(&self) -> Option<&Edge> {
        match self {
            Value::Edge(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// The element this value refers to, if it is a vertex or an edge.
    pub fn as_element(&self) -> Option<ElementRef> {
        match self {
            Value::Vertex(v) => Some(ElementRef::Vertex(v.id)),
            Value::Edge(e) => Some(ElementRef::Edge(e.clone())),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(f.0),
            _ => None,
        }
    }

    /// Ordering used by predicates. Numbers compare across `Int` and `Float`;
    /// other values only compare within their own kind.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                let (a, b) = (self.as_f64()?, other.as_f64()?);
                a.partial_cmp(&b)
            }
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Vertex(a), Value::Vertex(b)) => Some(a.id.cmp(&b.id)),
            (Value::Edge(a), Value::Edge(b)) => Some(a.id.cmp(&b.id)),
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            _ if std::mem::discriminant(self) == std::mem::discriminant(other) => {
                Some(self.cmp(other))
            }
            _ => None,
        }
    }

    pub fn loosely_equals(&self, other: &Value) -> bool {
        self.compare(other) == Some(Ordering::Equal)
    }

    /// Adds two numbers, promoting to `Float` when either side is one.
    pub fn add_numbers(&self, other: &Value) -> Option<Value> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(Value::Int(a.saturating_add(*b))),
            _ => Some(Value::float(self.as_f64()? + other.as_f64()?)),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vertex> for Value {
    fn from(v: Vertex) -> Self {
        Value::Vertex(v)
    }
}

impl From<Edge> for Value {
    fn from(e: Edge) -> Self {
        Value::Edge(e)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x.0),
            Value::Str(s) => f.write_str(s),
            Value::Vertex(v) => write!(f, "{}", v.id),
            Value::Edge(e) => write!(f, "{}[{}-{}->{}]", e.id, e.out_v.id, e.label, e.in_v.id),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}={}", k, v)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Maps are written as a list of pairs so that non-string keys survive
/// self-describing formats such as JSON.
mod map_entries {
    use super::Value;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(
        map: &BTreeMap<Value, Value>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let entries: Vec<(&Value, &Value)> = map.iter().collect();
        entries.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<Value, Value>, D::Error> {
        let entries: Vec<(Value, Value)> = Vec::deserialize(deserializer)?;
        Ok(entries.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_comparison_coerces() {
        assert_eq!(Value::Int(3).compare(&Value::float(3.0)), Some(Ordering::Equal));
        assert_eq!(Value::Int(2).compare(&Value::float(2.5)), Some(Ordering::Less));
        assert!(Value::Int(29).loosely_equals(&Value::Int(29)));
    }

    #[test]
    fn test_mismatched_kinds_do_not_compare() {
        assert_eq!(Value::str("1").compare(&Value::Int(1)), None);
        assert!(!Value::Bool(true).loosely_equals(&Value::Int(1)));
    }

    #[test]
    fn test_add_numbers() {
        assert_eq!(Value::Int(2).add_numbers(&Value::Int(3)), Some(Value::Int(5)));
        assert_eq!(
            Value::Int(1).add_numbers(&Value::float(0.5)),
            Some(Value::float(1.5))
        );
        assert_eq!(Value::str("a").add_numbers(&Value::Int(1)), None);
    }

    #[test]
    fn test_map_with_vertex_keys_survives_json() {
        let mut map = BTreeMap::new();
        map.insert(Value::Vertex(Vertex::new(1, "person")), Value::Int(2));
        let value = Value::Map(map);

        let encoded = serde_json::to_string(&value).unwrap();
        let decoded: Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, value);
    }
}
