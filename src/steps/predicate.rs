// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Value predicates and the `by()` modulator.

use crate::errors::TraversalResult;
use crate::steps::StepContext;
use crate::structure::Value;
use std::cmp::Ordering;
use std::fmt;

/// A predicate over a single value.
#[derive(Debug, Clone, PartialEq)]
pub enum P {
    Eq(Value),
    Neq(Value),
    Lt(Value),
    Lte(Value),
    Gt(Value),
    Gte(Value),
    /// Inclusive lower bound, exclusive upper bound.
    Between(Value, Value),
    Within(Vec<Value>),
    Without(Vec<Value>),
    And(Box<P>, Box<P>),
    Or(Box<P>, Box<P>),
    Not(Box<P>),
}

impl P {
    pub fn eq(value: impl Into<Value>) -> Self {
        P::Eq(value.into())
    }

    pub fn neq(value: impl Into<Value>) -> Self {
        P::Neq(value.into())
    }

    pub fn lt(value: impl Into<Value>) -> Self {
        P::Lt(value.into())
    }

    pub fn lte(value: impl Into<Value>) -> Self {
        P::Lte(value.into())
    }

    pub fn gt(value: impl Into<Value>) -> Self {
        P::Gt(value.into())
    }

    pub fn gte(value: impl Into<Value>) -> Self {
        P::Gte(value.into())
    }

    pub fn between(low: impl Into<Value>, high: impl Into<Value>) -> Self {
        P::Between(low.into(), high.into())
    }

    pub fn within<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        P::Within(values.into_iter().map(Into::into).collect())
    }

    pub fn without<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        P::Without(values.into_iter().map(Into::into).collect())
    }

    pub fn and(self, other: P) -> Self {
        P::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: P) -> Self {
        P::Or(Box::new(self), Box::new(other))
    }

    pub fn negate(self) -> Self {
        P::Not(Box::new(self))
    }

    pub fn test(&self, value: &Value) -> bool {
        let cmp = |other: &Value| value.compare(other);
        match self {
            P::Eq(v) => value.loosely_equals(v),
            P::Neq(v) => !value.loosely_equals(v),
            P::Lt(v) => cmp(v) == Some(Ordering::Less),
            P::Lte(v) => matches!(cmp(v), Some(Ordering::Less | Ordering::Equal)),
            P::Gt(v) => cmp(v) == Some(Ordering::Greater),
            P::Gte(v) => matches!(cmp(v), Some(Ordering::Greater | Ordering::Equal)),
            P::Between(low, high) => {
                matches!(cmp(low), Some(Ordering::Greater | Ordering::Equal))
                    && cmp(high) == Some(Ordering::Less)
            }
            P::Within(values) => values.iter().any(|v| value.loosely_equals(v)),
            P::Without(values) => !values.iter().any(|v| value.loosely_equals(v)),
            P::And(a, b) => a.test(value) && b.test(value),
            P::Or(a, b) => a.test(value) || b.test(value),
            P::Not(p) => !p.test(value),
        }
    }
}

/// Binary comparison between two resolved values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl CompareOp {
    pub fn test(self, left: &Value, right: &Value) -> bool {
        let ordering = left.compare(right);
        match self {
            CompareOp::Eq => ordering == Some(Ordering::Equal),
            CompareOp::Neq => ordering != Some(Ordering::Equal),
            CompareOp::Lt => ordering == Some(Ordering::Less),
            CompareOp::Lte => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
            CompareOp::Gt => ordering == Some(Ordering::Greater),
            CompareOp::Gte => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            CompareOp::Eq => "eq",
            CompareOp::Neq => "neq",
            CompareOp::Lt => "lt",
            CompareOp::Lte => "lte",
            CompareOp::Gt => "gt",
            CompareOp::Gte => "gte",
        };
        f.write_str(symbol)
    }
}

/// Projection applied before a step compares or groups values.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum By {
    #[default]
    Identity,
    /// First value of the named property; `Null` when absent.
    Key(String),
    /// Element label; `Null` for non-elements.
    Label,
}

impl By {
    pub fn key(name: impl Into<String>) -> Self {
        By::Key(name.into())
    }

    pub fn apply(&self, value: &Value, ctx: &StepContext<'_>) -> TraversalResult<Value> {
        match self {
            By::Identity => Ok(value.clone()),
            By::Label => Ok(ctx.label_of(value)?.map(Value::Str).unwrap_or(Value::Null)),
            By::Key(key) => {
                let Some(element) = value.as_element() else {
                    return Ok(Value::Null);
                };
                let props = ctx.graph.properties(&element, std::slice::from_ref(key))?;
                Ok(props.into_iter().next().map(|(_, v)| v).unwrap_or(Value::Null))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        let cases = vec![
            (P::eq(29), Value::Int(29), true),
            (P::neq(29), Value::Int(29), false),
            (P::gt(30), Value::Int(32), true),
            (P::gt(30), Value::str("x"), false),
            (P::lte(27), Value::float(27.0), true),
            (P::between(27, 32), Value::Int(32), false),
            (P::between(27, 32), Value::Int(27), true),
            (P::within(vec!["lop", "ripple"]), Value::str("lop"), true),
            (P::without(vec!["lop"]), Value::str("lop"), false),
            (P::gt(20).and(P::lt(30)), Value::Int(29), true),
            (P::lt(20).or(P::gt(30)), Value::Int(29), false),
            (P::eq(1).negate(), Value::Int(2), true),
        ];

        for (predicate, value, expected) in cases {
            assert_eq!(
                predicate.test(&value),
                expected,
                "{:?} on {:?}",
                predicate,
                value
            );
        }
    }

    #[test]
    fn test_compare_ops() {
        assert!(CompareOp::Eq.test(&Value::Int(1), &Value::float(1.0)));
        assert!(CompareOp::Neq.test(&Value::str("a"), &Value::Int(1)));
        assert!(CompareOp::Lt.test(&Value::Int(1), &Value::Int(2)));
        assert!(!CompareOp::Gte.test(&Value::Int(1), &Value::Int(2)));
    }
}
