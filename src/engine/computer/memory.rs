// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Shared accumulator state for vertex programs.
//!
//! A computation sees memory through three views:
//!
//! * [`Memory`] - the master view used by `setup` and `terminate`, which run
//!   single-threaded between rounds. Every operator is allowed.
//! * [`RoundMemory`] - handed to `execute`. Reads come from the snapshot taken
//!   when the round started, so no vertex observes another vertex's writes in
//!   the same round. Writes go to a per-worker delta merged after the round;
//!   only the commutative operators (`incr`, `and`, `or`) are accepted.
//! * [`FinalMemory`] - the read-only result of a finished computation.
//!
//! Every key must be declared up front with exactly one operator.

use crate::errors::{TraversalError, TraversalResult};
use crate::structure::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// How concurrent writes to a key combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoryOperator {
    /// Last write wins. Master phases only.
    Set,
    Incr,
    And,
    Or,
}

impl MemoryOperator {
    pub fn name(self) -> &'static str {
        match self {
            MemoryOperator::Set => "set",
            MemoryOperator::Incr => "incr",
            MemoryOperator::And => "and",
            MemoryOperator::Or => "or",
        }
    }

    fn combine(self, key: &str, current: Option<&Value>, update: Value) -> TraversalResult<Value> {
        let Some(current) = current else {
            return validate(self, key, update);
        };
        match self {
            MemoryOperator::Set => Ok(update),
            MemoryOperator::Incr => current.add_numbers(&update).ok_or_else(|| {
                TraversalError::InvalidMemoryValue {
                    key: key.to_string(),
                    reason: format!("cannot add {} to {}", update, current),
                }
            }),
            MemoryOperator::And | MemoryOperator::Or => {
                let (Some(left), Some(right)) = (current.as_bool(), update.as_bool()) else {
                    return Err(TraversalError::InvalidMemoryValue {
                        key: key.to_string(),
                        reason: format!("{} requires booleans", self.name()),
                    });
                };
                let combined = if self == MemoryOperator::And {
                    left && right
                } else {
                    left || right
                };
                Ok(Value::Bool(combined))
            }
        }
    }
}

fn validate(operator: MemoryOperator, key: &str, value: Value) -> TraversalResult<Value> {
    let valid = match operator {
        MemoryOperator::Set => true,
        MemoryOperator::Incr => matches!(value, Value::Int(_) | Value::Float(_)),
        MemoryOperator::And | MemoryOperator::Or => matches!(value, Value::Bool(_)),
    };
    if valid {
        Ok(value)
    } else {
        Err(TraversalError::InvalidMemoryValue {
            key: key.to_string(),
            reason: format!("{} does not accept {}", operator.name(), value),
        })
    }
}

/// A memory key a vertex program may write, with its merge operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryComputeKey {
    pub key: String,
    pub operator: MemoryOperator,
}

impl MemoryComputeKey {
    pub fn new(key: impl Into<String>, operator: MemoryOperator) -> Self {
        Self {
            key: key.into(),
            operator,
        }
    }
}

type Declared = Arc<BTreeMap<String, MemoryOperator>>;

fn operator_for(declared: &Declared, key: &str, attempted: MemoryOperator) -> TraversalResult<()> {
    match declared.get(key) {
        None => Err(TraversalError::UndeclaredMemoryKey {
            key: key.to_string(),
        }),
        Some(op) if *op != attempted && attempted != MemoryOperator::Set => {
            Err(TraversalError::MemoryOperatorMismatch {
                key: key.to_string(),
                declared: op.name(),
                attempted: attempted.name(),
            })
        }
        Some(_) => Ok(()),
    }
}

/// The master view of memory.
#[derive(Debug, Clone)]
pub struct Memory {
    declared: Declared,
    values: BTreeMap<String, Value>,
    iteration: u32,
}

impl Memory {
    pub fn new(keys: Vec<MemoryComputeKey>) -> Self {
        Self {
            declared: Arc::new(keys.into_iter().map(|k| (k.key, k.operator)).collect()),
            values: BTreeMap::new(),
            iteration: 0,
        }
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn is_declared(&self, key: &str) -> bool {
        self.declared.contains_key(key)
    }

    /// Overwrites `key` regardless of its declared operator.
    pub fn set(&mut self, key: &str, value: Value) -> TraversalResult<()> {
        operator_for(&self.declared, key, MemoryOperator::Set)?;
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    pub fn incr(&mut self, key: &str, value: Value) -> TraversalResult<()> {
        self.apply(key, MemoryOperator::Incr, value)
    }

    pub fn and(&mut self, key: &str, value: bool) -> TraversalResult<()> {
        self.apply(key, MemoryOperator::And, Value::Bool(value))
    }

    pub fn or(&mut self, key: &str, value: bool) -> TraversalResult<()> {
        self.apply(key, MemoryOperator::Or, Value::Bool(value))
    }

    fn apply(&mut self, key: &str, operator: MemoryOperator, value: Value) -> TraversalResult<()> {
        operator_for(&self.declared, key, operator)?;
        let combined = operator.combine(key, self.values.get(key), value)?;
        self.values.insert(key.to_string(), combined);
        Ok(())
    }

    pub(crate) fn round(&self) -> RoundMemory {
        RoundMemory {
            declared: Arc::clone(&self.declared),
            snapshot: Arc::new(self.values.clone()),
            delta: BTreeMap::new(),
            iteration: self.iteration,
        }
    }

    /// Folds one worker's writes into the master values.
    pub(crate) fn merge(&mut self, delta: MemoryDelta) -> TraversalResult<()> {
        for (key, value) in delta.0 {
            let operator = self
                .declared
                .get(&key)
                .copied()
                .ok_or_else(|| TraversalError::UndeclaredMemoryKey { key: key.clone() })?;
            let combined = operator.combine(&key, self.values.get(&key), value)?;
            self.values.insert(key, combined);
        }
        Ok(())
    }

    pub(crate) fn advance(&mut self) {
        self.iteration += 1;
    }

    pub(crate) fn into_final(self) -> FinalMemory {
        FinalMemory {
            values: self.values,
            iterations: self.iteration,
        }
    }
}

/// Writes made by one worker during a round.
#[derive(Debug, Clone, Default)]
pub struct MemoryDelta(BTreeMap<String, Value>);

/// The view of memory inside `execute`.
#[derive(Debug, Clone)]
pub struct RoundMemory {
    declared: Declared,
    snapshot: Arc<BTreeMap<String, Value>>,
    delta: BTreeMap<String, Value>,
    iteration: u32,
}

impl RoundMemory {
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn is_initial_iteration(&self) -> bool {
        self.iteration == 0
    }

    /// The value as of the start of this round.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.snapshot.get(key)
    }

    /// Always fails: concurrent last-write-wins has no defined outcome.
    pub fn set(&mut self, key: &str, _value: Value) -> TraversalResult<()> {
        operator_for(&self.declared, key, MemoryOperator::Set)?;
        Err(TraversalError::ConcurrentMemorySet {
            key: key.to_string(),
        })
    }

    pub fn incr(&mut self, key: &str, value: Value) -> TraversalResult<()> {
        self.apply(key, MemoryOperator::Incr, value)
    }

    pub fn and(&mut self, key: &str, value: bool) -> TraversalResult<()> {
        self.apply(key, MemoryOperator::And, Value::Bool(value))
    }

    pub fn or(&mut self, key: &str, value: bool) -> TraversalResult<()> {
        self.apply(key, MemoryOperator::Or, Value::Bool(value))
    }

    fn apply(&mut self, key: &str, operator: MemoryOperator, value: Value) -> TraversalResult<()> {
        operator_for(&self.declared, key, operator)?;
        let combined = operator.combine(key, self.delta.get(key), value)?;
        self.delta.insert(key.to_string(), combined);
        Ok(())
    }

    pub(crate) fn into_delta(self) -> MemoryDelta {
        MemoryDelta(self.delta)
    }
}

/// Memory after the computation finished.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinalMemory {
    values: BTreeMap<String, Value>,
    iterations: u32,
}

impl FinalMemory {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Rounds executed before `terminate` voted to halt.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory() -> Memory {
        Memory::new(vec![
            MemoryComputeKey::new("count", MemoryOperator::Incr),
            MemoryComputeKey::new("all", MemoryOperator::And),
            MemoryComputeKey::new("any", MemoryOperator::Or),
            MemoryComputeKey::new("last", MemoryOperator::Set),
        ])
    }

    #[test]
    fn test_master_operators() {
        let mut m = memory();
        m.incr("count", Value::Int(2)).unwrap();
        m.incr("count", Value::Int(3)).unwrap();
        m.and("all", true).unwrap();
        m.and("all", false).unwrap();
        m.or("any", false).unwrap();
        m.set("last", Value::str("x")).unwrap();
        assert_eq!(m.get("count"), Some(&Value::Int(5)));
        assert_eq!(m.get("all"), Some(&Value::Bool(false)));
        assert_eq!(m.get("any"), Some(&Value::Bool(false)));
        assert_eq!(m.get("last"), Some(&Value::str("x")));
    }

    #[test]
    fn test_undeclared_key_fails_fast() {
        let mut m = memory();
        assert_eq!(
            m.incr("nope", Value::Int(1)),
            Err(TraversalError::UndeclaredMemoryKey { key: "nope".into() })
        );
        let mut round = m.round();
        assert!(matches!(
            round.or("nope", true),
            Err(TraversalError::UndeclaredMemoryKey { .. })
        ));
    }

    #[test]
    fn test_operator_must_match_declaration() {
        let mut m = memory();
        assert_eq!(
            m.or("count", true),
            Err(TraversalError::MemoryOperatorMismatch {
                key: "count".into(),
                declared: "incr",
                attempted: "or",
            })
        );
    }

    #[test]
    fn test_round_isolation_and_merge() {
        let mut m = memory();
        m.set("count", Value::Int(10)).unwrap();

        let mut first = m.round();
        let mut second = m.round();
        first.incr("count", Value::Int(1)).unwrap();
        first.incr("count", Value::Int(1)).unwrap();
        second.incr("count", Value::Int(5)).unwrap();
        // neither worker sees its own or the other's writes mid-round
        assert_eq!(first.get("count"), Some(&Value::Int(10)));

        m.merge(first.into_delta()).unwrap();
        m.merge(second.into_delta()).unwrap();
        assert_eq!(m.get("count"), Some(&Value::Int(17)));
    }

    #[test]
    fn test_set_is_rejected_during_rounds() {
        let m = memory();
        let mut round = m.round();
        assert_eq!(
            round.set("last", Value::Int(1)),
            Err(TraversalError::ConcurrentMemorySet { key: "last".into() })
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut m = memory();
        assert!(matches!(
            m.incr("count", Value::str("a")),
            Err(TraversalError::InvalidMemoryValue { .. })
        ));
    }

    #[test]
    fn test_final_memory_reports_iterations() {
        let mut m = memory();
        m.advance();
        m.advance();
        m.incr("count", Value::Int(1)).unwrap();
        let done = m.into_final();
        assert_eq!(done.iterations(), 2);
        assert_eq!(done.keys().collect::<Vec<_>>(), vec!["count"]);
    }
}
