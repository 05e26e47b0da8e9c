// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::structure::Value;
use std::collections::BTreeMap;

/// Named state shared by every step of one traversal execution.
///
/// Only the iterating thread touches it, so there is no locking. The sack seed
/// lives here too: each start traverser receives its own copy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SideEffects {
    values: BTreeMap<String, Value>,
    sack_seed: Option<Value>,
}

impl SideEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Appends `value` to the list under `key` `times` times, creating the list if needed.
    pub fn append(&mut self, key: &str, value: &Value, times: u64) {
        let slot = self
            .values
            .entry(key.to_string())
            .or_insert_with(|| Value::List(Vec::new()));
        if !matches!(slot, Value::List(_)) {
            *slot = Value::List(vec![slot.clone()]);
        }
        if let Value::List(items) = slot {
            for _ in 0..times {
                items.push(value.clone());
            }
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn sack_seed(&self) -> Option<&Value> {
        self.sack_seed.as_ref()
    }

    pub fn set_sack_seed(&mut self, seed: Value) {
        self.sack_seed = Some(seed);
    }

    /// Drops accumulated values, keeping registered keys at their initial values.
    pub(crate) fn reset_to(&mut self, initial: &SideEffects) {
        *self = initial.clone();
    }
}
