// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::structure::Value;
use crate::traverser::{Traverser, TraverserKey};
use std::collections::HashMap;

/// Traversers merged by identity: equal value, path, sack and tags collapse
/// into one token whose bulk is the sum. Insertion order is kept.
#[derive(Debug, Clone, Default)]
pub struct TraverserSet {
    traversers: Vec<Traverser>,
    index: HashMap<TraverserKey, usize>,
}

impl TraverserSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, traverser: Traverser) {
        let key = traverser.key();
        match self.index.get(&key) {
            Some(&slot) => {
                let existing = &mut self.traversers[slot];
                existing.set_bulk(existing.bulk().saturating_add(traverser.bulk()));
            }
            None => {
                self.index.insert(key, self.traversers.len());
                self.traversers.push(traverser);
            }
        }
    }

    pub fn extend(&mut self, other: TraverserSet) {
        for traverser in other.traversers {
            self.add(traverser);
        }
    }

    pub fn len(&self) -> usize {
        self.traversers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traversers.is_empty()
    }

    /// Sum of bulks.
    pub fn total_bulk(&self) -> u64 {
        self.traversers.iter().map(Traverser::bulk).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Traverser> {
        self.traversers.iter()
    }

    pub fn into_vec(self) -> Vec<Traverser> {
        self.traversers
    }
}

impl FromIterator<Traverser> for TraverserSet {
    fn from_iter<I: IntoIterator<Item = Traverser>>(iter: I) -> Self {
        let mut set = TraverserSet::new();
        for traverser in iter {
            set.add(traverser);
        }
        set
    }
}

/// A weighted set of values, the bulk-aware materialization target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkSet {
    order: Vec<Value>,
    weights: HashMap<Value, u64>,
}

impl BulkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: Value, bulk: u64) {
        match self.weights.get_mut(&value) {
            Some(weight) => *weight = weight.saturating_add(bulk),
            None => {
                self.weights.insert(value.clone(), bulk);
                self.order.push(value);
            }
        }
    }

    pub fn get(&self, value: &Value) -> u64 {
        self.weights.get(value).copied().unwrap_or(0)
    }

    /// Number of distinct values.
    pub fn unique_size(&self) -> usize {
        self.order.len()
    }

    /// Sum of all weights.
    pub fn long_size(&self) -> u64 {
        self.weights.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, u64)> {
        self.order.iter().map(move |v| (v, self.get(v)))
    }
}
