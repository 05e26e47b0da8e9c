// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::structure::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PathEntry {
    pub value: Value,
    pub labels: BTreeSet<String>,
}

/// Ordered history of the values a traverser has visited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Path {
    entries: Vec<PathEntry>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[PathEntry] {
        &self.entries
    }

    pub fn extend(&mut self, value: Value, labels: BTreeSet<String>) {
        self.entries.push(PathEntry { value, labels });
    }

    /// Adds labels to the newest entry.
    pub fn label_last(&mut self, labels: &BTreeSet<String>) {
        if let Some(last) = self.entries.last_mut() {
            last.labels.extend(labels.iter().cloned());
        }
    }

    /// The most recent value stamped with `label`.
    pub fn get(&self, label: &str) -> Option<&Value> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.labels.contains(label))
            .map(|entry| &entry.value)
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.get(label).is_some()
    }

    pub fn labels(&self) -> BTreeSet<&str> {
        self.entries
            .iter()
            .flat_map(|entry| entry.labels.iter().map(String::as_str))
            .collect()
    }

    pub fn objects(&self) -> impl DoubleEndedIterator<Item = &Value> {
        self.entries.iter().map(|entry| &entry.value)
    }
}
