// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::TraversalResult;
use crate::steps::{By, Scoping, StepContext};
use crate::structure::Value;
use crate::traverser::{RequirementSet, Traverser, TraverserRequirement};
use std::collections::HashSet;

/// Drops every traverser whose key was already seen.
///
/// The survivor's bulk is forced to 1: a deduplicated value cannot also claim
/// a multiplicity. With scoping labels the key is the tuple of those labels'
/// path values, and a traverser missing any of them is dropped.
#[derive(Debug, Clone, Default)]
pub struct DedupStep {
    scoping: Scoping,
    by: By,
    seen: HashSet<Value>,
}

impl DedupStep {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scoped(labels: Vec<String>) -> Self {
        Self {
            scoping: Scoping::new(labels),
            ..Self::default()
        }
    }

    pub fn by(mut self, by: By) -> Self {
        self.by = by;
        self
    }

    pub fn set_by(&mut self, by: By) {
        self.by = by;
    }

    pub fn scoping(&self) -> &Scoping {
        &self.scoping
    }

    pub fn name(&self) -> String {
        if self.scoping.is_empty() {
            "dedup".into()
        } else {
            format!("dedup({})", self.scoping.keys().join(","))
        }
    }

    pub fn test(&mut self, traverser: &mut Traverser, ctx: &mut StepContext<'_>) -> TraversalResult<bool> {
        let Some(key) = self.key(traverser, ctx)? else {
            return Ok(false);
        };
        if self.seen.insert(key) {
            traverser.set_bulk(1);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn key(&self, traverser: &Traverser, ctx: &StepContext<'_>) -> TraversalResult<Option<Value>> {
        if self.scoping.is_empty() {
            return self.by.apply(traverser.value(), ctx).map(Some);
        }
        let mut parts = Vec::with_capacity(self.scoping.keys().len());
        for label in self.scoping.keys() {
            let Some(value) = traverser.labeled(label) else {
                return Ok(None);
            };
            parts.push(self.by.apply(value, ctx)?);
        }
        Ok(Some(Value::List(parts)))
    }

    pub fn requirements(&self) -> RequirementSet {
        let mut requirements: RequirementSet = [TraverserRequirement::Bulk].into_iter().collect();
        if !self.scoping.is_empty() {
            requirements.insert(TraverserRequirement::LabeledPath);
        }
        requirements
    }

    pub fn reset(&mut self) {
        self.seen.clear();
    }
}
