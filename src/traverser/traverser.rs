// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::steps::StepId;
use crate::structure::Value;
use crate::traverser::{Path, RequirementSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The result unit flowing through a pipeline.
///
/// In the standard engine a traverser is owned by whichever step holds it. In
/// the computer engine it is a serializable message and `step_id` names the
/// step that should receive it next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Traverser {
    value: Value,
    bulk: u64,
    path: Option<Path>,
    /// Whether the newest path entry records the current value.
    path_current: bool,
    sack: Option<Value>,
    tags: BTreeSet<String>,
    step_id: Option<StepId>,
    branch: Option<usize>,
}

/// The identity under which traversers are merged into one weighted token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraverserKey {
    value: Value,
    path: Option<Path>,
    sack: Option<Value>,
    tags: BTreeSet<String>,
    step_id: Option<StepId>,
    branch: Option<usize>,
}

impl Traverser {
    /// A bare traverser with bulk 1 and no path.
    pub fn new(value: Value) -> Self {
        Self::with_bulk(value, 1)
    }

    pub fn with_bulk(value: Value, bulk: u64) -> Self {
        Self {
            value,
            bulk,
            path: None,
            path_current: false,
            sack: None,
            tags: BTreeSet::new(),
            step_id: None,
            branch: None,
        }
    }

    /// A traverser shaped for a pipeline with the given requirements.
    pub fn start(value: Value, bulk: u64, requirements: &RequirementSet, sack: Option<&Value>) -> Self {
        let mut traverser = Self::with_bulk(value, bulk);
        if requirements.tracks_path() {
            traverser.path = Some(Path::new());
        }
        traverser.sack = sack.cloned();
        traverser
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn bulk(&self) -> u64 {
        self.bulk
    }

    pub fn set_bulk(&mut self, bulk: u64) {
        self.bulk = bulk;
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    /// Resolves a label against the path, if one is tracked.
    pub fn labeled(&self, label: &str) -> Option<&Value> {
        self.path.as_ref().and_then(|p| p.get(label))
    }

    pub fn sack(&self) -> Option<&Value> {
        self.sack.as_ref()
    }

    pub fn set_sack(&mut self, sack: Value) {
        self.sack = Some(sack);
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn tag(&mut self, tag: impl Into<String>) {
        self.tags.insert(tag.into());
    }

    /// Drops every tag starting with `prefix`.
    pub fn untag_prefixed(&mut self, prefix: &str) {
        self.tags.retain(|tag| !tag.starts_with(prefix));
    }

    pub fn step_id(&self) -> Option<StepId> {
        self.step_id
    }

    pub fn set_step_id(&mut self, step_id: Option<StepId>) {
        self.step_id = step_id;
    }

    /// The child a parent step should resume this traverser into.
    pub(crate) fn branch(&self) -> Option<usize> {
        self.branch
    }

    pub(crate) fn set_branch(&mut self, branch: Option<usize>) {
        self.branch = branch;
    }

    /// Replaces the current value in place. The path is not extended.
    pub fn set_value(&mut self, value: Value) {
        self.value = value;
        self.path_current = false;
    }

    /// An independent copy carrying `value`, sharing this traverser's path prefix
    /// and sack. Used whenever one input fans out into several outputs.
    pub fn split(&self, value: Value) -> Self {
        let mut child = self.clone();
        child.set_value(value);
        child
    }

    /// Records the current value on the path after a step produced it.
    pub fn extend_path(&mut self, labels: &BTreeSet<String>, requirements: &RequirementSet) {
        let Some(path) = self.path.as_mut() else {
            return;
        };
        if requirements.tracks_full_path() || !labels.is_empty() {
            path.extend(self.value.clone(), labels.clone());
            self.path_current = true;
        }
    }

    /// Stamps labels for a step that forwarded the value unchanged.
    pub fn add_labels(&mut self, labels: &BTreeSet<String>) {
        if labels.is_empty() {
            return;
        }
        let Some(path) = self.path.as_mut() else {
            return;
        };
        if self.path_current {
            path.label_last(labels);
        } else {
            path.extend(self.value.clone(), labels.clone());
            self.path_current = true;
        }
    }

    /// Binds `label` to `value` on the path without changing the current value.
    pub fn bind(&mut self, label: &str, value: Value) {
        let path = self.path.get_or_insert_with(Path::new);
        let labels: BTreeSet<String> = std::iter::once(label.to_string()).collect();
        path.extend(value.clone(), labels);
        self.path_current = self.value == value;
    }

    pub fn key(&self) -> TraverserKey {
        TraverserKey {
            value: self.value.clone(),
            path: self.path.clone(),
            sack: self.sack.clone(),
            tags: self.tags.clone(),
            step_id: self.step_id,
            branch: self.branch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traverser::TraverserRequirement;

    fn labels(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn labeled_path() -> RequirementSet {
        [TraverserRequirement::LabeledPath].into_iter().collect()
    }

    #[test]
    fn test_split_is_independent() {
        let mut parent = Traverser::start(Value::Int(1), 3, &labeled_path(), Some(&Value::Int(0)));
        parent.extend_path(&labels(&["a"]), &labeled_path());

        let mut child = parent.split(Value::Int(2));
        child.set_sack(Value::Int(10));
        child.extend_path(&labels(&["b"]), &labeled_path());

        assert_eq!(parent.sack(), Some(&Value::Int(0)));
        assert_eq!(parent.path().unwrap().len(), 1);
        assert_eq!(child.path().unwrap().len(), 2);
        assert_eq!(child.bulk(), 3);
        assert_eq!(child.labeled("a"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_labeled_path_skips_unlabeled_steps() {
        let reqs = labeled_path();
        let mut t = Traverser::start(Value::Int(1), 1, &reqs, None);
        t.extend_path(&labels(&[]), &reqs);
        assert_eq!(t.path().unwrap().len(), 0);

        let mut full = RequirementSet::new();
        full.insert(TraverserRequirement::Path);
        let mut t = Traverser::start(Value::Int(1), 1, &full, None);
        t.extend_path(&labels(&[]), &full);
        assert_eq!(t.path().unwrap().len(), 1);
    }

    #[test]
    fn test_add_labels_does_not_relabel_stale_entry() {
        let reqs = labeled_path();
        let mut t = Traverser::start(Value::Int(1), 1, &reqs, None);
        t.extend_path(&labels(&["a"]), &reqs);

        // an unlabeled map changes the value without touching the path
        let mut t = t.split(Value::Int(2));
        t.add_labels(&labels(&["b"]));

        assert_eq!(t.labeled("a"), Some(&Value::Int(1)));
        assert_eq!(t.labeled("b"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_untracked_path_ignores_labels() {
        let mut t = Traverser::new(Value::Int(1));
        t.add_labels(&labels(&["a"]));
        t.extend_path(&labels(&["b"]), &RequirementSet::new());
        assert!(t.path().is_none());
    }

    #[test]
    fn test_key_ignores_bulk() {
        let a = Traverser::with_bulk(Value::Int(1), 2);
        let b = Traverser::with_bulk(Value::Int(1), 5);
        assert_eq!(a.key(), b.key());
    }
}
