// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Fluent step builders.
//!
//! Builders return `Self` so calls chain. A builder that cannot apply (the
//! traversal is locked, or a modulator has nothing to modulate) records the
//! error instead; it surfaces on the next `has_next`/`next`.

use crate::errors::TraversalError;
use crate::steps::{
    BarrierStep, By, CoalesceStep, Connective, DedupStep, Emits, FilterStep, FlatMapStep, MapStep,
    MatchStep, RangeFilter, Reducer, Scoping, SideEffectStep, StartSource, StartStep, Step,
    StepKind, WherePredicate, WhereStep, P,
};
use crate::structure::{Direction, Value};
use crate::traversal::Traversal;

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Traversal {
    fn push(mut self, kind: StepKind) -> Self {
        if let Err(error) = self.add_step(Step::new(kind)) {
            self.defer(error);
        }
        self
    }

    /// Labels the most recent step. On an empty traversal the label goes on
    /// a fresh identity step so it still names the incoming value.
    pub fn as_(mut self, label: &str) -> Self {
        if self.is_locked() {
            let error = TraversalError::LockedTraversal {
                traversal: self.traversal_id(),
                operation: "label",
                step: label.to_string(),
            };
            self.defer(error);
            return self;
        }
        if self.steps.is_empty() {
            self = self.identity();
        }
        if let Some(last) = self.steps.last_mut() {
            last.add_label(label);
        }
        self
    }

    /// Modulates the most recent `dedup` or `group_count`.
    pub fn by(mut self, by: By) -> Self {
        if self.is_locked() {
            let error = TraversalError::LockedTraversal {
                traversal: self.traversal_id(),
                operation: "modulate",
                step: self.steps.last().map(Step::name).unwrap_or_default(),
            };
            self.defer(error);
            return self;
        }
        let accepted = match self.steps.last_mut().map(Step::kind_mut) {
            Some(StepKind::Filter(FilterStep::Dedup(dedup))) => {
                dedup.set_by(by);
                true
            }
            Some(StepKind::Barrier(barrier)) => match barrier.reducer_mut() {
                Reducer::GroupCount(current) => {
                    *current = by;
                    true
                }
                _ => false,
            },
            _ => false,
        };
        if !accepted {
            let step = self.steps.last().map(Step::name).unwrap_or_default();
            self.defer(TraversalError::InvalidModulator { step, modulator: "by" });
        }
        self
    }

    pub fn inject(self, values: Vec<Value>) -> Self {
        self.push(StepKind::Start(StartStep::new(StartSource::Inject(values))))
    }

    pub fn identity(self) -> Self {
        self.push(StepKind::Filter(FilterStep::Identity))
    }

    pub fn has(self, key: &str, predicate: P) -> Self {
        self.push(StepKind::Filter(FilterStep::Has {
            key: key.to_string(),
            predicate,
        }))
    }

    pub fn has_label(self, labels: &[&str]) -> Self {
        self.push(StepKind::Filter(FilterStep::HasLabel(owned(labels))))
    }

    pub fn is(self, predicate: P) -> Self {
        self.push(StepKind::Filter(FilterStep::Is(predicate)))
    }

    /// Keeps results `low..high`; `None` leaves the window open-ended.
    pub fn range(self, low: u64, high: Option<u64>) -> Self {
        self.push(StepKind::Filter(FilterStep::Range(RangeFilter::new(low, high))))
    }

    pub fn limit(self, count: u64) -> Self {
        self.range(0, Some(count))
    }

    pub fn dedup(self) -> Self {
        self.push(StepKind::Filter(FilterStep::Dedup(DedupStep::new())))
    }

    /// Dedup on the tuple of these labels' path values.
    pub fn dedup_labels(self, labels: &[&str]) -> Self {
        self.push(StepKind::Filter(FilterStep::Dedup(DedupStep::scoped(owned(labels)))))
    }

    pub fn where_(self, predicate: WherePredicate) -> Self {
        self.push(StepKind::Filter(FilterStep::Where(WhereStep::predicate(predicate))))
    }

    pub fn where_traversal(self, child: Traversal) -> Self {
        self.push(StepKind::Filter(FilterStep::Where(WhereStep::traversal(child))))
    }

    pub fn filter(self, child: Traversal) -> Self {
        self.push(StepKind::Filter(FilterStep::Traversal(child)))
    }

    pub fn not(self, child: Traversal) -> Self {
        self.push(StepKind::Filter(FilterStep::Not(child)))
    }

    pub fn id(self) -> Self {
        self.push(StepKind::Map(MapStep::Id))
    }

    pub fn label(self) -> Self {
        self.push(StepKind::Map(MapStep::Label))
    }

    pub fn constant(self, value: impl Into<Value>) -> Self {
        self.push(StepKind::Map(MapStep::Constant(value.into())))
    }

    pub fn select(self, labels: &[&str]) -> Self {
        self.push(StepKind::Map(MapStep::Select(Scoping::new(owned(labels)))))
    }

    pub fn path(self) -> Self {
        self.push(StepKind::Map(MapStep::Path))
    }

    pub fn sack(self) -> Self {
        self.push(StepKind::Map(MapStep::Sack))
    }

    pub fn out_v(self) -> Self {
        self.push(StepKind::Map(MapStep::EdgeVertex(Direction::Out)))
    }

    pub fn in_v(self) -> Self {
        self.push(StepKind::Map(MapStep::EdgeVertex(Direction::In)))
    }

    pub fn other_v(self) -> Self {
        self.push(StepKind::Map(MapStep::OtherVertex))
    }

    pub fn value_map(self, keys: &[&str]) -> Self {
        self.push(StepKind::Map(MapStep::ValueMap(owned(keys))))
    }

    fn adjacent(self, direction: Direction, labels: &[&str], emits: Emits) -> Self {
        self.push(StepKind::FlatMap(FlatMapStep::Vertex {
            direction,
            edge_labels: owned(labels),
            emits,
        }))
    }

    pub fn out(self, labels: &[&str]) -> Self {
        self.adjacent(Direction::Out, labels, Emits::Vertices)
    }

    pub fn in_(self, labels: &[&str]) -> Self {
        self.adjacent(Direction::In, labels, Emits::Vertices)
    }

    pub fn both(self, labels: &[&str]) -> Self {
        self.adjacent(Direction::Both, labels, Emits::Vertices)
    }

    pub fn out_e(self, labels: &[&str]) -> Self {
        self.adjacent(Direction::Out, labels, Emits::Edges)
    }

    pub fn in_e(self, labels: &[&str]) -> Self {
        self.adjacent(Direction::In, labels, Emits::Edges)
    }

    pub fn both_e(self, labels: &[&str]) -> Self {
        self.adjacent(Direction::Both, labels, Emits::Edges)
    }

    pub fn values(self, keys: &[&str]) -> Self {
        self.push(StepKind::FlatMap(FlatMapStep::Values(owned(keys))))
    }

    pub fn unfold(self) -> Self {
        self.push(StepKind::FlatMap(FlatMapStep::Unfold))
    }

    pub fn coalesce(self, branches: Vec<Traversal>) -> Self {
        self.push(StepKind::FlatMap(FlatMapStep::Coalesce(CoalesceStep::new(branches))))
    }

    pub fn union(self, branches: Vec<Traversal>) -> Self {
        self.push(StepKind::FlatMap(FlatMapStep::Union(branches)))
    }

    fn match_with(mut self, connective: Connective, patterns: Vec<Traversal>) -> Self {
        match MatchStep::new(connective, patterns) {
            Ok(step) => self.push(StepKind::FlatMap(FlatMapStep::Match(Box::new(step)))),
            Err(error) => {
                self.defer(error);
                self
            }
        }
    }

    /// Every pattern must hold.
    pub fn match_all(self, patterns: Vec<Traversal>) -> Self {
        self.match_with(Connective::And, patterns)
    }

    /// Any one pattern must hold.
    pub fn match_any(self, patterns: Vec<Traversal>) -> Self {
        self.match_with(Connective::Or, patterns)
    }

    /// Restricts the preceding match to one result per combination of these labels.
    pub fn match_dedup(mut self, labels: &[&str]) -> Self {
        let locked = self.is_locked();
        let target = match self.steps.last_mut().map(Step::kind_mut) {
            Some(StepKind::FlatMap(FlatMapStep::Match(step))) if !locked => Some(step),
            _ => None,
        };
        match target {
            Some(step) => step.set_dedup_labels(owned(labels)),
            None => {
                let step = self.steps.last().map(Step::name).unwrap_or_default();
                self.defer(TraversalError::InvalidModulator {
                    step,
                    modulator: "dedup",
                });
            }
        }
        self
    }

    pub fn store(self, key: &str) -> Self {
        self.push(StepKind::SideEffect(SideEffectStep::Store(key.to_string())))
    }

    /// Adds the numeric property `key` to each traverser's sack.
    pub fn sack_add(self, key: &str) -> Self {
        self.push(StepKind::SideEffect(SideEffectStep::SackAdd(key.to_string())))
    }

    pub fn count(self) -> Self {
        self.push(StepKind::Barrier(BarrierStep::new(Reducer::Count)))
    }

    pub fn sum(self) -> Self {
        self.push(StepKind::Barrier(BarrierStep::new(Reducer::Sum)))
    }

    pub fn fold(self) -> Self {
        self.push(StepKind::Barrier(BarrierStep::new(Reducer::Fold)))
    }

    pub fn group_count(self) -> Self {
        self.push(StepKind::Barrier(BarrierStep::new(Reducer::GroupCount(By::Identity))))
    }

    pub fn cap(self, key: &str) -> Self {
        self.push(StepKind::Barrier(BarrierStep::new(Reducer::Cap(key.to_string()))))
    }

    pub fn barrier(self) -> Self {
        self.push(StepKind::Barrier(BarrierStep::new(Reducer::NoOp)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traversal::__;

    #[test]
    fn test_as_on_empty_traversal_labels_identity() {
        let t = __::as_("a");
        assert_eq!(t.steps().len(), 1);
        assert!(matches!(
            t.steps()[0].kind(),
            StepKind::Filter(FilterStep::Identity)
        ));
        assert!(t.steps()[0].labels().contains("a"));
    }

    #[test]
    fn test_by_without_target_is_deferred() {
        let t = __::out(&[]).by(By::key("name"));
        assert!(matches!(
            t.deferred_error(),
            Some(TraversalError::InvalidModulator { modulator: "by", .. })
        ));
    }

    #[test]
    fn test_children_know_their_parent() {
        let t = __::out(&[]).coalesce(vec![__::out(&["knows"]), __::identity()]);
        let step = &t.steps()[1];
        for child in step.children() {
            let parent = child.parent().unwrap();
            assert_eq!(parent.traversal, t.traversal_id());
            assert_eq!(parent.step, step.id());
        }
    }

    #[test]
    fn test_match_dedup_requires_preceding_match() {
        let t = __::out(&[]).match_dedup(&["a"]);
        assert!(t.deferred_error().is_some());
    }
}
