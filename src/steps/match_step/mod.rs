// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pattern matching over child traversals joined on shared labels.
//!
//! Each pattern starts from a bound label and either binds or checks its end
//! label. A traverser works through the patterns one at a time; completed
//! patterns are remembered as tags of the form `~{step}.{pattern}` so they are
//! never retried, and are cleared again when the traverser leaves the step.

mod algorithm;

pub use algorithm::{CountMatchAlgorithm, MatchAlgorithm, MatchAlgorithmKind};

use crate::errors::{TraversalError, TraversalResult};
use crate::steps::{StepContext, StepId};
use crate::structure::Value;
use crate::traversal::Traversal;
use crate::traverser::{RequirementSet, Traverser, TraverserRequirement};
use std::collections::{BTreeMap, BTreeSet, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    /// Every pattern must hold.
    And,
    /// At least one pattern must hold.
    Or,
}

#[derive(Debug, Clone)]
pub struct MatchPattern {
    pub start: String,
    /// Without an end label the pattern only filters.
    pub end: Option<String>,
    pub traversal: Traversal,
}

impl MatchPattern {
    pub fn new(mut traversal: Traversal) -> TraversalResult<Self> {
        let (start, end) = traversal.take_pattern_ends();
        let Some(start) = start else {
            return Err(TraversalError::IllegalPattern {
                step: "match".into(),
                reason: format!("pattern {} does not start with a label", traversal),
            });
        };
        Ok(Self {
            start,
            end,
            traversal,
        })
    }
}

#[derive(Debug, Clone)]
pub struct MatchStep {
    connective: Connective,
    patterns: Vec<MatchPattern>,
    start_label: String,
    dedup_labels: Vec<String>,
    dedup_seen: HashSet<Value>,
    algorithm: MatchAlgorithm,
}

impl MatchStep {
    pub fn new(connective: Connective, traversals: Vec<Traversal>) -> TraversalResult<Self> {
        let patterns = traversals
            .into_iter()
            .map(MatchPattern::new)
            .collect::<TraversalResult<Vec<_>>>()?;
        let Some(first) = patterns.first() else {
            return Err(TraversalError::IllegalPattern {
                step: "match".into(),
                reason: "at least one pattern is required".into(),
            });
        };
        let start_label = first.start.clone();
        let algorithm = MatchAlgorithmKind::default().build(patterns.len());
        Ok(Self {
            connective,
            patterns,
            start_label,
            dedup_labels: Vec::new(),
            dedup_seen: HashSet::new(),
            algorithm,
        })
    }

    pub fn connective(&self) -> Connective {
        self.connective
    }

    pub fn patterns(&self) -> &[MatchPattern] {
        &self.patterns
    }

    pub fn patterns_mut(&mut self) -> &mut [MatchPattern] {
        &mut self.patterns
    }

    pub fn start_label(&self) -> &str {
        &self.start_label
    }

    pub fn dedup_labels(&self) -> &[String] {
        &self.dedup_labels
    }

    /// Keeps only the first result for each combination of these labels' values.
    pub fn set_dedup_labels(&mut self, labels: Vec<String>) {
        self.dedup_labels = labels;
    }

    pub fn algorithm(&self) -> &MatchAlgorithm {
        &self.algorithm
    }

    pub fn set_algorithm(&mut self, kind: MatchAlgorithmKind) {
        self.algorithm = kind.build(self.patterns.len());
    }

    /// Every start and end label across the patterns.
    pub fn match_labels(&self) -> BTreeSet<String> {
        self.patterns
            .iter()
            .flat_map(|p| std::iter::once(p.start.clone()).chain(p.end.clone()))
            .collect()
    }

    pub fn name(&self) -> String {
        let connective = match self.connective {
            Connective::And => "and",
            Connective::Or => "or",
        };
        let patterns: Vec<String> = self
            .patterns
            .iter()
            .map(|p| format!("{}->{}", p.start, p.end.as_deref().unwrap_or("_")))
            .collect();
        format!("match({})[{}]", connective, patterns.join(", "))
    }

    pub fn requirements(&self) -> RequirementSet {
        [TraverserRequirement::LabeledPath].into_iter().collect()
    }

    pub fn reset(&mut self) {
        self.dedup_seen.clear();
        for pattern in self.patterns.iter_mut() {
            pattern.traversal.reset();
        }
    }

    /// Runs a traverser through as many patterns as it can complete here.
    ///
    /// Under the computer engine a pattern whose start value lives on another
    /// vertex is not run; the traverser is handed back addressed to this step
    /// with the pattern recorded, and resumes when it arrives there.
    pub fn expand(
        &mut self,
        step: StepId,
        mut traverser: Traverser,
        ctx: &mut StepContext<'_>,
    ) -> TraversalResult<Vec<Traverser>> {
        let tag_prefix = format!("~{}.", step);
        if traverser.branch().is_none() && traverser.labeled(&self.start_label).is_none() {
            let value = traverser.value().clone();
            traverser.bind(&self.start_label, value);
        }

        let mut outputs = Vec::new();
        let mut stack = vec![traverser];
        while let Some(mut current) = stack.pop() {
            if let Some(pattern) = current.branch() {
                current.set_branch(None);
                current.set_step_id(None);
                self.run_pattern(pattern, current, &tag_prefix, ctx, &mut stack)?;
                continue;
            }

            let completed: Vec<bool> = (0..self.patterns.len())
                .map(|i| current.tags().contains(&format!("{}{}", tag_prefix, i)))
                .collect();
            let done = match self.connective {
                Connective::And => completed.iter().all(|c| *c),
                Connective::Or => completed.iter().any(|c| *c),
            };
            if done {
                if let Some(result) = self.finish(current, &tag_prefix) {
                    outputs.push(result);
                }
                continue;
            }

            let eligible: Vec<usize> = (0..self.patterns.len())
                .filter(|i| !completed[*i] && current.labeled(&self.patterns[*i].start).is_some())
                .collect();
            if eligible.is_empty() {
                let bound: Vec<String> = current
                    .path()
                    .map(|p| p.labels().into_iter().map(str::to_string).collect())
                    .unwrap_or_default();
                return Err(TraversalError::IllegalPattern {
                    step: self.name(),
                    reason: format!("no remaining pattern starts from a bound label ({})", bound.join(",")),
                });
            }
            let chosen: Vec<usize> = match self.connective {
                Connective::And => self.algorithm.choose(&eligible).into_iter().collect(),
                Connective::Or => eligible,
            };

            for pattern in chosen {
                let seed = current
                    .labeled(&self.patterns[pattern].start)
                    .cloned()
                    .unwrap_or(Value::Null);
                if !ctx.is_local(&seed) {
                    let mut hop = current.split(seed);
                    hop.set_step_id(Some(step));
                    hop.set_branch(Some(pattern));
                    outputs.push(hop);
                    continue;
                }
                self.run_pattern(pattern, current.clone(), &tag_prefix, ctx, &mut stack)?;
            }
        }
        Ok(outputs)
    }

    fn run_pattern(
        &mut self,
        index: usize,
        current: Traverser,
        tag_prefix: &str,
        ctx: &mut StepContext<'_>,
        stack: &mut Vec<Traverser>,
    ) -> TraversalResult<()> {
        let Some(pattern) = self.patterns.get_mut(index) else {
            return Err(TraversalError::IllegalPattern {
                step: "match".into(),
                reason: format!("traverser resumed into unknown pattern {}", index),
            });
        };
        let Some(seed) = current.labeled(&pattern.start).cloned() else {
            return Err(TraversalError::IllegalPattern {
                step: "match".into(),
                reason: format!("label {} is not bound", pattern.start),
            });
        };
        let tag = format!("{}{}", tag_prefix, index);
        self.algorithm.record_start(index, current.bulk());

        pattern.traversal.reset();
        pattern.traversal.add_start(current.split(seed));
        let results = pattern.traversal.drain_in(ctx)?;

        let mut produced = 0u64;
        match &pattern.end {
            None => {
                if !results.is_empty() {
                    produced = current.bulk();
                    let mut next = current;
                    next.tag(tag);
                    stack.push(next);
                }
            }
            Some(end) => {
                let bound = current.labeled(end).cloned();
                for out in results {
                    if bound.as_ref().is_some_and(|expected| out.value() != expected) {
                        continue;
                    }
                    let mut next = current.clone();
                    next.set_bulk(out.bulk());
                    next.set_value(out.value().clone());
                    if bound.is_none() {
                        next.bind(end, out.value().clone());
                    }
                    next.tag(tag.clone());
                    produced += out.bulk();
                    stack.push(next);
                }
            }
        }
        self.algorithm.record_end(index, produced);
        Ok(())
    }

    fn finish(&mut self, mut traverser: Traverser, tag_prefix: &str) -> Option<Traverser> {
        traverser.untag_prefixed(tag_prefix);
        if !self.dedup_labels.is_empty() {
            let key = Value::List(
                self.dedup_labels
                    .iter()
                    .map(|l| traverser.labeled(l).cloned().unwrap_or(Value::Null))
                    .collect(),
            );
            if !self.dedup_seen.insert(key) {
                return None;
            }
            traverser.set_bulk(1);
        }
        let bindings: BTreeMap<Value, Value> = self
            .match_labels()
            .into_iter()
            .filter_map(|label| {
                let value = traverser.labeled(&label).cloned()?;
                Some((Value::str(label), value))
            })
            .collect();
        traverser.set_value(Value::Map(bindings));
        Some(traverser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traversal::__;

    #[test]
    fn test_pattern_requires_start_label() {
        let result = MatchStep::new(Connective::And, vec![__::out(&["knows"])]);
        assert!(matches!(result, Err(TraversalError::IllegalPattern { .. })));
    }

    #[test]
    fn test_empty_match_is_illegal() {
        let result = MatchStep::new(Connective::Or, Vec::new());
        assert!(matches!(result, Err(TraversalError::IllegalPattern { .. })));
    }

    #[test]
    fn test_pattern_ends_are_taken_from_labels() {
        let step = MatchStep::new(
            Connective::And,
            vec![
                __::as_("a").out(&["knows"]).as_("b"),
                __::as_("b").has_label(&["person"]),
            ],
        )
        .unwrap();
        let patterns = step.patterns();
        assert_eq!(patterns[0].start, "a");
        assert_eq!(patterns[0].end.as_deref(), Some("b"));
        assert_eq!(patterns[1].start, "b");
        assert_eq!(patterns[1].end, None);
        assert_eq!(step.start_label(), "a");
        let labels: Vec<String> = step.match_labels().into_iter().collect();
        assert_eq!(labels, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_set_algorithm_rebuilds_for_pattern_count() {
        let mut step = MatchStep::new(Connective::And, vec![__::as_("a").out(&[]).as_("b")]).unwrap();
        step.set_algorithm(MatchAlgorithmKind::Greedy);
        assert_eq!(step.algorithm().kind(), MatchAlgorithmKind::Greedy);
    }
}
