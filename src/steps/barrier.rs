// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::TraversalResult;
use crate::steps::{By, StepContext};
use crate::structure::Value;
use crate::traverser::{RequirementSet, Traverser, TraverserRequirement, TraverserSet};
use std::collections::BTreeMap;

/// How a barrier folds its input.
///
/// Every reducer is associative and commutative over traversers, so partial
/// folds may be combined in any order.
#[derive(Debug, Clone, PartialEq)]
pub enum Reducer {
    Count,
    Sum,
    Fold,
    GroupCount(By),
    /// Emits the side effect under this key once upstream is drained.
    Cap(String),
    /// Merges equal traversers by bulk and re-emits them.
    NoOp,
}

#[derive(Debug, Clone)]
enum Accumulator {
    Count(u64),
    Sum(Option<Value>),
    Fold(Vec<Value>),
    Groups(BTreeMap<Value, u64>),
    Cap,
    Merge(TraverserSet),
}

impl Accumulator {
    fn seed(reducer: &Reducer) -> Self {
        match reducer {
            Reducer::Count => Accumulator::Count(0),
            Reducer::Sum => Accumulator::Sum(None),
            Reducer::Fold => Accumulator::Fold(Vec::new()),
            Reducer::GroupCount(_) => Accumulator::Groups(BTreeMap::new()),
            Reducer::Cap(_) => Accumulator::Cap,
            Reducer::NoOp => Accumulator::Merge(TraverserSet::new()),
        }
    }
}

/// Consumes its whole upstream before producing anything.
///
/// Memory grows with the number of distinct inputs for `Fold`, `GroupCount`
/// and `NoOp`; upstream is unbounded from this step's point of view. A
/// bounded `NoOp` barrier is the exception: it flushes every `max_size`
/// inputs, so the pipeline behind it keeps pulling lazily.
#[derive(Debug, Clone)]
pub struct BarrierStep {
    reducer: Reducer,
    acc: Accumulator,
    max_size: Option<usize>,
    drained: bool,
}

impl BarrierStep {
    pub fn new(reducer: Reducer) -> Self {
        let acc = Accumulator::seed(&reducer);
        Self {
            reducer,
            acc,
            max_size: None,
            drained: false,
        }
    }

    /// A merging barrier that flushes after `max_size` inputs.
    pub fn bounded(max_size: usize) -> Self {
        Self {
            max_size: Some(max_size.max(1)),
            ..Self::new(Reducer::NoOp)
        }
    }

    /// Inputs collected before an early flush; `None` drains upstream first.
    pub fn max_size(&self) -> Option<usize> {
        match self.reducer {
            Reducer::NoOp => self.max_size,
            _ => None,
        }
    }

    pub fn reducer(&self) -> &Reducer {
        &self.reducer
    }

    pub fn reducer_mut(&mut self) -> &mut Reducer {
        &mut self.reducer
    }

    pub fn name(&self) -> String {
        match &self.reducer {
            Reducer::Count => "count".into(),
            Reducer::Sum => "sum".into(),
            Reducer::Fold => "fold".into(),
            Reducer::GroupCount(by) => format!("groupCount({:?})", by),
            Reducer::Cap(key) => format!("cap({})", key),
            Reducer::NoOp => match self.max_size {
                Some(max) => format!("barrier({})", max),
                None => "barrier".into(),
            },
        }
    }

    pub fn is_drained(&self) -> bool {
        self.drained
    }

    /// Whether outputs are the inputs themselves rather than a new value.
    pub fn is_pass_through(&self) -> bool {
        matches!(self.reducer, Reducer::NoOp)
    }

    pub fn accumulate(&mut self, traverser: Traverser, ctx: &mut StepContext<'_>) -> TraversalResult<()> {
        let bulk = traverser.bulk();
        match (&mut self.acc, &self.reducer) {
            (Accumulator::Count(n), _) => *n = n.saturating_add(bulk),
            (Accumulator::Sum(total), _) => {
                let term = match traverser.value() {
                    Value::Int(i) => Value::Int(i.saturating_mul(saturating_int(bulk))),
                    Value::Float(f) => Value::float(f.0 * bulk as f64),
                    _ => return Ok(()),
                };
                *total = Some(match total.take() {
                    Some(running) => running.add_numbers(&term).unwrap_or(running),
                    None => term,
                });
            }
            (Accumulator::Fold(items), _) => {
                for _ in 0..bulk {
                    items.push(traverser.value().clone());
                }
            }
            (Accumulator::Groups(groups), Reducer::GroupCount(by)) => {
                let key = by.apply(traverser.value(), ctx)?;
                *groups.entry(key).or_insert(0) += bulk;
            }
            (Accumulator::Merge(set), _) => set.add(traverser),
            _ => {}
        }
        Ok(())
    }

    /// Final outputs once upstream is exhausted.
    pub fn finish(&mut self, ctx: &mut StepContext<'_>) -> TraversalResult<Vec<Traverser>> {
        self.drained = true;
        self.flush(ctx)
    }

    /// Hands out what has been collected so far and starts over.
    pub fn flush(&mut self, ctx: &mut StepContext<'_>) -> TraversalResult<Vec<Traverser>> {
        let acc = std::mem::replace(&mut self.acc, Accumulator::seed(&self.reducer));
        let single = |value: Value| vec![ctx.new_traverser(value, 1)];
        let outputs = match acc {
            Accumulator::Count(n) => single(Value::Int(saturating_int(n))),
            Accumulator::Sum(total) => total.map(|t| single(t)).unwrap_or_default(),
            Accumulator::Fold(items) => single(Value::List(items)),
            Accumulator::Groups(groups) => single(Value::Map(
                groups
                    .into_iter()
                    .map(|(k, n)| (k, Value::Int(saturating_int(n))))
                    .collect(),
            )),
            Accumulator::Cap => {
                let key = match &self.reducer {
                    Reducer::Cap(key) => key.as_str(),
                    _ => "",
                };
                let value = ctx
                    .side_effects
                    .get(key)
                    .cloned()
                    .unwrap_or(Value::List(Vec::new()));
                single(value)
            }
            Accumulator::Merge(set) => set.into_vec(),
        };
        Ok(outputs)
    }

    pub fn requirements(&self) -> RequirementSet {
        match self.reducer {
            Reducer::Cap(_) => [TraverserRequirement::SideEffects].into_iter().collect(),
            _ => [TraverserRequirement::Bulk].into_iter().collect(),
        }
    }

    pub fn reset(&mut self) {
        self.acc = Accumulator::seed(&self.reducer);
        self.drained = false;
    }
}

fn saturating_int(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::InMemoryGraph;
    use crate::traverser::{RequirementSet, SideEffects};

    fn run(reducer: Reducer, inputs: Vec<Traverser>) -> Vec<Traverser> {
        let graph = InMemoryGraph::modern();
        let mut effects = SideEffects::new();
        let reqs = RequirementSet::new();
        let mut ctx = StepContext::new(&graph, &mut effects, &reqs);
        let mut barrier = BarrierStep::new(reducer);
        for t in inputs {
            barrier.accumulate(t, &mut ctx).unwrap();
        }
        barrier.finish(&mut ctx).unwrap()
    }

    #[test]
    fn test_count_sums_bulk() {
        let out = run(
            Reducer::Count,
            vec![
                Traverser::with_bulk(Value::Int(1), 2),
                Traverser::with_bulk(Value::Int(2), 3),
            ],
        );
        assert_eq!(out[0].value(), &Value::Int(5));
    }

    #[test]
    fn test_sum_weights_by_bulk() {
        let out = run(
            Reducer::Sum,
            vec![
                Traverser::with_bulk(Value::Int(10), 2),
                Traverser::new(Value::float(0.5)),
            ],
        );
        assert_eq!(out[0].value(), &Value::float(20.5));
        assert!(run(Reducer::Sum, Vec::new()).is_empty());
    }

    #[test]
    fn test_fold_repeats_by_bulk() {
        let out = run(Reducer::Fold, vec![Traverser::with_bulk(Value::str("a"), 2)]);
        assert_eq!(
            out[0].value(),
            &Value::List(vec![Value::str("a"), Value::str("a")])
        );
    }

    #[test]
    fn test_huge_bulk_saturates_instead_of_wrapping() {
        let out = run(Reducer::Count, vec![Traverser::with_bulk(Value::Int(1), u64::MAX)]);
        assert_eq!(out[0].value(), &Value::Int(i64::MAX));

        let out = run(
            Reducer::GroupCount(By::Identity),
            vec![Traverser::with_bulk(Value::str("a"), u64::MAX)],
        );
        let Value::Map(groups) = out[0].value() else {
            panic!("group_count emits a map");
        };
        assert_eq!(groups.get(&Value::str("a")), Some(&Value::Int(i64::MAX)));

        let out = run(Reducer::Sum, vec![Traverser::with_bulk(Value::Int(2), u64::MAX)]);
        assert_eq!(out[0].value(), &Value::Int(i64::MAX));
    }

    #[test]
    fn test_bounded_barrier_only_applies_to_noop() {
        assert_eq!(BarrierStep::bounded(3).max_size(), Some(3));
        assert_eq!(BarrierStep::bounded(0).max_size(), Some(1));
        assert_eq!(BarrierStep::new(Reducer::NoOp).max_size(), None);
        assert_eq!(BarrierStep::bounded(3).name(), "barrier(3)");
    }

    #[test]
    fn test_noop_barrier_merges() {
        let out = run(
            Reducer::NoOp,
            vec![
                Traverser::new(Value::Int(1)),
                Traverser::new(Value::Int(1)),
                Traverser::new(Value::Int(2)),
            ],
        );
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].bulk(), 2);
    }
}
