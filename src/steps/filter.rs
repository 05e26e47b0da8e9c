// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::TraversalResult;
use crate::steps::{DedupStep, StepContext, WhereStep, P};
use crate::traversal::Traversal;
use crate::traverser::{RequirementSet, Traverser, TraverserRequirement};

/// Keeps the traverser at `[low, high)` of the stream, counting by bulk.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeFilter {
    pub low: u64,
    pub high: Option<u64>,
    seen: u64,
}

impl RangeFilter {
    pub fn new(low: u64, high: Option<u64>) -> Self {
        Self { low, high, seen: 0 }
    }

    /// Trims the traverser's bulk to the part that falls inside the window.
    fn admit(&mut self, traverser: &mut Traverser) -> bool {
        let high = self.high.unwrap_or(u64::MAX);
        if self.seen >= high {
            return false;
        }
        let start = self.seen;
        self.seen = self.seen.saturating_add(traverser.bulk());
        let keep_from = start.max(self.low);
        let keep_to = self.seen.min(high);
        if keep_to <= keep_from {
            return false;
        }
        traverser.set_bulk(keep_to - keep_from);
        true
    }
}

/// Pass or drop, never changing the value.
#[derive(Debug, Clone)]
pub enum FilterStep {
    Identity,
    Has { key: String, predicate: P },
    HasLabel(Vec<String>),
    Is(P),
    Range(RangeFilter),
    Dedup(DedupStep),
    Where(WhereStep),
    /// Passes when the child yields anything for this traverser.
    Traversal(Traversal),
    /// Passes when the child yields nothing for this traverser.
    Not(Traversal),
}

impl FilterStep {
    pub fn name(&self) -> String {
        match self {
            FilterStep::Identity => "identity".into(),
            FilterStep::Has { key, predicate } => format!("has({},{:?})", key, predicate),
            FilterStep::HasLabel(labels) => format!("hasLabel({})", labels.join(",")),
            FilterStep::Is(predicate) => format!("is({:?})", predicate),
            FilterStep::Range(r) => match r.high {
                Some(high) => format!("range({},{})", r.low, high),
                None => format!("range({},-1)", r.low),
            },
            FilterStep::Dedup(d) => d.name(),
            FilterStep::Where(w) => w.name(),
            FilterStep::Traversal(_) => "filter(traversal)".into(),
            FilterStep::Not(_) => "not(traversal)".into(),
        }
    }

    pub fn test(&mut self, traverser: &mut Traverser, ctx: &mut StepContext<'_>) -> TraversalResult<bool> {
        match self {
            FilterStep::Identity => Ok(true),
            FilterStep::Has { key, predicate } => {
                let Some(element) = traverser.value().as_element() else {
                    return Ok(false);
                };
                let props = ctx.graph.properties(&element, std::slice::from_ref(key))?;
                Ok(props.iter().any(|(_, value)| predicate.test(value)))
            }
            FilterStep::HasLabel(labels) => Ok(ctx
                .label_of(traverser.value())?
                .is_some_and(|label| labels.contains(&label))),
            FilterStep::Is(predicate) => Ok(predicate.test(traverser.value())),
            FilterStep::Range(range) => Ok(range.admit(traverser)),
            FilterStep::Dedup(dedup) => dedup.test(traverser, ctx),
            FilterStep::Where(where_step) => where_step.test(traverser, ctx),
            FilterStep::Traversal(child) => {
                child.reset();
                child.add_start(traverser.clone());
                child.has_next_in(ctx)
            }
            FilterStep::Not(child) => {
                child.reset();
                child.add_start(traverser.clone());
                Ok(!child.has_next_in(ctx)?)
            }
        }
    }

    pub fn requirements(&self) -> RequirementSet {
        match self {
            FilterStep::Range(_) => [TraverserRequirement::Bulk].into_iter().collect(),
            FilterStep::Dedup(d) => d.requirements(),
            FilterStep::Where(w) => w.requirements(),
            _ => RequirementSet::new(),
        }
    }

    pub fn children(&self) -> Vec<&Traversal> {
        match self {
            FilterStep::Where(w) => w.child().into_iter().collect(),
            FilterStep::Traversal(child) | FilterStep::Not(child) => vec![child],
            _ => Vec::new(),
        }
    }

    pub fn children_mut(&mut self) -> Vec<&mut Traversal> {
        match self {
            FilterStep::Where(w) => w.child_mut().into_iter().collect(),
            FilterStep::Traversal(child) | FilterStep::Not(child) => vec![child],
            _ => Vec::new(),
        }
    }

    pub fn requires_global_view(&self) -> bool {
        matches!(self, FilterStep::Dedup(_) | FilterStep::Range(_))
    }

    pub fn reset(&mut self) {
        match self {
            FilterStep::Range(range) => range.seen = 0,
            FilterStep::Dedup(dedup) => dedup.reset(),
            FilterStep::Where(where_step) => where_step.reset(),
            FilterStep::Traversal(child) | FilterStep::Not(child) => child.reset(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::Value;

    #[test]
    fn test_range_trims_bulk_to_window() {
        let mut range = RangeFilter::new(2, Some(5));
        let mut first = Traverser::with_bulk(Value::Int(1), 3);
        assert!(range.admit(&mut first));
        assert_eq!(first.bulk(), 1);

        let mut second = Traverser::with_bulk(Value::Int(2), 4);
        assert!(range.admit(&mut second));
        assert_eq!(second.bulk(), 2);

        let mut third = Traverser::new(Value::Int(3));
        assert!(!range.admit(&mut third));
    }

    #[test]
    fn test_range_below_low_drops() {
        let mut range = RangeFilter::new(2, None);
        let mut t = Traverser::new(Value::Int(1));
        assert!(!range.admit(&mut t));
        let mut t = Traverser::new(Value::Int(1));
        assert!(!range.admit(&mut t));
        let mut t = Traverser::with_bulk(Value::Int(1), 7);
        assert!(range.admit(&mut t));
        assert_eq!(t.bulk(), 7);
    }
}
