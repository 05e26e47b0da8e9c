// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::TraversalResult;
use crate::steps::{CompareOp, Scoping, StepContext};
use crate::structure::Value;
use crate::traversal::Traversal;
use crate::traverser::{RequirementSet, Traverser, TraverserRequirement};
use std::collections::BTreeMap;

/// A predicate tree over path labels.
///
/// `left: None` compares the traverser's current value.
#[derive(Debug, Clone, PartialEq)]
pub enum WherePredicate {
    Compare {
        left: Option<String>,
        op: CompareOp,
        right: String,
    },
    And(Vec<WherePredicate>),
    Or(Vec<WherePredicate>),
    Not(Box<WherePredicate>),
}

impl WherePredicate {
    /// `where(op(right))`: current value against a label.
    pub fn current(op: CompareOp, right: impl Into<String>) -> Self {
        WherePredicate::Compare {
            left: None,
            op,
            right: right.into(),
        }
    }

    /// `where(left, op(right))`: one label against another.
    pub fn labels(left: impl Into<String>, op: CompareOp, right: impl Into<String>) -> Self {
        WherePredicate::Compare {
            left: Some(left.into()),
            op,
            right: right.into(),
        }
    }

    fn collect_labels(&self, into: &mut Vec<String>) {
        match self {
            WherePredicate::Compare { left, right, .. } => {
                into.extend(left.iter().cloned());
                into.push(right.clone());
            }
            WherePredicate::And(children) | WherePredicate::Or(children) => {
                children.iter().for_each(|c| c.collect_labels(into))
            }
            WherePredicate::Not(inner) => inner.collect_labels(into),
        }
    }

    fn evaluate(&self, current: &Value, bound: &BTreeMap<&str, &Value>) -> bool {
        match self {
            WherePredicate::Compare { left, op, right } => {
                let left = match left {
                    Some(label) => bound.get(label.as_str()).copied(),
                    None => Some(current),
                };
                match (left, bound.get(right.as_str())) {
                    (Some(l), Some(r)) => op.test(l, r),
                    _ => false,
                }
            }
            WherePredicate::And(children) => children.iter().all(|c| c.evaluate(current, bound)),
            WherePredicate::Or(children) => children.iter().any(|c| c.evaluate(current, bound)),
            WherePredicate::Not(inner) => !inner.evaluate(current, bound),
        }
    }
}

/// Filter scoped to path labels, in either predicate or nested-traversal form.
#[derive(Debug, Clone)]
pub enum WhereStep {
    Predicate {
        predicate: WherePredicate,
        scoping: Scoping,
    },
    Traversal {
        start: Option<String>,
        end: Option<String>,
        child: Traversal,
    },
}

impl WhereStep {
    pub fn predicate(predicate: WherePredicate) -> Self {
        let mut labels = Vec::new();
        predicate.collect_labels(&mut labels);
        labels.sort();
        labels.dedup();
        WhereStep::Predicate {
            predicate,
            scoping: Scoping::new(labels),
        }
    }

    /// The child's leading `as_` label picks the seed value and its trailing
    /// label names the binding its output must equal. Both are removed from
    /// the child so they are not stamped twice.
    pub fn traversal(mut child: Traversal) -> Self {
        let (start, end) = child.take_pattern_ends();
        WhereStep::Traversal { start, end, child }
    }

    pub fn name(&self) -> String {
        match self {
            WhereStep::Predicate { scoping, .. } => format!("where({})", scoping.keys().join(",")),
            WhereStep::Traversal { start, end, .. } => format!(
                "where({}->{})",
                start.as_deref().unwrap_or("_"),
                end.as_deref().unwrap_or("_")
            ),
        }
    }

    pub fn child(&self) -> Option<&Traversal> {
        match self {
            WhereStep::Traversal { child, .. } => Some(child),
            WhereStep::Predicate { .. } => None,
        }
    }

    pub fn child_mut(&mut self) -> Option<&mut Traversal> {
        match self {
            WhereStep::Traversal { child, .. } => Some(child),
            WhereStep::Predicate { .. } => None,
        }
    }

    pub fn test(&mut self, traverser: &mut Traverser, ctx: &mut StepContext<'_>) -> TraversalResult<bool> {
        match self {
            WhereStep::Predicate { predicate, scoping } => {
                let mut bound = BTreeMap::new();
                for label in scoping.keys() {
                    match traverser.labeled(label) {
                        Some(value) => bound.insert(label.as_str(), value),
                        None => return Ok(false),
                    };
                }
                Ok(predicate.evaluate(traverser.value(), &bound))
            }
            WhereStep::Traversal { start, end, child } => {
                let seed_value = match start {
                    Some(label) => match traverser.labeled(label) {
                        Some(value) => value.clone(),
                        None => return Ok(false),
                    },
                    None => traverser.value().clone(),
                };
                let expected = match end {
                    Some(label) => match traverser.labeled(label) {
                        Some(value) => Some(value.clone()),
                        None => return Ok(false),
                    },
                    None => None,
                };

                child.reset();
                child.add_start(traverser.split(seed_value));
                match expected {
                    None => child.has_next_in(ctx),
                    Some(expected) => {
                        while let Some(out) = child.next_in(ctx)? {
                            if out.value() == &expected {
                                return Ok(true);
                            }
                        }
                        Ok(false)
                    }
                }
            }
        }
    }

    pub fn requirements(&self) -> RequirementSet {
        [TraverserRequirement::LabeledPath].into_iter().collect()
    }

    pub fn reset(&mut self) {
        if let WhereStep::Traversal { child, .. } = self {
            child.reset();
        }
    }
}
