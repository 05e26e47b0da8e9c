// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for strategy ordering and application.

use crate::observability::messages::StructuredLog;
use crate::traversal::TraversalId;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// A strategy set was ordered.
///
/// # Log Level
/// `debug!` - Happens when sets are built or changed
pub struct StrategiesSorted<'a> {
    pub order: &'a [&'a str],
}

impl Display for StrategiesSorted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Strategy order: [{}]", self.order.join(", "))
    }
}

impl StructuredLog for StrategiesSorted<'_> {
    fn log(&self) {
        tracing::debug!(count = self.order.len(), "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("strategy_sort", span_name = name, count = self.order.len())
    }
}

/// Ordering hints form a cycle.
///
/// # Log Level
/// `error!` - The strategy set is unusable
pub struct CyclicDependencyDetected<'a> {
    pub first: &'a str,
    pub second: &'a str,
    pub cycle: &'a [&'a str],
}

impl Display for CyclicDependencyDetected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Cyclic strategy dependency between '{}' and '{}': {}",
            self.first,
            self.second,
            self.cycle.join(" -> ")
        )
    }
}

impl StructuredLog for CyclicDependencyDetected<'_> {
    fn log(&self) {
        tracing::error!(first = self.first, second = self.second, "{}", self);
    }

    fn span(&self, name: &str) -> Span {
        tracing::error_span!(
            "strategy_cycle",
            span_name = name,
            first = self.first,
            second = self.second,
        )
    }
}

/// One strategy rewrote (or inspected) a traversal.
///
/// # Log Level
/// `trace!` - Per strategy, per traversal
pub struct StrategyApplied<'a> {
    pub strategy: &'a str,
    pub traversal: &'a TraversalId,
    pub steps: usize,
}

impl Display for StrategyApplied<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Applied strategy '{}' to {}: {} steps",
            self.strategy, self.traversal, self.steps
        )
    }
}

impl StructuredLog for StrategyApplied<'_> {
    fn log(&self) {
        tracing::trace!(
            strategy = self.strategy,
            traversal = %self.traversal,
            steps = self.steps,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!(
            "strategy",
            span_name = name,
            strategy = self.strategy,
            traversal = %self.traversal,
        )
    }
}
