// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for traversal compilation and execution events.

use crate::errors::TraversalError;
use crate::observability::messages::StructuredLog;
use crate::traversal::TraversalId;
use crate::traverser::RequirementSet;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Strategies were applied and the traversal can no longer change shape.
///
/// # Log Level
/// `debug!` - Happens once per traversal
pub struct TraversalLocked<'a> {
    pub traversal: &'a TraversalId,
    pub engine: &'static str,
    pub steps: usize,
    pub requirements: &'a RequirementSet,
}

impl Display for TraversalLocked<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Traversal {} locked for the {} engine: {} steps, requirements {}",
            self.traversal, self.engine, self.steps, self.requirements
        )
    }
}

impl StructuredLog for TraversalLocked<'_> {
    fn log(&self) {
        tracing::debug!(
            traversal = %self.traversal,
            engine = self.engine,
            steps = self.steps,
            requirements = %self.requirements,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "traversal",
            span_name = name,
            traversal = %self.traversal,
            engine = self.engine,
        )
    }
}

/// A fluent builder call failed; the error surfaces on first iteration.
///
/// # Log Level
/// `warn!` - Caller built an invalid traversal
pub struct DeferredBuildError<'a> {
    pub traversal: &'a TraversalId,
    pub error: &'a TraversalError,
}

impl Display for DeferredBuildError<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Traversal {} recorded a build error: {}",
            self.traversal, self.error
        )
    }
}

impl StructuredLog for DeferredBuildError<'_> {
    fn log(&self) {
        tracing::warn!(
            traversal = %self.traversal,
            error = %self.error,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "traversal_build",
            span_name = name,
            traversal = %self.traversal,
        )
    }
}

/// A structural change was attempted after strategies locked the traversal.
///
/// # Log Level
/// `warn!` - Caller bug
pub struct LockedMutationRejected<'a> {
    pub traversal: &'a TraversalId,
    pub operation: &'static str,
    pub step: &'a str,
}

impl Display for LockedMutationRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Rejected {} of step '{}' on locked traversal {}",
            self.operation, self.step, self.traversal
        )
    }
}

impl StructuredLog for LockedMutationRejected<'_> {
    fn log(&self) {
        tracing::warn!(
            traversal = %self.traversal,
            operation = self.operation,
            step = self.step,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "traversal_mutation",
            span_name = name,
            traversal = %self.traversal,
            operation = self.operation,
        )
    }
}

/// A barrier consumed its whole input.
///
/// # Log Level
/// `trace!` - Per barrier, per execution
pub struct BarrierDrained<'a> {
    pub step: &'a str,
    pub inputs: usize,
    pub outputs: usize,
}

impl Display for BarrierDrained<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Barrier '{}' drained {} traversers into {}",
            self.step, self.inputs, self.outputs
        )
    }
}

impl StructuredLog for BarrierDrained<'_> {
    fn log(&self) {
        tracing::trace!(
            step = self.step,
            inputs = self.inputs,
            outputs = self.outputs,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::trace_span!("barrier", span_name = name, step = self.step)
    }
}
