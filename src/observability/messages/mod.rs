// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for structured logging.
//!
//! # Usage Pattern
//!
//! ```rust
//! use the_wayfarer::observability::messages::computer::ComputationConverged;
//! use the_wayfarer::observability::messages::StructuredLog;
//!
//! ComputationConverged { iterations: 3 }.log();
//! ```

pub mod computer;
pub mod config;
pub mod strategy;
pub mod traversal;

use tracing::Span;

/// A log event that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emits the event at its level.
    fn log(&self);

    /// A span carrying the same fields, for work attributed to the event.
    fn span(&self, name: &str) -> Span;
}
