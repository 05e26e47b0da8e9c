// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::Engine;
use crate::errors::TraversalResult;
use crate::strategy::StrategyCategory;
use crate::traversal::Traversal;

/// A rewrite rule run once over a traversal before it executes.
///
/// `applies_before`/`applies_after` name other strategies by id; ids that are
/// not registered alongside this one are ignored when sorting.
pub trait TraversalStrategy: Send + Sync {
    fn id(&self) -> &'static str;

    fn category(&self) -> StrategyCategory;

    fn applies_before(&self) -> &[&'static str] {
        &[]
    }

    fn applies_after(&self) -> &[&'static str] {
        &[]
    }

    /// Run on every child traversal before the traversal that holds them,
    /// instead of after.
    fn applies_to_children_first(&self) -> bool {
        false
    }

    fn apply(&self, traversal: &mut Traversal, engine: Engine) -> TraversalResult<()>;
}
