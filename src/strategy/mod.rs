// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Traversal rewrite strategies: ordering, application and per-start defaults.

mod registry;
mod sorter;
pub mod strategies;
mod traversal_strategies;

pub use crate::traits::TraversalStrategy;
pub use registry::{StartContext, StrategyRegistry};
pub use sorter::sort_strategies;
pub use traversal_strategies::TraversalStrategies;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad phase a strategy belongs to. Declaration order is application order
/// wherever ordering hints leave strategies free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyCategory {
    Decoration,
    Optimization,
    Finalization,
    Verification,
}

impl fmt::Display for StrategyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyCategory::Decoration => "decoration",
            StrategyCategory::Optimization => "optimization",
            StrategyCategory::Finalization => "finalization",
            StrategyCategory::Verification => "verification",
        };
        write!(f, "{}", name)
    }
}
