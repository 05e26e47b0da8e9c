// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pipeline steps.
//!
//! A [`Step`] pairs an identity and its labels with a [`StepKind`] that says
//! which role it plays. Steps are pulled from downstream: each pull walks the
//! upstream half of the pipeline through [`Upstream`].

mod barrier;
mod coalesce;
mod context;
mod dedup;
mod filter;
mod flat_map;
mod map;
mod match_step;
mod predicate;
mod side_effect;
mod start;
mod step;
mod where_step;

pub use barrier::{BarrierStep, Reducer};
pub use coalesce::CoalesceStep;
pub use context::{StepContext, Upstream};
pub use dedup::DedupStep;
pub use filter::{FilterStep, RangeFilter};
pub use flat_map::{Emits, FlatMapStep};
pub use map::MapStep;
pub use match_step::{
    Connective, CountMatchAlgorithm, MatchAlgorithm, MatchAlgorithmKind, MatchPattern, MatchStep,
};
pub use predicate::{By, CompareOp, P};
pub use side_effect::SideEffectStep;
pub use start::{StartSource, StartStep};
pub use step::{Step, StepId, StepKind, StepRole};
pub use where_step::{WherePredicate, WhereStep};

/// Path labels a step reads from traversers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scoping {
    keys: Vec<String>,
}

impl Scoping {
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
