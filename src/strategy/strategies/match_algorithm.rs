// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::Engine;
use crate::errors::TraversalResult;
use crate::steps::{FlatMapStep, MatchAlgorithmKind, StepKind};
use crate::strategy::StrategyCategory;
use crate::traits::TraversalStrategy;
use crate::traversal::Traversal;

/// Installs the configured pattern-ordering algorithm on every match step.
#[derive(Debug, Clone, Copy)]
pub struct MatchAlgorithmStrategy {
    kind: MatchAlgorithmKind,
}

impl MatchAlgorithmStrategy {
    pub const ID: &'static str = "match_algorithm";

    pub fn new(kind: MatchAlgorithmKind) -> Self {
        Self { kind }
    }
}

impl TraversalStrategy for MatchAlgorithmStrategy {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn category(&self) -> StrategyCategory {
        StrategyCategory::Decoration
    }

    fn apply(&self, traversal: &mut Traversal, _engine: Engine) -> TraversalResult<()> {
        for step in traversal.steps_mut()? {
            if let StepKind::FlatMap(FlatMapStep::Match(match_step)) = step.kind_mut() {
                match_step.set_algorithm(self.kind);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traversal::__;

    #[test]
    fn test_sets_algorithm_on_match_steps() {
        let mut t = __::out(&[]).match_all(vec![__::as_("a").out(&[]).as_("b")]);
        MatchAlgorithmStrategy::new(MatchAlgorithmKind::Greedy)
            .apply(&mut t, Engine::Standard)
            .unwrap();
        let StepKind::FlatMap(FlatMapStep::Match(m)) = t.steps()[1].kind() else {
            panic!("expected match step");
        };
        assert_eq!(m.algorithm().kind(), MatchAlgorithmKind::Greedy);
    }
}
