// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::Engine;
use crate::errors::{TraversalError, TraversalResult};
use crate::steps::{FilterStep, FlatMapStep, SideEffectStep, StartSource, StepKind};
use crate::strategy::StrategyCategory;
use crate::traits::TraversalStrategy;
use crate::traversal::Traversal;

/// Rejects steps the computer engine cannot run. No-op for other engines.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComputerVerificationStrategy;

impl ComputerVerificationStrategy {
    pub const ID: &'static str = "computer_verification";
}

fn unsupported(kind: &StepKind) -> Option<&'static str> {
    match kind {
        StepKind::Filter(FilterStep::Range(_)) => {
            Some("ranges depend on a global order of traversers")
        }
        StepKind::SideEffect(SideEffectStep::Store(_)) => {
            Some("side-effect lists cannot be shared across workers")
        }
        StepKind::Start(start) if matches!(start.source(), StartSource::Inject(_)) => {
            Some("injected values have no home vertex")
        }
        StepKind::FlatMap(FlatMapStep::Match(m)) if !m.dedup_labels().is_empty() => {
            Some("match deduplication needs every result in one place")
        }
        _ => None,
    }
}

impl TraversalStrategy for ComputerVerificationStrategy {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn category(&self) -> StrategyCategory {
        StrategyCategory::Verification
    }

    fn apply(&self, traversal: &mut Traversal, engine: Engine) -> TraversalResult<()> {
        if engine != Engine::Computer {
            return Ok(());
        }
        for step in traversal.steps() {
            if let Some(reason) = unsupported(step.kind()) {
                return Err(TraversalError::ComputerUnsupported {
                    step: step.name(),
                    reason: reason.into(),
                });
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
    fn test_rejections_under_computer() {
        let cases = vec![
            __::out(&[]).limit(2),
            __::out(&[]).store("x"),
            __::inject(vec![1.into()]),
            __::out(&[])
                .match_all(vec![__::as_("a").out(&[]).as_("b")])
                .match_dedup(&["a"]),
        ];
        for mut t in cases {
            let result = ComputerVerificationStrategy.apply(&mut t, Engine::Computer);
            assert!(
                matches!(result, Err(TraversalError::ComputerUnsupported { .. })),
                "{} should be rejected",
                t
            );
        }
    }

    #[test]
    fn test_standard_engine_is_untouched() {
        let mut t = __::out(&[]).limit(2);
        assert!(ComputerVerificationStrategy.apply(&mut t, Engine::Standard).is_ok());
    }
}
