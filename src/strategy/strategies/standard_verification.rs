// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::RESERVED_LABEL_PREFIX;
use crate::engine::Engine;
use crate::errors::{TraversalError, TraversalResult};
use crate::steps::{FlatMapStep, StepKind};
use crate::strategy::StrategyCategory;
use crate::traits::TraversalStrategy;
use crate::traversal::Traversal;

/// Rejects user labels in the namespace the engine keeps for itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardVerificationStrategy;

impl StandardVerificationStrategy {
    pub const ID: &'static str = "standard_verification";
}

fn check(label: &str) -> TraversalResult<()> {
    if label.starts_with(RESERVED_LABEL_PREFIX) {
        return Err(TraversalError::ReservedLabel {
            label: label.to_string(),
        });
    }
    Ok(())
}

impl TraversalStrategy for StandardVerificationStrategy {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn category(&self) -> StrategyCategory {
        StrategyCategory::Verification
    }

    fn apply(&self, traversal: &mut Traversal, _engine: Engine) -> TraversalResult<()> {
        for step in traversal.steps() {
            for label in step.labels() {
                check(label)?;
            }
            if let StepKind::FlatMap(FlatMapStep::Match(match_step)) = step.kind() {
                for label in match_step.match_labels() {
                    check(&label)?;
                }
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
    fn test_reserved_prefix_is_rejected() {
        let mut t = __::out(&[]).as_("~hidden");
        let err = StandardVerificationStrategy
            .apply(&mut t, Engine::Standard)
            .unwrap_err();
        assert_eq!(
            err,
            TraversalError::ReservedLabel {
                label: "~hidden".into()
            }
        );
    }

    #[test]
    fn test_match_labels_are_checked() {
        let mut t = __::out(&[]).match_all(vec![__::as_("a").out(&[]).as_("~b")]);
        assert!(StandardVerificationStrategy
            .apply(&mut t, Engine::Standard)
            .is_err());
        let mut ok = __::out(&[]).as_("a");
        assert!(StandardVerificationStrategy.apply(&mut ok, Engine::Standard).is_ok());
    }
}
