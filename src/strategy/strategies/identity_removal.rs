// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::Engine;
use crate::errors::TraversalResult;
use crate::steps::{FilterStep, StepKind};
use crate::strategy::strategies::IncidentToAdjacentStrategy;
use crate::strategy::StrategyCategory;
use crate::traits::TraversalStrategy;
use crate::traversal::Traversal;

/// Drops identity steps. Labels on a dropped identity move to the step before
/// it; a labeled identity at the head stays, since it names the incoming value.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityRemovalStrategy;

impl IdentityRemovalStrategy {
    pub const ID: &'static str = "identity_removal";
}

impl TraversalStrategy for IdentityRemovalStrategy {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn category(&self) -> StrategyCategory {
        StrategyCategory::Optimization
    }

    fn applies_before(&self) -> &[&'static str] {
        &[IncidentToAdjacentStrategy::ID]
    }

    fn apply(&self, traversal: &mut Traversal, _engine: Engine) -> TraversalResult<()> {
        let mut index = 0;
        while index < traversal.steps().len() {
            let step = &traversal.steps()[index];
            if !matches!(step.kind(), StepKind::Filter(FilterStep::Identity)) {
                index += 1;
                continue;
            }
            if step.labels().is_empty() {
                traversal.remove_step(index)?;
                continue;
            }
            if index == 0 {
                index += 1;
                continue;
            }
            let mut removed = traversal.remove_step(index)?;
            let previous = &mut traversal.steps_mut()?[index - 1];
            for label in removed.take_labels() {
                previous.add_label(label);
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
    fn test_unlabeled_identities_are_removed() {
        let mut t = __::out(&[]).identity().out(&[]).identity();
        IdentityRemovalStrategy.apply(&mut t, Engine::Standard).unwrap();
        let names: Vec<String> = t.steps().iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["out()", "out()"]);
    }

    #[test]
    fn test_labels_move_to_previous_step() {
        let mut t = __::out(&[]).identity().as_("x");
        IdentityRemovalStrategy.apply(&mut t, Engine::Standard).unwrap();
        assert_eq!(t.steps().len(), 1);
        assert!(t.steps()[0].labels().contains("x"));
    }

    #[test]
    fn test_labeled_head_identity_survives() {
        let mut t = __::as_("a").out(&[]);
        IdentityRemovalStrategy.apply(&mut t, Engine::Standard).unwrap();
        assert_eq!(t.steps().len(), 2);
    }
}
