// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::Engine;
use crate::errors::TraversalResult;
use crate::config::consts::LAZY_BARRIER_MAX_SIZE;
use crate::steps::{BarrierStep, FlatMapStep, Step, StepKind};
use crate::strategy::strategies::IncidentToAdjacentStrategy;
use crate::strategy::StrategyCategory;
use crate::traits::TraversalStrategy;
use crate::traversal::Traversal;

/// Puts a bulk-merging barrier between consecutive adjacency hops so the
/// second hop expands each distinct vertex once per batch. The barrier is
/// bounded, so the first result never waits on the whole first hop.
///
/// Root traversals under the standard engine only, and only when no path is
/// tracked: traversers with different paths never merge.
#[derive(Debug, Clone, Copy, Default)]
pub struct LazyBarrierStrategy;

impl LazyBarrierStrategy {
    pub const ID: &'static str = "lazy_barrier";
}

fn is_hop(step: &Step) -> bool {
    matches!(step.kind(), StepKind::FlatMap(FlatMapStep::Vertex { .. }))
}

impl TraversalStrategy for LazyBarrierStrategy {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn category(&self) -> StrategyCategory {
        StrategyCategory::Optimization
    }

    fn applies_after(&self) -> &[&'static str] {
        &[IncidentToAdjacentStrategy::ID]
    }

    fn apply(&self, traversal: &mut Traversal, engine: Engine) -> TraversalResult<()> {
        if engine == Engine::Computer
            || !traversal.is_root()
            || traversal.collect_requirements().tracks_path()
        {
            return Ok(());
        }
        let mut index = traversal.steps().len();
        while index > 1 {
            index -= 1;
            let steps = traversal.steps();
            if is_hop(&steps[index - 1]) && is_hop(&steps[index]) {
                let barrier = BarrierStep::bounded(LAZY_BARRIER_MAX_SIZE);
                traversal.insert_step(index, Step::new(StepKind::Barrier(barrier)))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traversal::__;

    fn names(t: &Traversal) -> Vec<String> {
        t.steps().iter().map(|s| s.name()).collect()
    }

    #[test]
    fn test_barrier_between_hops() {
        let mut t = __::out(&[]).out(&[]).in_(&[]).count();
        LazyBarrierStrategy.apply(&mut t, Engine::Standard).unwrap();
        assert_eq!(
            names(&t),
            vec!["out()", "barrier(2500)", "out()", "barrier(2500)", "in()", "count"]
        );
        let StepKind::Barrier(barrier) = t.steps()[1].kind() else {
            panic!("expected a barrier");
        };
        assert_eq!(barrier.max_size(), Some(LAZY_BARRIER_MAX_SIZE));
    }

    #[test]
    fn test_skipped_for_computer_or_paths() {
        let mut computer = __::out(&[]).out(&[]);
        LazyBarrierStrategy.apply(&mut computer, Engine::Computer).unwrap();
        assert_eq!(computer.steps().len(), 2);

        let mut labeled = __::out(&[]).as_("a").out(&[]);
        LazyBarrierStrategy.apply(&mut labeled, Engine::Standard).unwrap();
        assert_eq!(labeled.steps().len(), 2);
    }
}
