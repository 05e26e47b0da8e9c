// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::engine::Engine;
use crate::errors::TraversalResult;
use crate::observability::messages::strategy::StrategyApplied;
use crate::observability::messages::StructuredLog;
use crate::strategy::sort_strategies;
use crate::traits::TraversalStrategy;
use crate::traversal::Traversal;
use std::fmt;
use std::sync::Arc;

/// A sorted strategy set. Kept sorted on every change, so sorting errors
/// surface when the set is assembled rather than when a traversal runs.
#[derive(Clone, Default)]
pub struct TraversalStrategies {
    sorted: Vec<Arc<dyn TraversalStrategy>>,
}

impl TraversalStrategies {
    pub fn new(strategies: Vec<Arc<dyn TraversalStrategy>>) -> TraversalResult<Self> {
        Ok(Self {
            sorted: sort_strategies(&strategies)?,
        })
    }

    /// Adds strategies, replacing any with the same id, and re-sorts.
    pub fn add(&mut self, strategies: Vec<Arc<dyn TraversalStrategy>>) -> TraversalResult<()> {
        let mut combined: Vec<Arc<dyn TraversalStrategy>> = self
            .sorted
            .iter()
            .filter(|existing| strategies.iter().all(|s| s.id() != existing.id()))
            .cloned()
            .collect();
        combined.extend(strategies);
        self.sorted = sort_strategies(&combined)?;
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.sorted.len();
        self.sorted.retain(|s| s.id() != id);
        before != self.sorted.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sorted.iter().any(|s| s.id() == id)
    }

    pub fn ids(&self) -> Vec<&'static str> {
        self.sorted.iter().map(|s| s.id()).collect()
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }

    /// Applies the set to `traversal` and, recursively, to its children.
    ///
    /// Strategies run in sorted order on the traversal before its children,
    /// except those that ask for children first: they run, still in sorted
    /// order, after every child has been fully rewritten. Each child sees the
    /// requirements of everything around it through
    /// [`Traversal::inherited_requirements`].
    pub fn apply(&self, traversal: &mut Traversal) -> TraversalResult<()> {
        let engine = traversal.engine();
        for strategy in self.sorted.iter().filter(|s| !s.applies_to_children_first()) {
            self.apply_one(strategy, traversal, engine)?;
        }
        for step in 0..traversal.steps.len() {
            let inherited = traversal.requirements_around(step);
            for child in traversal.steps[step].children_mut() {
                child.set_inherited_requirements(inherited.clone());
                self.apply(child)?;
            }
        }
        for strategy in self.sorted.iter().filter(|s| s.applies_to_children_first()) {
            self.apply_one(strategy, traversal, engine)?;
        }
        Ok(())
    }

    fn apply_one(
        &self,
        strategy: &Arc<dyn TraversalStrategy>,
        traversal: &mut Traversal,
        engine: Engine,
    ) -> TraversalResult<()> {
        strategy.apply(traversal, engine)?;
        StrategyApplied {
            strategy: strategy.id(),
            traversal: &traversal.traversal_id(),
            steps: traversal.steps().len(),
        }
        .log();
        Ok(())
    }
}

impl fmt::Debug for TraversalStrategies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.ids()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::StrategyCategory;
    use crate::traversal::__;

    /// Labels each traversal's first step `h<n>`, one more than the tallest
    /// child it can already see.
    struct Height {
        children_first: bool,
    }

    fn height(traversal: &Traversal) -> u32 {
        traversal
            .steps()
            .first()
            .and_then(|step| step.labels().iter().find_map(|l| l.strip_prefix('h')?.parse().ok()))
            .unwrap_or(0)
    }

    impl TraversalStrategy for Height {
        fn id(&self) -> &'static str {
            "height"
        }

        fn category(&self) -> StrategyCategory {
            StrategyCategory::Finalization
        }

        fn applies_to_children_first(&self) -> bool {
            self.children_first
        }

        fn apply(&self, traversal: &mut Traversal, _engine: Engine) -> TraversalResult<()> {
            let below = traversal
                .steps()
                .iter()
                .flat_map(|step| step.children())
                .map(height)
                .max()
                .unwrap_or(0);
            if let Some(first) = traversal.steps_mut()?.first_mut() {
                first.add_label(format!("h{}", below + 1));
            }
            Ok(())
        }
    }

    fn nested() -> Traversal {
        __::identity().union(vec![__::identity().union(vec![__::out(&[])])])
    }

    #[test]
    fn test_children_first_strategy_sees_rewritten_children() {
        let strategies = TraversalStrategies::new(vec![Arc::new(Height { children_first: true })]).unwrap();
        let mut t = nested();
        strategies.apply(&mut t).unwrap();
        assert_eq!(height(&t), 3);
    }

    #[test]
    fn test_parent_first_strategy_runs_before_children() {
        let strategies = TraversalStrategies::new(vec![Arc::new(Height { children_first: false })]).unwrap();
        let mut t = nested();
        strategies.apply(&mut t).unwrap();
        assert_eq!(height(&t), 1);
        assert_eq!(height(t.steps()[1].children()[0]), 1);
    }

    #[test]
    fn test_children_inherit_surrounding_requirements() {
        let strategies = TraversalStrategies::default();
        let mut t = __::identity()
            .union(vec![__::out(&[]), __::out(&[]).path()])
            .filter(Traversal::new().path());
        strategies.apply(&mut t).unwrap();
        assert!(t.inherited_requirements().iter().next().is_none());
        for branch in t.steps()[1].children() {
            assert!(branch.inherited_requirements().tracks_full_path());
        }

        let mut t = __::identity().union(vec![__::out(&[]), __::out(&[]).path()]);
        strategies.apply(&mut t).unwrap();
        assert!(!t.steps()[1].children()[0].inherited_requirements().tracks_full_path());
    }
}
