// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::TraversalResult;
use crate::steps::MatchAlgorithmKind;
use crate::strategy::strategies::{
    ComputerVerificationStrategy, IdentityRemovalStrategy, IncidentToAdjacentStrategy,
    LazyBarrierStrategy, MatchAlgorithmStrategy, StandardVerificationStrategy,
};
use crate::strategy::TraversalStrategies;
use crate::traits::TraversalStrategy;
use std::collections::HashMap;
use std::sync::Arc;

/// What a traversal starts from, used to pick its default strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StartContext {
    Vertex,
    Edge,
    Element,
    Default,
    /// Child fragments that never run on their own.
    Anonymous,
}

impl StartContext {
    fn fallback(self) -> Option<StartContext> {
        match self {
            StartContext::Vertex | StartContext::Edge => Some(StartContext::Element),
            StartContext::Element => Some(StartContext::Default),
            StartContext::Default | StartContext::Anonymous => None,
        }
    }
}

/// Strategy sets per start context, handed to a traversal source at
/// construction. Populated before it is shared; read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct StrategyRegistry {
    sets: HashMap<StartContext, TraversalStrategies>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in strategies under `Default`, minus any listed in `disabled`.
    pub fn with_defaults(match_algorithm: MatchAlgorithmKind, disabled: &[String]) -> TraversalResult<Self> {
        let all: Vec<Arc<dyn TraversalStrategy>> = vec![
            Arc::new(MatchAlgorithmStrategy::new(match_algorithm)),
            Arc::new(IdentityRemovalStrategy),
            Arc::new(IncidentToAdjacentStrategy),
            Arc::new(LazyBarrierStrategy),
            Arc::new(StandardVerificationStrategy),
            Arc::new(ComputerVerificationStrategy),
        ];
        let enabled = all
            .into_iter()
            .filter(|s| !disabled.iter().any(|d| d == s.id()))
            .collect();
        let mut registry = Self::new();
        registry.register(StartContext::Default, TraversalStrategies::new(enabled)?);
        Ok(registry)
    }

    /// Ids of every built-in strategy.
    pub fn builtin_ids() -> [&'static str; 6] {
        [
            MatchAlgorithmStrategy::ID,
            IdentityRemovalStrategy::ID,
            IncidentToAdjacentStrategy::ID,
            LazyBarrierStrategy::ID,
            StandardVerificationStrategy::ID,
            ComputerVerificationStrategy::ID,
        ]
    }

    pub fn register(&mut self, context: StartContext, strategies: TraversalStrategies) {
        self.sets.insert(context, strategies);
    }

    /// The set for `context`, walking Vertex/Edge -> Element -> Default.
    /// Anonymous only ever resolves to its own set.
    pub fn resolve(&self, context: StartContext) -> TraversalStrategies {
        let mut current = Some(context);
        while let Some(ctx) = current {
            if let Some(set) = self.sets.get(&ctx) {
                return set.clone();
            }
            current = ctx.fallback();
        }
        TraversalStrategies::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_falls_back_through_element() {
        let mut registry = StrategyRegistry::new();
        registry.register(
            StartContext::Element,
            TraversalStrategies::new(vec![Arc::new(IdentityRemovalStrategy)]).unwrap(),
        );
        registry.register(
            StartContext::Default,
            TraversalStrategies::new(vec![Arc::new(StandardVerificationStrategy)]).unwrap(),
        );

        assert_eq!(registry.resolve(StartContext::Vertex).ids(), vec!["identity_removal"]);
        assert_eq!(registry.resolve(StartContext::Edge).ids(), vec!["identity_removal"]);
        assert_eq!(
            registry.resolve(StartContext::Default).ids(),
            vec!["standard_verification"]
        );
    }

    #[test]
    fn test_anonymous_does_not_fall_back() {
        let registry =
            StrategyRegistry::with_defaults(MatchAlgorithmKind::Count, &[]).unwrap();
        assert!(registry.resolve(StartContext::Anonymous).is_empty());
        assert_eq!(registry.resolve(StartContext::Vertex).len(), 6);
    }

    #[test]
    fn test_defaults_sort_and_honour_disabled() {
        let disabled = vec!["lazy_barrier".to_string()];
        let registry = StrategyRegistry::with_defaults(MatchAlgorithmKind::Greedy, &disabled).unwrap();
        let ids = registry.resolve(StartContext::Vertex).ids();
        assert_eq!(
            ids,
            vec![
                "match_algorithm",
                "identity_removal",
                "incident_to_adjacent",
                "computer_verification",
                "standard_verification",
            ]
        );
    }
}
