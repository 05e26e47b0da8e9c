// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::Config;
use crate::engine::computer::{LocalSubstrate, TraversalComputer};
use crate::engine::Engine;
use crate::errors::{ConfigError, TraversalError};
use crate::strategy::StrategyRegistry;
use crate::structure::Graph;
use crate::traversal::GraphTraversalSource;
use std::sync::Arc;

/// Everything needed to run traversals, assembled from a [`Config`].
///
/// The strategy registry is built once and shared by every traversal
/// source handed out.
#[derive(Clone)]
pub struct Runtime {
    registry: Arc<StrategyRegistry>,
    computer: TraversalComputer<LocalSubstrate>,
    engine: Engine,
}

impl Runtime {
    pub fn registry(&self) -> &Arc<StrategyRegistry> {
        &self.registry
    }

    pub fn computer(&self) -> &TraversalComputer<LocalSubstrate> {
        &self.computer
    }

    pub fn engine(&self) -> Engine {
        self.engine
    }

    /// A traversal source over `graph` using this runtime's strategies and engine.
    pub fn traversal(&self, graph: Arc<dyn Graph>) -> GraphTraversalSource {
        GraphTraversalSource::new(graph, Arc::clone(&self.registry)).with_engine(self.engine)
    }
}

/// Builds a [`Runtime`] from configuration.
///
/// # Example
/// ```
/// use the_wayfarer::config::{Config, RuntimeBuilder};
/// use the_wayfarer::structure::InMemoryGraph;
/// use std::sync::Arc;
///
/// let runtime = RuntimeBuilder::from_config(&Config::default()).unwrap();
/// let g = runtime.traversal(Arc::new(InMemoryGraph::modern()));
/// assert_eq!(g.v(&[]).count().to_list().unwrap().len(), 1);
/// ```
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    pub fn from_config(cfg: &Config) -> Result<Runtime, ConfigError> {
        crate::config::validate_config(cfg)?;
        let registry =
            StrategyRegistry::with_defaults(cfg.match_options.algorithm, &cfg.strategies.disabled)
                .map_err(|e: TraversalError| ConfigError::Validation(vec![e.to_string()]))?;
        let substrate = LocalSubstrate::new(cfg.computer.workers, cfg.computer.max_iterations)
            .with_codec(cfg.computer.message_codec);
        Ok(Runtime {
            registry: Arc::new(registry),
            computer: TraversalComputer::new(substrate),
            engine: cfg.engine,
        })
    }
}
