// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! A graph traversal engine.
//!
//! Traversals are pipelines of steps built fluently from a
//! [`GraphTraversalSource`](traversal::GraphTraversalSource), rewritten by
//! strategies, and executed either by pulling results through the pipeline
//! (the standard engine) or as a bulk-synchronous vertex program (the
//! computer engine).
//!
//! ```
//! use the_wayfarer::steps::MatchAlgorithmKind;
//! use the_wayfarer::strategy::StrategyRegistry;
//! use the_wayfarer::structure::{InMemoryGraph, Value};
//! use the_wayfarer::traversal::GraphTraversalSource;
//! use std::sync::Arc;
//!
//! let registry = StrategyRegistry::with_defaults(MatchAlgorithmKind::Count, &[]).unwrap();
//! let g = GraphTraversalSource::new(Arc::new(InMemoryGraph::modern()), Arc::new(registry));
//! let names = g.v(&[1]).out(&["knows"]).values(&["name"]).to_set().unwrap();
//! assert!(names.contains(&Value::str("josh")));
//! ```

pub mod config;     // configuration + runtime assembly
pub mod engine;     // standard/computer engines
pub mod errors;     // error handling
pub mod observability;
pub mod steps;      // step roles and concrete steps
pub mod strategy;   // strategy ordering and built-in strategies
pub mod structure;  // values, elements, graph collaborator
pub mod traits;     // unified abstractions
pub mod traversal;  // pipeline, builders, sources
pub mod traverser;  // traversers and their state
