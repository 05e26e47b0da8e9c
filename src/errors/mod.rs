// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod graph;
mod traversal;

pub use config::ConfigError;
pub use graph::{GraphError, GraphResult};
pub use traversal::{TraversalError, TraversalResult};
