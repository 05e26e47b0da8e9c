// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod strategy;
pub mod vertex_program;

pub use strategy::TraversalStrategy;
pub use vertex_program::{MapReduce, VertexProgram};
