// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Traversals: building them, compiling them with strategies, and pulling
//! results out of them with the standard engine.

pub mod anonymous;
mod builder;
mod pipeline;
mod source;

pub use anonymous as __;
pub use pipeline::{ParentRef, Traversal, TraversalId};
pub use source::GraphTraversalSource;

#[cfg(test)]
mod integration_tests;
