// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Execution engines.
//!
//! The standard engine is the pull pipeline in [`crate::traversal`]; it runs
//! on the thread that iterates the traversal. The computer engine in
//! [`computer`] runs the same steps as a vertex program spread over workers.

pub mod computer;
#[cfg(test)]
mod integration_tests;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which engine a traversal is compiled for.
///
/// Strategies consult it; a traversal that was never told defaults to
/// [`Engine::Standard`] when its strategies are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Engine {
    #[default]
    Unset,
    Standard,
    Computer,
}

impl Engine {
    pub fn name(self) -> &'static str {
        match self {
            Engine::Unset => "unset",
            Engine::Standard => "standard",
            Engine::Computer => "computer",
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
