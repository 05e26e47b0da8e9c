// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::TraversalResult;
use crate::steps::StepContext;
use crate::traversal::Traversal;
use crate::traverser::Traverser;

/// Emits the output of the first branch that produces anything for the input.
///
/// Branches are tried in order per traverser; a later branch only runs when
/// every earlier one came up empty. Under the computer engine branches run
/// inside the executing vertex, so the same order holds there.
#[derive(Debug, Clone)]
pub struct CoalesceStep {
    branches: Vec<Traversal>,
}

impl CoalesceStep {
    pub fn new(branches: Vec<Traversal>) -> Self {
        Self { branches }
    }

    pub fn branches(&self) -> &[Traversal] {
        &self.branches
    }

    pub fn branches_mut(&mut self) -> &mut [Traversal] {
        &mut self.branches
    }

    pub fn expand(&mut self, traverser: &Traverser, ctx: &mut StepContext<'_>) -> TraversalResult<Vec<Traverser>> {
        for branch in self.branches.iter_mut() {
            branch.reset();
            branch.add_start(traverser.clone());
            if branch.has_next_in(ctx)? {
                return branch.drain_in(ctx);
            }
        }
        Ok(Vec::new())
    }
}
