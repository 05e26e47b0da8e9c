// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::TraversalResult;
use crate::steps::StepContext;
use crate::traverser::{RequirementSet, Traverser, TraverserRequirement};

/// Passes the traverser through after mutating shared or per-traverser state.
#[derive(Debug, Clone, PartialEq)]
pub enum SideEffectStep {
    /// Appends the value to the side-effect list `key`, once per unit of bulk.
    Store(String),
    /// Adds the numeric property `key` of the current element to the sack.
    SackAdd(String),
}

impl SideEffectStep {
    pub fn name(&self) -> String {
        match self {
            SideEffectStep::Store(key) => format!("store({})", key),
            SideEffectStep::SackAdd(key) => format!("sack(sum).by({})", key),
        }
    }

    pub fn apply(&mut self, traverser: &mut Traverser, ctx: &mut StepContext<'_>) -> TraversalResult<()> {
        match self {
            SideEffectStep::Store(key) => {
                ctx.side_effects.append(key, traverser.value(), traverser.bulk());
            }
            SideEffectStep::SackAdd(key) => {
                let Some(element) = traverser.value().as_element() else {
                    return Ok(());
                };
                let props = ctx.graph.properties(&element, std::slice::from_ref(key))?;
                if let Some((_, amount)) = props.into_iter().next() {
                    let current = traverser.sack().cloned().unwrap_or(crate::structure::Value::Int(0));
                    if let Some(sum) = current.add_numbers(&amount) {
                        traverser.set_sack(sum);
                    }
                }
            }
        }
        Ok(())
    }

    pub fn requirements(&self) -> RequirementSet {
        match self {
            SideEffectStep::Store(_) => [TraverserRequirement::SideEffects].into_iter().collect(),
            SideEffectStep::SackAdd(_) => [TraverserRequirement::Sack].into_iter().collect(),
        }
    }
}
