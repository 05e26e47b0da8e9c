// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Traversers and the state they carry or share.

mod path;
mod requirements;
mod set;
mod side_effects;
#[allow(clippy::module_inception)]
mod traverser;

pub use path::{Path, PathEntry};
pub use requirements::{RequirementSet, TraverserRequirement};
pub use set::{BulkSet, TraverserSet};
pub use side_effects::SideEffects;
pub use traverser::{Traverser, TraverserKey};
