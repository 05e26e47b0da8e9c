// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A traverser field that some step needs populated.
///
/// Steps declare requirements statically; the union over a traversal (children
/// included) decides what every traverser carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TraverserRequirement {
    /// Full history: every producing step appends an entry.
    Path,
    /// Only labeled steps append entries.
    LabeledPath,
    SideEffects,
    Bulk,
    Sack,
    Object,
}

impl fmt::Display for TraverserRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TraverserRequirement::Path => "PATH",
            TraverserRequirement::LabeledPath => "LABELED_PATH",
            TraverserRequirement::SideEffects => "SIDE_EFFECTS",
            TraverserRequirement::Bulk => "BULK",
            TraverserRequirement::Sack => "SACK",
            TraverserRequirement::Object => "OBJECT",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementSet(BTreeSet<TraverserRequirement>);

impl RequirementSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, requirement: TraverserRequirement) {
        self.0.insert(requirement);
    }

    pub fn extend(&mut self, other: &RequirementSet) {
        self.0.extend(other.0.iter().copied());
    }

    pub fn contains(&self, requirement: TraverserRequirement) -> bool {
        self.0.contains(&requirement)
    }

    /// True when traversers must carry a path at all.
    pub fn tracks_path(&self) -> bool {
        self.contains(TraverserRequirement::Path) || self.contains(TraverserRequirement::LabeledPath)
    }

    /// True when every producing step, labeled or not, appends to the path.
    pub fn tracks_full_path(&self) -> bool {
        self.contains(TraverserRequirement::Path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TraverserRequirement> {
        self.0.iter()
    }
}

impl fmt::Display for RequirementSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", names.join(","))
    }
}

impl FromIterator<TraverserRequirement> for RequirementSet {
    fn from_iter<I: IntoIterator<Item = TraverserRequirement>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_tracking_flags() {
        let labeled: RequirementSet = [TraverserRequirement::LabeledPath].into_iter().collect();
        assert!(labeled.tracks_path());
        assert!(!labeled.tracks_full_path());

        let mut full = RequirementSet::new();
        full.insert(TraverserRequirement::Path);
        assert!(full.tracks_path() && full.tracks_full_path());

        assert!(!RequirementSet::new().tracks_path());
    }
}
