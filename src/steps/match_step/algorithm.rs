// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{MATCH_AGGRESSIVE_RESORT_LIMIT, MATCH_RESORT_INTERVAL};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Configured choice of pattern-ordering heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchAlgorithmKind {
    Greedy,
    #[default]
    Count,
}

impl MatchAlgorithmKind {
    pub fn build(self, patterns: usize) -> MatchAlgorithm {
        match self {
            MatchAlgorithmKind::Greedy => MatchAlgorithm::Greedy,
            MatchAlgorithmKind::Count => MatchAlgorithm::Count(CountMatchAlgorithm::new(patterns)),
        }
    }
}

/// Decides which eligible pattern a traverser tries next.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchAlgorithm {
    /// Declared order, always.
    Greedy,
    Count(CountMatchAlgorithm),
}

impl MatchAlgorithm {
    pub fn kind(&self) -> MatchAlgorithmKind {
        match self {
            MatchAlgorithm::Greedy => MatchAlgorithmKind::Greedy,
            MatchAlgorithm::Count(_) => MatchAlgorithmKind::Count,
        }
    }

    /// The first of `eligible` in this algorithm's current preference order.
    pub fn choose(&self, eligible: &[usize]) -> Option<usize> {
        match self {
            MatchAlgorithm::Greedy => eligible.iter().min().copied(),
            MatchAlgorithm::Count(count) => count
                .order()
                .iter()
                .copied()
                .find(|pattern| eligible.contains(pattern)),
        }
    }

    pub fn record_start(&mut self, pattern: usize, bulk: u64) {
        if let MatchAlgorithm::Count(count) = self {
            count.record_start(pattern, bulk);
        }
    }

    pub fn record_end(&mut self, pattern: usize, bulk: u64) {
        if let MatchAlgorithm::Count(count) = self {
            count.record_end(pattern, bulk);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Bundle {
    pattern: usize,
    starts: u64,
    ends: u64,
}

impl Bundle {
    fn multiplicity(&self) -> f64 {
        if self.starts == 0 {
            0.0
        } else {
            self.ends as f64 / self.starts as f64
        }
    }
}

/// Orders patterns by observed multiplicity (ends per start), highest first.
///
/// The order is recomputed after every completion until
/// `MATCH_AGGRESSIVE_RESORT_LIMIT` completions have been seen, then only every
/// `MATCH_RESORT_INTERVAL` completions. The sort is stable, so patterns with
/// equal multiplicity keep their declared order.
#[derive(Debug, Clone, PartialEq)]
pub struct CountMatchAlgorithm {
    bundles: Vec<Bundle>,
    order: Vec<usize>,
    completions: u64,
}

impl CountMatchAlgorithm {
    pub fn new(patterns: usize) -> Self {
        Self {
            bundles: (0..patterns)
                .map(|pattern| Bundle {
                    pattern,
                    starts: 0,
                    ends: 0,
                })
                .collect(),
            order: (0..patterns).collect(),
            completions: 0,
        }
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn completions(&self) -> u64 {
        self.completions
    }

    pub fn record_start(&mut self, pattern: usize, bulk: u64) {
        if let Some(bundle) = self.bundles.get_mut(pattern) {
            bundle.starts += bulk;
        }
    }

    /// Counts a finished run of `pattern` that produced `bulk` results.
    pub fn record_end(&mut self, pattern: usize, bulk: u64) {
        if let Some(bundle) = self.bundles.get_mut(pattern) {
            bundle.ends += bulk;
        }
        self.completions += 1;
        if self.completions < MATCH_AGGRESSIVE_RESORT_LIMIT
            || self.completions % MATCH_RESORT_INTERVAL == 0
        {
            self.resort();
        }
    }

    fn resort(&mut self) {
        let mut ranked: Vec<&Bundle> = self.bundles.iter().collect();
        ranked.sort_by(|a, b| {
            b.multiplicity()
                .partial_cmp(&a.multiplicity())
                .unwrap_or(Ordering::Equal)
        });
        self.order = ranked.into_iter().map(|b| b.pattern).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greedy_takes_declared_order() {
        let algorithm = MatchAlgorithmKind::Greedy.build(3);
        assert_eq!(algorithm.choose(&[2, 1]), Some(1));
        assert_eq!(algorithm.choose(&[]), None);
    }

    #[test]
    fn test_count_prefers_higher_multiplicity() {
        let mut algorithm = MatchAlgorithmKind::Count.build(2);
        algorithm.record_start(0, 4);
        algorithm.record_end(0, 1);
        algorithm.record_start(1, 1);
        algorithm.record_end(1, 3);
        assert_eq!(algorithm.choose(&[0, 1]), Some(1));
        assert_eq!(algorithm.choose(&[0]), Some(0));
    }

    #[test]
    fn test_count_is_stable_on_ties() {
        let mut count = CountMatchAlgorithm::new(3);
        for pattern in 0..3 {
            count.record_start(pattern, 2);
            count.record_end(pattern, 2);
        }
        assert_eq!(count.order(), &[0, 1, 2]);
    }

    #[test]
    fn test_count_resorts_periodically_after_limit() {
        let mut count = CountMatchAlgorithm::new(2);
        for _ in 0..MATCH_AGGRESSIVE_RESORT_LIMIT {
            count.record_start(0, 1);
            count.record_end(0, 1);
        }
        assert_eq!(count.order(), &[0, 1]);

        // pattern 1 overtakes, but the order holds until the next interval boundary
        count.record_start(1, 1);
        count.record_end(1, 50);
        assert_eq!(count.order(), &[0, 1]);

        while count.completions() % MATCH_RESORT_INTERVAL != MATCH_RESORT_INTERVAL - 1 {
            count.record_start(0, 1);
            count.record_end(0, 1);
        }
        count.record_start(0, 1);
        count.record_end(0, 1);
        assert_eq!(count.order(), &[1, 0]);
    }

    #[test]
    fn test_kind_round_trips_through_yaml() {
        let kind: MatchAlgorithmKind = serde_yaml::from_str("greedy").unwrap();
        assert_eq!(kind, MatchAlgorithmKind::Greedy);
        assert_eq!(MatchAlgorithmKind::default(), MatchAlgorithmKind::Count);
    }
}
