// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Worker tasks per computer round when the configuration names none.
pub const DEFAULT_WORKERS: usize = 4;
/// Rounds a vertex program may run before it is stopped.
pub const DEFAULT_MAX_ITERATIONS: u32 = 1000;
/// Completions during which the count algorithm re-sorts after every pattern.
pub const MATCH_AGGRESSIVE_RESORT_LIMIT: u64 = 200;
/// After the aggressive phase, the count algorithm re-sorts every this many completions.
pub const MATCH_RESORT_INTERVAL: u64 = 250;
/// Traversers a strategy-inserted `barrier()` collects before it flushes downstream.
pub const LAZY_BARRIER_MAX_SIZE: usize = 2500;
/// Labels, memory keys and tags starting with this prefix belong to the engine.
pub const RESERVED_LABEL_PREFIX: &str = "~";
