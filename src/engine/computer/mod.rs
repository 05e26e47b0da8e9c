// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The bulk-synchronous computer engine.
//!
//! Work is organized in rounds. In each round every vertex runs the vertex
//! program against its own star graph, reads the memory as of the round
//! start, and sends messages that arrive in the next round. Rounds repeat
//! until the program votes to terminate.

mod job;
mod map_reduce;
mod memory;
mod messenger;
mod substrate;
mod traversal_program;

pub use job::{ComputerJob, ComputerResult, TraversalComputer};
pub use map_reduce::{run_map_reduce, TraverserMapReduce};
pub use memory::{FinalMemory, Memory, MemoryComputeKey, MemoryDelta, MemoryOperator, RoundMemory};
pub use messenger::Messenger;
pub use substrate::{ComputeSubstrate, ComputeVertex, LocalSubstrate, MessageCodec, ResultGraph};
pub use traversal_program::{TraversalVertexProgram, ACTIVE_KEY, PROCESSED_KEY};
