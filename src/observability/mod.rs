// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structured logging for traversal compilation and execution.
//!
//! Log lines are built from message structs in [`messages`], one per event,
//! each with a `Display` implementation and a [`messages::StructuredLog`]
//! implementation that picks the level and the structured fields. Call sites
//! never format log strings themselves.
//!
//! Messages are organized by subsystem:
//! * `messages::traversal` - locking, deferred build errors, barrier drains
//! * `messages::strategy` - strategy ordering and application
//! * `messages::computer` - vertex program rounds and job lifecycle
//! * `messages::config` - configuration loading and validation

pub mod messages;

use tracing_subscriber::EnvFilter;

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, defaulting to `info`
/// for this crate. Returns an error if a global subscriber is already set.
pub fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("the_wayfarer=info"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_installs_once() {
        let _ = init_tracing();
        assert!(init_tracing().is_err());
    }
}
