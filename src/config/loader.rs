// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_MAX_ITERATIONS, DEFAULT_WORKERS};
use crate::config::validate_config;
use crate::engine::computer::MessageCodec;
use crate::engine::Engine;
use crate::errors::ConfigError;
use crate::observability::messages::config::ConfigLoaded;
use crate::observability::messages::StructuredLog;
use crate::steps::MatchAlgorithmKind;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Engine configuration.
///
/// Every section is optional; a missing section takes its defaults.
///
/// # Example
/// ```yaml
/// engine: standard
/// strategies:
///   disabled: [lazy_barrier]
/// match_options:
///   algorithm: count
/// computer:
///   workers: 4
///   max_iterations: 1000
///   message_codec: json
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// The engine traversal sources compile for. `unset` behaves as standard.
    #[serde(default)]
    pub engine: Engine,
    #[serde(default)]
    pub strategies: StrategyOptions,
    #[serde(default)]
    pub match_options: MatchOptions,
    #[serde(default)]
    pub computer: ComputerOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StrategyOptions {
    /// Built-in strategy ids left out of the default set.
    #[serde(default)]
    pub disabled: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchOptions {
    #[serde(default)]
    pub algorithm: MatchAlgorithmKind,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComputerOptions {
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
    #[serde(default)]
    pub message_codec: MessageCodec,
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_max_iterations() -> u32 {
    DEFAULT_MAX_ITERATIONS
}

impl Default for ComputerOptions {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            message_codec: MessageCodec::default(),
        }
    }
}

impl Config {
    pub fn from_yaml_str(document: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(document)?)
    }

    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(document)?)
    }
}

/// Reads a configuration file, choosing the format by extension.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let content = fs::read_to_string(path)?;
    let cfg = match extension.as_str() {
        "yaml" | "yml" => Config::from_yaml_str(&content)?,
        "toml" => Config::from_toml_str(&content)?,
        other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
    };
    ConfigLoaded {
        path: &path.display().to_string(),
        engine: cfg.engine.name(),
        disabled: cfg.strategies.disabled.len(),
    }
    .log();
    Ok(cfg)
}

/// [`load_config`] followed by [`validate_config`].
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let cfg = load_config(path)?;
    validate_config(&cfg)?;
    Ok(cfg)
}
