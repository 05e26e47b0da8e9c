// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Configuration validation.
//!
//! Every check runs and every problem is reported, so a user can fix a file
//! in one pass instead of one error at a time.
//!
//! # Checks
//!
//! 1. **Strategy ids**: each disabled id must name a built-in strategy, once.
//! 2. **Computer options**: at least one worker and a non-zero iteration limit.

use crate::config::Config;
use crate::errors::ConfigError;
use crate::observability::messages::config::ValidationFailed;
use crate::observability::messages::StructuredLog;
use crate::strategy::StrategyRegistry;
use std::collections::HashSet;

/// Validates `config`, collecting every problem into [`ConfigError::Validation`].
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if let Err(strategy_errors) = validate_disabled_strategies(config) {
        errors.extend(strategy_errors);
    }
    if let Err(computer_errors) = validate_computer_options(config) {
        errors.extend(computer_errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        ValidationFailed {
            error_count: errors.len(),
            errors: &errors,
        }
        .log();
        Err(ConfigError::Validation(errors))
    }
}

fn validate_disabled_strategies(config: &Config) -> Result<(), Vec<String>> {
    let known = StrategyRegistry::builtin_ids();
    let mut seen = HashSet::new();
    let mut errors = Vec::new();

    for id in &config.strategies.disabled {
        if !known.contains(&id.as_str()) {
            errors.push(format!(
                "unknown strategy '{}' in strategies.disabled (known: {})",
                id,
                known.join(", ")
            ));
        } else if !seen.insert(id.as_str()) {
            errors.push(format!("strategy '{}' is disabled more than once", id));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_computer_options(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();
    if config.computer.workers == 0 {
        errors.push("computer.workers must be at least 1".to_string());
    }
    if config.computer.max_iterations == 0 {
        errors.push("computer.max_iterations must be at least 1".to_string());
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_all_problems_are_reported_together() {
        let cfg = Config::from_yaml_str(
            r#"
strategies:
  disabled: [lazy_barrier, lazy_barrier, warp_drive]
computer:
  workers: 0
  max_iterations: 0
"#,
        )
        .unwrap();
        let Err(ConfigError::Validation(errors)) = validate_config(&cfg) else {
            panic!("expected validation errors");
        };
        assert_eq!(errors.len(), 4);
        assert!(errors[0].contains("more than once"));
        assert!(errors[1].contains("warp_drive"));
        assert!(errors[2].contains("workers"));
        assert!(errors[3].contains("max_iterations"));
    }

    #[test]
    fn test_every_builtin_may_be_disabled() {
        let mut cfg = Config::default();
        cfg.strategies.disabled = StrategyRegistry::builtin_ids()
            .iter()
            .map(|id| id.to_string())
            .collect();
        assert!(validate_config(&cfg).is_ok());
    }
}
