// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Every problem is collected before failing, so one run reports all of them.

use crate::{ConfigError, ConfigResult, SimbrainConfig};

/// Accepted `logging.level` values (case-insensitive)
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Upper bound on the worker pool size
pub const MAX_THREADS: usize = 1024;

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    InvalidValue { field: String, reason: String },
    OutOfRange { field: String, value: String, range: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
            Self::OutOfRange {
                field,
                value,
                range,
            } => {
                write!(f, "{} = {} is outside valid range {}", field, value, range)
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &SimbrainConfig) -> ConfigResult<()> {
    let errors = collect_errors(config);
    if errors.is_empty() {
        return Ok(());
    }

    let error_messages = errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::ValidationError(format!(
        "Configuration validation failed:\n{}",
        error_messages
    )))
}

/// All validation errors of a configuration, in section order
pub fn collect_errors(config: &SimbrainConfig) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();
    validate_network(config, &mut errors);
    validate_updater(config, &mut errors);
    validate_logging(config, &mut errors);
    errors
}

fn validate_network(config: &SimbrainConfig, errors: &mut Vec<ConfigValidationError>) {
    let time_step = config.network.time_step;
    if !(time_step.is_finite() && time_step > 0.0) {
        errors.push(ConfigValidationError::OutOfRange {
            field: "network.time_step".to_string(),
            value: time_step.to_string(),
            range: "(0, inf)".to_string(),
        });
    }
}

fn validate_updater(config: &SimbrainConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.updater.num_threads > MAX_THREADS {
        errors.push(ConfigValidationError::OutOfRange {
            field: "updater.num_threads".to_string(),
            value: config.updater.num_threads.to_string(),
            range: format!("[0, {}]", MAX_THREADS),
        });
    }
}

fn validate_logging(config: &SimbrainConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!(
                "'{}' is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }
    if config.logging.file_logging && config.logging.log_dir.as_os_str().is_empty() {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.log_dir".to_string(),
            reason: "must be set when file logging is enabled".to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&SimbrainConfig::default()).is_ok());
    }

    #[test]
    fn test_all_errors_reported_together() {
        let mut config = SimbrainConfig::default();
        config.network.time_step = 0.0;
        config.updater.num_threads = MAX_THREADS + 1;
        config.logging.level = "loud".to_string();

        let errors = collect_errors(&config);
        assert_eq!(errors.len(), 3);

        let message = validate_config(&config).unwrap_err().to_string();
        assert!(message.contains("network.time_step"));
        assert!(message.contains("updater.num_threads"));
        assert!(message.contains("logging.level"));
    }

    #[test]
    fn test_log_level_case_insensitive() {
        let mut config = SimbrainConfig::default();
        config.logging.level = "WARN".to_string();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_file_logging_requires_dir() {
        let mut config = SimbrainConfig::default();
        config.logging.file_logging = true;
        config.logging.log_dir = PathBuf::new();
        assert_eq!(collect_errors(&config).len(), 1);
    }
}
