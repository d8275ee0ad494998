// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! Observability configuration types

use serde::{Deserialize, Serialize};
use simbrain_config::LoggingConfig;
use std::path::PathBuf;

/// Logging setup resolved from the `[logging]` config section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Default level (trace, debug, info, warn, error)
    pub level: String,
    /// Write per-run JSON log files
    pub file_logging: bool,
    /// Base directory holding one `run_<timestamp>` folder per run
    pub log_dir: PathBuf,
    /// Delete run folders older than this
    pub retention_days: u64,
    /// Keep at most this many run folders
    pub retention_runs: usize,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self::from(&LoggingConfig::default())
    }
}

impl From<&LoggingConfig> for ObservabilityConfig {
    fn from(logging: &LoggingConfig) -> Self {
        Self {
            level: logging.level.clone(),
            file_logging: logging.file_logging,
            log_dir: logging.log_dir.clone(),
            retention_days: logging.retention_days,
            retention_runs: 10,
        }
    }
}
