// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Each struct maps to one section of `simbrain.toml`. Every field has a
//! default, so a partial file (or no file at all) is a complete config.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SimbrainConfig {
    pub network: NetworkConfig,
    pub updater: UpdaterConfig,
    pub logging: LoggingConfig,
}

/// Network stepping configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Simulated time per step
    pub time_step: f64,
    /// Seed of every noise and randomization stream
    pub seed: u64,
    /// Arena size from which compute passes go data-parallel
    pub parallel_threshold: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            time_step: 0.1,
            seed: 0,
            parallel_threshold: 4096,
        }
    }
}

/// Workspace updater configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct UpdaterConfig {
    /// Worker pool size, 0 = available parallelism
    pub num_threads: usize,
    /// Cycles run by the headless tool
    pub iterations: u64,
    /// Pause between cycles of a free-running updater
    pub cycle_delay_ms: u64,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            num_threads: 0, // 0 = auto-detect
            iterations: 100,
            cycle_delay_ms: 0,
        }
    }
}

impl UpdaterConfig {
    /// Pool size with `0` resolved to the machine's parallelism
    pub fn resolved_num_threads(&self) -> usize {
        if self.num_threads > 0 {
            return self.num_threads;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Write per-run JSON log files (requires the `file-logging` feature)
    pub file_logging: bool,
    pub log_dir: PathBuf,
    /// Days before old run directories are deleted
    pub retention_days: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_logging: false,
            log_dir: PathBuf::from("logs"),
            retention_days: 7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: SimbrainConfig = toml::from_str("[network]\nseed = 7\n").unwrap();
        assert_eq!(config.network.seed, 7);
        assert_eq!(config.network.time_step, 0.1);
        assert_eq!(config.updater, UpdaterConfig::default());
    }

    #[test]
    fn test_resolved_num_threads() {
        let explicit = UpdaterConfig {
            num_threads: 3,
            ..Default::default()
        };
        assert_eq!(explicit.resolved_num_threads(), 3);
        assert!(UpdaterConfig::default().resolved_num_threads() >= 1);
    }

    #[test]
    fn test_config_serializes_to_json() {
        let json = serde_json::to_value(SimbrainConfig::default()).unwrap();
        assert_eq!(json["logging"]["level"], "info");
        assert_eq!(json["updater"]["num_threads"], 0);
    }
}
