// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! Unified logging initialization
//!
//! Console output always; with the `file-logging` feature, per-run JSON log
//! files and retention cleanup.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::ObservabilityConfig;

/// Keeps file writers alive; logs are flushed when it is dropped
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Directory of this run's log files, if file logging is active
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize the global subscriber
///
/// With file logging the layout is:
/// ```text
/// <log_dir>/
///   └── run_20250101_120000/
///       ├── simbrain-network.log
///       ├── simbrain-workspace.log
///       └── simbrain.log (combined)
/// ```
///
/// # Errors
///
/// Fails if the filter is malformed, the log directory cannot be created, or
/// a global subscriber is already installed.
pub fn init_logging(config: &ObservabilityConfig, debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
    let filter = debug_flags.to_filter_string(&config.level);
    let env_filter = EnvFilter::try_new(&filter)
        .with_context(|| format!("Invalid log filter: {}", filter))?;

    let mut layers: Vec<BoxedLayer> = Vec::new();

    // Console layer (human-readable)
    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        .with_filter(env_filter)
        .boxed();
    layers.push(console_layer);

    let guard = if config.file_logging {
        file_layers(config, &filter, &mut layers)?
    } else {
        LoggingGuard {
            #[cfg(feature = "file-logging")]
            _file_guards: Vec::new(),
            log_dir: None,
        }
    };

    Registry::default()
        .with(layers)
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    if let Some(dir) = guard.log_dir() {
        tracing::info!("[LOGGING] Writing log files to {}", dir.display());
    }
    Ok(guard)
}

#[cfg(feature = "file-logging")]
fn file_layers(
    config: &ObservabilityConfig,
    filter: &str,
    layers: &mut Vec<BoxedLayer>,
) -> Result<LoggingGuard> {
    use chrono::Utc;
    use tracing_appender::rolling;

    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let run_folder = config.log_dir.join(format!("run_{}", timestamp));
    std::fs::create_dir_all(&run_folder)
        .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

    cleanup_old_logs(&config.log_dir, config.retention_days, config.retention_runs)?;

    let mut file_guards = Vec::new();

    // One file per crate
    for crate_name in crate::KNOWN_CRATES {
        let appender = rolling::never(&run_folder, format!("{}.log", crate_name));
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        file_guards.push(guard);

        let crate_filter = EnvFilter::try_new(format!(
            "off,{}=debug",
            crate::crate_target(crate_name)
        ))?;
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .json()
                .with_filter(crate_filter)
                .boxed(),
        );
    }

    // Combined log file (all crates)
    let combined = rolling::never(&run_folder, "simbrain.log");
    let (combined_non_blocking, combined_guard) = tracing_appender::non_blocking(combined);
    file_guards.push(combined_guard);
    layers.push(
        tracing_subscriber::fmt::layer()
            .with_writer(combined_non_blocking)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .with_filter(EnvFilter::try_new(filter)?)
            .boxed(),
    );

    Ok(LoggingGuard {
        _file_guards: file_guards,
        log_dir: Some(run_folder),
    })
}

#[cfg(not(feature = "file-logging"))]
fn file_layers(
    _config: &ObservabilityConfig,
    _filter: &str,
    _layers: &mut Vec<BoxedLayer>,
) -> Result<LoggingGuard> {
    eprintln!("Warning: file logging requested but the `file-logging` feature is disabled");
    Ok(LoggingGuard { log_dir: None })
}

/// Remove run folders older than `retention_days`, then all but the newest
/// `retention_runs`
#[cfg(feature = "file-logging")]
pub fn cleanup_old_logs(base_log_dir: &Path, retention_days: u64, retention_runs: usize) -> Result<()> {
    use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

    if !base_log_dir.exists() {
        return Ok(());
    }

    let cutoff_date = Utc::now() - chrono::Duration::days(retention_days as i64);

    let mut runs: Vec<(PathBuf, DateTime<Utc>)> = Vec::new();
    for entry in std::fs::read_dir(base_log_dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let Some(timestamp) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix("run_"))
        else {
            continue;
        };
        if let Ok(naive) = NaiveDateTime::parse_from_str(timestamp, "%Y%m%d_%H%M%S") {
            runs.push((path, Utc.from_utc_datetime(&naive)));
        }
    }

    // Newest first
    runs.sort_by(|a, b| b.1.cmp(&a.1));

    for (index, (path, dt)) in runs.iter().enumerate() {
        if index >= retention_runs || *dt < cutoff_date {
            if let Err(e) = std::fs::remove_dir_all(path) {
                eprintln!(
                    "Warning: Failed to remove old log directory {}: {}",
                    path.display(),
                    e
                );
            }
        }
    }

    Ok(())
}

#[cfg(all(test, feature = "file-logging"))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cleanup_keeps_newest_runs() {
        let dir = tempdir().unwrap();
        let now = chrono::Utc::now();
        for minutes in 0..5 {
            let ts = (now - chrono::Duration::minutes(minutes)).format("%Y%m%d_%H%M%S");
            std::fs::create_dir_all(dir.path().join(format!("run_{}", ts))).unwrap();
        }
        std::fs::create_dir_all(dir.path().join("not_a_run")).unwrap();

        cleanup_old_logs(dir.path(), 30, 2).unwrap();

        let remaining: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(remaining.iter().filter(|n| n.starts_with("run_")).count(), 2);
        assert!(remaining.iter().any(|n| n == "not_a_run"));
    }

    #[test]
    fn test_cleanup_removes_expired_runs() {
        let dir = tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("run_20000101_000000")).unwrap();
        cleanup_old_logs(dir.path(), 1, 10).unwrap();
        assert!(!dir.path().join("run_20000101_000000").exists());
    }
}
