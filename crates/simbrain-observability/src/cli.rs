// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! CLI argument parsing for per-crate debug flags
//!
//! Supports flags like `--debug-simbrain-network`, `--debug-simbrain-workspace`,
//! plus `--debug-all`.

use std::collections::BTreeSet;
use std::env;

use crate::{crate_target, KNOWN_CRATES};

/// Crates with debug logging enabled
///
/// # Example
/// ```rust
/// use simbrain_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(vec!["--debug-simbrain-network".to_string()]);
/// assert!(flags.is_enabled("simbrain-network"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrateDebugFlags {
    enabled_crates: BTreeSet<String>,
}

impl CrateDebugFlags {
    /// Parse debug flags from command-line arguments
    ///
    /// Looks for arguments matching `--debug-{crate-name}`. Other arguments are
    /// ignored, so the full `std::env::args()` can be passed in.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = CrateDebugFlags::default();
        for arg in args {
            if arg == "--debug-all" {
                flags.enable_all();
            } else if let Some(crate_name) = arg.strip_prefix("--debug-") {
                flags.enable(crate_name);
            }
        }
        flags
    }

    /// Merge a `SIMBRAIN_DEBUG`-style value: `all` or comma-separated crate names
    pub fn merge_env_value(&mut self, value: &str) {
        if value.trim() == "all" {
            self.enable_all();
            return;
        }
        for crate_name in value.split(',').map(str::trim) {
            if !crate_name.is_empty() {
                self.enable(crate_name);
            }
        }
    }

    pub fn enable(&mut self, crate_name: &str) {
        self.enabled_crates.insert(crate_name.to_string());
    }

    pub fn enable_all(&mut self) {
        for crate_name in KNOWN_CRATES {
            self.enable(crate_name);
        }
    }

    /// Check if debug is enabled for a specific crate
    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains(crate_name)
    }

    pub fn enabled_crates(&self) -> impl Iterator<Item = &str> {
        self.enabled_crates.iter().map(String::as_str)
    }

    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// `DEBUG` for enabled crates, `INFO` otherwise
    pub fn log_level(&self, crate_name: &str) -> tracing::Level {
        if self.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Build an `EnvFilter` directive string
    ///
    /// Format: `"info,simbrain_network=debug"`, or just the default level when
    /// no crate is enabled.
    pub fn to_filter_string(&self, default_level: &str) -> String {
        let mut filters = vec![default_level.to_lowercase()];
        filters.extend(
            self.enabled_crates
                .iter()
                .map(|name| format!("{}=debug", crate_target(name))),
        );
        filters.join(",")
    }
}

/// Parse debug flags from the process arguments and `SIMBRAIN_DEBUG`
pub fn parse_debug_flags() -> CrateDebugFlags {
    let mut flags = CrateDebugFlags::from_args(env::args());
    if let Ok(value) = env::var("SIMBRAIN_DEBUG") {
        flags.merge_env_value(&value);
    }
    flags
}

/// Help text for debug flags
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug-all                    Enable debug logging for all crates
  --debug-{{crate-name}}          Enable debug logging for specific crate

Available crates:
  {}

Environment Variable:
  SIMBRAIN_DEBUG={{crate-name}}[,{{crate-name}}]  Enable debug for crates (comma-separated)
  SIMBRAIN_DEBUG=all                               Enable debug for all crates
"#,
        KNOWN_CRATES.join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_crate_flag() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-simbrain-network".to_string()]);
        assert!(flags.is_enabled("simbrain-network"));
        assert!(!flags.is_enabled("simbrain-workspace"));
    }

    #[test]
    fn test_unrelated_args_ignored() {
        let flags = CrateDebugFlags::from_args(vec![
            "simbrain-headless".to_string(),
            "--iterations".to_string(),
            "10".to_string(),
        ]);
        assert!(!flags.any_enabled());
    }

    #[test]
    fn test_debug_all() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-all".to_string()]);
        for crate_name in KNOWN_CRATES {
            assert!(flags.is_enabled(crate_name), "{} should be enabled", crate_name);
        }
    }

    #[test]
    fn test_env_value() {
        let mut flags = CrateDebugFlags::default();
        flags.merge_env_value(" simbrain-config , ,simbrain-workspace");
        assert_eq!(
            flags.enabled_crates().collect::<Vec<_>>(),
            vec!["simbrain-config", "simbrain-workspace"]
        );
    }

    #[test]
    fn test_filter_string_uses_targets() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-simbrain-network".to_string()]);
        assert_eq!(flags.to_filter_string("INFO"), "info,simbrain_network=debug");
        assert_eq!(CrateDebugFlags::default().to_filter_string("warn"), "warn");
    }

    #[test]
    fn test_log_level() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-simbrain-workspace".to_string()]);
        assert_eq!(flags.log_level("simbrain-workspace"), tracing::Level::DEBUG);
        assert_eq!(flags.log_level("simbrain-network"), tracing::Level::INFO);
    }
}
