// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! # simbrain-observability
//!
//! Logging setup shared by every Simbrain binary, with per-crate debug flag
//! support.
//!
//! ## Features
//! - `file-logging`: per-run JSON log files with retention cleanup

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known Simbrain crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "simbrain",
    "simbrain-network",
    "simbrain-workspace",
    "simbrain-config",
    "simbrain-observability",
];

/// Tracing target of a crate name (`simbrain-network` -> `simbrain_network`)
pub fn crate_target(crate_name: &str) -> String {
    crate_name.replace('-', "_")
}
