// Copyright 2025 The Simbrain Authors
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later tiers win:
//! 1. TOML file (base values)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{validate_config, ConfigError, ConfigResult, SimbrainConfig};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File name searched for when no explicit path is given
pub const CONFIG_FILE_NAME: &str = "simbrain.toml";

/// Find the Simbrain configuration file
///
/// Search order:
/// 1. `SIMBRAIN_CONFIG_PATH` environment variable
/// 2. Current working directory: `./simbrain.toml`
/// 3. Up to five parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var("SIMBRAIN_CONFIG_PATH") {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by SIMBRAIN_CONFIG_PATH not found: {}",
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(found) = search_paths.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet SIMBRAIN_CONFIG_PATH to specify a custom location.",
        CONFIG_FILE_NAME, search_list
    )))
}

/// Load, override and validate the configuration
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, the file is searched for.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the file is not found, contains invalid TOML, or fails validation
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<SimbrainConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let config: SimbrainConfig = toml::from_str(&content)?;
    finish(config, cli_args)
}

/// Like [`load_config`], but falls back to defaults when no file exists
///
/// An explicit `config_path` that does not exist is still an error.
pub fn load_config_or_default(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<SimbrainConfig> {
    if config_path.is_some() {
        return load_config(config_path, cli_args);
    }
    match find_config_file() {
        Ok(path) => load_config(Some(&path), cli_args),
        Err(ConfigError::FileNotFound(_)) => finish(SimbrainConfig::default(), cli_args),
        Err(e) => Err(e),
    }
}

fn finish(
    mut config: SimbrainConfig,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<SimbrainConfig> {
    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }
    validate_config(&config)?;
    Ok(config)
}

fn parse_into<T: FromStr>(value: &str, slot: &mut T) {
    if let Ok(parsed) = value.trim().parse::<T>() {
        *slot = parsed;
    }
}

fn parse_flag(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "1" || value == "yes"
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `SIMBRAIN_NUM_THREADS` -> `updater.num_threads`
/// - `SIMBRAIN_ITERATIONS` -> `updater.iterations`
/// - `SIMBRAIN_TIME_STEP` -> `network.time_step`
/// - `SIMBRAIN_SEED` -> `network.seed`
/// - `SIMBRAIN_LOG_LEVEL` -> `logging.level`
/// - `SIMBRAIN_FILE_LOGGING` -> `logging.file_logging`
///
/// Values that fail to parse are ignored.
pub fn apply_environment_overrides(config: &mut SimbrainConfig) {
    if let Ok(value) = env::var("SIMBRAIN_NUM_THREADS") {
        parse_into(&value, &mut config.updater.num_threads);
    }
    if let Ok(value) = env::var("SIMBRAIN_ITERATIONS") {
        parse_into(&value, &mut config.updater.iterations);
    }
    if let Ok(value) = env::var("SIMBRAIN_TIME_STEP") {
        parse_into(&value, &mut config.network.time_step);
    }
    if let Ok(value) = env::var("SIMBRAIN_SEED") {
        parse_into(&value, &mut config.network.seed);
    }
    if let Ok(value) = env::var("SIMBRAIN_LOG_LEVEL") {
        config.logging.level = value;
    }
    if let Ok(value) = env::var("SIMBRAIN_FILE_LOGGING") {
        config.logging.file_logging = parse_flag(&value);
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - Map of CLI arguments (e.g., `{"num_threads": "4", "seed": "7"}`)
pub fn apply_cli_overrides(config: &mut SimbrainConfig, cli_args: &HashMap<String, String>) {
    // Network
    if let Some(value) = cli_args.get("time_step") {
        parse_into(value, &mut config.network.time_step);
    }
    if let Some(value) = cli_args.get("seed") {
        parse_into(value, &mut config.network.seed);
    }
    if let Some(value) = cli_args.get("parallel_threshold") {
        parse_into(value, &mut config.network.parallel_threshold);
    }

    // Updater
    if let Some(value) = cli_args.get("num_threads") {
        parse_into(value, &mut config.updater.num_threads);
    }
    if let Some(value) = cli_args.get("iterations") {
        parse_into(value, &mut config.updater.iterations);
    }
    if let Some(value) = cli_args.get("cycle_delay_ms") {
        parse_into(value, &mut config.updater.cycle_delay_ms);
    }

    // Logging
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
    if let Some(value) = cli_args.get("file_logging") {
        config.logging.file_logging = parse_flag(value);
    }
    if let Some(value) = cli_args.get("log_dir") {
        config.logging.log_dir = PathBuf::from(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const OVERRIDE_VARS: &[&str] = &[
        "SIMBRAIN_NUM_THREADS",
        "SIMBRAIN_ITERATIONS",
        "SIMBRAIN_TIME_STEP",
        "SIMBRAIN_SEED",
        "SIMBRAIN_LOG_LEVEL",
        "SIMBRAIN_FILE_LOGGING",
    ];

    fn clear_override_vars() {
        for var in OVERRIDE_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_find_config_file_env_var() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("custom_config.toml");
        File::create(&config_path).unwrap();

        env::set_var("SIMBRAIN_CONFIG_PATH", config_path.to_str().unwrap());
        let result = find_config_file();
        env::remove_var("SIMBRAIN_CONFIG_PATH");

        assert_eq!(result.unwrap(), config_path);
    }

    #[test]
    fn test_missing_env_path_is_an_error() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        env::set_var("SIMBRAIN_CONFIG_PATH", "/definitely/not/here/simbrain.toml");
        let result = find_config_file();
        env::remove_var("SIMBRAIN_CONFIG_PATH");

        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_minimal_config() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_override_vars();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[updater]").unwrap();
        writeln!(file, "num_threads = 4").unwrap();
        writeln!(file, "[network]").unwrap();
        writeln!(file, "time_step = 0.5").unwrap();

        let config = load_config(Some(&config_path), None).unwrap();

        assert_eq!(config.updater.num_threads, 4);
        assert_eq!(config.network.time_step, 0.5);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_toml() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "[network\ntime_step = ").unwrap();

        assert!(matches!(
            load_config(Some(&config_path), None),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_environment_overrides() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        let mut config = SimbrainConfig::default();

        env::set_var("SIMBRAIN_NUM_THREADS", "6");
        env::set_var("SIMBRAIN_SEED", "not-a-number");
        env::set_var("SIMBRAIN_LOG_LEVEL", "debug");

        apply_environment_overrides(&mut config);
        clear_override_vars();

        assert_eq!(config.updater.num_threads, 6);
        assert_eq!(config.network.seed, 0);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = SimbrainConfig::default();
        let mut cli_args = HashMap::new();
        cli_args.insert("iterations".to_string(), "25".to_string());
        cli_args.insert("time_step".to_string(), "0.01".to_string());
        cli_args.insert("file_logging".to_string(), "yes".to_string());

        apply_cli_overrides(&mut config, &cli_args);

        assert_eq!(config.updater.iterations, 25);
        assert_eq!(config.network.time_step, 0.01);
        assert!(config.logging.file_logging);
    }

    #[test]
    fn test_override_precedence() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_override_vars();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);

        let mut file = File::create(&config_path).unwrap();
        writeln!(file, "[network]").unwrap();
        writeln!(file, "seed = 1").unwrap();
        writeln!(file, "[updater]").unwrap();
        writeln!(file, "num_threads = 2").unwrap();

        env::set_var("SIMBRAIN_SEED", "2");
        env::set_var("SIMBRAIN_NUM_THREADS", "3");

        let mut cli_args = HashMap::new();
        cli_args.insert("seed".to_string(), "9".to_string());

        let config = load_config(Some(&config_path), Some(&cli_args));
        clear_override_vars();
        let config = config.unwrap();

        // CLI wins for seed, env wins for threads (no CLI override)
        assert_eq!(config.network.seed, 9);
        assert_eq!(config.updater.num_threads, 3);
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let _env_lock = ENV_LOCK.lock().unwrap();
        clear_override_vars();
        let dir = tempdir().unwrap();
        let config_path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "[network]\ntime_step = -1.0\n").unwrap();

        assert!(matches!(
            load_config(Some(&config_path), None),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
