//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Start from [`KioskConfig::default`]
//! 2. Overlay a config file if one is found (`RVM_CONFIG` or probed paths)
//! 3. Overlay environment variables
//! 4. Validate
//!
//! A missing file is not an error; the defaults describe a service on
//! `http://localhost:8000`.
//!
//! ## Environment Variables
//! - `RVM_CONFIG`: Explicit config file path
//! - `RVM_API_URL`: Base URL of the detection service
//! - `RVM_STATUS_POLL_MS`: Background poll interval in milliseconds
//! - `RVM_SCAN_POLL_MS`: Scan poll interval in milliseconds
//! - `RVM_SCAN_MAX_ATTEMPTS`: Poll attempts before a scan is given up
//! - `RVM_LOG_FORMAT`: `pretty` or `json`
//!
//! ## File Locations
//! The loader probes `rvm.toml`, `rvm.json`, `config.toml` and `config.json`
//! in the current working directory, then next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use rvm_domain::constants::API_URL_ENV;
use rvm_domain::{KioskConfig, KioskError, LogFormat, Result};

use crate::remote::client::normalize_base_url;

pub const CONFIG_PATH_ENV: &str = "RVM_CONFIG";
pub const STATUS_POLL_ENV: &str = "RVM_STATUS_POLL_MS";
pub const SCAN_POLL_ENV: &str = "RVM_SCAN_POLL_MS";
pub const SCAN_MAX_ATTEMPTS_ENV: &str = "RVM_SCAN_MAX_ATTEMPTS";
pub const LOG_FORMAT_ENV: &str = "RVM_LOG_FORMAT";

const CONFIG_FILE_NAMES: [&str; 4] = ["rvm.toml", "rvm.json", "config.toml", "config.json"];

/// Load configuration from the process environment
///
/// # Errors
/// Returns `KioskError::Config` if the file named by `RVM_CONFIG` is missing,
/// any source fails to parse, or the merged configuration is invalid.
pub fn load() -> Result<KioskConfig> {
    let explicit = std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from);
    load_with(explicit, |key| std::env::var(key).ok())
}

/// Load configuration with an explicit file and environment lookup
///
/// `path` of `None` falls back to [`probe_config_paths`].
pub fn load_with<F>(path: Option<PathBuf>, env: F) -> Result<KioskConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => load_from_file(&path)?,
        None => match probe_config_paths() {
            Some(path) => load_from_file(&path)?,
            None => {
                tracing::debug!("No config file found, using defaults");
                KioskConfig::default()
            }
        },
    };

    apply_env_overrides(&mut config, env)?;
    config.validate()?;
    normalize_base_url(&config.api.base_url)?;

    tracing::info!(
        base_url = %config.api.base_url,
        status_interval_ms = config.polling.status_interval_ms,
        scan_interval_ms = config.polling.scan_interval_ms,
        scan_max_attempts = config.polling.scan_max_attempts,
        "Configuration loaded"
    );
    Ok(config)
}

/// Load configuration from a file
///
/// Supports JSON and TOML formats (detected by file extension). Fields the
/// file omits keep their defaults.
///
/// # Errors
/// Returns `KioskError::Config` if the file does not exist, cannot be read,
/// or fails to parse.
pub fn load_from_file(path: &Path) -> Result<KioskConfig> {
    if !path.exists() {
        return Err(KioskError::Config(format!("Config file not found: {}", path.display())));
    }

    tracing::info!(path = %path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(path)
        .map_err(|e| KioskError::Config(format!("Failed to read config file: {e}")))?;

    parse_config(&contents, path)
}

fn parse_config(contents: &str, path: &Path) -> Result<KioskConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| KioskError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| KioskError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(KioskError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a config file
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

/// Overlay environment variables onto `config`
///
/// Empty values are ignored.
///
/// # Errors
/// Returns `KioskError::Config` naming the variable when a value does not
/// parse.
pub fn apply_env_overrides<F>(config: &mut KioskConfig, env: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let lookup = |key: &str| env(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(url) = lookup(API_URL_ENV) {
        config.api.base_url = url;
    }
    if let Some(value) = lookup(STATUS_POLL_ENV) {
        config.polling.status_interval_ms = parse_env(STATUS_POLL_ENV, &value)?;
    }
    if let Some(value) = lookup(SCAN_POLL_ENV) {
        config.polling.scan_interval_ms = parse_env(SCAN_POLL_ENV, &value)?;
    }
    if let Some(value) = lookup(SCAN_MAX_ATTEMPTS_ENV) {
        config.polling.scan_max_attempts = parse_env(SCAN_MAX_ATTEMPTS_ENV, &value)?;
    }
    if let Some(value) = lookup(LOG_FORMAT_ENV) {
        config.logging.format = match value.to_ascii_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            other => {
                return Err(KioskError::Config(format!(
                    "Invalid {LOG_FORMAT_ENV}: {other} (expected pretty or json)"
                )))
            }
        };
    }

    Ok(())
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| KioskError::Config(format!("Invalid {key}: {e}")))
}
