//! Configuration file loading with precedence handling.

use super::EngineConfig;
use crate::view_state::types::PixelHeight;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SCROLLFEED_CONFIG";

/// Environment variable overriding the buffer size.
pub const BUFFER_ENV_VAR: &str = "SCROLLFEED_BUFFER";

/// Environment variable overriding the settle delay in milliseconds.
pub const SETTLE_DELAY_ENV_VAR: &str = "SCROLLFEED_SETTLE_DELAY_MS";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// A setting parsed but is outside its valid range.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue {
        /// Name of the offending setting.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/scrollfeed/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Height in pixels assumed for unmeasured items.
    #[serde(default)]
    pub estimated_item_height: Option<f64>,

    /// Extra items mounted on each side of the visible range.
    #[serde(default)]
    pub buffer: Option<usize>,

    /// Pixel tolerance for "at bottom".
    #[serde(default)]
    pub bottom_epsilon: Option<f64>,

    /// Quiet period in milliseconds before scrolling counts as settled.
    #[serde(default)]
    pub settle_delay_ms: Option<u64>,

    /// Display frame interval in milliseconds.
    #[serde(default)]
    pub frame_interval_ms: Option<u64>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
/// Values are not validated until [`ResolvedConfig::engine_config`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Estimated item height in pixels.
    pub estimated_item_height: f64,
    /// Buffer item count per side.
    pub buffer: usize,
    /// Bottom-pin tolerance in pixels.
    pub bottom_epsilon: f64,
    /// Settle delay in milliseconds.
    pub settle_delay_ms: u64,
    /// Frame interval in milliseconds.
    pub frame_interval_ms: u64,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            estimated_item_height: engine.estimated_item_height.get(),
            buffer: engine.buffer,
            bottom_epsilon: engine.bottom_epsilon,
            settle_delay_ms: engine.settle_delay.as_millis() as u64,
            frame_interval_ms: engine.frame_interval.as_millis() as u64,
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Validate the settings and build the engine configuration.
    ///
    /// # Errors
    ///
    /// - `estimated_item_height` not positive and finite
    /// - `bottom_epsilon` negative or non-finite
    /// - `frame_interval_ms` zero
    pub fn engine_config(&self) -> Result<EngineConfig, ConfigError> {
        let estimated_item_height =
            PixelHeight::new(self.estimated_item_height).map_err(|e| ConfigError::InvalidValue {
                field: "estimated_item_height",
                reason: e.to_string(),
            })?;

        if !self.bottom_epsilon.is_finite() || self.bottom_epsilon < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "bottom_epsilon",
                reason: format!("must be a non-negative pixel count (got {})", self.bottom_epsilon),
            });
        }

        if self.frame_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "frame_interval_ms",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(EngineConfig {
            estimated_item_height,
            buffer: self.buffer,
            bottom_epsilon: self.bottom_epsilon,
            settle_delay: Duration::from_millis(self.settle_delay_ms),
            frame_interval: Duration::from_millis(self.frame_interval_ms),
        })
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/scrollfeed/scrollfeed.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("scrollfeed").join("scrollfeed.log")
    } else {
        PathBuf::from("scrollfeed.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
/// Returns `Err` if file exists but cannot be read or parsed.
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/scrollfeed/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("scrollfeed").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `SCROLLFEED_CONFIG` environment variable
/// 3. Default path `~/.config/scrollfeed/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `SCROLLFEED_BUFFER`: buffer item count
/// - `SCROLLFEED_SETTLE_DELAY_MS`: settle delay
///
/// Values that don't parse as non-negative integers are ignored.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Some(buffer) = env_number::<usize>(BUFFER_ENV_VAR) {
        config.buffer = buffer;
    }

    if let Some(delay) = env_number::<u64>(SETTLE_DELAY_ENV_VAR) {
        config.settle_delay_ms = delay;
    }

    config
}

fn env_number<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok()?.trim().parse().ok()
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        estimated_item_height: config
            .estimated_item_height
            .unwrap_or(defaults.estimated_item_height),
        buffer: config.buffer.unwrap_or(defaults.buffer),
        bottom_epsilon: config.bottom_epsilon.unwrap_or(defaults.bottom_epsilon),
        settle_delay_ms: config.settle_delay_ms.unwrap_or(defaults.settle_delay_ms),
        frame_interval_ms: config
            .frame_interval_ms
            .unwrap_or(defaults.frame_interval_ms),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    estimate_override: Option<f64>,
    buffer_override: Option<usize>,
    log_file_override: Option<PathBuf>,
) -> ResolvedConfig {
    if let Some(estimate) = estimate_override {
        config.estimated_item_height = estimate;
    }

    if let Some(buffer) = buffer_override {
        config.buffer = buffer;
    }

    if let Some(path) = log_file_override {
        config.log_file_path = path;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
