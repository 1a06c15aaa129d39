//! Configuration module.

pub mod loader;

pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, ConfigError, ConfigFile,
    ResolvedConfig,
};

use crate::view_state::types::PixelHeight;
use std::time::Duration;

/// Tuning parameters of the virtualization engine.
///
/// Built from a [`ResolvedConfig`] via [`ResolvedConfig::engine_config`], which
/// validates every field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Height assumed for items that have not been measured yet.
    pub estimated_item_height: PixelHeight,
    /// Extra items mounted on each side of the visible range.
    pub buffer: usize,
    /// Distance from the bottom (px) still treated as "at bottom".
    pub bottom_epsilon: f64,
    /// Quiet period after the last scroll sample before the feed counts as settled.
    pub settle_delay: Duration,
    /// Minimum spacing of applied scroll samples (one display frame).
    pub frame_interval: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            estimated_item_height: PixelHeight::DEFAULT_ESTIMATE,
            buffer: 3,
            bottom_epsilon: 10.0,
            settle_delay: Duration::from_millis(500),
            frame_interval: Duration::from_millis(16),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_engine_config_values() {
        let config = EngineConfig::default();
        assert_eq!(config.estimated_item_height.get(), 120.0);
        assert_eq!(config.buffer, 3);
        assert_eq!(config.bottom_epsilon, 10.0);
        assert_eq!(config.settle_delay, Duration::from_millis(500));
        assert_eq!(config.frame_interval, Duration::from_millis(16));
    }

    #[test]
    fn default_resolved_config_matches_engine_defaults() {
        let engine = ResolvedConfig::default()
            .engine_config()
            .expect("defaults are valid");
        assert_eq!(engine, EngineConfig::default());
    }
}
