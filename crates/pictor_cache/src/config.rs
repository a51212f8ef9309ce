//! Derivative cache configuration.

use chrono::TimeDelta;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the derivative cache.
///
/// # Example
///
/// ```
/// use pictor_cache::{DerivativeCacheConfig, DerivativeCacheConfigBuilder};
///
/// let config = DerivativeCacheConfigBuilder::default()
///     .max_age_secs(600)
///     .build()
///     .unwrap();
/// assert_eq!(*config.max_age_secs(), 600);
/// assert_eq!(*config.sweep_interval_secs(), 3600);
///
/// let tuned = DerivativeCacheConfig::default().with_default_quality(75);
/// assert_eq!(*tuned.default_quality(), 75);
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(default)]
pub struct DerivativeCacheConfig {
    /// Directory derivatives are written to
    #[serde(default = "default_scratch_dir")]
    scratch_dir: PathBuf,

    /// Age after which a derivative is evicted (seconds)
    #[serde(default = "default_max_age_secs")]
    max_age_secs: u64,

    /// Time between background sweeps (seconds)
    #[serde(default = "default_sweep_interval_secs")]
    sweep_interval_secs: u64,

    /// JPEG quality used when a conversion does not specify one (1-100)
    #[serde(default = "default_quality")]
    default_quality: u8,
}

fn default_scratch_dir() -> PathBuf {
    std::env::temp_dir().join("pictor")
}

fn default_max_age_secs() -> u64 {
    7200 // 2 hours
}

fn default_sweep_interval_secs() -> u64 {
    3600 // 1 hour
}

fn default_quality() -> u8 {
    90
}

impl Default for DerivativeCacheConfig {
    fn default() -> Self {
        Self {
            scratch_dir: default_scratch_dir(),
            max_age_secs: default_max_age_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            default_quality: default_quality(),
        }
    }
}

impl DerivativeCacheConfig {
    /// Maximum age as a chrono duration, for comparison against wall-clock stamps.
    ///
    /// Ages too large to represent saturate at [`TimeDelta::MAX`].
    pub fn max_age(&self) -> TimeDelta {
        i64::try_from(self.max_age_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }

    /// Sweep interval as a timer duration.
    pub fn sweep_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.sweep_interval_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = DerivativeCacheConfig::default();
        assert_eq!(*config.max_age_secs(), 7200);
        assert_eq!(*config.sweep_interval_secs(), 3600);
        assert_eq!(*config.default_quality(), 90);
        assert_eq!(config.max_age(), chrono::Duration::hours(2));
        assert_eq!(config.sweep_interval(), std::time::Duration::from_secs(3600));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: DerivativeCacheConfig =
            serde_json::from_str(r#"{"scratch_dir": "/var/tmp/pictor", "max_age_secs": 60}"#)
                .unwrap();
        assert_eq!(config.scratch_dir(), &PathBuf::from("/var/tmp/pictor"));
        assert_eq!(*config.max_age_secs(), 60);
        assert_eq!(*config.sweep_interval_secs(), 3600);
        assert_eq!(*config.default_quality(), 90);
    }

    #[test]
    fn huge_max_age_saturates() {
        let config = DerivativeCacheConfig::default().with_max_age_secs(u64::MAX);
        assert_eq!(config.max_age(), TimeDelta::MAX);

        let config = DerivativeCacheConfig::default().with_max_age_secs(i64::MAX as u64 / 1000 + 1);
        assert_eq!(config.max_age(), TimeDelta::MAX);
    }
}
