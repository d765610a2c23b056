//! Animation Configuration
//!
//! Timing and behavior knobs for the character state machine, loaded from a
//! TOML file at `~/.config/owen/animation.toml`.
//!
//! # Configuration Priority
//!
//! Configuration values are loaded with the following priority (highest first):
//! 1. Programmatic overrides ([`ConfigOverrides`])
//! 2. Environment variables (`OWEN_*`)
//! 3. TOML configuration file
//! 4. Default values
//!
//! # Example Configuration
//!
//! ```toml
//! [timing]
//! fade_in_secs = 0.3
//! fade_out_secs = 0.3
//! quirk_fade_secs = 0.2
//! clip_poll_interval_ms = 16
//! clip_wait_timeout_ms = 10000
//!
//! [quirks]
//! interval_ms = 5000
//! probability = 0.3
//! seed = 42
//!
//! [inactivity]
//! timeout_ms = 60000
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value set programmatically through [`ConfigOverrides`]
    Override,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Override => write!(f, "override"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Timing section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingToml {
    /// Default fade-in duration in seconds
    pub fade_in_secs: Option<f32>,

    /// Default fade-out duration in seconds
    pub fade_out_secs: Option<f32>,

    /// Cross-fade used when a quirk interrupts an idle loop
    pub quirk_fade_secs: Option<f32>,

    /// How often clip completion is polled, in milliseconds
    pub clip_poll_interval_ms: Option<u64>,

    /// Upper bound on waiting for a clip to finish, in milliseconds
    pub clip_wait_timeout_ms: Option<u64>,
}

/// Quirk section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuirksToml {
    /// Time between quirk rolls in milliseconds
    pub interval_ms: Option<u64>,

    /// Chance that a roll plays a quirk
    pub probability: Option<f32>,

    /// Fixed RNG seed for reproducible quirks
    pub seed: Option<u64>,
}

/// Inactivity section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InactivityToml {
    /// Idle time before Owen falls asleep, in milliseconds
    pub timeout_ms: Option<u64>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationToml {
    /// Timing section
    pub timing: TimingToml,

    /// Quirk section
    pub quirks: QuirksToml,

    /// Inactivity section
    pub inactivity: InactivityToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Configuration for the Owen animation system
#[derive(Clone, Debug)]
pub struct OwenConfig {
    /// Fade-in used when a state plays its clips
    pub fade_in: Duration,

    /// Fade-out used when a state stops its clips
    pub fade_out: Duration,

    /// Cross-fade between idle loop and quirk
    pub quirk_fade: Duration,

    /// Time between quirk rolls in the wait state
    pub quirk_interval: Duration,

    /// Chance in `0.0..=1.0` that a roll plays a quirk
    pub quirk_probability: f32,

    /// Idle time before falling asleep
    pub inactivity_timeout: Duration,

    /// Poll interval for clip completion
    pub clip_poll_interval: Duration,

    /// Upper bound on waiting for a clip to finish
    pub clip_wait_timeout: Duration,

    /// RNG seed for quirk selection; entropy when `None`
    pub rng_seed: Option<u64>,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for OwenConfig {
    fn default() -> Self {
        Self {
            fade_in: Duration::from_millis(300),
            fade_out: Duration::from_millis(300),
            quirk_fade: Duration::from_millis(200),
            quirk_interval: Duration::from_secs(5),
            quirk_probability: 0.3,
            inactivity_timeout: Duration::from_secs(60),
            clip_poll_interval: Duration::from_millis(16),
            clip_wait_timeout: Duration::from_secs(10),
            rng_seed: None,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl OwenConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with `OWEN_*` environment overrides applied
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        apply_env_config(&mut config);
        config
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Set the configuration source
    pub fn set_source(&mut self, source: ConfigSource) {
        self.source = source;
    }

    /// Fade-in in seconds, as the engine expects
    #[must_use]
    pub fn fade_in_secs(&self) -> f32 {
        self.fade_in.as_secs_f32()
    }

    /// Fade-out in seconds, as the engine expects
    #[must_use]
    pub fn fade_out_secs(&self) -> f32 {
        self.fade_out.as_secs_f32()
    }

    /// Quirk cross-fade in seconds
    #[must_use]
    pub fn quirk_fade_secs(&self) -> f32 {
        self.quirk_fade.as_secs_f32()
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.quirk_probability) {
            return Err(ConfigError::ValidationError(format!(
                "quirk probability must be within 0.0..=1.0, got {}",
                self.quirk_probability
            )));
        }
        if self.quirk_interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "quirk interval must be greater than zero".to_string(),
            ));
        }
        if self.inactivity_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "inactivity timeout must be greater than zero".to_string(),
            ));
        }
        if self.clip_poll_interval.is_zero() {
            return Err(ConfigError::ValidationError(
                "clip poll interval must be greater than zero".to_string(),
            ));
        }
        if self.clip_wait_timeout < self.clip_poll_interval {
            return Err(ConfigError::ValidationError(
                "clip wait timeout must not be shorter than the poll interval".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/owen/animation.toml` or
/// `~/.config/owen/animation.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("owen").join("animation.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if
/// the resulting values fail [`OwenConfig::validate`].
/// A missing config file is not an error (defaults are used).
pub fn load_config() -> Result<OwenConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed,
/// or if the loaded values are out of range.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<OwenConfig, ConfigError> {
    let mut config = OwenConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: AnimationToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded animation configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config);
    config.validate()?;

    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut OwenConfig, toml: &AnimationToml) {
    if let Some(secs) = toml.timing.fade_in_secs {
        config.fade_in = secs_to_duration(secs);
    }
    if let Some(secs) = toml.timing.fade_out_secs {
        config.fade_out = secs_to_duration(secs);
    }
    if let Some(secs) = toml.timing.quirk_fade_secs {
        config.quirk_fade = secs_to_duration(secs);
    }
    if let Some(ms) = toml.timing.clip_poll_interval_ms {
        config.clip_poll_interval = Duration::from_millis(ms);
    }
    if let Some(ms) = toml.timing.clip_wait_timeout_ms {
        config.clip_wait_timeout = Duration::from_millis(ms);
    }

    if let Some(ms) = toml.quirks.interval_ms {
        config.quirk_interval = Duration::from_millis(ms);
    }
    if let Some(p) = toml.quirks.probability {
        config.quirk_probability = p;
    }
    if toml.quirks.seed.is_some() {
        config.rng_seed = toml.quirks.seed;
    }

    if let Some(ms) = toml.inactivity.timeout_ms {
        config.inactivity_timeout = Duration::from_millis(ms);
    }
}

/// Apply environment variable overrides to the config
fn apply_env_config(config: &mut OwenConfig) {
    apply_env_lookup(config, |key| std::env::var(key).ok());
}

/// Apply overrides from an arbitrary key lookup
fn apply_env_lookup<F>(config: &mut OwenConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let mut changed = false;

    if let Some(secs) = lookup("OWEN_FADE_IN_SECS").and_then(|v| v.parse::<f32>().ok()) {
        config.fade_in = secs_to_duration(secs);
        changed = true;
    }
    if let Some(secs) = lookup("OWEN_FADE_OUT_SECS").and_then(|v| v.parse::<f32>().ok()) {
        config.fade_out = secs_to_duration(secs);
        changed = true;
    }
    if let Some(secs) = lookup("OWEN_QUIRK_FADE_SECS").and_then(|v| v.parse::<f32>().ok()) {
        config.quirk_fade = secs_to_duration(secs);
        changed = true;
    }
    if let Some(ms) = lookup("OWEN_QUIRK_INTERVAL_MS").and_then(|v| v.parse::<u64>().ok()) {
        config.quirk_interval = Duration::from_millis(ms);
        changed = true;
    }
    if let Some(p) = lookup("OWEN_QUIRK_PROBABILITY").and_then(|v| v.parse::<f32>().ok()) {
        config.quirk_probability = p;
        changed = true;
    }
    if let Some(ms) = lookup("OWEN_INACTIVITY_TIMEOUT_MS").and_then(|v| v.parse::<u64>().ok()) {
        config.inactivity_timeout = Duration::from_millis(ms);
        changed = true;
    }
    if let Some(ms) = lookup("OWEN_CLIP_WAIT_TIMEOUT_MS").and_then(|v| v.parse::<u64>().ok()) {
        config.clip_wait_timeout = Duration::from_millis(ms);
        changed = true;
    }
    if let Some(ms) = lookup("OWEN_CLIP_POLL_INTERVAL_MS").and_then(|v| v.parse::<u64>().ok()) {
        config.clip_poll_interval = Duration::from_millis(ms);
        changed = true;
    }
    if let Some(seed) = lookup("OWEN_RNG_SEED").and_then(|v| v.parse::<u64>().ok()) {
        config.rng_seed = Some(seed);
        changed = true;
    }

    if changed {
        config.source = ConfigSource::Env;
    }
}

/// Whole milliseconds; negative and non-finite values clamp to zero
fn secs_to_duration(secs: f32) -> Duration {
    if !secs.is_finite() || secs <= 0.0 {
        return Duration::ZERO;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let millis = (f64::from(secs) * 1000.0).round() as u64;
    Duration::from_millis(millis)
}

// =============================================================================
// Programmatic Override Support
// =============================================================================

/// Builder for applying programmatic overrides to configuration
///
/// Use this after [`load_config`], typically from a host application or a
/// test harness that needs deterministic timing.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Quirk interval override
    pub quirk_interval: Option<Duration>,

    /// Quirk probability override
    pub quirk_probability: Option<f32>,

    /// Inactivity timeout override
    pub inactivity_timeout: Option<Duration>,

    /// Clip wait timeout override
    pub clip_wait_timeout: Option<Duration>,

    /// RNG seed override
    pub rng_seed: Option<u64>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set quirk interval override
    #[must_use]
    pub fn with_quirk_interval(mut self, interval: Duration) -> Self {
        self.quirk_interval = Some(interval);
        self
    }

    /// Set quirk probability override
    #[must_use]
    pub fn with_quirk_probability(mut self, probability: f32) -> Self {
        self.quirk_probability = Some(probability);
        self
    }

    /// Set inactivity timeout override
    #[must_use]
    pub fn with_inactivity_timeout(mut self, timeout: Duration) -> Self {
        self.inactivity_timeout = Some(timeout);
        self
    }

    /// Set clip wait timeout override
    #[must_use]
    pub fn with_clip_wait_timeout(mut self, timeout: Duration) -> Self {
        self.clip_wait_timeout = Some(timeout);
        self
    }

    /// Set RNG seed override
    #[must_use]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Apply overrides to a configuration
    pub fn apply(&self, config: &mut OwenConfig) {
        if self.quirk_interval.is_some()
            || self.quirk_probability.is_some()
            || self.inactivity_timeout.is_some()
            || self.clip_wait_timeout.is_some()
            || self.rng_seed.is_some()
        {
            config.source = ConfigSource::Override;
        }

        if let Some(interval) = self.quirk_interval {
            config.quirk_interval = interval;
        }
        if let Some(probability) = self.quirk_probability {
            config.quirk_probability = probability;
        }
        if let Some(timeout) = self.inactivity_timeout {
            config.inactivity_timeout = timeout;
        }
        if let Some(timeout) = self.clip_wait_timeout {
            config.clip_wait_timeout = timeout;
        }
        if self.rng_seed.is_some() {
            config.rng_seed = self.rng_seed;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    // =========================================================================
    // Default Configuration Tests
    // =========================================================================

    #[test]
    fn test_default_config() {
        let config = OwenConfig::default();

        assert_eq!(config.fade_in, Duration::from_millis(300));
        assert_eq!(config.fade_out, Duration::from_millis(300));
        assert_eq!(config.quirk_interval, Duration::from_secs(5));
        assert!((config.quirk_probability - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.inactivity_timeout, Duration::from_secs(60));
        assert_eq!(config.rng_seed, None);
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_path() {
        if let Some(p) = default_config_path() {
            assert!(p.to_string_lossy().contains("owen"));
            assert!(p.to_string_lossy().contains("animation.toml"));
        }
    }

    // =========================================================================
    // TOML Parsing Tests
    // =========================================================================

    #[test]
    fn test_parse_valid_toml() {
        let file = write_toml(
            r#"
[timing]
fade_in_secs = 0.5
quirk_fade_secs = 0.1
clip_wait_timeout_ms = 2000

[quirks]
interval_ms = 1000
probability = 1.0
seed = 7

[inactivity]
timeout_ms = 30000
"#,
        );

        let config = load_config_from_path(Some(file.path().to_path_buf())).unwrap();

        assert_eq!(config.fade_in, Duration::from_millis(500));
        assert_eq!(config.quirk_fade, Duration::from_millis(100));
        assert_eq!(config.clip_wait_timeout, Duration::from_secs(2));
        assert_eq!(config.quirk_interval, Duration::from_secs(1));
        assert!((config.quirk_probability - 1.0).abs() < f32::EPSILON);
        assert_eq!(config.rng_seed, Some(7));
        assert_eq!(config.inactivity_timeout, Duration::from_secs(30));
        assert_eq!(
            config.config_file_path.as_deref(),
            Some(file.path())
        );
    }

    #[test]
    fn test_parse_partial_toml_keeps_defaults() {
        let file = write_toml("[quirks]\ninterval_ms = 2500\n");
        let config = load_config_from_path(Some(file.path().to_path_buf())).unwrap();

        assert_eq!(config.quirk_interval, Duration::from_millis(2500));
        assert_eq!(config.fade_out, Duration::from_millis(300));
    }

    #[test]
    fn test_missing_file_graceful() {
        let path = PathBuf::from("/nonexistent/path/animation.toml");
        let config = load_config_from_path(Some(path)).unwrap();
        assert!(config.config_file_path.is_none());
    }

    #[test]
    fn test_malformed_toml_error() {
        let file = write_toml("[timing\nfade_in_secs = \"slow\"\n");
        let result = load_config_from_path(Some(file.path().to_path_buf()));
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_out_of_range_probability_rejected() {
        let file = write_toml("[quirks]\nprobability = 1.5\n");
        let result = load_config_from_path(Some(file.path().to_path_buf()));
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::ValidationError(_)
        ));
    }

    // =========================================================================
    // Environment Tests
    // =========================================================================

    #[test]
    fn test_env_lookup_overrides() {
        let vars: HashMap<&str, &str> = [
            ("OWEN_QUIRK_INTERVAL_MS", "750"),
            ("OWEN_FADE_IN_SECS", "0.05"),
            ("OWEN_RNG_SEED", "99"),
            ("OWEN_QUIRK_PROBABILITY", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = OwenConfig::default();
        apply_env_lookup(&mut config, |key| vars.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.quirk_interval, Duration::from_millis(750));
        assert_eq!(config.fade_in, Duration::from_millis(50));
        assert_eq!(config.rng_seed, Some(99));
        assert!((config.quirk_probability - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_env_lookup_covers_fade_and_polling() {
        let vars: HashMap<&str, &str> = [
            ("OWEN_QUIRK_FADE_SECS", "0.25"),
            ("OWEN_CLIP_POLL_INTERVAL_MS", "40"),
        ]
        .into_iter()
        .collect();

        let mut config = OwenConfig::default();
        apply_env_lookup(&mut config, |key| vars.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.quirk_fade, Duration::from_millis(250));
        assert_eq!(config.clip_poll_interval, Duration::from_millis(40));
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_env_lookup_without_vars_keeps_source() {
        let mut config = OwenConfig::default();
        apply_env_lookup(&mut config, |_| None);
        assert_eq!(config.source(), ConfigSource::Default);
    }

    // =========================================================================
    // Override Tests
    // =========================================================================

    #[test]
    fn test_overrides_apply() {
        let mut config = OwenConfig::default();
        ConfigOverrides::new()
            .with_quirk_interval(Duration::from_millis(100))
            .with_quirk_probability(1.0)
            .with_rng_seed(3)
            .apply(&mut config);

        assert_eq!(config.quirk_interval, Duration::from_millis(100));
        assert_eq!(config.rng_seed, Some(3));
        assert_eq!(config.source(), ConfigSource::Override);
    }

    #[test]
    fn test_empty_overrides_do_not_change_source() {
        let mut config = OwenConfig::default();
        ConfigOverrides::new().apply(&mut config);
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_negative_fade_clamps_to_zero() {
        assert_eq!(secs_to_duration(-1.0), Duration::ZERO);
        assert_eq!(secs_to_duration(f32::NAN), Duration::ZERO);
        assert_eq!(secs_to_duration(0.1), Duration::from_millis(100));
    }
}
