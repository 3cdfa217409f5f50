//! Configuration for the sync engine.
//!
//! Configuration is loaded from a TOML file (default: `outbox.toml`).

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration for the sync engine.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EngineConfig {
    /// Scheduler configuration.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Batch execution configuration.
    #[serde(default)]
    pub batch: BatchConfig,
    /// Retry configuration.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Queue configuration.
    #[serde(default)]
    pub queue: QueueConfig,
}

/// Scheduler configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Periodic sync interval in seconds (default: 30).
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

/// Batch execution configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    /// Delay between chunks in milliseconds (default: 500).
    ///
    /// Gives a recovering network path room to breathe between bursts.
    #[serde(default = "default_inter_batch_delay_ms")]
    pub inter_batch_delay_ms: u64,
    /// Upper bound on a single applier call in seconds (default: 30).
    /// Exceeding it is treated as a transient failure.
    #[serde(default = "default_apply_timeout_secs")]
    pub apply_timeout_secs: u64,
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Failed attempts before a conflict-class failure flags the action
    /// (default: 3).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

/// Queue configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// Maximum number of queued actions (default: 1000).
    #[serde(default = "default_max_queue_size")]
    pub max_size: usize,
}

impl EngineConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// The periodic sync interval as a [`Duration`].
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.scheduler.interval_secs)
    }

    /// The inter-chunk delay as a [`Duration`].
    pub fn inter_batch_delay(&self) -> Duration {
        Duration::from_millis(self.batch.inter_batch_delay_ms)
    }

    /// The per-applier-call timeout as a [`Duration`].
    pub fn apply_timeout(&self) -> Duration {
        Duration::from_secs(self.batch.apply_timeout_secs)
    }
}

// Default value functions
fn default_interval_secs() -> u64 {
    30
}

fn default_inter_batch_delay_ms() -> u64 {
    500
}

fn default_apply_timeout_secs() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_max_queue_size() -> usize {
    1000
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            inter_batch_delay_ms: default_inter_batch_delay_ms(),
            apply_timeout_secs: default_apply_timeout_secs(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            max_size: default_max_queue_size(),
        }
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML parse error.
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.scheduler.interval_secs, 30);
        assert_eq!(config.batch.inter_batch_delay_ms, 500);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.queue.max_size, 1000);
    }

    #[test]
    fn config_from_toml_string() {
        let toml = r#"
[scheduler]
interval_secs = 60

[batch]
inter_batch_delay_ms = 250
apply_timeout_secs = 10

[retry]
max_attempts = 5

[queue]
max_size = 200
"#;

        let config: EngineConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.scheduler.interval_secs, 60);
        assert_eq!(config.batch.inter_batch_delay_ms, 250);
        assert_eq!(config.batch.apply_timeout_secs, 10);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.queue.max_size, 200);
    }

    #[test]
    fn config_missing_fields_use_defaults() {
        let toml = r#"
[scheduler]
[batch]
[retry]
[queue]
"#;

        let config: EngineConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.scheduler.interval_secs, 30);
        assert_eq!(config.batch.apply_timeout_secs, 30);
    }

    #[test]
    fn config_missing_sections_use_defaults() {
        let config: EngineConfig = toml::from_str("").unwrap();
        assert_eq!(config.queue.max_size, 1000);
        assert_eq!(config.sync_interval(), Duration::from_secs(30));
        assert_eq!(config.inter_batch_delay(), Duration::from_millis(500));
    }
}
