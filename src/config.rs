//! Scheduler configuration.
//!
//! Loads run settings from TOML so the search order can be changed
//! without code changes.
//!
//! # Examples
//!
//! ```
//! use timetable_engine::config::{SchedulerConfig, SearchOrderKind};
//!
//! let config = SchedulerConfig::from_toml_str(r#"
//!     random_seed = 42
//!     search_order = "shuffled"
//! "#).unwrap();
//!
//! assert_eq!(config.random_seed, Some(42));
//! assert_eq!(config.search_order, SearchOrderKind::Shuffled);
//! ```
//!
//! Use the default config when the file is missing:
//!
//! ```
//! use timetable_engine::config::SchedulerConfig;
//!
//! let config = SchedulerConfig::load("timetable.toml").unwrap_or_default();
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// How candidate days, periods and subjects are ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchOrderKind {
    /// Pseudorandom order, seeded by `random_seed` if set.
    #[default]
    Shuffled,
    /// Candidates tried in their natural order.
    Fixed,
}

/// Scheduler configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct SchedulerConfig {
    /// Random seed for reproducible timetables.
    #[serde(default)]
    pub random_seed: Option<u64>,

    /// Search order.
    #[serde(default)]
    pub search_order: SearchOrderKind,
}

impl SchedulerConfig {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Sets the random seed.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Sets the search order.
    pub fn with_search_order(mut self, order: SearchOrderKind) -> Self {
        self.search_order = order;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = SchedulerConfig::from_toml_str("").unwrap();
        assert_eq!(config, SchedulerConfig::default());
        assert_eq!(config.search_order, SearchOrderKind::Shuffled);
        assert!(config.random_seed.is_none());
    }

    #[test]
    fn test_fixed_order() {
        let config = SchedulerConfig::from_toml_str(r#"search_order = "fixed""#).unwrap();
        assert_eq!(config.search_order, SearchOrderKind::Fixed);
    }

    #[test]
    fn test_invalid_toml() {
        let err = SchedulerConfig::from_toml_str("random_seed = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = SchedulerConfig::load("/nonexistent/timetable.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
        assert!(err.to_string().starts_with("IO error"));
    }

    #[test]
    fn test_builders() {
        let config = SchedulerConfig::new()
            .with_random_seed(7)
            .with_search_order(SearchOrderKind::Fixed);
        assert_eq!(config.random_seed, Some(7));
        assert_eq!(config.search_order, SearchOrderKind::Fixed);
    }

    #[test]
    fn test_serialize_round_trip() {
        let config = SchedulerConfig::new().with_random_seed(3);
        let text = toml::to_string(&config).unwrap();
        assert_eq!(SchedulerConfig::from_toml_str(&text).unwrap(), config);
    }
}
