//! Search configuration for the move search engine.

use crate::solver::Strategy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration loading errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Tuning knobs for [`MoveSearchEngine`](crate::MoveSearchEngine).
///
/// The defaults reproduce the stock opponent. Lowering `group_sample_limit`
/// makes it faster and weaker; the opponent is never guaranteed optimal.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Number of per-rank group alternative lists the exhaustive strategy samples.
    #[serde(default = "default_group_sample_limit")]
    pub group_sample_limit: usize,
    /// Also try reclaiming two board tiles, not just one.
    #[serde(default = "default_reclaim_pairs")]
    pub reclaim_pairs: bool,
    /// Strategies to try, in order. The first to place a tile wins.
    #[serde(default = "default_strategies")]
    pub strategies: Vec<Strategy>,
}

fn default_group_sample_limit() -> usize {
    6
}

fn default_reclaim_pairs() -> bool {
    true
}

fn default_strategies() -> Vec<Strategy> {
    Strategy::ALL.to_vec()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            group_sample_limit: default_group_sample_limit(),
            reclaim_pairs: default_reclaim_pairs(),
            strategies: default_strategies(),
        }
    }
}

impl SearchConfig {
    /// Load and validate configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load and validate configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SearchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.group_sample_limit == 0 {
            return Err(ConfigError::Invalid(
                "group_sample_limit must be at least 1".to_string(),
            ));
        }
        if self.strategies.is_empty() {
            return Err(ConfigError::Invalid(
                "strategies must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = SearchConfig::from_json("{}").unwrap();
        assert_eq!(config, SearchConfig::default());
        assert_eq!(config.group_sample_limit, 6);
        assert!(config.reclaim_pairs);
        assert_eq!(
            config.strategies,
            vec![Strategy::Simple, Strategy::Moderate, Strategy::Good, Strategy::Best]
        );
    }

    #[test]
    fn test_partial_override() {
        let config =
            SearchConfig::from_json(r#"{"group_sample_limit": 3, "strategies": ["best", "simple"]}"#)
                .unwrap();
        assert_eq!(config.group_sample_limit, 3);
        assert!(config.reclaim_pairs);
        assert_eq!(config.strategies, vec![Strategy::Best, Strategy::Simple]);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            SearchConfig::from_json(r#"{"group_sample_limit": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SearchConfig::from_json(r#"{"strategies": []}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SearchConfig::from_json(r#"{"strategies": ["perfect"]}"#),
            Err(ConfigError::Json(_))
        ));
        assert!(matches!(SearchConfig::from_json("not json"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = SearchConfig::load("/nonexistent/rummy-engine/config.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_round_trip_through_json() {
        let config = SearchConfig {
            group_sample_limit: 2,
            reclaim_pairs: false,
            strategies: vec![Strategy::Good],
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(SearchConfig::from_json(&json).unwrap(), config);
    }
}
