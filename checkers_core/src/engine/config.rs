use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MAX_DEPTH: u8 = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // Plies searched by the computer turn
    pub max_depth: u8,
    // Wall-clock budget per search, unlimited when absent
    pub time_limit_seconds: Option<f64>,
    pub alpha_beta_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            time_limit_seconds: None,
            alpha_beta_enabled: true,
        }
    }
}

impl EngineConfig {
    /// Parses a JSON object; missing fields keep their defaults.
    pub fn load_from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The time budget as a `Duration`. Negative or non-finite budgets are
    /// ignored.
    pub fn time_limit(&self) -> Option<Duration> {
        let seconds = self.time_limit_seconds?;
        match Duration::try_from_secs_f64(seconds) {
            Ok(limit) => Some(limit),
            Err(err) => {
                log::warn!("Ignoring time limit of {seconds}s: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_default() {
        let config = EngineConfig::load_from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.max_depth, 4);
        assert!(config.alpha_beta_enabled);
        assert_eq!(config.time_limit(), None);
    }

    #[test]
    fn test_load_config_partial() {
        let json = r#"{
            "max_depth": 6
        }"#;
        let config = EngineConfig::load_from_json(json).unwrap();
        assert_eq!(config.max_depth, 6);
        // Others should be default
        assert!(config.alpha_beta_enabled);
        assert_eq!(config.time_limit_seconds, None);
    }

    #[test]
    fn test_load_config_full() {
        let json = r#"{
            "max_depth": 3,
            "time_limit_seconds": 1.5,
            "alpha_beta_enabled": false
        }"#;
        let config = EngineConfig::load_from_json(json).unwrap();
        assert_eq!(config.max_depth, 3);
        assert!(!config.alpha_beta_enabled);
        assert_eq!(config.time_limit(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_load_config_invalid_json() {
        let result = EngineConfig::load_from_json("{ invalid json }");
        assert!(result.is_err());
    }

    #[test]
    fn test_negative_time_limit_is_ignored() {
        let config = EngineConfig {
            time_limit_seconds: Some(-1.0),
            ..EngineConfig::default()
        };
        assert_eq!(config.time_limit(), None);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = EngineConfig {
            max_depth: 7,
            time_limit_seconds: Some(0.25),
            alpha_beta_enabled: false,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(EngineConfig::load_from_json(&json).unwrap(), config);
    }
}
