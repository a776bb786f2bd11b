//! From trait implementations for RolloutError conversions

use super::types::RolloutError;

impl From<std::io::Error> for RolloutError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<serde_json::Error> for RolloutError {
    fn from(error: serde_json::Error) -> Self {
        Self::json(error.to_string())
    }
}

impl From<serde_yaml::Error> for RolloutError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::config_with_context(error.to_string(), "YAML")
    }
}

impl From<toml::de::Error> for RolloutError {
    fn from(error: toml::de::Error) -> Self {
        Self::config_with_context(error.to_string(), "TOML")
    }
}

