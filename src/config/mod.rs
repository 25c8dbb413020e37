use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::experiment::ResolutionPolicy;
use crate::domain::quality::GatePolicy;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default = "AppConfig::default_experiments_dir")]
    pub experiments_dir: PathBuf,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub gate: GatePolicy,
    #[serde(default)]
    pub resolution: ResolutionPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            experiments_dir: Self::default_experiments_dir(),
            logging: LoggingConfig::default(),
            gate: GatePolicy::default(),
            resolution: ResolutionPolicy::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    fn default_experiments_dir() -> PathBuf {
        PathBuf::from("experiments")
    }

    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.experiments_dir, PathBuf::from("experiments"));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.resolution.min_sample_size, 100);
    }

    #[test]
    fn test_deserializes_with_partial_input() {
        let config: AppConfig =
            serde_json::from_str(r#"{"experiments_dir": "/tmp/experiments"}"#).unwrap();
        assert_eq!(config.experiments_dir, PathBuf::from("/tmp/experiments"));
        assert_eq!(config.resolution.min_sample_size, 100);
    }
}
