use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use validator::Validate;

use crate::domain::app_config::AppConfig;
use crate::domain::error::{AppError, Result};

const DEFAULT_CONFIG_FILE: &str = "bug_classifier.toml";
const CONFIG_PATH_VAR: &str = "BUG_CLASSIFIER_CONFIG";
const ENV_PREFIX: &str = "BUG_CLASSIFIER_";

pub struct ConfigService {
    config_path: PathBuf,
}

impl ConfigService {
    pub fn new() -> Self {
        let config_path = std::env::var(CONFIG_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self { config_path }
    }

    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Defaults, then the TOML file (if present), then `BUG_CLASSIFIER_*` variables
    pub fn load(&self) -> Result<AppConfig> {
        let figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(&self.config_path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::extract(figment)
    }

    fn extract(figment: Figment) -> Result<AppConfig> {
        let config: AppConfig = figment.extract()?;
        config
            .validate()
            .map_err(|e| AppError::ConfigError(format!("Invalid configuration: {}", e)))?;
        Ok(config)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}
