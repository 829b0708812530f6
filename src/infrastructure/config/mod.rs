use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};
use crate::domain::import_settings::{ImportSettings, OptionLettering};

pub const CONFIG_FILE: &str = "quizbank.toml";
pub const ENV_PREFIX: &str = "QUIZBANK_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the JSON store files
    pub data_dir: PathBuf,
    /// Fixed key the question bank lives under
    pub store_key: String,
    pub preview_limit: usize,
    pub option_lettering: OptionLettering,
    pub max_upload_bytes: usize,
    /// `tracing_subscriber::EnvFilter` directive
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            data_dir: PathBuf::from("data"),
            store_key: "voltKickQuestions".to_string(),
            preview_limit: 5,
            option_lettering: OptionLettering::Positional,
            max_upload_bytes: 5 * 1024 * 1024,
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Defaults, then `quizbank.toml`, then `QUIZBANK_*` environment variables.
    pub fn load() -> Result<Self> {
        Self::from_figment(
            Figment::from(Serialized::defaults(AppConfig::default()))
                .merge(Toml::file(CONFIG_FILE))
                .merge(Env::prefixed(ENV_PREFIX)),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: AppConfig = figment
            .extract()
            .map_err(|e| AppError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(AppError::ConfigError("port must be > 0".to_string()));
        }
        if self.store_key.trim().is_empty() {
            return Err(AppError::ConfigError("store_key must not be empty".to_string()));
        }
        if self.preview_limit == 0 {
            return Err(AppError::ConfigError("preview_limit must be > 0".to_string()));
        }
        if self.max_upload_bytes == 0 {
            return Err(AppError::ConfigError("max_upload_bytes must be > 0".to_string()));
        }
        Ok(())
    }

    pub fn import_settings(&self) -> ImportSettings {
        ImportSettings {
            preview_limit: self.preview_limit,
            option_lettering: self.option_lettering,
        }
    }
}
