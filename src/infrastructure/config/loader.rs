use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use reqwest::Url;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project configuration, created by hand or checked in.
pub const PROJECT_CONFIG_FILE: &str = ".doubletrust/config.yaml";

/// Untracked per-developer overrides.
pub const LOCAL_CONFIG_FILE: &str = ".doubletrust/local.yaml";

/// Prefix for nested environment overrides, e.g. `DOUBLETRUST_CACHE__RETRY_COUNT`.
pub const ENV_PREFIX: &str = "DOUBLETRUST_";

/// Shorthand for `api.base_url`.
pub const API_URL_ENV: &str = "DOUBLETRUST_API_URL";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid API base URL: {0}. Must be an http or https URL")]
    InvalidBaseUrl(String),

    #[error("Invalid timeout_secs: 0. Must be at least 1")]
    InvalidTimeout,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error(
        "Invalid retry configuration: retry_delay_ms ({0}) must not exceed max_retry_delay_ms ({1})"
    )]
    InvalidRetryDelay(u64, u64),

    #[error("Config file not found: {}", .0.display())]
    MissingFile(PathBuf),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .doubletrust/config.yaml (project config, optional)
    /// 3. .doubletrust/local.yaml (local overrides, optional)
    /// 4. Environment variables (DOUBLETRUST_* prefix, `__` for nesting)
    /// 5. DOUBLETRUST_API_URL
    pub fn load() -> Result<Config> {
        Self::load_with(None)
    }

    /// Load configuration, replacing the project files with `config_file`
    /// when one is given. Environment overrides still apply.
    pub fn load_with(config_file: Option<&Path>) -> Result<Config> {
        if let Some(path) = config_file {
            if !path.exists() {
                return Err(ConfigError::MissingFile(path.to_path_buf()).into());
            }
        }

        let config: Config = Self::figment(config_file)
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, without environment overrides
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::MissingFile(path.to_path_buf()).into());
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// The layered provider chain behind [`ConfigLoader::load_with`].
    pub fn figment(config_file: Option<&Path>) -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        let figment = match config_file {
            Some(path) => figment.merge(Yaml::file(path)),
            None => figment
                .merge(Yaml::file(PROJECT_CONFIG_FILE))
                .merge(Yaml::file(LOCAL_CONFIG_FILE)),
        };

        figment
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .merge(
                Env::raw()
                    .only(&[API_URL_ENV])
                    .map(|_| "api.base_url".into()),
            )
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        match Url::parse(&config.api.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && !url.cannot_be_a_base() => {}
            _ => return Err(ConfigError::InvalidBaseUrl(config.api.base_url.clone())),
        }

        if config.api.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        if config.cache.retry_delay_ms > config.cache.max_retry_delay_ms {
            return Err(ConfigError::InvalidRetryDelay(
                config.cache.retry_delay_ms,
                config.cache.max_retry_delay_ms,
            ));
        }

        Ok(())
    }
}
