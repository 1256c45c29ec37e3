//! Configuration loader with layered sources.

use crate::validation::{format_validation_errors, ConfigValidator};
use crate::CacheConfig;
use config::{Config, ConfigError, Environment, File};
use sqlcache_core::CacheError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Prefix of environment variables that override file settings.
pub const ENV_PREFIX: &str = "SQLCACHE";

/// Variable selecting the environment-specific overlay file.
pub const ENVIRONMENT_VAR: &str = "SQLCACHE_ENVIRONMENT";

/// Configuration loader with runtime refresh support.
#[derive(Clone)]
pub struct ConfigLoader {
    config: Arc<RwLock<CacheConfig>>,
    config_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `{config_dir}/default.toml` - Default values
    /// 2. `{config_dir}/{environment}.toml` - Environment-specific overrides
    /// 3. `{config_dir}/local.toml` - Local overrides
    /// 4. Environment variables with `SQLCACHE__` prefix, e.g.
    ///    `SQLCACHE__DATABASE__URL`
    ///
    /// Missing files are skipped. The result is validated before it is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Configuration`] if a source cannot be parsed or
    /// the merged configuration fails validation.
    pub fn new(config_dir: impl AsRef<Path>) -> Result<Self, CacheError> {
        let config_dir = config_dir.as_ref().to_path_buf();
        let config = Self::load_config(&config_dir)?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            config_dir,
        })
    }

    /// Loads configuration from the default location (`./config`).
    ///
    /// # Errors
    ///
    /// See [`ConfigLoader::new`].
    pub fn from_default_location() -> Result<Self, CacheError> {
        Self::new("./config")
    }

    /// Returns the current configuration.
    pub async fn get(&self) -> CacheConfig {
        self.config.read().await.clone()
    }

    /// Reloads the configuration from disk.
    ///
    /// The previous configuration stays in place if loading fails.
    ///
    /// # Errors
    ///
    /// See [`ConfigLoader::new`].
    pub async fn reload(&self) -> Result<(), CacheError> {
        let new_config = Self::load_config(&self.config_dir)?;
        let mut config = self.config.write().await;
        *config = new_config;
        info!("Configuration reloaded successfully");
        Ok(())
    }

    /// Loads configuration from the specified directory.
    fn load_config(config_dir: &Path) -> Result<CacheConfig, CacheError> {
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let environment =
            std::env::var(ENVIRONMENT_VAR).unwrap_or_else(|_| "development".to_string());

        info!("Loading cache configuration for environment: {}", environment);

        let mut builder = Config::builder();

        for name in ["default", environment.as_str(), "local"] {
            let path = config_dir.join(format!("{}.toml", name));
            if path.exists() {
                debug!("Loading config from: {}", path.display());
                builder = builder.add_source(File::with_name(&path.to_string_lossy()).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let cache_config: CacheConfig = builder
            .build()
            .and_then(Config::try_deserialize)
            .map_err(config_error_to_cache_error)?;

        ConfigValidator::validate(&cache_config)
            .map_err(|errors| CacheError::Configuration(format_validation_errors(&errors)))?;

        debug!(
            backend = ?cache_config.database.backend(),
            table = %cache_config.table.qualified_name(),
            "Cache configuration loaded"
        );

        Ok(cache_config)
    }
}

fn config_error_to_cache_error(err: ConfigError) -> CacheError {
    CacheError::Configuration(err.to_string())
}
