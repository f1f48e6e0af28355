// Store Configuration (layered: files, then DAOKIT_* environment)

use config::{Config, ConfigError, Environment, File, Map};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Connection pool settings for the shared store
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// e.g. `sqlite://daokit.db` or `sqlite::memory:`
    pub database_url: String,
    pub max_connections: u32,
    /// How long a statement waits on a locked database
    pub busy_timeout_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://daokit.db".to_string(),
            max_connections: 10,
            busy_timeout_secs: 5,
        }
    }
}

impl StoreConfig {
    /// Load configuration in order:
    /// 1. `{config_dir}/default.toml`
    /// 2. `{config_dir}/local.toml` (not committed)
    /// 3. Environment variables with `DAOKIT_` prefix (`DAOKIT_DATABASE_URL`, ...)
    pub fn load_from(config_dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_layered(config_dir.as_ref(), None)
    }

    /// `env` replaces the process environment when set
    fn load_layered(
        config_dir: &Path,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        for name in ["default.toml", "local.toml"] {
            let path = config_dir.join(name);
            if path.exists() {
                debug!(path = %path.display(), "Loading store config");
                builder = builder.add_source(File::from(path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("DAOKIT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let store_config: StoreConfig = builder.build()?.try_deserialize()?;
        store_config.validate()?;
        Ok(store_config)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_secs(self.busy_timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database_url.trim().is_empty() {
            return Err(ConfigError::Message("database_url is required".to_string()));
        }
        if self.max_connections == 0 {
            return Err(ConfigError::Message(
                "max_connections must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
