use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{info, warn};

use crate::types::ConfigError;

use super::{paths, Config};

/// Re-reads the config file on demand. Every load is all-or-nothing.
#[derive(Debug, Clone)]
pub struct ConfigSource {
    path: PathBuf,
}

impl ConfigSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Source pointing at the well-known config location
    pub fn from_env() -> Self {
        Self::new(paths::config_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<Config, ConfigError> {
        let config = Config::read(&self.path).await?;
        info!(user = %config.user, api_url = %config.api_url, "Loaded configuration");
        Ok(config)
    }

    /// Reload for a running loop: on failure the previous config is kept as is.
    pub async fn reload(&self, current: &mut Config) -> Result<(), ConfigError> {
        let fresh = Config::read(&self.path).await?;
        if fresh.display != current.display {
            warn!("Display settings changed; restart the service to apply them");
        }
        if fresh != *current {
            info!(user = %fresh.user, api_url = %fresh.api_url, "Configuration changed");
        }
        *current = fresh;
        Ok(())
    }
}

impl Config {
    async fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ConfigError::Io {
                    path: path.to_path_buf(),
                    source: err,
                }
            }
        })?;

        Self::parse(path, &contents)
    }

    fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        let config: Config =
            serde_json::from_str(contents).map_err(|err| ConfigError::Parse {
                path: path.to_path_buf(),
                source: err,
            })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.user.trim().is_empty() {
            return Err(ConfigError::Invalid("`user` must not be empty".to_string()));
        }
        if self.api_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "`api_url` must not be empty".to_string(),
            ));
        }
        if self.display.width == 0 || self.display.height == 0 {
            return Err(ConfigError::Invalid(
                "display dimensions must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
