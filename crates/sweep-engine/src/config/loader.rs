use super::schema::SweepConfig;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. ./sweep.yaml
    /// 2. ~/.sweep/config.yaml
    /// 3. Default configuration
    pub async fn load_default() -> Result<SweepConfig, ConfigError> {
        let local_config = PathBuf::from("./sweep.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".sweep").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        Ok(SweepConfig::default())
    }

    pub async fn load_from(path: &Path) -> Result<SweepConfig, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: SweepConfig = serde_yaml::from_str(&content)?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}
