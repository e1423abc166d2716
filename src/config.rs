use crate::error::{PetmapError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    10
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from("config.toml")?;

        // Environment wins over the file so deployments can point at a
        // different backend without editing config.toml
        if let Ok(base_url) = std::env::var("PETMAP_API_BASE_URL") {
            config.api.base_url = base_url;
        }

        Ok(config)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_content = fs::read_to_string(path).map_err(|e| {
            PetmapError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        Ok(config)
    }
}
