use brickd_core::EngineConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "brickd.config.json";

/// brickd project configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Page document the commands operate on by default
    #[serde(default = "default_page")]
    pub page: String,

    /// Engine settings (key seed, history depth, component palette, platform)
    #[serde(flatten)]
    pub engine: EngineConfig,
}

fn default_page() -> String {
    "page.json".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Absolute path to the page document
    pub fn get_page_path(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.page)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page: default_page(),
            engine: EngineConfig::default(),
        }
    }
}
