use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::constants::*;
use crate::error::{CatalogError, Result};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub catalog: CatalogConfig,
    pub scraper: ScraperConfig,
    pub output: OutputConfig,
}

/// Where Mode A fetches the catalog from.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub url: String,
    pub path: PathBuf,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub forum_url: String,
    pub base_url: String,
    pub user_agent: String,
    pub limit: usize,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub data_dir: PathBuf,
    pub js_dir: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_CATALOG_URL.to_string(),
            path: PathBuf::from(DEFAULT_CATALOG_PATH),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            forum_url: DEFAULT_FORUM_URL.to_string(),
            base_url: DEFAULT_FORUM_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            limit: DEFAULT_THREAD_LIMIT,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            js_dir: PathBuf::from(DEFAULT_JS_DIR),
        }
    }
}

impl OutputConfig {
    pub fn json_path(&self) -> PathBuf {
        self.data_dir.join(CATALOG_JSON_FILE)
    }

    pub fn js_path(&self) -> PathBuf {
        self.js_dir.join(CATALOG_JS_FILE)
    }
}

impl Config {
    /// Loads `config.toml` from the working directory, falling back to
    /// defaults when it does not exist, then applies environment overrides.
    pub fn load() -> Result<Self> {
        let path = Path::new(CONFIG_FILE);
        let config = if path.exists() {
            Self::load_from(path)?
        } else {
            info!("No {} found, using defaults", CONFIG_FILE);
            Self::default()
        };
        Ok(config.with_env_overrides())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CatalogError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;
        let config = Self::parse(&content)?;
        debug!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.scraper.limit == 0 {
            return Err(CatalogError::Config("scraper.limit must be greater than zero".into()));
        }
        if self.catalog.url.trim().is_empty() {
            return Err(CatalogError::Config("catalog.url must not be empty".into()));
        }
        Ok(())
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(ENV_CATALOG_URL) {
            if !url.trim().is_empty() {
                self.catalog.url = url;
            }
        }
        if let Ok(url) = std::env::var(ENV_FORUM_URL) {
            if !url.trim().is_empty() {
                self.scraper.forum_url = url;
            }
        }
        self
    }
}
