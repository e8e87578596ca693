use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Value of the `x-rapidapi-host` header
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_popular_limit")]
    pub popular_limit: usize,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
    /// No timeout unless set; the transport default applies
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Overrides the platform data directory
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

pub const MAX_POPULAR_LIMIT: usize = 100;

/// 30 days
pub const MAX_CACHE_TTL_SECS: u64 = 30 * 24 * 60 * 60;

fn default_base_url() -> String {
    "https://imdb8.p.rapidapi.com".to_string()
}

fn default_host() -> String {
    "imdb8.p.rapidapi.com".to_string()
}

fn default_popular_limit() -> usize {
    20
}

fn default_cache_ttl_secs() -> u64 {
    3600 // 1 hour
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            host: default_host(),
            popular_limit: default_popular_limit(),
            cache_ttl_secs: default_cache_ttl_secs(),
            request_timeout_secs: None,
        }
    }
}

impl CatalogConfig {
    /// Clamped to `MAX_CACHE_TTL_SECS`, so an unvalidated value cannot overflow
    pub fn cache_ttl(&self) -> chrono::Duration {
        let secs = self.cache_ttl_secs.min(MAX_CACHE_TTL_SECS) as i64;
        chrono::Duration::try_seconds(secs).unwrap_or_else(|| chrono::Duration::days(30))
    }

    pub fn request_timeout(&self) -> Option<std::time::Duration> {
        self.request_timeout_secs.map(std::time::Duration::from_secs)
    }
}

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the config file, falling back to defaults when it does not exist
    pub fn load_or_default(path: &PathBuf) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let catalog = &self.catalog;

        if !(catalog.base_url.starts_with("https://") || catalog.base_url.starts_with("http://")) {
            return Err(anyhow::anyhow!(
                "catalog.base_url must start with http:// or https://, got {}",
                catalog.base_url
            ));
        }

        if catalog.host.trim().is_empty() {
            return Err(anyhow::anyhow!("catalog.host cannot be empty"));
        }

        if catalog.popular_limit == 0 || catalog.popular_limit > MAX_POPULAR_LIMIT {
            return Err(anyhow::anyhow!(
                "catalog.popular_limit must be between 1 and {}, got {}",
                MAX_POPULAR_LIMIT,
                catalog.popular_limit
            ));
        }

        if catalog.cache_ttl_secs == 0 || catalog.cache_ttl_secs > MAX_CACHE_TTL_SECS {
            return Err(anyhow::anyhow!(
                "catalog.cache_ttl_secs must be between 1 and {}, got {}",
                MAX_CACHE_TTL_SECS,
                catalog.cache_ttl_secs
            ));
        }

        if catalog.request_timeout_secs == Some(0) {
            return Err(anyhow::anyhow!("catalog.request_timeout_secs must be positive when set"));
        }

        Ok(())
    }
}
