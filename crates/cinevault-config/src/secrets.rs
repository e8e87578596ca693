use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable that takes precedence over the stored API key
pub const API_KEY_ENV: &str = "CINEVAULT_API_KEY";

/// On-disk shape of `secrets.toml`
#[derive(Debug, Serialize, Deserialize, Default)]
struct SecretsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    catalog_api_key: Option<String>,
}

/// The catalog API key, kept out of `config.toml`
pub struct SecretStore {
    path: PathBuf,
    catalog_api_key: Option<String>,
}

impl SecretStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            catalog_api_key: None,
        }
    }

    /// A missing file leaves the store empty
    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let file: SecretsFile = toml::from_str(&content)?;
            self.catalog_api_key = file.catalog_api_key.filter(|k| !k.trim().is_empty());
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = SecretsFile {
            catalog_api_key: self.catalog_api_key.clone(),
        };
        std::fs::write(&self.path, toml::to_string_pretty(&file)?)?;
        Ok(())
    }

    pub fn get_catalog_api_key(&self) -> Option<&str> {
        self.catalog_api_key.as_deref()
    }

    pub fn set_catalog_api_key(&mut self, key: String) {
        self.catalog_api_key = Some(key);
    }

    /// API key from the environment, falling back to the stored one
    pub fn resolve_catalog_api_key(&self) -> Option<String> {
        self.resolve_with_env(std::env::var(API_KEY_ENV).ok())
    }

    fn resolve_with_env(&self, env_key: Option<String>) -> Option<String> {
        env_key
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.catalog_api_key.clone())
    }
}
