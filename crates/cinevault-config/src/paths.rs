use anyhow::Result;
use std::path::PathBuf;

/// Container base path from `CINEVAULT_BASE_PATH`, defaulting to "/app"
fn container_base_path() -> PathBuf {
    std::env::var("CINEVAULT_BASE_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/app"))
}

#[derive(Debug, Clone)]
pub struct PathManager {
    config_dir: PathBuf,
    data_dir: PathBuf,
    log_dir: PathBuf,
}

impl PathManager {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
            .join("cinevault");

        Ok(Self::from_base(base_dir))
    }

    /// Lay everything out under a single directory
    pub fn from_base(base: PathBuf) -> Self {
        Self {
            config_dir: base.clone(),
            data_dir: base.join("data"),
            log_dir: base.join("logs"),
        }
    }

    pub fn from_docker_env() -> Self {
        Self::from_base(container_base_path())
    }

    /// Directory backing the key/value store
    pub fn store_dir(&self) -> PathBuf {
        self.data_dir.join("store")
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn secrets_file(&self) -> PathBuf {
        self.config_dir.join("secrets.toml")
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join("cinevault.log")
    }

    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        std::fs::create_dir_all(self.store_dir())?;
        Ok(())
    }
}

impl Default for PathManager {
    fn default() -> Self {
        // The container image creates the base directory; its presence means we run there
        let base = container_base_path();
        if base.exists() {
            return Self::from_docker_env();
        }

        Self::new().unwrap_or_else(|_| Self::from_docker_env())
    }
}
