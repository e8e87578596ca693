pub mod config;
pub mod paths;
pub mod secrets;

pub use config::{CatalogConfig, Config, StorageConfig, MAX_CACHE_TTL_SECS, MAX_POPULAR_LIMIT};
pub use paths::PathManager;
pub use secrets::{SecretStore, API_KEY_ENV};
