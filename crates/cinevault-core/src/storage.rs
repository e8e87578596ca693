use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Well-known keys in the key/value store
pub mod keys {
    pub const USER: &str = "user";
    pub const CREDENTIALS: &str = "credentials";
    pub const WATCHED_MOVIES: &str = "watchedMovies";
    pub const WANT_TO_WATCH_MOVIES: &str = "wantToWatchMovies";
    pub const FAVORITES: &str = "@cinevault_favorites";
    pub const POPULAR_MOVIES_CACHE: &str = "popularMoviesCache";
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed for key {key:?}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("stored value for key {key:?} is not valid JSON: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode value for key {key:?}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid storage key {0:?}")]
    InvalidKey(String),

    #[error("storage unavailable for key {key:?}: {reason}")]
    Unavailable { key: String, reason: String },
}

/// Device-local string key/value storage shared by every stateful component
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing a missing key is not an error
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Read and decode a JSON value; `None` when the key is absent
pub async fn load_json<T>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>, StorageError>
where
    T: DeserializeOwned,
{
    match store.get(key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Decode {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

pub async fn save_json<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), StorageError>
where
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &raw).await
}
