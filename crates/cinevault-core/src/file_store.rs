use crate::storage::{KeyValueStore, StorageError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, trace};

/// Key/value store keeping one JSON file per key in a directory
///
/// Writes go to a temp file that is renamed over the target, and writes to
/// the same key are serialized through a per-key lock.
pub struct FileStore {
    dir: PathBuf,
    write_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            write_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '@' | '.'));
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }

    fn lock_for(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.write_locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(key.to_string()).or_default().clone()
    }
}

fn io_error(key: &str, source: std::io::Error) -> StorageError {
    StorageError::Io {
        key: key.to_string(),
        source,
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                trace!(key, bytes = content.len(), "Store read");
                Ok(Some(content))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(key, e)),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(key, e))?;

        let temp_path = path.with_extension("json.tmp");
        tokio::fs::write(&temp_path, value)
            .await
            .map_err(|e| io_error(key, e))?;
        tokio::fs::rename(&temp_path, &path)
            .await
            .map_err(|e| io_error(key, e))?;

        debug!(key, bytes = value.len(), "Store write");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(key, "Store remove");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{keys, load_json, save_json};

    #[tokio::test]
    async fn test_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("store"));

        assert_eq!(store.get(keys::USER).await.unwrap(), None);

        store.set(keys::USER, "a@b.com").await.unwrap();
        assert_eq!(store.get(keys::USER).await.unwrap().as_deref(), Some("a@b.com"));
        assert!(dir.path().join("store").join("user.json").exists());

        store.remove(keys::USER).await.unwrap();
        assert_eq!(store.get(keys::USER).await.unwrap(), None);

        // Removing again is fine
        store.remove(keys::USER).await.unwrap();
    }

    #[tokio::test]
    async fn test_values_survive_a_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = FileStore::new(dir.path());
            save_json(&store, keys::FAVORITES, &vec!["tt1", "tt2"]).await.unwrap();
        }

        let store = FileStore::new(dir.path());
        let loaded: Option<Vec<String>> = load_json(&store, keys::FAVORITES).await.unwrap();
        assert_eq!(loaded, Some(vec!["tt1".to_string(), "tt2".to_string()]));
    }

    #[tokio::test]
    async fn test_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        for key in ["", "../escape", ".hidden", "a/b"] {
            assert!(matches!(
                store.set(key, "x").await,
                Err(StorageError::InvalidKey(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_corrupt_json_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.set(keys::WATCHED_MOVIES, "{not json").await.unwrap();

        let result: Result<Option<Vec<String>>, _> = load_json(&store, keys::WATCHED_MOVIES).await;
        assert!(matches!(result, Err(StorageError::Decode { .. })));
    }

    #[tokio::test]
    async fn test_concurrent_writes_to_one_key_leave_a_whole_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::new(dir.path()));

        let writes = (0..16).map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                let value = format!("[{}]", vec![i.to_string(); 200].join(","));
                store.set(keys::WANT_TO_WATCH_MOVIES, &value).await
            })
        });
        for handle in futures::future::join_all(writes).await {
            handle.unwrap().unwrap();
        }

        let loaded: Option<Vec<u32>> = load_json(&*store, keys::WANT_TO_WATCH_MOVIES)
            .await
            .unwrap();
        let values = loaded.unwrap();
        assert_eq!(values.len(), 200);
        assert!(values.iter().all(|v| *v == values[0]));
    }
}
