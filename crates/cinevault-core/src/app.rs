use crate::catalog::CatalogService;
use crate::events::EventBus;
use crate::file_store::FileStore;
use crate::lists::ListManager;
use crate::session::SessionManager;
use crate::storage::KeyValueStore;
use cinevault_catalog::{CatalogProvider, Imdb8Client, Imdb8Settings};
use cinevault_config::{Config, PathManager};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Everything the application needs, wired together
///
/// All components share one store and one event bus. Subscribe to
/// [`App::events`] to follow state changes.
pub struct App {
    store: Arc<dyn KeyValueStore>,
    events: EventBus,
    session: SessionManager,
    lists: ListManager,
    catalog: CatalogService,
}

impl App {
    /// Build the file-backed application and load persisted state
    ///
    /// Without an API key the session and lists work normally and catalog
    /// calls fail with `CatalogError::MissingApiKey`.
    pub async fn open(config: &Config, paths: &PathManager, api_key: Option<String>) -> Result<Self, AppError> {
        config.validate().map_err(|e| AppError::Config(e.to_string()))?;
        if api_key.is_none() {
            warn!("No catalog API key configured");
        }

        let store_dir = match &config.storage.dir {
            Some(dir) => dir.join("store"),
            None => paths.store_dir(),
        };
        debug!(dir = %store_dir.display(), "Opening store");
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(store_dir));

        let provider: Arc<dyn CatalogProvider> = Arc::new(Imdb8Client::new(Imdb8Settings {
            base_url: config.catalog.base_url.clone(),
            host: config.catalog.host.clone(),
            api_key: api_key.unwrap_or_default(),
            timeout: config.catalog.request_timeout(),
        }));

        let app = Self::with_parts(store, provider, EventBus::new(), config);
        app.initialize().await;
        Ok(app)
    }

    /// Assemble from injected parts without touching storage
    pub fn with_parts(
        store: Arc<dyn KeyValueStore>,
        provider: Arc<dyn CatalogProvider>,
        events: EventBus,
        config: &Config,
    ) -> Self {
        let catalog = CatalogService::new(provider, store.clone())
            .with_cache_ttl(config.catalog.cache_ttl())
            .with_popular_limit(config.catalog.popular_limit);

        Self {
            session: SessionManager::new(store.clone(), events.clone()),
            lists: ListManager::new(store.clone(), events.clone()),
            catalog,
            store,
            events,
        }
    }

    /// Restore the session and load every list
    pub async fn initialize(&self) {
        self.session.initialize().await;
        self.lists.load().await;
        info!(
            user = ?self.session.current_user(),
            watched = self.lists.watched_movies().len(),
            want_to_watch = self.lists.want_to_watch_movies().len(),
            "Application state loaded"
        );
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn lists(&self) -> &ListManager {
        &self.lists
    }

    pub fn catalog(&self) -> &CatalogService {
        &self.catalog
    }
}
