use crate::storage::{keys, load_json, save_json, KeyValueStore};
use crate::validation::validate_query;
use chrono::{DateTime, Duration, Utc};
use cinevault_catalog::{CatalogError, CatalogProvider, NO_SYNOPSIS};
use cinevault_models::{Movie, PopularMoviesCache};
use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

pub const DEFAULT_POPULAR_LIMIT: usize = 20;

pub fn default_cache_ttl() -> Duration {
    Duration::hours(1)
}

/// Read side of the movie catalog, with a read-through cache for the popular list
pub struct CatalogService {
    provider: Arc<dyn CatalogProvider>,
    store: Arc<dyn KeyValueStore>,
    cache_ttl: Duration,
    popular_limit: usize,
}

impl CatalogService {
    pub fn new(provider: Arc<dyn CatalogProvider>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            provider,
            store,
            cache_ttl: default_cache_ttl(),
            popular_limit: DEFAULT_POPULAR_LIMIT,
        }
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    pub fn with_popular_limit(mut self, limit: usize) -> Self {
        self.popular_limit = limit.max(1);
        self
    }

    pub fn provider_name(&self) -> &str {
        self.provider.provider_name()
    }

    pub async fn get_popular_movies(&self) -> Result<Vec<Movie>, CatalogError> {
        self.get_popular_movies_at(Utc::now()).await
    }

    /// `get_popular_movies` evaluated against an explicit clock reading
    pub async fn get_popular_movies_at(&self, now: DateTime<Utc>) -> Result<Vec<Movie>, CatalogError> {
        let cached = self.read_cache().await;

        if let Some(entry) = &cached {
            if entry.is_fresh(now, self.cache_ttl) {
                info!(
                    "Cache hit: popular movies ({} items, age {})",
                    entry.data.len(),
                    describe_age(entry, now)
                );
                return Ok(entry.data.clone());
            }
            debug!("Popular movies cache is stale (age {})", describe_age(entry, now));
        }

        match self.fetch_popular().await {
            Ok(movies) => {
                let entry = PopularMoviesCache::new(movies.clone(), now);
                if let Err(e) = save_json(self.store.as_ref(), keys::POPULAR_MOVIES_CACHE, &entry).await {
                    warn!("Failed to write popular movies cache: {}", e);
                }
                Ok(movies)
            }
            Err(CatalogError::RateLimited) => match cached {
                Some(entry) => {
                    warn!(
                        "Rate limited by {}, serving {} cached popular movies (age {})",
                        self.provider.provider_name(),
                        entry.data.len(),
                        describe_age(&entry, now)
                    );
                    Ok(entry.data)
                }
                None => {
                    error!("Rate limited by {} and no cached popular movies", self.provider.provider_name());
                    Err(CatalogError::RateLimited)
                }
            },
            Err(e) => {
                error!("Failed to fetch popular movies from {}: {}", self.provider.provider_name(), e);
                Err(e)
            }
        }
    }

    async fn read_cache(&self) -> Option<PopularMoviesCache> {
        match load_json(self.store.as_ref(), keys::POPULAR_MOVIES_CACHE).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Ignoring unreadable popular movies cache: {}", e);
                None
            }
        }
    }

    /// Popular ids followed by one detail lookup per id, run concurrently
    ///
    /// Failed lookups are dropped. When every lookup fails the first failure is
    /// returned (a rate limit wins) so an empty page never replaces the cache.
    async fn fetch_popular(&self) -> Result<Vec<Movie>, CatalogError> {
        let ids = self.provider.popular_ids().await?;
        let ids: Vec<String> = ids.into_iter().take(self.popular_limit).collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let lookups = ids.iter().map(|id| self.provider.details(id));
        let results = join_all(lookups).await;

        let mut movies = Vec::with_capacity(results.len());
        let mut first_error: Option<CatalogError> = None;
        for (id, result) in ids.iter().zip(results) {
            match result {
                Ok(movie) => movies.push(movie),
                Err(e) => {
                    debug!(id = %id, "Dropping popular movie after failed lookup: {}", e);
                    let replace = match &first_error {
                        None => true,
                        Some(existing) => !existing.is_rate_limited() && e.is_rate_limited(),
                    };
                    if replace {
                        first_error = Some(e);
                    }
                }
            }
        }

        if movies.is_empty() {
            if let Some(e) = first_error {
                return Err(e);
            }
        }

        info!("Fetched {} of {} popular movies", movies.len(), ids.len());
        Ok(movies)
    }

    /// Blank queries are rejected; anything else goes to the provider verbatim
    pub async fn search_movies(&self, query: &str) -> Result<Vec<Movie>, CatalogError> {
        validate_query(query).map_err(|e| CatalogError::InvalidRequest(e.to_string()))?;
        let movies = self.provider.search(query).await.map_err(|e| {
            error!("Search for {:?} failed: {}", query, e);
            e
        })?;
        debug!("Search for {:?} returned {} movies", query, movies.len());
        Ok(movies)
    }

    pub async fn get_details(&self, id: &str) -> Result<Movie, CatalogError> {
        let mut movie = self.provider.details(id.trim()).await.map_err(|e| {
            error!("Details lookup for {} failed: {}", id, e);
            e
        })?;
        if movie.plot.is_none() {
            movie.plot = Some(NO_SYNOPSIS.to_string());
        }
        Ok(movie)
    }

    pub async fn clear_popular_cache(&self) -> Result<(), crate::storage::StorageError> {
        self.store.remove(keys::POPULAR_MOVIES_CACHE).await?;
        info!("Cleared popular movies cache");
        Ok(())
    }
}

fn describe_age(entry: &PopularMoviesCache, now: DateTime<Utc>) -> String {
    match entry.age_at(now) {
        Some(age) => format!("{}s", age.num_seconds()),
        None => "out of range".to_string(),
    }
}
