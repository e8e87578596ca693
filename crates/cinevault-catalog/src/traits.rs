use async_trait::async_trait;
use cinevault_models::Movie;
use crate::error::CatalogError;

/// A movie metadata provider
///
/// Implementations own the provider's wire format and hand back canonical
/// [`Movie`] records. Caching and fallbacks live above this seam.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    fn provider_name(&self) -> &str;

    /// Ids of currently popular movies, most popular first
    async fn popular_ids(&self) -> Result<Vec<String>, CatalogError>;

    async fn search(&self, query: &str) -> Result<Vec<Movie>, CatalogError>;

    async fn details(&self, id: &str) -> Result<Movie, CatalogError>;
}
