use crate::error::CatalogError;
use crate::imdb::api;
use crate::traits::CatalogProvider;
use async_trait::async_trait;
use cinevault_models::Movie;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Connection settings for the imdb8 API on RapidAPI
#[derive(Debug, Clone)]
pub struct Imdb8Settings {
    pub base_url: String,
    pub host: String,
    pub api_key: String,
    pub timeout: Option<Duration>,
}

#[derive(Clone)]
pub struct Imdb8Client {
    client: Arc<Client>,
    base_url: String,
    host: String,
    api_key: String,
}

fn create_http_client(timeout: Option<Duration>) -> Client {
    let mut builder = Client::builder().user_agent(concat!("cinevault/", env!("CARGO_PKG_VERSION")));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().unwrap_or_else(|_| Client::new())
}

impl Imdb8Client {
    pub fn new(settings: Imdb8Settings) -> Self {
        Self {
            client: Arc::new(create_http_client(settings.timeout)),
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            host: settings.host,
            api_key: settings.api_key,
        }
    }

    /// GET an endpoint and return the body of a successful response
    async fn get_text(&self, path: &str, query: &[(&str, &str)]) -> Result<String, CatalogError> {
        if self.api_key.trim().is_empty() {
            return Err(CatalogError::MissingApiKey);
        }
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, ?query, "Catalog request");

        let response = self
            .client
            .get(&url)
            .query(query)
            .header("x-rapidapi-key", &self.api_key)
            .header("x-rapidapi-host", &self.host)
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!(path, "Catalog rate limit hit");
            return Err(CatalogError::RateLimited);
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(CatalogError::Unauthorized { status: status.as_u16() });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Http {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl CatalogProvider for Imdb8Client {
    fn provider_name(&self) -> &str {
        "imdb8"
    }

    async fn popular_ids(&self) -> Result<Vec<String>, CatalogError> {
        let body = self.get_text(api::POPULAR_PATH, &[]).await?;
        api::parse_popular_ids(&body)
    }

    async fn search(&self, query: &str) -> Result<Vec<Movie>, CatalogError> {
        let body = self.get_text(api::SEARCH_PATH, &[("q", query)]).await?;
        api::parse_search(&body)
    }

    async fn details(&self, id: &str) -> Result<Movie, CatalogError> {
        if !api::is_title_id(id) {
            return Err(CatalogError::InvalidRequest(format!("not a title id: {:?}", id)));
        }
        let body = self.get_text(api::DETAILS_PATH, &[("tconst", id)]).await?;
        api::parse_overview(id, &body)
    }
}
