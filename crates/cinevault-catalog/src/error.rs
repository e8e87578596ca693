use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog rate limit reached, try again later")]
    RateLimited,

    #[error("no catalog API key configured; set CINEVAULT_API_KEY or run `cinevault config set-api-key`")]
    MissingApiKey,

    #[error("catalog rejected the API key (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("catalog returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("unexpected response from {endpoint}: {reason}")]
    Parse { endpoint: String, reason: String },

    #[error("catalog request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid catalog request: {0}")]
    InvalidRequest(String),
}

impl CatalogError {
    pub fn parse(endpoint: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::Parse {
            endpoint: endpoint.into(),
            reason: reason.to_string(),
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited)
    }
}
