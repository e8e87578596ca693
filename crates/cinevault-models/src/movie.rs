use serde::{Deserialize, Serialize};
use crate::rating::UserRating;

/// Placeholder title used when the provider omits one
pub const UNKNOWN_TITLE: &str = "Unknown title";

/// Provider rating used when no aggregate score is available
pub const NO_RATING: &str = "N/A";

/// Canonical movie record
///
/// Every catalog response is normalized into this shape before it reaches the
/// rest of the application, and it is the shape stored in the user's lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default = "default_rating")]
    pub rating: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
}

fn default_rating() -> String {
    NO_RATING.to_string()
}

impl Movie {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image: None,
            rating: default_rating(),
            plot: None,
            year: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_rating(mut self, rating: impl Into<String>) -> Self {
        self.rating = rating.into();
        self
    }

    pub fn with_plot(mut self, plot: impl Into<String>) -> Self {
        self.plot = Some(plot.into());
        self
    }

    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    pub fn has_rating(&self) -> bool {
        self.rating != NO_RATING
    }
}

/// A movie the user has watched, with their own score
///
/// `user_rating` is the viewer's personal score and is unrelated to the
/// provider's aggregate `rating`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchedMovie {
    #[serde(flatten)]
    pub movie: Movie,
    #[serde(rename = "userRating")]
    pub user_rating: UserRating,
}

impl WatchedMovie {
    pub fn new(movie: Movie, user_rating: UserRating) -> Self {
        Self { movie, user_rating }
    }

    pub fn id(&self) -> &str {
        &self.movie.id
    }
}
