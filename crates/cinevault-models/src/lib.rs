pub mod movie;
pub mod rating;
pub mod credential;
pub mod popular_cache;

pub use movie::{Movie, WatchedMovie, UNKNOWN_TITLE, NO_RATING};
pub use rating::{UserRating, RatingError};
pub use credential::Credential;
pub use popular_cache::PopularMoviesCache;
