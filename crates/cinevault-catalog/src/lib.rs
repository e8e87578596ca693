pub mod error;
pub mod traits;
pub mod imdb;

pub use error::CatalogError;
pub use traits::CatalogProvider;
pub use imdb::{Imdb8Client, Imdb8Settings, NO_SYNOPSIS};
