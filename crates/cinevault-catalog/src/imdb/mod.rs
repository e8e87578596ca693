pub mod api;
pub mod client;

pub use api::{extract_title_id, is_title_id, NO_SYNOPSIS};
pub use client::{Imdb8Client, Imdb8Settings};
