pub mod auth;
pub mod cache;
pub mod config;
pub mod context;
pub mod lists;
pub mod movies;
pub mod prompts;
pub mod spinner;
