//! Wire format of the imdb8 RapidAPI endpoints and its mapping onto [`Movie`].
//!
//! The structs below only describe the fields we read. serde ignores the rest,
//! but a payload missing a required field is rejected instead of producing a
//! half-empty movie.

use cinevault_models::{Movie, NO_RATING, UNKNOWN_TITLE};
use serde::Deserialize;
use crate::error::CatalogError;

pub const POPULAR_PATH: &str = "/title/get-most-popular-movies";
pub const SEARCH_PATH: &str = "/title/auto-complete";
pub const DETAILS_PATH: &str = "/title/get-overview-details";

/// Plot shown by the details view when the provider has none
pub const NO_SYNOPSIS: &str = "No synopsis available.";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OverviewDetails {
    pub title: OverviewTitle,
    #[serde(default)]
    pub ratings: Option<OverviewRatings>,
    #[serde(default)]
    pub plot_summary: Option<PlotText>,
    #[serde(default)]
    pub plot_outline: Option<PlotText>,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OverviewTitle {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub year: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ImageRef {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OverviewRatings {
    #[serde(default)]
    pub rating: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlotText {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AutoComplete {
    #[allow(dead_code)]
    pub q: String,
    /// Absent when nothing matched
    #[serde(default)]
    pub d: Vec<AutoCompleteHit>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AutoCompleteHit {
    pub id: String,
    #[serde(default)]
    pub l: Option<String>,
    #[serde(default)]
    pub i: Option<AutoCompleteImage>,
    #[serde(default)]
    pub y: Option<u32>,
    #[serde(default)]
    pub s: Option<String>,
    /// Aggregate score; a number or a preformatted string when present
    #[serde(default)]
    pub r: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AutoCompleteImage {
    pub image_url: String,
}

/// Whether `id` looks like an IMDb title const (`tt` followed by digits)
pub fn is_title_id(id: &str) -> bool {
    id.strip_prefix("tt")
        .map(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

/// Turn `/title/tt0111161/` into `tt0111161`
pub fn extract_title_id(path: &str) -> Option<String> {
    let id = path
        .trim()
        .trim_start_matches("/title/")
        .trim_end_matches('/');
    is_title_id(id).then(|| id.to_string())
}

pub(crate) fn parse_popular_ids(body: &str) -> Result<Vec<String>, CatalogError> {
    let paths: Vec<String> =
        serde_json::from_str(body).map_err(|e| CatalogError::parse(POPULAR_PATH, e))?;

    paths
        .iter()
        .map(|path| {
            extract_title_id(path).ok_or_else(|| {
                CatalogError::parse(POPULAR_PATH, format!("not a title path: {:?}", path))
            })
        })
        .collect()
}

/// Score carried by an auto-complete hit, `"N/A"` when absent or unusable
fn hit_rating(value: Option<serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::Number(n)) => format_rating(n.as_f64()),
        Some(serde_json::Value::String(text)) if !text.trim().is_empty() => text.trim().to_string(),
        _ => NO_RATING.to_string(),
    }
}

fn format_rating(rating: Option<f64>) -> String {
    rating
        .filter(|r| r.is_finite())
        .map(|r| format!("{:.1}", r))
        .unwrap_or_else(|| NO_RATING.to_string())
}

/// First four characters of an ISO date, when they are a year
fn year_from_release_date(date: &str) -> Option<String> {
    let year = date.get(..4)?;
    year.chars().all(|c| c.is_ascii_digit()).then(|| year.to_string())
}

pub(crate) fn parse_overview(id: &str, body: &str) -> Result<Movie, CatalogError> {
    let details: OverviewDetails =
        serde_json::from_str(body).map_err(|e| CatalogError::parse(DETAILS_PATH, e))?;
    Ok(overview_to_movie(id, details))
}

pub(crate) fn overview_to_movie(id: &str, details: OverviewDetails) -> Movie {
    let OverviewDetails {
        title,
        ratings,
        plot_summary,
        plot_outline,
        release_date,
    } = details;

    let year = release_date
        .as_deref()
        .and_then(year_from_release_date)
        .or_else(|| title.year.map(|y| y.to_string()));

    Movie {
        id: id.to_string(),
        title: title
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
        image: title.image.map(|i| i.url),
        rating: format_rating(ratings.and_then(|r| r.rating)),
        plot: plot_summary.or(plot_outline).map(|p| p.text),
        year,
    }
}

/// Search hits that are titles, mapped in provider order
///
/// Auto-complete also returns people (`nm…`) and other entities; those are
/// not movies and are dropped.
pub(crate) fn parse_search(body: &str) -> Result<Vec<Movie>, CatalogError> {
    let response: AutoComplete =
        serde_json::from_str(body).map_err(|e| CatalogError::parse(SEARCH_PATH, e))?;

    Ok(response
        .d
        .into_iter()
        .filter(|hit| is_title_id(&hit.id))
        .map(|hit| Movie {
            title: hit
                .l
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            image: hit.i.map(|i| i.image_url),
            rating: hit_rating(hit.r),
            plot: hit.s,
            year: hit.y.map(|y| y.to_string()),
            id: hit.id,
        })
        .collect())
}
