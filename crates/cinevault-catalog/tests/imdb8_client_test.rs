use std::collections::HashMap;
use std::net::SocketAddr;

use axum::extract::Query;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use cinevault_catalog::{CatalogError, CatalogProvider, Imdb8Client, Imdb8Settings};

const API_KEY: &str = "test-key";
const HOST: &str = "imdb8.p.rapidapi.com";

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("x-rapidapi-key").and_then(|v| v.to_str().ok()) == Some(API_KEY)
        && headers.get("x-rapidapi-host").and_then(|v| v.to_str().ok()) == Some(HOST)
}

fn json(body: String) -> axum::response::Response {
    (StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn popular(headers: HeaderMap) -> axum::response::Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    json(r#"["/title/tt0111161/", "/title/tt0068646/"]"#.to_string())
}

async fn auto_complete(Query(params): Query<HashMap<String, String>>) -> axum::response::Response {
    let q = params.get("q").cloned().unwrap_or_default();
    json(format!(
        r#"{{"q": "{}", "d": [{{"id": "tt0133093", "l": "The Matrix", "y": 1999}}]}}"#,
        q
    ))
}

async fn overview(Query(params): Query<HashMap<String, String>>) -> axum::response::Response {
    match params.get("tconst").map(String::as_str) {
        Some("tt0068646") => json(
            r#"{"title": {"title": "The Godfather", "year": 1972}, "ratings": {"rating": 9.2}}"#
                .to_string(),
        ),
        Some("tt0000429") => StatusCode::TOO_MANY_REQUESTS.into_response(),
        Some("tt0000500") => (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response(),
        _ => json(r#"{"unexpected": true}"#.to_string()),
    }
}

async fn start_server() -> (SocketAddr, tokio::task::JoinHandle<()>) {
    let app = Router::new()
        .route("/title/get-most-popular-movies", get(popular))
        .route("/title/auto-complete", get(auto_complete))
        .route("/title/get-overview-details", get(overview));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, handle)
}

fn client_for(addr: SocketAddr, api_key: &str) -> Imdb8Client {
    Imdb8Client::new(Imdb8Settings {
        base_url: format!("http://{}/", addr),
        host: HOST.to_string(),
        api_key: api_key.to_string(),
        timeout: None,
    })
}

#[tokio::test]
async fn test_popular_ids_sends_rapidapi_headers() {
    let (addr, _handle) = start_server().await;
    let client = client_for(addr, API_KEY);

    let ids = client.popular_ids().await.unwrap();
    assert_eq!(ids, vec!["tt0111161", "tt0068646"]);
}

#[tokio::test]
async fn test_wrong_api_key_is_unauthorized() {
    let (addr, _handle) = start_server().await;
    let client = client_for(addr, "wrong");

    let err = client.popular_ids().await.unwrap_err();
    assert!(matches!(err, CatalogError::Unauthorized { status: 401 }));
}

#[tokio::test]
async fn test_search_passes_query_through() {
    let (addr, _handle) = start_server().await;
    let client = client_for(addr, API_KEY);

    let movies = client.search("the matrix").await.unwrap();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].title, "The Matrix");
    assert_eq!(movies[0].year.as_deref(), Some("1999"));
}

#[tokio::test]
async fn test_details_maps_overview() {
    let (addr, _handle) = start_server().await;
    let client = client_for(addr, API_KEY);

    let movie = client.details("tt0068646").await.unwrap();
    assert_eq!(movie.id, "tt0068646");
    assert_eq!(movie.title, "The Godfather");
    assert_eq!(movie.rating, "9.2");
}

#[tokio::test]
async fn test_details_status_mapping() {
    let (addr, _handle) = start_server().await;
    let client = client_for(addr, API_KEY);

    assert!(client.details("tt0000429").await.unwrap_err().is_rate_limited());

    match client.details("tt0000500").await.unwrap_err() {
        CatalogError::Http { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "upstream exploded");
        }
        other => panic!("expected Http error, got {:?}", other),
    }

    assert!(matches!(
        client.details("tt0000001").await.unwrap_err(),
        CatalogError::Parse { .. }
    ));
}

#[tokio::test]
async fn test_details_rejects_non_title_ids_without_a_request() {
    let client = Imdb8Client::new(Imdb8Settings {
        base_url: "http://127.0.0.1:9".to_string(),
        host: HOST.to_string(),
        api_key: API_KEY.to_string(),
        timeout: None,
    });

    let err = client.details("nm0000206").await.unwrap_err();
    assert!(matches!(err, CatalogError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_missing_api_key_fails_before_any_request() {
    let client = Imdb8Client::new(Imdb8Settings {
        base_url: "http://127.0.0.1:9".to_string(),
        host: HOST.to_string(),
        api_key: String::new(),
        timeout: None,
    });

    assert!(matches!(
        client.popular_ids().await.unwrap_err(),
        CatalogError::MissingApiKey
    ));
}
