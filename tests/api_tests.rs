use std::sync::Arc;

use axum::http::{Method, StatusCode};
use axum::{routing::get, Router};
use axum_test::TestServer;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use reelmatch_api::api::{create_router, with_layers, AppState};
use reelmatch_api::config::Config;
use reelmatch_api::db::WatchHistoryStore;
use reelmatch_api::error::AppResult;
use reelmatch_api::models::WatchEntry;
use reelmatch_api::services::providers::{MetadataProvider, TmdbProvider};

struct FixedHistory(Vec<&'static str>);

#[async_trait::async_trait]
impl WatchHistoryStore for FixedHistory {
    async fn recent_entries(&self, limit: usize) -> AppResult<Vec<WatchEntry>> {
        let skip = self.0.len().saturating_sub(limit);
        Ok(self
            .0
            .iter()
            .skip(skip)
            .map(|id| WatchEntry {
                imdb_id: Some(id.to_string()),
                title: None,
            })
            .collect())
    }
}

fn create_test_server(state: AppState) -> TestServer {
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

fn config_for(tmdb: &MockServer) -> Config {
    Config {
        tmdb_api_key: Some("test-key".to_string()),
        tmdb_api_url: tmdb.uri(),
        ..Config::default()
    }
}

fn state_with_history(tmdb: &MockServer, history: Option<FixedHistory>) -> AppState {
    let config = config_for(tmdb);
    let provider: Arc<dyn MetadataProvider> = Arc::new(
        TmdbProvider::new(
            "test-key".to_string(),
            tmdb.uri(),
            config.provider_timeout(),
        )
        .unwrap(),
    );
    let history = history.map(|h| Arc::new(h) as Arc<dyn WatchHistoryStore>);
    AppState::new(config, Some(provider), history)
}

fn discover_hit(id: u64, title: &str, genre_ids: &[u32], overview: &str, date: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "overview": overview,
        "genre_ids": genre_ids,
        "original_language": "en",
        "release_date": date,
        "vote_average": 8.1,
        "vote_count": 30000
    })
}

async fn mount_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "id": 27205, "title": "Inception", "popularity": 80.0 },
                { "id": 64956, "title": "Inception: The Cobol Job", "popularity": 5.0 }
            ]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/movie/27205"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 27205,
            "title": "Inception",
            "overview": "A thief who enters dreams to steal secrets is offered one last heist.",
            "genres": [{ "id": 878, "name": "Science Fiction" }],
            "original_language": "en",
            "release_date": "2010-07-15"
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/movie/157336"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 157336,
            "title": "Interstellar",
            "overview": "Explorers travel through a wormhole in space.",
            "genres": [{ "id": 878, "name": "Science Fiction" }],
            "original_language": "en",
            "release_date": "2014-11-05"
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/find/tt1375666"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "movie_results": [{ "id": 27205 }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/find/tt0816692"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "movie_results": [{ "id": 157336 }]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/discover/movie"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                discover_hit(27205, "Inception", &[878], "A thief who enters dreams.", "2010-07-15"),
                discover_hit(157336, "Interstellar", &[878], "Science fiction voyage through a wormhole where dreams of home persist.", "2014-11-05"),
                discover_hit(603, "The Matrix", &[878, 28], "A hacker learns his reality is a simulated dream.", "1999-03-30"),
                discover_hit(11036, "The Notebook", &[10749], "A poor young man and a rich young woman fall in love one summer.", "2004-06-25"),
                discover_hit(11324, "Shutter Island", &[53], "A marshal investigates a disappearance at an asylum.", "2010-02-14"),
                discover_hit(577922, "Tenet", &[878, 28], "A secret agent manipulates the flow of time to stop a heist of the future.", "2020-08-22"),
                discover_hit(77, "Memento", &[9648], "A man with short-term memory loss hunts his wife's killer.", "2000-10-11")
            ]
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/discover/movie"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .mount(server)
        .await;
}

fn titles(body: &Value) -> Vec<String> {
    body["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server(AppState::new(Config::default(), None, None));
    let response = server.get("/health").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "status": "healthy" }));
}

#[tokio::test]
async fn test_diag_reports_configuration() {
    let server = create_test_server(AppState::from_config(Config::default()).unwrap());
    let response = server
        .get("/recommendations")
        .add_query_param("mode", "diag")
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({ "tmdbKeyPresent": false, "userTableSet": false }));
    assert_eq!(
        response
            .header("access-control-allow-origin")
            .to_str()
            .unwrap(),
        "*"
    );
    assert!(!response.header("x-request-id").is_empty());
}

#[tokio::test]
async fn test_preflight_returns_no_content() {
    let server = create_test_server(AppState::new(Config::default(), None, None));
    let response = server
        .method(Method::OPTIONS, "/recommendations")
        .await;

    response.assert_status(StatusCode::NO_CONTENT);
    assert_eq!(
        response
            .header("access-control-allow-methods")
            .to_str()
            .unwrap(),
        "GET, POST, OPTIONS"
    );
    assert_eq!(
        response
            .header("access-control-allow-headers")
            .to_str()
            .unwrap(),
        "Content-Type, Authorization"
    );
    assert!(response.text().is_empty());
}

#[tokio::test]
async fn test_missing_title_is_bad_request() {
    let server = create_test_server(AppState::new(Config::default(), None, None));
    let response = server
        .get("/recommendations")
        .add_query_param("mode", "similar")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "error": "Missing 'title' query parameter" }));
}

#[tokio::test]
async fn test_unknown_mode_is_bad_request() {
    let server = create_test_server(AppState::new(Config::default(), None, None));
    let response = server
        .get("/recommendations")
        .add_query_param("mode", "trending")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({ "error": "Unknown mode: trending" }));
}

#[tokio::test]
async fn test_missing_key_is_generic_internal_error() {
    let server = create_test_server(AppState::new(Config::default(), None, None));
    let response = server
        .get("/recommendations")
        .add_query_param("title", "Inception")
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({ "error": "internal" }));
}

async fn exploding_handler() -> &'static str {
    panic!("ranking state corrupted")
}

#[tokio::test]
async fn test_handler_panic_is_generic_internal_error() {
    let app = with_layers(Router::new().route("/explode", get(exploding_handler)))
        .with_state(AppState::new(Config::default(), None, None));
    let server = TestServer::new(app).unwrap();

    let response = server.get("/explode").await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({ "error": "internal" }));
    assert_eq!(
        response
            .header("access-control-allow-origin")
            .to_str()
            .unwrap(),
        "*"
    );
    assert!(!response.header("x-request-id").is_empty());
}

#[tokio::test]
async fn test_similar_ranks_candidates() {
    let tmdb = MockServer::start().await;
    mount_catalog(&tmdb).await;
    let server = create_test_server(AppState::from_config(config_for(&tmdb)).unwrap());

    let response = server
        .get("/recommendations")
        .add_query_param("mode", "similar")
        .add_query_param("title", "inception")
        .add_query_param("debug", "1")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["mode"], "similar");
    assert_eq!(body["seed"], "Inception");

    let ranked = titles(&body);
    assert!(!ranked.is_empty());
    assert!(ranked.len() <= 10);
    assert!(!ranked.contains(&"Inception".to_string()));

    let position = |t: &str| ranked.iter().position(|r| r == t).unwrap();
    assert!(position("Interstellar") < position("The Notebook"));

    let scores: Vec<f64> = body["recommendations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["score"].as_f64().unwrap())
        .collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));

    let debug = &body["debug"];
    assert_eq!(debug["rawCandidates"], 6);
    assert_eq!(debug["filtered"], 6);
    assert_eq!(debug["dropReasons"]["kept"], 6);
    assert_eq!(debug["usedFallback"], false);
    assert_eq!(debug["budgetMs"], 23000);
}

#[tokio::test]
async fn test_similar_without_debug_has_no_diagnostics() {
    let tmdb = MockServer::start().await;
    mount_catalog(&tmdb).await;
    let server = create_test_server(AppState::from_config(config_for(&tmdb)).unwrap());

    let response = server
        .get("/recommendations")
        .add_query_param("title", "Inception")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert!(body.get("debug").is_none());
}

#[tokio::test]
async fn test_similar_unknown_title_is_not_found() {
    let tmdb = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search/movie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .mount(&tmdb)
        .await;
    let server = create_test_server(AppState::from_config(config_for(&tmdb)).unwrap());

    let response = server
        .get("/recommendations")
        .add_query_param("title", "Nonexistent Film")
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({ "error": "Title not found via TMDB: Nonexistent Film" }));
}

#[tokio::test]
async fn test_user_mode_aggregates_history() {
    let tmdb = MockServer::start().await;
    mount_catalog(&tmdb).await;
    let history = FixedHistory(vec!["tt1375666", "tt0000000", "tt0816692"]);
    let server = create_test_server(state_with_history(&tmdb, Some(history)));

    let response = server
        .get("/recommendations")
        .add_query_param("mode", "user")
        .add_query_param("debug", "1")
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["mode"], "user");
    assert_eq!(body["seed"], "Inception, Interstellar");

    let ranked = titles(&body);
    assert!(!ranked.contains(&"Inception".to_string()));
    assert!(!ranked.contains(&"Interstellar".to_string()));
    assert_eq!(body["debug"]["rawCandidates"], 5);
}

#[tokio::test]
async fn test_user_mode_with_empty_history_is_not_found() {
    let tmdb = MockServer::start().await;
    let server = create_test_server(state_with_history(&tmdb, Some(FixedHistory(vec![]))));

    let response = server
        .get("/recommendations")
        .add_query_param("mode", "user")
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({ "error": "Watchlist is empty" }));
}

#[tokio::test]
async fn test_user_mode_without_store_is_internal_error() {
    let tmdb = MockServer::start().await;
    let server = create_test_server(state_with_history(&tmdb, None));

    let response = server
        .get("/recommendations")
        .add_query_param("mode", "user")
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({ "error": "internal" }));
}
