//! TMDB (The Movie Database) v3 provider
//!
//! API Flow:
//! 1. Title Search: /search/movie → candidate ids with popularity
//! 2. Details: /movie/{id} → full seed record
//! 3. Cross-reference: /find/{imdb_id}?external_source=imdb_id → TMDB id
//! 4. Discovery: /discover/movie → paged candidate pool sorted by vote count

use crate::{
    error::{AppError, AppResult},
    models::tmdb::{
        TmdbDiscoverResponse, TmdbDiscoverResult, TmdbFindResponse, TmdbMovieDetails,
        TmdbSearchResponse, TmdbSearchResult,
    },
    services::providers::{DiscoverQuery, MetadataProvider},
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbProvider {
    /// Creates a provider whose every call is bounded by `timeout`
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, params: &[(&str, String)]) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(path = %path, error = %e, "TMDB request failed");
                e
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(path = %path, status = %status, body = %body, "TMDB returned an error status");
            return Err(AppError::Provider(format!(
                "TMDB API returned status {} for {}: {}",
                status, path, body
            )));
        }

        let response_text = response.text().await?;
        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(path = %path, error = %e, "Failed to deserialize TMDB response");
            AppError::Provider(format!("Failed to parse TMDB response for {}: {}", path, e))
        })
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn search_movies(&self, query: &str) -> AppResult<Vec<TmdbSearchResult>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        let response: TmdbSearchResponse = self
            .get(
                "/search/movie",
                &[
                    ("query", query.to_string()),
                    ("include_adult", "false".to_string()),
                ],
            )
            .await?;

        tracing::debug!(
            query = %query,
            results = response.results.len(),
            provider = "tmdb",
            "Title search completed"
        );

        Ok(response.results)
    }

    async fn movie_details(&self, id: u64) -> AppResult<TmdbMovieDetails> {
        self.get(
            &format!("/movie/{}", id),
            &[("append_to_response", String::new())],
        )
        .await
    }

    async fn find_by_imdb_id(&self, imdb_id: &str) -> AppResult<Vec<u64>> {
        let response: TmdbFindResponse = self
            .get(
                &format!("/find/{}", imdb_id),
                &[("external_source", "imdb_id".to_string())],
            )
            .await?;

        Ok(response.movie_results.into_iter().map(|m| m.id).collect())
    }

    async fn discover(&self, query: &DiscoverQuery) -> AppResult<Vec<TmdbDiscoverResult>> {
        let params = query.to_params();
        let response: TmdbDiscoverResponse = self.get("/discover/movie", &params).await?;

        tracing::debug!(
            page = query.page,
            results = response.results.len(),
            provider = "tmdb",
            "Discover page fetched"
        );

        Ok(response.results)
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
