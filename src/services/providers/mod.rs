//! Movie metadata provider abstraction
//!
//! The ranking pipeline only needs four lookups from a metadata source: free-text
//! search, detail fetch by native id, cross-reference lookup from an IMDB id, and a
//! paged discovery query. `TmdbProvider` implements them against TMDB v3.

use chrono::NaiveDate;

use crate::{
    error::AppResult,
    models::tmdb::{TmdbDiscoverResult, TmdbMovieDetails, TmdbSearchResult},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Sort order requested from `/discover/movie`
pub const DISCOVER_SORT: &str = "vote_count.desc";

/// Filters for one page of a discovery query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverQuery {
    pub genre_id: Option<u32>,
    pub language: Option<String>,
    pub vote_count_gte: u64,
    pub release_from: Option<NaiveDate>,
    pub release_to: Option<NaiveDate>,
    pub page: u32,
}

impl DiscoverQuery {
    /// Query-string parameters in provider terms
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("sort_by", DISCOVER_SORT.to_string()),
            ("vote_count.gte", self.vote_count_gte.to_string()),
            ("include_adult", "false".to_string()),
            ("page", self.page.to_string()),
        ];

        if let Some(genre_id) = self.genre_id {
            params.push(("with_genres", genre_id.to_string()));
        }
        if let Some(language) = &self.language {
            params.push(("with_original_language", language.clone()));
        }
        if let Some(from) = self.release_from {
            params.push(("primary_release_date.gte", from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.release_to {
            params.push(("primary_release_date.lte", to.format("%Y-%m-%d").to_string()));
        }

        params
    }
}

/// Trait for movie metadata providers
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Free-text title search
    async fn search_movies(&self, query: &str) -> AppResult<Vec<TmdbSearchResult>>;

    /// Full detail record by native provider id
    async fn movie_details(&self, id: u64) -> AppResult<TmdbMovieDetails>;

    /// Native ids of the movies matching an IMDB id
    async fn find_by_imdb_id(&self, imdb_id: &str) -> AppResult<Vec<u64>>;

    /// One page of a discovery query
    async fn discover(&self, query: &DiscoverQuery) -> AppResult<Vec<TmdbDiscoverResult>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
