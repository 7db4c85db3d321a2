use serde::Deserialize;

use super::{genre, parse::NumericField, parse_year, CandidateRecord, SeedRecord};

// ============================================================================
// TMDB v3 API Types
// ============================================================================

/// Response of `/search/movie`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSearchResponse {
    #[serde(default)]
    pub results: Vec<TmdbSearchResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSearchResult {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub popularity: Option<f64>,
}

impl TmdbSearchResult {
    /// Display title, falling back to the original-language title
    pub fn display_title(&self) -> &str {
        non_empty(self.title.as_deref())
            .or_else(|| non_empty(self.original_title.as_deref()))
            .unwrap_or_default()
    }
}

/// Response of `/movie/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    #[serde(default)]
    pub id: Option<u32>,
    #[serde(default)]
    pub name: Option<String>,
}

impl TmdbMovieDetails {
    /// Lower-cased name of the first listed genre, resolved through the genre
    /// table when the provider omits the name
    pub fn primary_genre(&self) -> String {
        let Some(first) = self.genres.first() else {
            return String::new();
        };

        match first.name.as_deref().map(str::to_lowercase) {
            Some(name) if !name.is_empty() => name,
            _ => first
                .id
                .and_then(genre::genre_name)
                .unwrap_or_default()
                .to_string(),
        }
    }
}

impl From<TmdbMovieDetails> for SeedRecord {
    fn from(details: TmdbMovieDetails) -> Self {
        let genre = details.primary_genre();
        let title = non_empty(details.title.as_deref())
            .or_else(|| non_empty(details.original_title.as_deref()))
            .unwrap_or_default()
            .to_string();
        let release_year = details
            .release_date
            .as_deref()
            .and_then(|date| parse_year(date).ok());

        SeedRecord {
            id: Some(details.id),
            title,
            overview: details.overview.unwrap_or_default(),
            genre,
            language: details
                .original_language
                .unwrap_or_default()
                .to_lowercase(),
            release_year,
        }
    }
}

/// Response of `/find/{external_id}`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbFindResponse {
    #[serde(default)]
    pub movie_results: Vec<TmdbFindResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbFindResult {
    pub id: u64,
}

/// Response of `/discover/movie`
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbDiscoverResponse {
    #[serde(default)]
    pub results: Vec<TmdbDiscoverResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbDiscoverResult {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub original_title: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<NumericField>,
    #[serde(default)]
    pub vote_count: Option<NumericField>,
}

impl TmdbDiscoverResult {
    /// Converts a discover hit into a candidate; hits without a usable id are skipped
    pub fn into_candidate(self) -> Option<CandidateRecord> {
        let id = self.id.filter(|id| *id != 0)?;
        let title = non_empty(self.title.as_deref())
            .or_else(|| non_empty(self.original_title.as_deref()))
            .unwrap_or_default()
            .to_string();

        Some(CandidateRecord {
            id,
            title,
            overview: self.overview.unwrap_or_default(),
            genre_ids: self.genre_ids,
            language: self.original_language.unwrap_or_default().to_lowercase(),
            release_date: self.release_date.unwrap_or_default(),
            vote_average: self.vote_average,
            vote_count: self.vote_count,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
