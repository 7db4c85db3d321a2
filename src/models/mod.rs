use serde::{Deserialize, Serialize};

pub mod genre;
pub mod parse;
pub mod tmdb;

pub use parse::{parse_count, parse_float, parse_year, NumericField, ParseFailure};

/// The movie used as the similarity baseline for a request
///
/// Built from a provider detail lookup, or synthesized from several seeds by
/// the seed aggregator (in which case `id` is `None`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeedRecord {
    pub id: Option<u64>,
    pub title: String,
    pub overview: String,
    /// Lower-cased primary genre name, empty when unknown
    pub genre: String,
    /// Lower-cased original-language code
    pub language: String,
    pub release_year: Option<i32>,
}

impl SeedRecord {
    /// Text tags projected into the candidates' term space
    pub fn tags(&self) -> String {
        [
            self.genre.as_str(),
            self.overview.as_str(),
            self.title.as_str(),
            self.language.as_str(),
        ]
        .join(" ")
        .to_lowercase()
    }
}

/// A movie discovered while harvesting
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRecord {
    pub id: u64,
    pub title: String,
    pub overview: String,
    pub genre_ids: Vec<u32>,
    pub language: String,
    pub release_date: String,
    pub vote_average: Option<NumericField>,
    pub vote_count: Option<NumericField>,
}

/// A candidate that passed the quality gate, projected to ranking fields
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredRow {
    pub id: u64,
    pub title: String,
    pub tags: String,
    pub rating: f64,
    pub votes: u64,
    pub year: Option<i32>,
    pub primary_genre: String,
    pub language: String,
}

/// Why candidates were rejected by the quality gate
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DropStats {
    pub detail_miss: usize,
    pub bad_votes: usize,
    pub bad_rating: usize,
    pub kept: usize,
}

impl DropStats {
    /// Total number of candidates this pass looked at
    pub fn examined(&self) -> usize {
        self.detail_miss + self.bad_votes + self.bad_rating + self.kept
    }
}

/// A recommended title and its blended score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResult {
    pub title: String,
    pub score: f64,
}

/// Ranked output of one request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking {
    pub results: Vec<RankedResult>,
    pub top_titles: Vec<String>,
}

/// One prior-watched entry from the watch-history store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchEntry {
    #[serde(rename = "imdbID", default)]
    pub imdb_id: Option<String>,
    #[serde(rename = "Title", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}
