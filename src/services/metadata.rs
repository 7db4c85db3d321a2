use std::cmp::Ordering;
use std::sync::Arc;

use strsim::normalized_levenshtein;

use crate::{
    error::AppResult,
    models::{tmdb::TmdbSearchResult, SeedRecord},
    services::providers::MetadataProvider,
};

/// Resolves seeds against the metadata provider
///
/// Title lookups pick the search hit whose title is closest to the query,
/// breaking ties on provider popularity, then fetch that hit's full detail record.
#[derive(Clone)]
pub struct MetadataClient {
    provider: Arc<dyn MetadataProvider>,
}

impl MetadataClient {
    pub fn new(provider: Arc<dyn MetadataProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &dyn MetadataProvider {
        self.provider.as_ref()
    }

    /// Resolves free text to the best-matching movie, `None` when the search is empty
    pub async fn resolve_by_title(&self, text: &str) -> AppResult<Option<SeedRecord>> {
        let results = self.provider.search_movies(text).await?;

        let Some(best) = best_match(text, &results) else {
            tracing::info!(query = %text, "Title search returned no results");
            return Ok(None);
        };

        tracing::debug!(
            query = %text,
            matched = %best.display_title(),
            tmdb_id = best.id,
            "Resolved title"
        );

        let details = self.provider.movie_details(best.id).await?;
        Ok(Some(SeedRecord::from(details)))
    }

    /// Resolves an IMDB id through the provider's cross-reference lookup
    pub async fn resolve_by_cross_id(&self, imdb_id: &str) -> AppResult<Option<SeedRecord>> {
        let ids = self.provider.find_by_imdb_id(imdb_id).await?;

        let Some(&tmdb_id) = ids.first() else {
            tracing::info!(imdb_id = %imdb_id, "No provider match for cross-reference id");
            return Ok(None);
        };

        let details = self.provider.movie_details(tmdb_id).await?;
        Ok(Some(SeedRecord::from(details)))
    }
}

/// Similarity ratio in [0, 1] between two titles, ignoring case and surrounding space
pub fn title_similarity(a: &str, b: &str) -> f64 {
    normalized_levenshtein(&a.trim().to_lowercase(), &b.trim().to_lowercase())
}

/// Highest (title similarity, popularity) hit; the earliest wins on a full tie
fn best_match<'a>(query: &str, results: &'a [TmdbSearchResult]) -> Option<&'a TmdbSearchResult> {
    let key = |r: &TmdbSearchResult| {
        (
            title_similarity(query, r.display_title()),
            r.popularity.unwrap_or(0.0),
        )
    };

    results.iter().fold(None, |best, candidate| match best {
        None => Some(candidate),
        Some(current) => {
            let (sim, pop) = key(candidate);
            let (best_sim, best_pop) = key(current);
            let ordering = sim
                .partial_cmp(&best_sim)
                .unwrap_or(Ordering::Equal)
                .then(pop.partial_cmp(&best_pop).unwrap_or(Ordering::Equal));
            if ordering == Ordering::Greater {
                Some(candidate)
            } else {
                Some(current)
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::tmdb::TmdbMovieDetails;
    use crate::services::providers::MockMetadataProvider;
    use mockall::predicate::eq;

    fn hit(id: u64, title: &str, popularity: f64) -> TmdbSearchResult {
        TmdbSearchResult {
            id,
            title: Some(title.to_string()),
            original_title: None,
            popularity: Some(popularity),
        }
    }

    fn details(id: u64, title: &str) -> TmdbMovieDetails {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": title,
            "overview": "A thief enters dreams.",
            "genres": [{"id": 878, "name": "Science Fiction"}],
            "original_language": "en",
            "release_date": "2010-07-15"
        }))
        .unwrap()
    }

    #[test]
    fn test_title_similarity_normalizes_case_and_space() {
        assert_eq!(title_similarity("  Inception ", "inception"), 1.0);
        assert!(title_similarity("Inception", "Interstellar") < 0.5);
    }

    #[test]
    fn test_best_match_prefers_closest_title() {
        let results = vec![
            hit(1, "Inception: The Cobol Job", 90.0),
            hit(2, "Inception", 10.0),
        ];
        assert_eq!(best_match("inception", &results).map(|r| r.id), Some(2));
    }

    #[test]
    fn test_best_match_breaks_ties_on_popularity() {
        let results = vec![hit(1, "Heat", 5.0), hit(2, "Heat", 40.0), hit(3, "Heat", 40.0)];
        assert_eq!(best_match("Heat", &results).map(|r| r.id), Some(2));
    }

    #[test]
    fn test_best_match_empty() {
        assert!(best_match("anything", &[]).is_none());
    }

    #[tokio::test]
    async fn test_resolve_by_title_fetches_details_of_best_hit() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_search_movies()
            .with(eq("Inception"))
            .returning(|_| Ok(vec![hit(64956, "Inception: The Cobol Job", 6.0), hit(27205, "Inception", 80.0)]));
        provider
            .expect_movie_details()
            .with(eq(27205))
            .times(1)
            .returning(|id| Ok(details(id, "Inception")));

        let client = MetadataClient::new(Arc::new(provider));
        let seed = client.resolve_by_title("Inception").await.unwrap().unwrap();

        assert_eq!(seed.id, Some(27205));
        assert_eq!(seed.genre, "science fiction");
        assert_eq!(seed.release_year, Some(2010));
    }

    #[tokio::test]
    async fn test_resolve_by_title_no_results() {
        let mut provider = MockMetadataProvider::new();
        provider.expect_search_movies().returning(|_| Ok(vec![]));
        provider.expect_movie_details().never();

        let client = MetadataClient::new(Arc::new(provider));
        assert_eq!(client.resolve_by_title("zzzz").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_resolve_by_title_propagates_provider_error() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_search_movies()
            .returning(|_| Err(AppError::Provider("TMDB API returned status 503".to_string())));

        let client = MetadataClient::new(Arc::new(provider));
        let result = client.resolve_by_title("Inception").await;
        assert!(matches!(result, Err(AppError::Provider(_))));
    }

    #[tokio::test]
    async fn test_resolve_by_cross_id() {
        let mut provider = MockMetadataProvider::new();
        provider
            .expect_find_by_imdb_id()
            .with(eq("tt1375666"))
            .returning(|_| Ok(vec![27205, 99]));
        provider
            .expect_movie_details()
            .with(eq(27205))
            .returning(|id| Ok(details(id, "Inception")));

        let client = MetadataClient::new(Arc::new(provider));
        let seed = client.resolve_by_cross_id("tt1375666").await.unwrap().unwrap();
        assert_eq!(seed.title, "Inception");
    }

    #[tokio::test]
    async fn test_resolve_by_cross_id_no_match() {
        let mut provider = MockMetadataProvider::new();
        provider.expect_find_by_imdb_id().returning(|_| Ok(vec![]));
        provider.expect_movie_details().never();

        let client = MetadataClient::new(Arc::new(provider));
        assert_eq!(client.resolve_by_cross_id("tt0000000").await.unwrap(), None);
    }
}
