use std::collections::HashSet;
use std::time::Duration;

use chrono::NaiveDate;

use crate::{
    models::{genre, CandidateRecord, SeedRecord},
    services::{
        deadline::Deadline,
        providers::{DiscoverQuery, MetadataProvider},
    },
};

/// Discovery pages fetched per harvest at most
pub const MAX_PAGES: u32 = 3;

/// Default cap on unique candidates per harvest
pub const DEFAULT_MAX_HITS: usize = 120;

/// Server-side vote-count floor on discovery queries
pub const DISCOVER_MIN_VOTES: u64 = 3000;

/// Half-width of the release window around the seed year
pub const YEAR_WINDOW: i32 = 8;

/// Earliest year a release window may start at
pub const MIN_WINDOW_YEAR: i32 = 1900;

/// Budget that must remain before starting another page
pub const PAGE_MARGIN: Duration = Duration::from_millis(3000);

/// Budget that must remain before taking another record from a page
pub const RECORD_MARGIN: Duration = Duration::from_millis(2000);

/// Builds the first-page discovery query biased toward the seed
pub fn discover_query_for(seed: &SeedRecord) -> DiscoverQuery {
    let language = Some(seed.language.to_lowercase()).filter(|lang| !lang.is_empty());

    let (release_from, release_to) = match seed.release_year {
        Some(year) => (
            NaiveDate::from_ymd_opt((year - YEAR_WINDOW).max(MIN_WINDOW_YEAR), 1, 1),
            NaiveDate::from_ymd_opt(year + YEAR_WINDOW, 12, 31),
        ),
        None => (None, None),
    };

    DiscoverQuery {
        genre_id: genre::genre_id(&seed.genre),
        language,
        vote_count_gte: DISCOVER_MIN_VOTES,
        release_from,
        release_to,
        page: 1,
    }
}

/// Pulls a deduplicated candidate pool for `seed`
///
/// Pagination stops at the page cap, on a failed or empty page, once `max_hits`
/// unique candidates are collected, or when the shared deadline is nearly spent.
/// Provider failures end the harvest early and never surface as errors.
pub async fn harvest(
    provider: &dyn MetadataProvider,
    seed: &SeedRecord,
    max_hits: usize,
    deadline: &Deadline,
) -> Vec<CandidateRecord> {
    let base_query = discover_query_for(seed);
    let mut out: Vec<CandidateRecord> = Vec::new();
    let mut seen: HashSet<u64> = HashSet::new();

    'pages: for page in 1..=MAX_PAGES {
        if deadline.within(PAGE_MARGIN) {
            tracing::debug!(
                page,
                remaining_ms = deadline.remaining().as_millis() as u64,
                spent = deadline.spent(),
                "Harvest stopped: budget"
            );
            break;
        }

        let query = DiscoverQuery {
            page,
            ..base_query.clone()
        };

        let results = match provider.discover(&query).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(page, error = %e, provider = provider.name(), "Harvest stopped: page fetch failed");
                break;
            }
        };

        if results.is_empty() {
            tracing::debug!(page, "Harvest stopped: empty page");
            break;
        }

        for result in results {
            if deadline.within(RECORD_MARGIN) {
                break;
            }

            let Some(candidate) = result.into_candidate() else {
                continue;
            };
            if !seen.insert(candidate.id) {
                continue;
            }

            out.push(candidate);
            if out.len() >= max_hits {
                break 'pages;
            }
        }
    }

    tracing::info!(
        seed = %seed.title,
        candidates = out.len(),
        elapsed_ms = deadline.elapsed().as_millis() as u64,
        "Harvest completed"
    );

    out
}
