use std::collections::HashSet;

use serde::Serialize;

use crate::{
    db::WatchHistoryStore,
    error::{AppError, AppResult},
    models::{CandidateRecord, DropStats, Ranking, SeedRecord},
    services::{
        aggregator,
        deadline::Deadline,
        harvester::{self, DEFAULT_MAX_HITS},
        metadata::MetadataClient,
        ranking,
        rows::{self, GateOutcome},
    },
};

/// Watch-history entries used as seeds at most
pub const HISTORY_SEEDS: usize = 5;

/// Seed titles shown in the `user` mode preview
pub const SEED_PREVIEW: usize = 3;

/// Per-request pipeline diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub raw_candidates: usize,
    pub filtered: usize,
    pub drop_reasons: DropStats,
    pub top: Vec<String>,
    pub used_fallback: bool,
    pub duration_ms: u64,
    pub budget_ms: u64,
}

/// Ranked output of one pipeline run
#[derive(Debug, Clone)]
pub struct Recommendation {
    /// Seed label shown to the caller
    pub seed: String,
    pub ranking: Ranking,
    pub diagnostics: Diagnostics,
}

/// Recommendations for a single title
///
/// Provider failures while resolving the seed are fatal; failures while
/// harvesting only shrink the candidate pool.
pub async fn recommend_similar(
    metadata: &MetadataClient,
    title: &str,
    deadline: &Deadline,
) -> AppResult<Recommendation> {
    let seed = metadata
        .resolve_by_title(title)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Title not found via TMDB: {}", title)))?;

    tracing::info!(query = %title, seed = %seed.title, "Seed resolved");

    let candidates = harvester::harvest(metadata.provider(), &seed, DEFAULT_MAX_HITS, deadline).await;
    let candidates = exclude_seeds(candidates, std::slice::from_ref(&seed));

    Ok(score(seed.title.clone(), &seed, &candidates, deadline))
}

/// Recommendations for the most recent watch-history entries
///
/// Entries that fail to resolve are skipped. Each seed is harvested in turn under
/// the same deadline and the pools are merged before ranking against the
/// composite seed.
pub async fn recommend_for_history(
    metadata: &MetadataClient,
    history: &dyn WatchHistoryStore,
    deadline: &Deadline,
) -> AppResult<Recommendation> {
    let entries = history.recent_entries(HISTORY_SEEDS).await?;

    let mut seeds: Vec<SeedRecord> = Vec::new();
    for imdb_id in entries
        .iter()
        .filter_map(|e| e.imdb_id.as_deref())
        .filter(|id| !id.trim().is_empty())
    {
        match metadata.resolve_by_cross_id(imdb_id).await {
            Ok(Some(seed)) => seeds.push(seed),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(imdb_id = %imdb_id, error = %e, "Skipping watch-history seed");
            }
        }
    }

    if seeds.is_empty() {
        return Err(AppError::NotFound("Watchlist is empty".to_string()));
    }

    let mut pool: Vec<CandidateRecord> = Vec::new();
    let mut seen: HashSet<u64> = HashSet::new();
    for seed in &seeds {
        let harvested = harvester::harvest(metadata.provider(), seed, DEFAULT_MAX_HITS, deadline).await;
        pool.extend(harvested.into_iter().filter(|c| seen.insert(c.id)));
    }
    let candidates = exclude_seeds(pool, &seeds);

    let composite = aggregator::combine(&seeds)
        .ok_or_else(|| AppError::Internal("No seeds to combine".to_string()))?;
    let label = seeds
        .iter()
        .take(SEED_PREVIEW)
        .map(|s| s.title.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    tracing::info!(seeds = seeds.len(), composite = %composite.title, "Composite seed built");

    Ok(score(label, &composite, &candidates, deadline))
}

fn exclude_seeds(candidates: Vec<CandidateRecord>, seeds: &[SeedRecord]) -> Vec<CandidateRecord> {
    let seed_ids: HashSet<u64> = seeds.iter().filter_map(|s| s.id).collect();
    candidates
        .into_iter()
        .filter(|c| !seed_ids.contains(&c.id))
        .collect()
}

fn score(
    label: String,
    seed: &SeedRecord,
    candidates: &[CandidateRecord],
    deadline: &Deadline,
) -> Recommendation {
    let GateOutcome {
        rows,
        stats,
        used_fallback,
    } = rows::build_rows_with_fallback(candidates);

    let ranking = ranking::rank(seed, &rows);

    let diagnostics = Diagnostics {
        raw_candidates: candidates.len(),
        filtered: rows.len(),
        drop_reasons: stats,
        top: ranking.top_titles.clone(),
        used_fallback,
        duration_ms: deadline.elapsed().as_millis() as u64,
        budget_ms: deadline.budget().as_millis() as u64,
    };

    tracing::info!(
        seed = %label,
        raw_candidates = diagnostics.raw_candidates,
        filtered = diagnostics.filtered,
        used_fallback,
        results = ranking.results.len(),
        elapsed_ms = diagnostics.duration_ms,
        "Recommendations ranked"
    );

    Recommendation {
        seed: label,
        ranking,
        diagnostics,
    }
}
