use std::collections::HashSet;

use crate::models::{
    genre, parse_count, parse_float, parse_year, CandidateRecord, DropStats, FilteredRow,
};

/// Minimum average rating (0-10) a candidate needs in every tier
pub const RATING_FLOOR: f64 = 6.2;

/// Vote-count floor of the strict first pass
pub const VOTES_FLOOR_PRIMARY: u64 = 15_000;

/// Vote-count floor of the relaxed second pass
pub const VOTES_FLOOR_BACKOFF: u64 = 3_000;

/// Below this many kept rows the backoff pass runs
pub const MIN_VIABLE_ROWS: usize = 5;

/// Candidates examined per pass at most
pub const MAX_ROWS: usize = 200;

/// Filtered rows plus gate diagnostics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GateOutcome {
    pub rows: Vec<FilteredRow>,
    pub stats: DropStats,
    pub used_fallback: bool,
}

/// Space-joined genre names, overview, title and language, lower-cased
pub fn build_tags(candidate: &CandidateRecord) -> String {
    let genre_names = candidate
        .genre_ids
        .iter()
        .filter_map(|id| genre::genre_name(*id))
        .collect::<Vec<_>>()
        .join(" ");

    [
        genre_names.as_str(),
        candidate.overview.as_str(),
        candidate.title.as_str(),
        candidate.language.as_str(),
    ]
    .join(" ")
    .trim()
    .to_lowercase()
}

/// Applies the quality gate to the first `MAX_ROWS` candidates
pub fn build_rows(candidates: &[CandidateRecord], votes_floor: u64) -> (Vec<FilteredRow>, DropStats) {
    let mut stats = DropStats::default();
    let mut rows = Vec::new();

    for candidate in candidates.iter().take(MAX_ROWS) {
        let votes = match parse_count(candidate.vote_count.as_ref()) {
            Ok(votes) if votes >= votes_floor => votes,
            _ => {
                stats.bad_votes += 1;
                continue;
            }
        };

        let rating = match parse_float(candidate.vote_average.as_ref()) {
            Ok(rating) if rating >= RATING_FLOOR => rating,
            _ => {
                stats.bad_rating += 1;
                continue;
            }
        };

        let primary_genre = candidate
            .genre_ids
            .first()
            .and_then(|id| genre::genre_name(*id))
            .unwrap_or_default()
            .to_string();

        rows.push(FilteredRow {
            id: candidate.id,
            title: candidate.title.clone(),
            tags: build_tags(candidate),
            rating,
            votes,
            year: parse_year(&candidate.release_date).ok(),
            primary_genre,
            language: candidate.language.clone(),
        });
        stats.kept += 1;
    }

    (rows, stats)
}

/// Runs the strict tier, then the relaxed tier if the strict one starves
///
/// Backoff rows are appended only when their id is not already present. Drop
/// reasons are summed over both passes and `kept` is the merged row count.
pub fn build_rows_with_fallback(candidates: &[CandidateRecord]) -> GateOutcome {
    let (mut rows, primary) = build_rows(candidates, VOTES_FLOOR_PRIMARY);

    if rows.len() >= MIN_VIABLE_ROWS {
        return GateOutcome {
            rows,
            stats: primary,
            used_fallback: false,
        };
    }

    let (backoff_rows, backoff) = build_rows(candidates, VOTES_FLOOR_BACKOFF);
    let have: HashSet<u64> = rows.iter().map(|r| r.id).collect();
    rows.extend(backoff_rows.into_iter().filter(|r| !have.contains(&r.id)));

    let stats = DropStats {
        detail_miss: primary.detail_miss + backoff.detail_miss,
        bad_votes: primary.bad_votes + backoff.bad_votes,
        bad_rating: primary.bad_rating + backoff.bad_rating,
        kept: rows.len(),
    };

    tracing::debug!(
        primary_kept = primary.kept,
        merged = rows.len(),
        "Primary gate starved, applied backoff tier"
    );

    GateOutcome {
        rows,
        stats,
        used_fallback: true,
    }
}
