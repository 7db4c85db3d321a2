use std::cmp::Ordering;

use crate::{
    models::{FilteredRow, RankedResult, Ranking, SeedRecord},
    services::tfidf::TfidfVectorizer,
};

/// Content similarity below this is treated as noise
pub const SIM_FLOOR: f64 = 0.05;

/// Vote counts are clipped here before scaling the quality score
pub const VOTES_CLIP: u64 = 50_000;

/// Release-year gap tolerated without penalty
pub const YEAR_GRACE: i32 = 8;

pub const SIMILARITY_WEIGHT: f64 = 0.65;
pub const QUALITY_WEIGHT: f64 = 0.30;

/// Results returned per request at most
pub const TOP_N: usize = 10;

/// Reception times audience size, both scaled into [0, 1]
pub fn quality_score(rating: f64, votes: u64) -> f64 {
    let rating = (rating / 10.0).clamp(0.0, 1.0);
    let audience = votes.min(VOTES_CLIP) as f64 / VOTES_CLIP as f64;
    rating * audience
}

/// Penalty factor for a release-year gap: 1 inside the grace window, then
/// quadratically decaying
pub fn year_decay(gap: i32) -> f64 {
    let excess = (gap.abs() - YEAR_GRACE).max(0) as f64;
    1.0 / (1.0 + excess * excess / 100.0)
}

/// Temporal penalty for a row; rows with no year count as matching the seed
pub fn temporal_penalty(seed_year: Option<i32>, row_year: Option<i32>) -> f64 {
    match seed_year {
        None => 1.0,
        Some(seed_year) => year_decay(row_year.unwrap_or(seed_year) - seed_year),
    }
}

/// Rows sharing the seed's genre or language, or every row when none do
fn gate<'a>(seed: &SeedRecord, rows: &'a [FilteredRow]) -> Vec<&'a FilteredRow> {
    let gated: Vec<&FilteredRow> = rows
        .iter()
        .filter(|row| row.primary_genre == seed.genre || row.language == seed.language)
        .collect();

    if gated.is_empty() {
        rows.iter().collect()
    } else {
        gated
    }
}

/// Scores `rows` against `seed` and keeps the best `TOP_N`
pub fn rank(seed: &SeedRecord, rows: &[FilteredRow]) -> Ranking {
    if rows.is_empty() {
        return Ranking::default();
    }

    let gated = gate(seed, rows);
    let documents: Vec<&str> = gated.iter().map(|row| row.tags.as_str()).collect();
    let (vectorizer, vectors) = TfidfVectorizer::fit_transform(&documents);
    let seed_vector = vectorizer.transform(&seed.tags());

    let mut scored: Vec<RankedResult> = gated
        .iter()
        .zip(vectors.iter())
        .map(|(row, vector)| {
            let similarity = match seed_vector.cosine(vector) {
                sim if sim >= SIM_FLOOR => sim,
                _ => 0.0,
            };
            let quality = quality_score(row.rating, row.votes);
            let penalty = temporal_penalty(seed.release_year, row.year);

            RankedResult {
                title: row.title.clone(),
                score: (SIMILARITY_WEIGHT * similarity + QUALITY_WEIGHT * quality) * penalty,
            }
        })
        .filter(|result| result.score > 0.0)
        .collect();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    scored.truncate(TOP_N);

    tracing::debug!(
        rows = rows.len(),
        gated = gated.len(),
        vocabulary = vectorizer.vocabulary_len(),
        returned = scored.len(),
        "Ranking completed"
    );

    let top_titles = scored.iter().map(|r| r.title.clone()).collect();
    Ranking {
        results: scored,
        top_titles,
    }
}
