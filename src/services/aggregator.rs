use std::collections::HashMap;

use crate::models::SeedRecord;

/// Merges watch-history seeds into one composite seed
///
/// Titles are comma-joined and overviews period-joined. The language is the most
/// frequent one (earliest wins a tie), the genre is the first non-empty one, and
/// the year is the latest known. Returns `None` for an empty slice; callers are
/// expected to check before combining.
pub fn combine(seeds: &[SeedRecord]) -> Option<SeedRecord> {
    let first = seeds.first()?;
    if seeds.len() == 1 {
        return Some(SeedRecord {
            id: None,
            ..first.clone()
        });
    }

    let title = seeds
        .iter()
        .map(|s| s.title.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let overview = seeds
        .iter()
        .map(|s| s.overview.as_str())
        .collect::<Vec<_>>()
        .join(". ");

    Some(SeedRecord {
        id: None,
        title,
        overview,
        genre: seeds
            .iter()
            .map(|s| s.genre.as_str())
            .find(|genre| !genre.is_empty())
            .unwrap_or_default()
            .to_string(),
        language: most_common_language(seeds),
        release_year: seeds.iter().filter_map(|s| s.release_year).max(),
    })
}

fn most_common_language(seeds: &[SeedRecord]) -> String {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for seed in seeds {
        let language = seed.language.to_lowercase();
        let count = counts.entry(language.clone()).or_insert(0);
        if *count == 0 {
            order.push(language);
        }
        *count += 1;
    }

    let mut best: Option<(&String, usize)> = None;
    for language in &order {
        let count = counts[language];
        if best.map_or(true, |(_, top)| count > top) {
            best = Some((language, count));
        }
    }

    best.map(|(language, _)| language.clone()).unwrap_or_default()
}
