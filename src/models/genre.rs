/// TMDB movie genre table (lower-cased name → provider id)
///
/// `sci-fi` and `science fiction` share id 878; the reverse lookup resolves
/// 878 to `science fiction`.
const GENRES: &[(&str, u32)] = &[
    ("action", 28),
    ("adventure", 12),
    ("animation", 16),
    ("comedy", 35),
    ("crime", 80),
    ("documentary", 99),
    ("drama", 18),
    ("family", 10751),
    ("fantasy", 14),
    ("history", 36),
    ("horror", 27),
    ("music", 10402),
    ("mystery", 9648),
    ("romance", 10749),
    ("sci-fi", 878),
    ("science fiction", 878),
    ("tv movie", 10770),
    ("thriller", 53),
    ("war", 10752),
    ("western", 37),
];

/// Resolves a genre name (any case) to its provider id
pub fn genre_id(name: &str) -> Option<u32> {
    let name = name.trim().to_lowercase();
    GENRES
        .iter()
        .find(|(genre, _)| *genre == name)
        .map(|(_, id)| *id)
}

/// Resolves a provider genre id to its lower-cased name
///
/// Later table entries win for shared ids.
pub fn genre_name(id: u32) -> Option<&'static str> {
    GENRES
        .iter()
        .rev()
        .find(|(_, genre_id)| *genre_id == id)
        .map(|(name, _)| *name)
}
