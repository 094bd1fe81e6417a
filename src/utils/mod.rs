use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use uuid::Uuid;

pub mod metrics;
pub mod validation;

/// Split a comma-delimited genre string into trimmed, lowercased entries.
pub fn parse_genres(genres_csv: &str) -> Vec<String> {
    genres_csv
        .split(',')
        .map(|g| g.trim().to_lowercase())
        .filter(|g| !g.is_empty())
        .collect()
}

/// Display form of a stored genre: title-cased words, with the common
/// "sci-fi" spellings mapped to "Sci-Fi".
pub fn pretty_genre(genre: &str) -> String {
    let s = genre.trim().to_lowercase();
    if s.is_empty() {
        return String::new();
    }

    if s == "sci-fi" || s == "scifi" || s == "sci fi" {
        return "Sci-Fi".to_string();
    }

    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Time bucket index for a seed window, from unix seconds.
pub fn seed_bucket(now_secs: i64, window_hours: u64) -> u64 {
    let window = (window_hours * 3600).max(1);
    (now_secs.max(0) as u64) / window
}

/// Deterministic explore seed: same user and same time bucket always yield
/// the same value, so explore picks hold steady inside the window.
pub fn explore_seed(user_id: Uuid, bucket: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    user_id.hash(&mut hasher);
    bucket.hash(&mut hasher);
    hasher.finish()
}
