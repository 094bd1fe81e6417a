use crate::config::RecommendationConfig;
use crate::models::ContentItem;
use crate::utils::parse_genres;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Per-request genre affinity map. Positive interactions weigh 1.0 per genre,
/// recent clicks weigh `click_genre_weight` per genre. Never negative; an
/// empty map signals cold start.
pub fn build_preference(
    positive_ids: &[Uuid],
    recent_clicked_ids: &[Uuid],
    by_id: &HashMap<Uuid, &ContentItem>,
    click_genre_weight: f64,
) -> HashMap<String, f64> {
    let mut pref: HashMap<String, f64> = HashMap::new();

    for id in positive_ids {
        if let Some(content) = by_id.get(id) {
            for genre in content.genre_list() {
                *pref.entry(genre).or_insert(0.0) += 1.0;
            }
        }
    }

    for id in recent_clicked_ids {
        if let Some(content) = by_id.get(id) {
            for genre in content.genre_list() {
                *pref.entry(genre).or_insert(0.0) += click_genre_weight;
            }
        }
    }

    pref
}

/// Affinity map from the onboarding genre selection alone.
pub fn onboarding_preference(genres_csv: &str, weight: f64) -> HashMap<String, f64> {
    let mut pref = HashMap::new();
    for genre in parse_genres(genres_csv) {
        *pref.entry(genre).or_insert(0.0) += weight;
    }
    pref
}

/// Sum of positive affinities over the item's genres. Zero when either side
/// is empty or nothing overlaps.
pub fn genre_score(content: &ContentItem, pref: &HashMap<String, f64>) -> f64 {
    if pref.is_empty() {
        return 0.0;
    }

    content
        .genre_list()
        .iter()
        .filter_map(|g| pref.get(g))
        .filter(|&&w| w > 0.0)
        .sum()
}

/// Content-based score for every eligible catalog item. Items in the exclude
/// or disliked sets are skipped entirely; items without genre overlap score a
/// flat 0.0 and stay enumerable but never ranked.
pub fn score_catalog(
    catalog: &[ContentItem],
    pref: &HashMap<String, f64>,
    exclude: &HashSet<Uuid>,
    disliked: &HashSet<Uuid>,
    viewed: &HashSet<Uuid>,
    config: &RecommendationConfig,
) -> HashMap<Uuid, f64> {
    let max_view = catalog.iter().map(|c| c.view_count).max().unwrap_or(1).max(1);

    let mut scores = HashMap::new();
    for content in catalog {
        if exclude.contains(&content.id) || disliked.contains(&content.id) {
            continue;
        }

        let genre = genre_score(content, pref);
        if genre <= 0.0 {
            scores.insert(content.id, 0.0);
            continue;
        }

        let rating = content.rating.unwrap_or(0.0);
        let view_norm = content.view_count as f64 / max_view as f64;

        let mut score =
            genre + rating * config.rating_weight + view_norm * config.popularity_weight;

        if viewed.contains(&content.id) {
            score *= config.view_penalty;
        }

        scores.insert(content.id, score);
    }

    scores
}

/// Ranked candidate ids, descending by score, zero scores dropped. The sort
/// is stable over catalog iteration order, so equal-score ties follow the
/// catalog; beyond that the tie order is accepted nondeterminism, not a
/// guarantee.
pub fn rank_eligible(catalog: &[ContentItem], scores: &HashMap<Uuid, f64>) -> Vec<Uuid> {
    let mut ranked: Vec<(Uuid, f64)> = catalog
        .iter()
        .filter_map(|c| {
            scores
                .get(&c.id)
                .filter(|&&s| s > 0.0)
                .map(|&s| (c.id, s))
        })
        .collect();

    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked.into_iter().map(|(id, _)| id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn item(genres: &str, views: u64) -> ContentItem {
        ContentItem::new(Uuid::new_v4(), "movie", "t", genres).with_view_count(views)
    }

    fn index(catalog: &[ContentItem]) -> HashMap<Uuid, &ContentItem> {
        catalog.iter().map(|c| (c.id, c)).collect()
    }

    #[test]
    fn test_build_preference_weights() {
        let liked = item("action, drama", 0);
        let clicked = item("action", 0);
        let catalog = vec![liked.clone(), clicked.clone()];
        let by_id = index(&catalog);

        let pref = build_preference(&[liked.id], &[clicked.id], &by_id, 2.0);
        assert_eq!(pref["action"], 3.0);
        assert_eq!(pref["drama"], 1.0);
    }

    #[test]
    fn test_build_preference_empty_is_cold_start() {
        let by_id = HashMap::new();
        let pref = build_preference(&[], &[], &by_id, 2.0);
        assert!(pref.is_empty());
    }

    #[test]
    fn test_onboarding_preference() {
        let pref = onboarding_preference("Action, Sci-Fi", 1.5);
        assert_eq!(pref["action"], 1.5);
        assert_eq!(pref["sci-fi"], 1.5);
    }

    #[test]
    fn test_score_catalog_formula() {
        let config = Config::default().recommendation;
        let mut matching = item("action", 50);
        matching.rating = Some(8.0);
        let unrelated = item("romance", 100);
        let catalog = vec![matching.clone(), unrelated.clone()];

        let pref = HashMap::from([("action".to_string(), 2.0)]);
        let scores = score_catalog(
            &catalog,
            &pref,
            &HashSet::new(),
            &HashSet::new(),
            &HashSet::new(),
            &config,
        );

        // genre 2.0 + rating 8.0 * 0.12 + (50/100) * 0.35
        let expected = 2.0 + 8.0 * 0.12 + 0.5 * 0.35;
        assert!((scores[&matching.id] - expected).abs() < 1e-9);
        assert_eq!(scores[&unrelated.id], 0.0);
    }

    #[test]
    fn test_score_catalog_view_penalty_and_exclusions() {
        let config = Config::default().recommendation;
        let viewed_item = item("action", 10);
        let excluded_item = item("action", 10);
        let catalog = vec![viewed_item.clone(), excluded_item.clone()];

        let pref = HashMap::from([("action".to_string(), 1.0)]);
        let exclude = HashSet::from([excluded_item.id]);
        let viewed = HashSet::from([viewed_item.id]);

        let scores = score_catalog(&catalog, &pref, &exclude, &HashSet::new(), &viewed, &config);
        assert!(!scores.contains_key(&excluded_item.id));

        let unpenalized = 1.0 + 1.0 * config.popularity_weight;
        assert!((scores[&viewed_item.id] - unpenalized * config.view_penalty).abs() < 1e-9);
    }

    #[test]
    fn test_rank_eligible_descending_and_drops_zero() {
        let a = item("action", 0);
        let b = item("action, drama", 0);
        let c = item("romance", 0);
        let catalog = vec![a.clone(), b.clone(), c.clone()];

        let pref = HashMap::from([("action".to_string(), 1.0), ("drama".to_string(), 1.0)]);
        let scores = score_catalog(
            &catalog,
            &pref,
            &HashSet::new(),
            &HashSet::new(),
            &HashSet::new(),
            &Config::default().recommendation,
        );

        let ranked = rank_eligible(&catalog, &scores);
        assert_eq!(ranked, vec![b.id, a.id]);
    }
}
