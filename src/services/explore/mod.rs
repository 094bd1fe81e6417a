use crate::models::ContentItem;
use crate::utils::{explore_seed, seed_bucket};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Split a slate of `size_a` slots into (exploit, explore) counts.
/// `exploit + explore == size_a` for every `size_a`.
pub fn split_counts(size_a: usize, explore_ratio: f64) -> (usize, usize) {
    let explore = ((size_a as f64 * explore_ratio).round() as usize).min(size_a);
    (size_a - explore, explore)
}

/// Weighted sample of `explore_count` ids from the top of the ranking,
/// without replacement. The candidate pool is the top
/// `explore_count * pool_mult + already_picked.len()` ranked ids minus the
/// exploit slice. Draws favor high scores, genres the user has little
/// affinity for, and unseen items. The RNG is seeded per (user, time bucket),
/// so picks are stable inside the window and reshuffle afterwards.
#[allow(clippy::too_many_arguments)]
pub fn pick_explore(
    user_id: Uuid,
    ranked: &[Uuid],
    scores: &HashMap<Uuid, f64>,
    pref: &HashMap<String, f64>,
    viewed: &HashSet<Uuid>,
    already_picked: &[Uuid],
    explore_count: usize,
    by_id: &HashMap<Uuid, &ContentItem>,
    pool_mult: usize,
    seed_window_hours: u64,
    now_secs: i64,
) -> Vec<Uuid> {
    if explore_count == 0 {
        return Vec::new();
    }

    let picked: HashSet<Uuid> = already_picked.iter().copied().collect();
    let pool_size = ranked
        .len()
        .min(explore_count * pool_mult + already_picked.len());

    let mut pool: Vec<Uuid> = ranked[..pool_size]
        .iter()
        .copied()
        .filter(|id| !picked.contains(id))
        .collect();

    if pool.is_empty() {
        return Vec::new();
    }

    let bucket = seed_bucket(now_secs, seed_window_hours);
    let mut rng = StdRng::seed_from_u64(explore_seed(user_id, bucket));

    let mut result = Vec::with_capacity(explore_count);
    for _ in 0..explore_count {
        match weighted_pick_once(&pool, scores, pref, viewed, by_id, &mut rng) {
            Some(index) => result.push(pool.swap_remove(index)),
            None => break,
        }
        if pool.is_empty() {
            break;
        }
    }

    result
}

/// One roulette-wheel draw over the pool; returns the chosen index.
fn weighted_pick_once(
    pool: &[Uuid],
    scores: &HashMap<Uuid, f64>,
    pref: &HashMap<String, f64>,
    viewed: &HashSet<Uuid>,
    by_id: &HashMap<Uuid, &ContentItem>,
    rng: &mut StdRng,
) -> Option<usize> {
    let mut weights = vec![0.0; pool.len()];
    let mut total = 0.0;

    for (i, id) in pool.iter().enumerate() {
        let Some(content) = by_id.get(id) else {
            continue;
        };

        let base = scores.get(id).copied().unwrap_or(0.01).max(0.01);
        let rarity = genre_rarity_weight(content, pref);
        let novelty = if viewed.contains(id) { 0.25 } else { 1.0 };

        let weight = base * rarity * novelty;
        weights[i] = weight;
        total += weight;
    }

    if total <= 0.0 {
        return None;
    }

    let r = rng.gen::<f64>() * total;
    let mut acc = 0.0;
    for (i, w) in weights.iter().enumerate() {
        acc += w;
        if r <= acc {
            return Some(i);
        }
    }

    Some(pool.len() - 1)
}

/// Items whose weakest genre is rare in the affinity map get boosted; this is
/// the diversity pressure on the explore slice.
fn genre_rarity_weight(content: &ContentItem, pref: &HashMap<String, f64>) -> f64 {
    let genres = content.genre_list();
    if genres.is_empty() {
        return 1.0;
    }

    let min_pref = genres
        .iter()
        .map(|g| pref.get(g).copied().unwrap_or(0.0))
        .fold(f64::MAX, f64::min);

    1.0 + 1.2 / (1.0 + min_pref)
}
