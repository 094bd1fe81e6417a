use crate::models::{ContentItem, InteractionType};
use crate::store::InteractionStore;
use anyhow::Result;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Candidate ids from users who share positive interactions with this user.
/// Neighbors' positively-interacted content is tallied by frequency and
/// ranked `(frequency desc, view count desc)`. No neighbors means an empty
/// result, which is an expected state.
pub async fn collaborative_ids(
    interactions: &dyn InteractionStore,
    user_id: Uuid,
    positive_ids: &[Uuid],
    exclude: &HashSet<Uuid>,
    disliked: &HashSet<Uuid>,
    size_b: usize,
    by_id: &HashMap<Uuid, &ContentItem>,
) -> Result<Vec<Uuid>> {
    if positive_ids.is_empty() || size_b == 0 {
        return Ok(Vec::new());
    }

    let neighbors = interactions
        .neighbor_user_ids(user_id, positive_ids, &InteractionType::POSITIVE)
        .await?;
    if neighbors.is_empty() {
        return Ok(Vec::new());
    }

    let candidates = interactions
        .content_ids_by_users_and_types(&neighbors, &InteractionType::POSITIVE)
        .await?;

    let mut freq: HashMap<Uuid, usize> = HashMap::new();
    let mut order: Vec<Uuid> = Vec::new();
    for content_id in candidates {
        if exclude.contains(&content_id) || disliked.contains(&content_id) {
            continue;
        }
        let count = freq.entry(content_id).or_insert(0);
        if *count == 0 {
            order.push(content_id);
        }
        *count += 1;
    }

    order.sort_by(|a, b| {
        freq[b].cmp(&freq[a]).then_with(|| {
            let views = |id: &Uuid| by_id.get(id).map(|c| c.view_count).unwrap_or(0);
            views(b).cmp(&views(a))
        })
    });

    order.truncate(size_b);
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Interaction;
    use crate::store::memory::MemoryInteractionStore;
    use crate::store::InteractionStore as _;

    fn item(views: u64) -> ContentItem {
        ContentItem::new(Uuid::new_v4(), "movie", "t", "action").with_view_count(views)
    }

    #[tokio::test]
    async fn test_collaborative_ranks_by_frequency_then_views() {
        let store = MemoryInteractionStore::new();
        let me = Uuid::new_v4();
        let (n1, n2) = (Uuid::new_v4(), Uuid::new_v4());

        let shared = item(0);
        let popular = item(100);
        let frequent = item(10);

        // Both neighbors overlap with me on `shared`.
        for user in [me, n1, n2] {
            store
                .record(Interaction::new(user, shared.id, InteractionType::Like))
                .await
                .unwrap();
        }
        // `frequent` liked by both neighbors, `popular` by one.
        for user in [n1, n2] {
            store
                .record(Interaction::new(user, frequent.id, InteractionType::Like))
                .await
                .unwrap();
        }
        store
            .record(Interaction::new(n1, popular.id, InteractionType::Bookmark))
            .await
            .unwrap();

        let catalog = vec![shared.clone(), popular.clone(), frequent.clone()];
        let by_id: HashMap<Uuid, &ContentItem> = catalog.iter().map(|c| (c.id, c)).collect();
        let exclude = HashSet::from([shared.id]);

        let result = collaborative_ids(
            &store,
            me,
            &[shared.id],
            &exclude,
            &HashSet::new(),
            10,
            &by_id,
        )
        .await
        .unwrap();

        assert_eq!(result, vec![frequent.id, popular.id]);
    }

    #[tokio::test]
    async fn test_no_neighbors_is_empty_not_error() {
        let store = MemoryInteractionStore::new();
        let me = Uuid::new_v4();
        let lonely = item(0);

        store
            .record(Interaction::new(me, lonely.id, InteractionType::Like))
            .await
            .unwrap();

        let by_id = HashMap::new();
        let result = collaborative_ids(
            &store,
            me,
            &[lonely.id],
            &HashSet::new(),
            &HashSet::new(),
            10,
            &by_id,
        )
        .await
        .unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_disliked_candidates_dropped() {
        let store = MemoryInteractionStore::new();
        let me = Uuid::new_v4();
        let neighbor = Uuid::new_v4();
        let shared = item(0);
        let bad = item(50);

        for user in [me, neighbor] {
            store
                .record(Interaction::new(user, shared.id, InteractionType::Like))
                .await
                .unwrap();
        }
        store
            .record(Interaction::new(neighbor, bad.id, InteractionType::Like))
            .await
            .unwrap();

        let catalog = vec![shared.clone(), bad.clone()];
        let by_id: HashMap<Uuid, &ContentItem> = catalog.iter().map(|c| (c.id, c)).collect();
        let exclude = HashSet::from([shared.id]);
        let disliked = HashSet::from([bad.id]);

        let result =
            collaborative_ids(&store, me, &[shared.id], &exclude, &disliked, 10, &by_id)
                .await
                .unwrap();
        assert!(result.is_empty());
    }
}
