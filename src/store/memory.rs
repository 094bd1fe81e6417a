use crate::models::*;
use crate::store::{CatalogStore, ClickStore, ImpressionStore, InteractionStore, ProfileStore};
use anyhow::Result;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Insertion-ordered catalog. Iteration order is stable, which keeps
/// equal-score ranking ties reproducible within one process.
#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
    items: RwLock<Vec<ContentItem>>,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn get(&self, id: Uuid) -> Result<Option<ContentItem>> {
        Ok(self.items.read().iter().find(|c| c.id == id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<ContentItem>> {
        Ok(self.items.read().clone())
    }

    async fn list_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ContentItem>> {
        let wanted: HashSet<Uuid> = ids.iter().copied().collect();
        Ok(self
            .items
            .read()
            .iter()
            .filter(|c| wanted.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn list_top_by_view_count(&self, n: usize) -> Result<Vec<ContentItem>> {
        let mut all = self.items.read().clone();
        all.sort_by(|a, b| b.view_count.cmp(&a.view_count));
        all.truncate(n);
        Ok(all)
    }

    async fn upsert(&self, item: ContentItem) -> Result<()> {
        let mut items = self.items.write();
        match items.iter_mut().find(|c| c.id == item.id) {
            Some(existing) => *existing = item,
            None => items.push(item),
        }
        Ok(())
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<u64> {
        let mut items = self.items.write();
        let item = items
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| anyhow::anyhow!("content not found: {}", id))?;
        item.view_count += 1;
        Ok(item.view_count)
    }
}

#[derive(Debug, Default)]
pub struct MemoryInteractionStore {
    rows: RwLock<Vec<Interaction>>,
}

impl MemoryInteractionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl InteractionStore for MemoryInteractionStore {
    async fn record(&self, interaction: Interaction) -> Result<()> {
        self.rows.write().push(interaction);
        Ok(())
    }

    async fn remove(
        &self,
        user_id: Uuid,
        content_id: Uuid,
        interaction_type: InteractionType,
    ) -> Result<bool> {
        let mut rows = self.rows.write();
        let before = rows.len();
        rows.retain(|r| {
            !(r.user_id == user_id
                && r.content_id == content_id
                && r.interaction_type == interaction_type)
        });
        Ok(rows.len() != before)
    }

    async fn exists(
        &self,
        user_id: Uuid,
        content_id: Uuid,
        interaction_type: InteractionType,
    ) -> Result<bool> {
        Ok(self.rows.read().iter().any(|r| {
            r.user_id == user_id
                && r.content_id == content_id
                && r.interaction_type == interaction_type
        }))
    }

    async fn content_ids_by_user_and_types(
        &self,
        user_id: Uuid,
        types: &[InteractionType],
    ) -> Result<Vec<Uuid>> {
        let mut seen = HashSet::new();
        Ok(self
            .rows
            .read()
            .iter()
            .filter(|r| r.user_id == user_id && types.contains(&r.interaction_type))
            .map(|r| r.content_id)
            .filter(|id| seen.insert(*id))
            .collect())
    }

    async fn recent_content_ids_by_user_and_types(
        &self,
        user_id: Uuid,
        types: &[InteractionType],
        limit: usize,
    ) -> Result<Vec<Uuid>> {
        let mut seen = HashSet::new();
        Ok(self
            .rows
            .read()
            .iter()
            .rev()
            .filter(|r| r.user_id == user_id && types.contains(&r.interaction_type))
            .map(|r| r.content_id)
            .filter(|id| seen.insert(*id))
            .take(limit)
            .collect())
    }

    async fn neighbor_user_ids(
        &self,
        user_id: Uuid,
        seed_content_ids: &[Uuid],
        types: &[InteractionType],
    ) -> Result<Vec<Uuid>> {
        let seeds: HashSet<Uuid> = seed_content_ids.iter().copied().collect();
        let mut seen = HashSet::new();
        Ok(self
            .rows
            .read()
            .iter()
            .filter(|r| {
                r.user_id != user_id
                    && seeds.contains(&r.content_id)
                    && types.contains(&r.interaction_type)
            })
            .map(|r| r.user_id)
            .filter(|id| seen.insert(*id))
            .collect())
    }

    async fn content_ids_by_users_and_types(
        &self,
        user_ids: &[Uuid],
        types: &[InteractionType],
    ) -> Result<Vec<Uuid>> {
        let users: HashSet<Uuid> = user_ids.iter().copied().collect();
        Ok(self
            .rows
            .read()
            .iter()
            .filter(|r| users.contains(&r.user_id) && types.contains(&r.interaction_type))
            .map(|r| r.content_id)
            .collect())
    }

    async fn types_for_content(
        &self,
        user_id: Uuid,
        content_id: Uuid,
    ) -> Result<Vec<InteractionType>> {
        let mut seen = HashSet::new();
        Ok(self
            .rows
            .read()
            .iter()
            .filter(|r| r.user_id == user_id && r.content_id == content_id)
            .map(|r| r.interaction_type)
            .filter(|ty| seen.insert(*ty))
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct MemoryImpressionStore {
    logs: RwLock<Vec<ImpressionLog>>,
}

impl MemoryImpressionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn latest_by_content(
        logs: &[ImpressionLog],
        user_id: Uuid,
        content_ids: &HashSet<Uuid>,
        since: DateTime<Utc>,
    ) -> HashMap<Uuid, ImpressionLog> {
        let mut latest = HashMap::new();
        // Append order doubles as time order; scan newest first and keep the
        // first hit per content id.
        for log in logs.iter().rev() {
            if log.user_id != user_id
                || log.created_at < since
                || !content_ids.contains(&log.content_id)
            {
                continue;
            }
            latest.entry(log.content_id).or_insert_with(|| log.clone());
        }
        latest
    }
}

#[async_trait::async_trait]
impl ImpressionStore for MemoryImpressionStore {
    async fn find_recent(
        &self,
        user_id: Uuid,
        content_ids: &[Uuid],
        since: DateTime<Utc>,
    ) -> Result<Vec<ImpressionLog>> {
        let wanted: HashSet<Uuid> = content_ids.iter().copied().collect();
        Ok(self
            .logs
            .read()
            .iter()
            .rev()
            .filter(|l| {
                l.user_id == user_id && l.created_at >= since && wanted.contains(&l.content_id)
            })
            .cloned()
            .collect())
    }

    async fn insert_batch(&self, logs: Vec<ImpressionLog>) -> Result<Vec<ImpressionLog>> {
        self.logs.write().extend(logs.iter().cloned());
        Ok(logs)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ImpressionLog>> {
        Ok(self.logs.read().iter().find(|l| l.id == id).cloned())
    }

    async fn dedupe_batch(
        &self,
        user_id: Uuid,
        drafts: Vec<ImpressionLog>,
        since: DateTime<Utc>,
    ) -> Result<Vec<ImpressionLog>> {
        // Single write guard covers the read-then-insert sequence, so two
        // concurrent requests for one user cannot both insert inside the
        // window.
        let mut logs = self.logs.write();

        let content_ids: HashSet<Uuid> = drafts.iter().map(|d| d.content_id).collect();
        let mut latest = Self::latest_by_content(&logs, user_id, &content_ids, since);

        let mut aligned = Vec::with_capacity(drafts.len());
        for draft in drafts {
            match latest.get(&draft.content_id) {
                Some(existing) => aligned.push(existing.clone()),
                None => {
                    latest.insert(draft.content_id, draft.clone());
                    logs.push(draft.clone());
                    aligned.push(draft);
                }
            }
        }

        Ok(aligned)
    }
}

#[derive(Debug, Default)]
pub struct MemoryClickStore {
    rows: RwLock<Vec<ClickLog>>,
}

impl MemoryClickStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ClickStore for MemoryClickStore {
    async fn insert(&self, click: ClickLog) -> Result<ClickLog> {
        self.rows.write().push(click.clone());
        Ok(click)
    }

    async fn recent_clicked_content_ids(&self, user_id: Uuid, limit: usize) -> Result<Vec<Uuid>> {
        Ok(self
            .rows
            .read()
            .iter()
            .rev()
            .filter(|c| c.user_id == user_id)
            .map(|c| c.content_id)
            .take(limit)
            .collect())
    }

    async fn total_clicks(&self) -> Result<u64> {
        Ok(self.rows.read().len() as u64)
    }

    async fn unique_clicks(&self) -> Result<u64> {
        let unique: HashSet<Uuid> = self
            .rows
            .read()
            .iter()
            .map(|c| c.impression_log_id)
            .collect();
        Ok(unique.len() as u64)
    }
}

#[derive(Debug, Default)]
pub struct MemoryProfileStore {
    genres: DashMap<Uuid, String>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn preferred_genres(&self, user_id: Uuid) -> Result<Option<String>> {
        Ok(self.genres.get(&user_id).map(|g| g.clone()))
    }

    async fn set_preferred_genres(&self, user_id: Uuid, genres_csv: &str) -> Result<()> {
        self.genres.insert(user_id, genres_csv.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_catalog_top_by_view_count() {
        let store = MemoryCatalogStore::new();
        for views in [5u64, 50, 20] {
            let item = ContentItem::new(Uuid::new_v4(), "movie", "t", "action")
                .with_view_count(views);
            store.upsert(item).await.unwrap();
        }

        let top = store.list_top_by_view_count(2).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].view_count, 50);
        assert_eq!(top[1].view_count, 20);
    }

    #[tokio::test]
    async fn test_interaction_recent_ids_most_recent_first() {
        let store = MemoryInteractionStore::new();
        let user = Uuid::new_v4();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        store
            .record(Interaction::new(user, a, InteractionType::Like))
            .await
            .unwrap();
        store
            .record(Interaction::new(user, b, InteractionType::Bookmark))
            .await
            .unwrap();

        let recent = store
            .recent_content_ids_by_user_and_types(user, &InteractionType::POSITIVE, 10)
            .await
            .unwrap();
        assert_eq!(recent, vec![b, a]);
    }

    #[tokio::test]
    async fn test_impression_dedupe_batch_reuses_inside_window() {
        let store = MemoryImpressionStore::new();
        let user = Uuid::new_v4();
        let content = Uuid::new_v4();
        let now = Utc::now();
        let since = now - Duration::hours(24);

        let first = ImpressionLog::new(user, content, "S".into(), "r".into(), now);
        let first_id = first.id;
        let aligned = store.dedupe_batch(user, vec![first], since).await.unwrap();
        assert_eq!(aligned[0].id, first_id);

        let second = ImpressionLog::new(user, content, "S".into(), "r".into(), now);
        let aligned = store.dedupe_batch(user, vec![second], since).await.unwrap();
        assert_eq!(aligned[0].id, first_id);
    }

    #[tokio::test]
    async fn test_impression_dedupe_batch_expired_window_inserts() {
        let store = MemoryImpressionStore::new();
        let user = Uuid::new_v4();
        let content = Uuid::new_v4();
        let now = Utc::now();

        let old = ImpressionLog::new(user, content, "S".into(), "r".into(), now - Duration::hours(25));
        let old_id = old.id;
        store.insert_batch(vec![old]).await.unwrap();

        let fresh = ImpressionLog::new(user, content, "S".into(), "r".into(), now);
        let aligned = store
            .dedupe_batch(user, vec![fresh], now - Duration::hours(24))
            .await
            .unwrap();
        assert_ne!(aligned[0].id, old_id);
    }

    #[tokio::test]
    async fn test_click_store_counts() {
        let store = MemoryClickStore::new();
        let user = Uuid::new_v4();
        let impression = Uuid::new_v4();
        let content = Uuid::new_v4();

        store
            .insert(ClickLog::new(impression, user, content))
            .await
            .unwrap();
        store
            .insert(ClickLog::new(impression, user, content))
            .await
            .unwrap();

        assert_eq!(store.total_clicks().await.unwrap(), 2);
        assert_eq!(store.unique_clicks().await.unwrap(), 1);
        assert_eq!(
            store.recent_clicked_content_ids(user, 10).await.unwrap(),
            vec![content, content]
        );
    }
}
