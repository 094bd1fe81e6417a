use crate::models::*;
use anyhow::Result;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod memory;

#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<ContentItem>>;
    async fn list_all(&self) -> Result<Vec<ContentItem>>;
    async fn list_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ContentItem>>;
    async fn list_top_by_view_count(&self, n: usize) -> Result<Vec<ContentItem>>;
    async fn upsert(&self, item: ContentItem) -> Result<()>;
    async fn increment_view_count(&self, id: Uuid) -> Result<u64>;
}

#[async_trait::async_trait]
pub trait InteractionStore: Send + Sync {
    async fn record(&self, interaction: Interaction) -> Result<()>;

    /// Remove a (user, content, type) row if present. Returns whether a row
    /// was removed.
    async fn remove(
        &self,
        user_id: Uuid,
        content_id: Uuid,
        interaction_type: InteractionType,
    ) -> Result<bool>;

    async fn exists(
        &self,
        user_id: Uuid,
        content_id: Uuid,
        interaction_type: InteractionType,
    ) -> Result<bool>;

    async fn content_ids_by_user_and_types(
        &self,
        user_id: Uuid,
        types: &[InteractionType],
    ) -> Result<Vec<Uuid>>;

    /// Most-recent-first distinct content ids.
    async fn recent_content_ids_by_user_and_types(
        &self,
        user_id: Uuid,
        types: &[InteractionType],
        limit: usize,
    ) -> Result<Vec<Uuid>>;

    /// Other users with at least one matching interaction on the seed ids.
    async fn neighbor_user_ids(
        &self,
        user_id: Uuid,
        seed_content_ids: &[Uuid],
        types: &[InteractionType],
    ) -> Result<Vec<Uuid>>;

    /// All matching rows' content ids, duplicates preserved for frequency
    /// tallies.
    async fn content_ids_by_users_and_types(
        &self,
        user_ids: &[Uuid],
        types: &[InteractionType],
    ) -> Result<Vec<Uuid>>;

    async fn types_for_content(
        &self,
        user_id: Uuid,
        content_id: Uuid,
    ) -> Result<Vec<InteractionType>>;
}

#[async_trait::async_trait]
pub trait ImpressionStore: Send + Sync {
    /// Logs for this user touching the given content ids, created at or
    /// after `since`, most-recent-first.
    async fn find_recent(
        &self,
        user_id: Uuid,
        content_ids: &[Uuid],
        since: DateTime<Utc>,
    ) -> Result<Vec<ImpressionLog>>;

    async fn insert_batch(&self, logs: Vec<ImpressionLog>) -> Result<Vec<ImpressionLog>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ImpressionLog>>;

    /// Atomic find-recent + insert for one request: per draft, reuse the most
    /// recent existing log for its content id inside the window, otherwise
    /// persist the draft. The result is aligned positionally with `drafts`.
    async fn dedupe_batch(
        &self,
        user_id: Uuid,
        drafts: Vec<ImpressionLog>,
        since: DateTime<Utc>,
    ) -> Result<Vec<ImpressionLog>>;
}

#[async_trait::async_trait]
pub trait ClickStore: Send + Sync {
    async fn insert(&self, click: ClickLog) -> Result<ClickLog>;

    /// Content ids of this user's recent clicks, most-recent-first. One entry
    /// per click row; repeat clicks amplify the signal.
    async fn recent_clicked_content_ids(&self, user_id: Uuid, limit: usize) -> Result<Vec<Uuid>>;

    /// Raw click rows.
    async fn total_clicks(&self) -> Result<u64>;

    /// Distinct impressions that received at least one click.
    async fn unique_clicks(&self) -> Result<u64>;
}

#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// Comma-delimited onboarding genres, if the user selected any.
    async fn preferred_genres(&self, user_id: Uuid) -> Result<Option<String>>;

    async fn set_preferred_genres(&self, user_id: Uuid, genres_csv: &str) -> Result<()>;
}
