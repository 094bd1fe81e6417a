use crate::error::RecommendError;
use crate::models::{ContentItem, Interaction, InteractionState, InteractionType};
use crate::store::{CatalogStore, InteractionStore};
use crate::utils::validation::validate_interaction_request;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Records user interactions and keeps the LIKE/DISLIKE pair mutually
/// exclusive per (user, content). BOOKMARK is an independent toggle; VIEW
/// appends a row and bumps the catalog view counter.
pub struct InteractionService {
    catalog: Arc<dyn CatalogStore>,
    interactions: Arc<dyn InteractionStore>,
}

impl InteractionService {
    pub fn new(catalog: Arc<dyn CatalogStore>, interactions: Arc<dyn InteractionStore>) -> Self {
        Self {
            catalog,
            interactions,
        }
    }

    async fn require_content(&self, content_id: Uuid) -> Result<ContentItem, RecommendError> {
        self.catalog
            .get(content_id)
            .await?
            .ok_or_else(|| RecommendError::not_found(format!("content {}", content_id)))
    }

    pub async fn view(
        &self,
        user_id: Uuid,
        content_id: Uuid,
    ) -> Result<InteractionState, RecommendError> {
        validate_interaction_request(user_id, content_id)?;
        self.require_content(content_id).await?;

        self.interactions
            .record(Interaction::new(user_id, content_id, InteractionType::View))
            .await?;
        self.catalog.increment_view_count(content_id).await?;

        self.state(user_id, content_id).await
    }

    pub async fn like(
        &self,
        user_id: Uuid,
        content_id: Uuid,
    ) -> Result<InteractionState, RecommendError> {
        self.set_exclusive(user_id, content_id, InteractionType::Like, InteractionType::Dislike)
            .await
    }

    pub async fn dislike(
        &self,
        user_id: Uuid,
        content_id: Uuid,
    ) -> Result<InteractionState, RecommendError> {
        self.set_exclusive(user_id, content_id, InteractionType::Dislike, InteractionType::Like)
            .await
    }

    /// Upsert `wanted` and drop its opposite in the same operation.
    async fn set_exclusive(
        &self,
        user_id: Uuid,
        content_id: Uuid,
        wanted: InteractionType,
        opposite: InteractionType,
    ) -> Result<InteractionState, RecommendError> {
        validate_interaction_request(user_id, content_id)?;
        self.require_content(content_id).await?;

        let removed = self.interactions.remove(user_id, content_id, opposite).await?;
        if removed {
            debug!(%user_id, %content_id, ?opposite, "removed opposite interaction");
        }

        if !self.interactions.exists(user_id, content_id, wanted).await? {
            self.interactions
                .record(Interaction::new(user_id, content_id, wanted))
                .await?;
        }

        self.state(user_id, content_id).await
    }

    pub async fn toggle_bookmark(
        &self,
        user_id: Uuid,
        content_id: Uuid,
    ) -> Result<InteractionState, RecommendError> {
        validate_interaction_request(user_id, content_id)?;
        self.require_content(content_id).await?;

        if self
            .interactions
            .exists(user_id, content_id, InteractionType::Bookmark)
            .await?
        {
            self.interactions
                .remove(user_id, content_id, InteractionType::Bookmark)
                .await?;
        } else {
            self.interactions
                .record(Interaction::new(user_id, content_id, InteractionType::Bookmark))
                .await?;
        }

        self.state(user_id, content_id).await
    }

    pub async fn state(
        &self,
        user_id: Uuid,
        content_id: Uuid,
    ) -> Result<InteractionState, RecommendError> {
        validate_interaction_request(user_id, content_id)?;
        let content = self.require_content(content_id).await?;

        let types = self
            .interactions
            .types_for_content(user_id, content_id)
            .await?;

        Ok(InteractionState {
            liked: types.contains(&InteractionType::Like),
            disliked: types.contains(&InteractionType::Dislike),
            bookmarked: types.contains(&InteractionType::Bookmark),
            view_count: content.view_count,
        })
    }
}
