use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    pub id: Uuid,
    pub content_type: String,
    pub title: String,
    pub overview: String,
    pub genres: String,
    pub release_date: Option<NaiveDate>,
    pub rating: Option<f64>,
    pub rating_count: u64,
    pub view_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteractionType {
    View,
    Like,
    Dislike,
    Bookmark,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub user_id: Uuid,
    pub content_id: Uuid,
    pub interaction_type: InteractionType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecommendSource {
    ContentBased,
    Collaborative,
    TrendingFallback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpressionLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content_id: Uuid,
    pub source: String,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickLog {
    pub id: Uuid,
    pub impression_log_id: Uuid,
    pub user_id: Uuid,
    pub content_id: Uuid,
    pub clicked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendedItem {
    pub content: ContentItem,
    pub reason: String,
    pub source: RecommendSource,
    pub impression_log_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub user_id: Uuid,
    pub items: Vec<RecommendedItem>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct InteractionState {
    pub liked: bool,
    pub disliked: bool,
    pub bookmarked: bool,
    pub view_count: u64,
}

impl ContentItem {
    pub fn new(id: Uuid, content_type: &str, title: &str, genres: &str) -> Self {
        Self {
            id,
            content_type: content_type.to_string(),
            title: title.to_string(),
            overview: String::new(),
            genres: genres.to_string(),
            release_date: None,
            rating: None,
            rating_count: 0,
            view_count: 0,
        }
    }

    pub fn with_overview(mut self, overview: &str) -> Self {
        self.overview = overview.to_string();
        self
    }

    pub fn with_release_date(mut self, date: NaiveDate) -> Self {
        self.release_date = Some(date);
        self
    }

    pub fn with_rating(mut self, rating: f64, rating_count: u64) -> Self {
        self.rating = Some(rating);
        self.rating_count = rating_count;
        self
    }

    pub fn with_view_count(mut self, view_count: u64) -> Self {
        self.view_count = view_count;
        self
    }

    /// Genres as a normalized list: trimmed, lowercased, blanks dropped.
    pub fn genre_list(&self) -> Vec<String> {
        crate::utils::parse_genres(&self.genres)
    }
}

impl InteractionType {
    /// Interaction kinds that express positive taste.
    pub const POSITIVE: [InteractionType; 2] = [InteractionType::Like, InteractionType::Bookmark];

    /// Interaction kinds whose content is excluded from fresh recommendations.
    pub const EXCLUDE: [InteractionType; 3] = [
        InteractionType::Like,
        InteractionType::Dislike,
        InteractionType::Bookmark,
    ];
}

impl Interaction {
    pub fn new(user_id: Uuid, content_id: Uuid, interaction_type: InteractionType) -> Self {
        Self {
            user_id,
            content_id,
            interaction_type,
            created_at: Utc::now(),
        }
    }
}

impl RecommendSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendSource::ContentBased => "CONTENT_BASED",
            RecommendSource::Collaborative => "COLLABORATIVE",
            RecommendSource::TrendingFallback => "TRENDING_FALLBACK",
        }
    }

    /// Tag written into the impression log, e.g. `CONTENT_BASED_EXPLORE`.
    pub fn log_tag(&self, explore: bool) -> String {
        format!(
            "{}_{}",
            self.as_str(),
            if explore { "EXPLORE" } else { "EXPLOIT" }
        )
    }
}

impl ImpressionLog {
    pub fn new(
        user_id: Uuid,
        content_id: Uuid,
        source: String,
        reason: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            content_id,
            source,
            reason,
            created_at,
        }
    }
}

impl ClickLog {
    pub fn new(impression_log_id: Uuid, user_id: Uuid, content_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            impression_log_id,
            user_id,
            content_id,
            clicked_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_list_normalizes() {
        let item = ContentItem::new(Uuid::new_v4(), "movie", "Test", " Action, Sci-Fi ,, drama ");
        assert_eq!(item.genre_list(), vec!["action", "sci-fi", "drama"]);
    }

    #[test]
    fn test_log_tag() {
        assert_eq!(
            RecommendSource::ContentBased.log_tag(true),
            "CONTENT_BASED_EXPLORE"
        );
        assert_eq!(
            RecommendSource::TrendingFallback.log_tag(false),
            "TRENDING_FALLBACK_EXPLOIT"
        );
    }
}
