pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;
pub mod utils;

pub use config::Config;
pub use error::RecommendError;
pub use models::*;

use services::interaction::InteractionService;
use services::recommendation::RecommendationService;
use std::sync::Arc;
use store::memory::{
    MemoryCatalogStore, MemoryClickStore, MemoryImpressionStore, MemoryInteractionStore,
    MemoryProfileStore,
};
use store::{CatalogStore, ClickStore, ImpressionStore, InteractionStore, ProfileStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<dyn CatalogStore>,
    pub interactions: Arc<dyn InteractionStore>,
    pub impressions: Arc<dyn ImpressionStore>,
    pub clicks: Arc<dyn ClickStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub recommendation_service: Arc<RecommendationService>,
    pub interaction_service: Arc<InteractionService>,
}

impl AppState {
    /// Wire the full service graph over the in-memory stores.
    pub fn with_memory_stores(config: Config) -> Self {
        let config = Arc::new(config);

        let catalog: Arc<dyn CatalogStore> = Arc::new(MemoryCatalogStore::new());
        let interactions: Arc<dyn InteractionStore> = Arc::new(MemoryInteractionStore::new());
        let impressions: Arc<dyn ImpressionStore> = Arc::new(MemoryImpressionStore::new());
        let clicks: Arc<dyn ClickStore> = Arc::new(MemoryClickStore::new());
        let profiles: Arc<dyn ProfileStore> = Arc::new(MemoryProfileStore::new());

        let recommendation_service = Arc::new(RecommendationService::new(
            catalog.clone(),
            interactions.clone(),
            impressions.clone(),
            clicks.clone(),
            profiles.clone(),
            config.clone(),
        ));

        let interaction_service = Arc::new(InteractionService::new(
            catalog.clone(),
            interactions.clone(),
        ));

        Self {
            config,
            catalog,
            interactions,
            impressions,
            clicks,
            profiles,
            recommendation_service,
            interaction_service,
        }
    }
}

pub async fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
