use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub recommendation: RecommendationConfig,
    pub impression: ImpressionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.host, self.port).parse().unwrap()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationConfig {
    pub default_size: usize,
    pub max_size: usize,
    /// Share of the requested size served by the content-based slate on warm starts.
    pub content_slot_ratio: f64,
    pub explore_ratio: f64,
    pub explore_pool_mult: usize,
    pub rating_weight: f64,
    pub popularity_weight: f64,
    pub view_penalty: f64,
    pub click_genre_weight: f64,
    pub onboarding_genre_weight: f64,
    pub recent_click_limit: usize,
    pub anchor_limit: usize,
    /// Explore picks are stable for a user inside a rolling window of this length.
    pub seed_window_hours: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpressionConfig {
    pub dedupe_window_hours: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                workers: num_cpus::get(),
            },
            recommendation: RecommendationConfig {
                default_size: 20,
                max_size: 100,
                content_slot_ratio: 0.8,
                explore_ratio: 0.20,
                explore_pool_mult: 6,
                rating_weight: 0.12,
                popularity_weight: 0.35,
                view_penalty: 0.35,
                click_genre_weight: 2.0,
                onboarding_genre_weight: 1.5,
                recent_click_limit: 60,
                anchor_limit: 2,
                seed_window_hours: 6,
            },
            impression: ImpressionConfig {
                dedupe_window_hours: 24,
            },
        }
    }
}

impl Config {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix("STREAMREC"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
