use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use streamrec::{init_tracing, AppState, Config, RecommendError};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "streamrec-server")]
struct Args {
    /// Path to a config file; defaults apply when omitted.
    #[arg(long)]
    config: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RecommendationQuery {
    size: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    message: String,
}

impl<T> ApiResponse<T> {
    fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: "Success".to_string(),
        }
    }
}

fn status_for(err: &RecommendError) -> StatusCode {
    match err {
        RecommendError::NotFound(_) => StatusCode::NOT_FOUND,
        RecommendError::Forbidden(_) => StatusCode::FORBIDDEN,
        RecommendError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        RecommendError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn health_check() -> Json<ApiResponse<HashMap<String, String>>> {
    let mut status = HashMap::new();
    status.insert("status".to_string(), "healthy".to_string());
    status.insert("service".to_string(), "streamrec".to_string());
    status.insert("version".to_string(), "0.1.0".to_string());

    Json(ApiResponse::success(status))
}

async fn get_recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<RecommendationQuery>,
) -> Result<Json<ApiResponse<streamrec::RecommendationResponse>>, StatusCode> {
    let size = params
        .size
        .unwrap_or(state.config.recommendation.default_size);

    match state.recommendation_service.recommend(user_id, size).await {
        Ok(items) => Ok(Json(ApiResponse::success(streamrec::RecommendationResponse {
            user_id,
            items,
            generated_at: chrono::Utc::now(),
        }))),
        Err(e) => {
            tracing::error!("failed to build recommendations: {}", e);
            Err(status_for(&e))
        }
    }
}

async fn record_click(
    State(state): State<AppState>,
    Path((user_id, impression_log_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<streamrec::ClickLog>>, StatusCode> {
    match state
        .recommendation_service
        .record_click(user_id, impression_log_id)
        .await
    {
        Ok(click) => Ok(Json(ApiResponse::success(click))),
        Err(e) => {
            tracing::error!("failed to record click: {}", e);
            Err(status_for(&e))
        }
    }
}

async fn record_view(
    State(state): State<AppState>,
    Path((user_id, content_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<streamrec::InteractionState>>, StatusCode> {
    interaction_response(state.interaction_service.view(user_id, content_id).await)
}

async fn record_like(
    State(state): State<AppState>,
    Path((user_id, content_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<streamrec::InteractionState>>, StatusCode> {
    interaction_response(state.interaction_service.like(user_id, content_id).await)
}

async fn record_dislike(
    State(state): State<AppState>,
    Path((user_id, content_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<streamrec::InteractionState>>, StatusCode> {
    interaction_response(state.interaction_service.dislike(user_id, content_id).await)
}

async fn toggle_bookmark(
    State(state): State<AppState>,
    Path((user_id, content_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<streamrec::InteractionState>>, StatusCode> {
    interaction_response(
        state
            .interaction_service
            .toggle_bookmark(user_id, content_id)
            .await,
    )
}

async fn get_interaction_state(
    State(state): State<AppState>,
    Path((user_id, content_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<streamrec::InteractionState>>, StatusCode> {
    interaction_response(state.interaction_service.state(user_id, content_id).await)
}

fn interaction_response(
    result: Result<streamrec::InteractionState, RecommendError>,
) -> Result<Json<ApiResponse<streamrec::InteractionState>>, StatusCode> {
    match result {
        Ok(state) => Ok(Json(ApiResponse::success(state))),
        Err(e) => {
            tracing::error!("interaction failed: {}", e);
            Err(status_for(&e))
        }
    }
}

fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/recommendations/:user_id", get(get_recommendations))
        .route(
            "/recommendations/:user_id/clicks/:impression_log_id",
            post(record_click),
        )
        .route("/interactions/:user_id/:content_id/view", post(record_view))
        .route("/interactions/:user_id/:content_id/like", post(record_like))
        .route(
            "/interactions/:user_id/:content_id/dislike",
            post(record_dislike),
        )
        .route(
            "/interactions/:user_id/:content_id/bookmark",
            post(toggle_bookmark),
        )
        .route(
            "/interactions/:user_id/:content_id",
            get(get_interaction_state),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing().await;

    let args = Args::parse();
    let config = match args.config {
        Some(path) => Config::from_file(&path)?,
        None => Config::default(),
    };
    info!("Starting streamrec server with config: {:?}", config.server);

    let state = AppState::with_memory_stores(config.clone());
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.server.socket_addr()).await?;
    info!("Server listening on {}", config.server.socket_addr());

    axum::serve(listener, app).await?;

    Ok(())
}
