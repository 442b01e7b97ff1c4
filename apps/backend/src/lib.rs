pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::db::Database;
use crate::routes::rate_limit::RateLimiter;
use crate::services::llm::LlmClient;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub llm: Arc<LlmClient>,
    pub rate_limiter: Arc<RateLimiter>,
}

/// Build the API router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Group routes
        .route("/groups", get(routes::groups::list))
        .route("/groups/:id", get(routes::groups::get))
        .route("/groups/:id/words", get(routes::groups::words))
        .route("/groups/:id/words/raw", get(routes::groups::words_raw))
        .route(
            "/groups/:id/study_sessions",
            get(routes::groups::study_sessions),
        )
        // Word routes
        .route("/words", get(routes::words::list))
        .route("/words/:id", get(routes::words::get))
        // Study session routes
        .route(
            "/api/study-sessions",
            get(routes::study_sessions::list).post(routes::study_sessions::create),
        )
        .route(
            "/api/study-sessions/reset",
            post(routes::study_sessions::reset),
        )
        .route("/api/study-sessions/:id", get(routes::study_sessions::get))
        .route(
            "/api/study-sessions/:id/review",
            post(routes::study_sessions::submit_review),
        )
        // Chat proxy
        .route("/v1/example-service", post(routes::chat::completions))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            routes::rate_limit::rate_limit_middleware,
        ))
        .with_state(state)
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Open database
    let db_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| "vocab.db".to_string());

    tracing::info!("Opening database at {}", db_path);
    let db = Database::connect(Path::new(&db_path)).await?;

    tracing::info!("Running migrations...");
    db.run_migrations().await?;

    let llm = LlmClient::from_env();

    let rate_limit = std::env::var("RATE_LIMIT_PER_MINUTE")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(60);

    let state = AppState {
        db: Arc::new(db),
        llm: Arc::new(llm),
        rate_limiter: Arc::new(RateLimiter::per_minute(rate_limit)),
    };

    let app = router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "OK"
}
