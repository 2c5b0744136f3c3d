mod applications;
mod auth;
mod config;
mod db;
mod errors;
mod jobs;
mod matching;
mod models;
mod onboarding;
mod resume_parser;
mod routes;
mod state;
mod storage;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::matching::match_score::{HeuristicMatchScorer, MatchScorer};
use crate::resume_parser::HttpResumeParser;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::S3FileStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting HR portal API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    // Initialize S3 / MinIO
    let files = Arc::new(S3FileStore::from_config(&config).await);
    info!("S3 file store initialized (bucket: {})", config.s3_bucket);

    // Initialize resume parsing client
    let resume_parser = Arc::new(HttpResumeParser::new(
        config.resume_parser_url.clone(),
        config.resume_parser_api_key.clone(),
    )?);
    info!("Resume parser client initialized");

    let match_scorer = Arc::new(HeuristicMatchScorer);
    info!("Match scorer: {}", match_scorer.backend());

    // Build app state
    let state = AppState {
        db,
        config: config.clone(),
        match_scorer,
        resume_parser,
        files,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
