use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::matching::match_score::MatchScorer;
use crate::resume_parser::ResumeParser;
use crate::storage::FileStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    /// Pluggable match scorer. Default: HeuristicMatchScorer.
    pub match_scorer: Arc<dyn MatchScorer>,
    /// Third-party resume parsing service.
    pub resume_parser: Arc<dyn ResumeParser>,
    /// Resume and employee document storage.
    pub files: Arc<dyn FileStore>,
}
