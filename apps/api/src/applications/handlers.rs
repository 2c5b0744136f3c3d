//! Axum route handlers for the Applications API.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::applications::bulk::{process_bulk_action, BulkOutcome};
use crate::applications::filters::{build_listing_query, ApplicationFilter};
use crate::applications::status::{ApplicationStatus, BulkAction};
use crate::applications::store::PgHrStore;
use crate::applications::submit::{
    submit_application, ResumeUpload, SubmissionDeps, SubmissionReceipt,
};
use crate::applications::update::{update_application_status, StatusUpdateOutcome};
use crate::auth::RequestContext;
use crate::errors::AppError;
use crate::models::application::{ApplicationListItem, ApplicationRow, CandidateApplicationItem};
use crate::models::user::{UserRole, UserRow};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub new_status: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkActionRequest {
    pub action: BulkAction,
    pub application_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationDetailResponse {
    pub application: ApplicationRow,
    pub candidate: UserRow,
    pub job_title: String,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct JobApplicationStats {
    pub job_position_id: Uuid,
    pub title: String,
    pub applications: i64,
    pub average_match: Option<f64>,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct RecentHire {
    pub application_id: Uuid,
    pub employee_id: Uuid,
    pub full_name: String,
    pub job_title: String,
    pub hired_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct HrDashboardResponse {
    pub total_applications: i64,
    pub by_status: Vec<StatusCount>,
    pub by_job: Vec<JobApplicationStats>,
    pub active_jobs: i64,
    pub employees: i64,
    pub recent_hires: Vec<RecentHire>,
}

// ────────────────────────────────────────────────────────────────────────────
// Candidate handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/applications
///
/// Multipart form with `job_position_id` and a `resume` file.
pub async fn handle_submit_application(
    State(state): State<AppState>,
    ctx: RequestContext,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<SubmissionReceipt>), AppError> {
    ctx.require(UserRole::Candidate)?;

    let mut job_position_id: Option<Uuid> = None;
    let mut upload: Option<ResumeUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "job_position_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?;
                job_position_id = Some(
                    Uuid::parse_str(text.trim())
                        .map_err(|_| AppError::Validation("Invalid job_position_id".to_string()))?,
                );
            }
            "resume" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes: Bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?;
                upload = Some(ResumeUpload { filename, bytes });
            }
            _ => {}
        }
    }

    let job_position_id = job_position_id
        .ok_or_else(|| AppError::Validation("job_position_id is required".to_string()))?;
    let upload =
        upload.ok_or_else(|| AppError::Validation("A resume file is required".to_string()))?;

    let mut store = PgHrStore::acquire(&state.db).await?;
    let receipt = submit_application(
        &mut store,
        SubmissionDeps {
            files: state.files.as_ref(),
            parser: state.resume_parser.as_ref(),
            scorer: state.match_scorer.as_ref(),
            max_resume_bytes: state.config.max_resume_bytes,
        },
        ctx.user_id,
        job_position_id,
        upload,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(receipt)))
}

/// GET /api/v1/applications/mine
pub async fn handle_my_applications(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<Vec<CandidateApplicationItem>>, AppError> {
    ctx.require(UserRole::Candidate)?;

    let items = sqlx::query_as::<_, CandidateApplicationItem>(
        r#"
        SELECT a.id, a.job_position_id, j.title AS job_title, j.department,
               a.match_percentage, a.status, a.applied_at, a.updated_at
        FROM applications a
        JOIN job_positions j ON j.id = a.job_position_id
        WHERE a.candidate_id = $1
        ORDER BY a.applied_at DESC
        "#,
    )
    .bind(ctx.user_id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(items))
}

// ────────────────────────────────────────────────────────────────────────────
// HR handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/applications?job_id=&status=&min_match=&max_match=
pub async fn handle_list_applications(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(filter): Query<ApplicationFilter>,
) -> Result<Json<Vec<ApplicationListItem>>, AppError> {
    ctx.require(UserRole::Hr)?;

    let mut query = build_listing_query(&filter)?;
    let items = query
        .build_query_as::<ApplicationListItem>()
        .fetch_all(&state.db)
        .await?;

    Ok(Json(items))
}

/// GET /api/v1/applications/:id
pub async fn handle_get_application(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(application_id): Path<Uuid>,
) -> Result<Json<ApplicationDetailResponse>, AppError> {
    ctx.require(UserRole::Hr)?;

    let application =
        sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE id = $1")
            .bind(application_id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Application {application_id} not found")))?;

    let candidate = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(application.candidate_id)
        .fetch_one(&state.db)
        .await?;

    let job_title: String = sqlx::query_scalar("SELECT title FROM job_positions WHERE id = $1")
        .bind(application.job_position_id)
        .fetch_one(&state.db)
        .await?;

    Ok(Json(ApplicationDetailResponse {
        application,
        candidate,
        job_title,
    }))
}

/// PATCH /api/v1/applications/:id/status
///
/// Moving to `hired` converts the candidate into an employee.
pub async fn handle_update_status(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(application_id): Path<Uuid>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<StatusUpdateOutcome>, AppError> {
    ctx.require(UserRole::Hr)?;

    let new_status: ApplicationStatus = request.new_status.parse()?;
    let notes = request
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let outcome = update_application_status(&state.db, application_id, new_status, notes).await?;
    Ok(Json(outcome))
}

/// POST /api/v1/applications/bulk
pub async fn handle_bulk_action(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(request): Json<BulkActionRequest>,
) -> Result<Json<BulkOutcome>, AppError> {
    ctx.require(UserRole::Hr)?;

    let outcome = process_bulk_action(&state.db, request.action, &request.application_ids).await?;
    Ok(Json(outcome))
}

/// GET /api/v1/hr/dashboard
pub async fn handle_hr_dashboard(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<HrDashboardResponse>, AppError> {
    ctx.require(UserRole::Hr)?;

    let by_status = sqlx::query_as::<_, StatusCount>(
        "SELECT status, COUNT(*) AS count FROM applications GROUP BY status ORDER BY status",
    )
    .fetch_all(&state.db)
    .await?;

    let by_job = sqlx::query_as::<_, JobApplicationStats>(
        r#"
        SELECT j.id AS job_position_id, j.title,
               COUNT(a.id) AS applications, AVG(a.match_percentage) AS average_match
        FROM job_positions j
        LEFT JOIN applications a ON a.job_position_id = j.id
        WHERE j.status = 'active'
        GROUP BY j.id, j.title
        ORDER BY applications DESC, j.title
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    let active_jobs: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM job_positions WHERE status = 'active'")
            .fetch_one(&state.db)
            .await?;

    let employees: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'employee'")
        .fetch_one(&state.db)
        .await?;

    let recent_hires = sqlx::query_as::<_, RecentHire>(
        r#"
        SELECT a.id AS application_id, u.id AS employee_id, u.full_name,
               j.title AS job_title, a.updated_at AS hired_at
        FROM applications a
        JOIN users u ON u.id = a.candidate_id
        JOIN job_positions j ON j.id = a.job_position_id
        WHERE a.status = 'hired'
        ORDER BY a.updated_at DESC
        LIMIT 10
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(HrDashboardResponse {
        total_applications: by_status.iter().map(|s| s.count).sum(),
        by_status,
        by_job,
        active_jobs,
        employees,
        recent_hires,
    }))
}
