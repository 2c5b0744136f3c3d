//! Axum route handlers for the employee portal and HR document review.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::auth::RequestContext;
use crate::errors::AppError;
use crate::models::onboarding::{EmployeeDocumentRow, OnboardingAssignment, TrainingAssignment};
use crate::models::user::{UserRole, UserRow};
use crate::onboarding::progress::{compute_progress_summary, ProgressSummary};
use crate::onboarding::rules::{
    ensure_reviewable, ensure_uploadable, submitted_or_locked, training_state_for,
    validate_document_file, ReviewDecision,
};
use crate::state::AppState;
use crate::storage::{content_type_for, document_key};

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct EmployeeDashboardResponse {
    pub employee: UserRow,
    pub job_title: Option<String>,
    pub progress: ProgressSummary,
}

#[derive(Debug, Deserialize)]
pub struct TrainingProgressRequest {
    pub progress_percentage: i32,
}

#[derive(Debug, Deserialize)]
pub struct DocumentReviewRequest {
    pub decision: String,
    pub notes: Option<String>,
}

/// Re-checks the approval lock in the same statement that writes the file,
/// so a review landing during the upload is never overwritten.
const SUBMIT_DOCUMENT_SQL: &str = r#"
    UPDATE employee_documents
    SET status = 'submitted', file_path = $1, submitted_at = NOW(), reviewed_at = NULL
    WHERE id = $2 AND status <> 'approved'
    RETURNING *
"#;

// ────────────────────────────────────────────────────────────────────────────
// Loaders
// ────────────────────────────────────────────────────────────────────────────

async fn load_tasks(db: &PgPool, employee_id: Uuid) -> Result<Vec<OnboardingAssignment>, AppError> {
    let tasks = sqlx::query_as::<_, OnboardingAssignment>(
        r#"
        SELECT t.id AS task_id, t.task_name, t.description, t.is_mandatory, t.order_sequence,
               eo.status, eo.completed_at
        FROM employee_onboarding eo
        JOIN onboarding_tasks t ON t.id = eo.task_id
        WHERE eo.employee_id = $1
        ORDER BY t.order_sequence, t.task_name
        "#,
    )
    .bind(employee_id)
    .fetch_all(db)
    .await?;
    Ok(tasks)
}

async fn load_training(db: &PgPool, employee_id: Uuid) -> Result<Vec<TrainingAssignment>, AppError> {
    let modules = sqlx::query_as::<_, TrainingAssignment>(
        r#"
        SELECT m.id AS module_id, m.module_name, m.description, m.is_mandatory,
               m.duration_hours, m.order_sequence,
               et.status, et.progress_percentage, et.started_at, et.completed_at
        FROM employee_training et
        JOIN training_modules m ON m.id = et.module_id
        WHERE et.employee_id = $1
        ORDER BY m.order_sequence, m.module_name
        "#,
    )
    .bind(employee_id)
    .fetch_all(db)
    .await?;
    Ok(modules)
}

async fn load_documents(
    db: &PgPool,
    employee_id: Uuid,
) -> Result<Vec<EmployeeDocumentRow>, AppError> {
    let documents = sqlx::query_as::<_, EmployeeDocumentRow>(
        "SELECT * FROM employee_documents WHERE employee_id = $1 ORDER BY document_name",
    )
    .bind(employee_id)
    .fetch_all(db)
    .await?;
    Ok(documents)
}

// ────────────────────────────────────────────────────────────────────────────
// Employee handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/employee/dashboard
pub async fn handle_employee_dashboard(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<EmployeeDashboardResponse>, AppError> {
    ctx.require(UserRole::Employee)?;

    let employee = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(ctx.user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", ctx.user_id)))?;

    let job_title: Option<String> = match employee.job_position_id {
        Some(job_id) => {
            sqlx::query_scalar("SELECT title FROM job_positions WHERE id = $1")
                .bind(job_id)
                .fetch_optional(&state.db)
                .await?
        }
        None => None,
    };

    let tasks = load_tasks(&state.db, ctx.user_id).await?;
    let modules = load_training(&state.db, ctx.user_id).await?;
    let documents = load_documents(&state.db, ctx.user_id).await?;

    Ok(Json(EmployeeDashboardResponse {
        employee,
        job_title,
        progress: compute_progress_summary(&tasks, &modules, &documents),
    }))
}

/// GET /api/v1/employee/onboarding
pub async fn handle_list_onboarding(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<Vec<OnboardingAssignment>>, AppError> {
    ctx.require(UserRole::Employee)?;
    Ok(Json(load_tasks(&state.db, ctx.user_id).await?))
}

/// POST /api/v1/employee/onboarding/:task_id/complete
///
/// Completing an already completed task leaves `completed_at` untouched.
pub async fn handle_complete_task(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(task_id): Path<Uuid>,
) -> Result<Json<Vec<OnboardingAssignment>>, AppError> {
    ctx.require(UserRole::Employee)?;

    let assigned: bool = sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM employee_onboarding WHERE employee_id = $1 AND task_id = $2)",
    )
    .bind(ctx.user_id)
    .bind(task_id)
    .fetch_one(&state.db)
    .await?;
    if !assigned {
        return Err(AppError::NotFound(format!(
            "Onboarding task {task_id} is not assigned to you"
        )));
    }

    let result = sqlx::query(
        r#"
        UPDATE employee_onboarding
        SET status = 'completed', completed_at = NOW()
        WHERE employee_id = $1 AND task_id = $2 AND status <> 'completed'
        "#,
    )
    .bind(ctx.user_id)
    .bind(task_id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() > 0 {
        info!("Employee {} completed onboarding task {task_id}", ctx.user_id);
    }

    Ok(Json(load_tasks(&state.db, ctx.user_id).await?))
}

/// GET /api/v1/employee/training
pub async fn handle_list_training(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<Vec<TrainingAssignment>>, AppError> {
    ctx.require(UserRole::Employee)?;
    Ok(Json(load_training(&state.db, ctx.user_id).await?))
}

/// PATCH /api/v1/employee/training/:module_id
pub async fn handle_update_training(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(module_id): Path<Uuid>,
    Json(req): Json<TrainingProgressRequest>,
) -> Result<Json<Vec<TrainingAssignment>>, AppError> {
    ctx.require(UserRole::Employee)?;

    let (status, progress) = training_state_for(req.progress_percentage);

    // started_at is set once; completed_at follows the completed state.
    let result = sqlx::query(
        r#"
        UPDATE employee_training
        SET progress_percentage = $1,
            status = $2,
            started_at = CASE WHEN $2 = 'not_started' THEN started_at
                              ELSE COALESCE(started_at, NOW()) END,
            completed_at = CASE WHEN $2 = 'completed' THEN COALESCE(completed_at, NOW())
                                ELSE NULL END
        WHERE employee_id = $3 AND module_id = $4
        "#,
    )
    .bind(progress)
    .bind(status.as_str())
    .bind(ctx.user_id)
    .bind(module_id)
    .execute(&state.db)
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Training module {module_id} is not assigned to you"
        )));
    }

    info!(
        "Employee {} training {module_id}: {}% ({})",
        ctx.user_id,
        progress,
        status.as_str()
    );
    Ok(Json(load_training(&state.db, ctx.user_id).await?))
}

/// GET /api/v1/employee/documents
pub async fn handle_list_documents(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<Vec<EmployeeDocumentRow>>, AppError> {
    ctx.require(UserRole::Employee)?;
    Ok(Json(load_documents(&state.db, ctx.user_id).await?))
}

/// POST /api/v1/employee/documents/:document_type
///
/// Multipart form with a single `file` field.
pub async fn handle_upload_document(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(document_type): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<EmployeeDocumentRow>, AppError> {
    ctx.require(UserRole::Employee)?;

    let document = sqlx::query_as::<_, EmployeeDocumentRow>(
        "SELECT * FROM employee_documents WHERE employee_id = $1 AND document_type = $2",
    )
    .bind(ctx.user_id)
    .bind(&document_type)
    .fetch_optional(&state.db)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("No '{document_type}' document slot")))?;
    ensure_uploadable(&document)?;

    let mut upload: Option<(String, Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Malformed upload: {e}")))?;
            upload = Some((filename, bytes));
        }
    }
    let (filename, bytes) =
        upload.ok_or_else(|| AppError::Validation("A document file is required".to_string()))?;

    let ext = validate_document_file(&filename, bytes.len(), state.config.max_resume_bytes)?;
    let key = document_key(ctx.user_id, &document_type, &filename);
    let stored_path = state.files.put(&key, bytes, content_type_for(&ext)).await?;

    let updated = sqlx::query_as::<_, EmployeeDocumentRow>(SUBMIT_DOCUMENT_SQL)
        .bind(&stored_path)
        .bind(document.id)
        .fetch_optional(&state.db)
        .await?;
    let updated = submitted_or_locked(updated, &document.document_name)?;

    info!("Employee {} submitted {document_type}", ctx.user_id);
    Ok(Json(updated))
}

// ────────────────────────────────────────────────────────────────────────────
// HR handlers
// ────────────────────────────────────────────────────────────────────────────

/// PATCH /api/v1/hr/documents/:id/review
pub async fn handle_review_document(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(document_id): Path<Uuid>,
    Json(req): Json<DocumentReviewRequest>,
) -> Result<Json<EmployeeDocumentRow>, AppError> {
    ctx.require(UserRole::Hr)?;

    let decision = ReviewDecision::parse(&req.decision)?;

    let document =
        sqlx::query_as::<_, EmployeeDocumentRow>("SELECT * FROM employee_documents WHERE id = $1")
            .bind(document_id)
            .fetch_optional(&state.db)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Document {document_id} not found")))?;
    ensure_reviewable(&document)?;

    let notes = req
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());

    let updated = sqlx::query_as::<_, EmployeeDocumentRow>(
        r#"
        UPDATE employee_documents
        SET status = $1, reviewer_notes = $2, reviewed_at = NOW()
        WHERE id = $3
        RETURNING *
        "#,
    )
    .bind(decision.as_str())
    .bind(notes)
    .bind(document_id)
    .fetch_one(&state.db)
    .await?;

    info!(
        "Document {document_id} of employee {} {} by {}",
        updated.employee_id,
        decision.as_str(),
        ctx.user_id
    );
    Ok(Json(updated))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_keeps_approved_documents_locked() {
        let sql = SUBMIT_DOCUMENT_SQL.split_whitespace().collect::<Vec<_>>().join(" ");
        assert!(sql.contains("WHERE id = $2 AND status <> 'approved'"));
        assert!(sql.contains("RETURNING *"));
    }
}
