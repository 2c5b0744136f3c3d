use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::RequestContext;
use crate::errors::AppError;
use crate::models::job::{ExperienceLevel, JobPositionRow};
use crate::models::user::UserRole;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub title: String,
    pub department: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required_skills: String,
    pub experience_level: String,
}

/// A create request after trimming and validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidJob {
    pub title: String,
    pub department: String,
    pub description: String,
    pub required_skills: String,
    pub experience_level: ExperienceLevel,
}

/// Checks required fields and normalizes the skill list to `"a, b, c"`.
pub fn validate_new_job(req: &CreateJobRequest) -> Result<ValidJob, AppError> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title is required".to_string()));
    }
    let department = req.department.trim();
    if department.is_empty() {
        return Err(AppError::Validation("department is required".to_string()));
    }
    let experience_level: ExperienceLevel = req.experience_level.parse()?;

    let required_skills = req
        .required_skills
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

    Ok(ValidJob {
        title: title.to_string(),
        department: department.to_string(),
        description: req.description.trim().to_string(),
        required_skills,
        experience_level,
    })
}

/// GET /api/v1/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    _ctx: RequestContext,
) -> Result<Json<Vec<JobPositionRow>>, AppError> {
    let jobs = sqlx::query_as::<_, JobPositionRow>(
        "SELECT * FROM job_positions WHERE status = 'active' ORDER BY created_at DESC",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(jobs))
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(req): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobPositionRow>), AppError> {
    ctx.require(UserRole::Hr)?;
    let job = validate_new_job(&req)?;

    let row = sqlx::query_as::<_, JobPositionRow>(
        r#"
        INSERT INTO job_positions
            (id, title, department, description, required_skills, experience_level, created_by)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(&job.title)
    .bind(&job.department)
    .bind(&job.description)
    .bind(&job.required_skills)
    .bind(job.experience_level.as_str())
    .bind(ctx.user_id)
    .fetch_one(&state.db)
    .await?;

    info!("Job position {} '{}' created by {}", row.id, row.title, ctx.user_id);
    Ok((StatusCode::CREATED, Json(row)))
}

/// PATCH /api/v1/jobs/:id/close
pub async fn handle_close_job(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    ctx.require(UserRole::Hr)?;

    let result = sqlx::query("UPDATE job_positions SET status = 'closed' WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Job position {id} not found")));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(title: &str, skills: &str, level: &str) -> CreateJobRequest {
        CreateJobRequest {
            title: title.to_string(),
            department: "Salon".to_string(),
            description: String::new(),
            required_skills: skills.to_string(),
            experience_level: level.to_string(),
        }
    }

    #[test]
    fn test_skills_are_normalized() {
        let job = validate_new_job(&request("Stylist", " Cutting ,, Colouring,", "Mid")).unwrap();
        assert_eq!(job.required_skills, "Cutting, Colouring");
        assert_eq!(job.experience_level, ExperienceLevel::Mid);
    }

    #[test]
    fn test_blank_title_rejected() {
        let err = validate_new_job(&request("   ", "Cutting", "entry")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_unknown_level_rejected() {
        assert!(validate_new_job(&request("Stylist", "Cutting", "guru")).is_err());
    }
}
