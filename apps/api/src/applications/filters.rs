use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::applications::status::ApplicationStatus;
use crate::errors::AppError;

const LISTING_SELECT: &str = r#"
    SELECT a.id, a.candidate_id, u.full_name AS candidate_name, u.email AS candidate_email,
           a.job_position_id, j.title AS job_title, a.match_percentage, a.status, a.applied_at
    FROM applications a
    JOIN users u ON u.id = a.candidate_id
    JOIN job_positions j ON j.id = a.job_position_id
"#;

/// Optional predicates for the HR application listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApplicationFilter {
    pub job_id: Option<Uuid>,
    pub status: Option<String>,
    pub min_match: Option<f64>,
    pub max_match: Option<f64>,
}

impl ApplicationFilter {
    fn validated_status(&self) -> Result<Option<ApplicationStatus>, AppError> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") | Some("all") => Ok(None),
            Some(s) => s.parse().map(Some),
        }
    }

    fn validate_range(&self) -> Result<(), AppError> {
        for bound in [self.min_match, self.max_match].into_iter().flatten() {
            if !(0.0..=100.0).contains(&bound) {
                return Err(AppError::Validation(
                    "Match filters must be between 0 and 100".to_string(),
                ));
            }
        }
        if let (Some(min), Some(max)) = (self.min_match, self.max_match) {
            if min > max {
                return Err(AppError::Validation(
                    "min_match cannot exceed max_match".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Composes the listing query with bound parameters for every active filter,
/// best matches first.
pub fn build_listing_query(
    filter: &ApplicationFilter,
) -> Result<QueryBuilder<'static, Postgres>, AppError> {
    let status = filter.validated_status()?;
    filter.validate_range()?;

    let mut qb = QueryBuilder::<Postgres>::new(LISTING_SELECT);
    qb.push(" WHERE TRUE");

    if let Some(job_id) = filter.job_id {
        qb.push(" AND a.job_position_id = ").push_bind(job_id);
    }
    if let Some(status) = status {
        qb.push(" AND a.status = ").push_bind(status.as_str());
    }
    if let Some(min) = filter.min_match {
        qb.push(" AND a.match_percentage >= ").push_bind(min);
    }
    if let Some(max) = filter.max_match {
        qb.push(" AND a.match_percentage <= ").push_bind(max);
    }

    qb.push(" ORDER BY a.match_percentage DESC, a.applied_at ASC");
    Ok(qb)
}
