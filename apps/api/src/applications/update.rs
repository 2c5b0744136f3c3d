use serde::Serialize;
use sqlx::PgPool;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::applications::hire::{hire_in, HireOutcome};
use crate::applications::status::{
    leaves_hired, transition_effect, ApplicationStatus, TransitionEffect,
};
use crate::applications::store::{HrStore, PgHrTx};
use crate::errors::AppError;

#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdateOutcome {
    pub application_id: Uuid,
    pub previous_status: String,
    pub status: ApplicationStatus,
    /// Present when the update converted the candidate.
    pub hire: Option<HireOutcome>,
}

/// Applies an HR status change against `store`.
pub async fn apply_status_update(
    store: &mut dyn HrStore,
    application_id: Uuid,
    new_status: ApplicationStatus,
    notes: Option<&str>,
) -> Result<StatusUpdateOutcome, AppError> {
    let current = store
        .application(application_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {application_id} not found")))?;

    let from = current.status.parse::<ApplicationStatus>().ok();
    if let Some(from) = from {
        if leaves_hired(from, new_status) {
            warn!(
                "Application {application_id} moved from hired to {new_status}; the employee account is unchanged"
            );
        } else if from.is_terminal() && from != new_status {
            info!("Application {application_id} reopened from {from} to {new_status}");
        }
    }

    let hire = match transition_effect(from.unwrap_or(ApplicationStatus::Pending), new_status) {
        TransitionEffect::Hire => Some(hire_in(store, application_id, notes).await?),
        TransitionEffect::FieldWrite => {
            if !store
                .set_application_status(application_id, new_status, notes)
                .await?
            {
                return Err(AppError::NotFound(format!(
                    "Application {application_id} not found"
                )));
            }
            None
        }
    };

    Ok(StatusUpdateOutcome {
        application_id,
        previous_status: current.status,
        status: new_status,
        hire,
    })
}

/// Runs a status change in its own transaction.
pub async fn update_application_status(
    pool: &PgPool,
    application_id: Uuid,
    new_status: ApplicationStatus,
    notes: Option<&str>,
) -> Result<StatusUpdateOutcome, AppError> {
    let mut tx = PgHrTx::begin(pool).await?;

    match apply_status_update(&mut tx, application_id, new_status, notes).await {
        Ok(outcome) => {
            tx.commit().await?;
            info!(
                "Application {application_id}: {} -> {}",
                outcome.previous_status, outcome.status
            );
            Ok(outcome)
        }
        Err(e) => {
            error!("Status update of application {application_id} failed: {e}");
            if let Err(rollback_err) = tx.rollback().await {
                warn!("Rollback after failed status update also failed: {rollback_err}");
            }
            Err(e)
        }
    }
}
