//! Bulk actions over the HR listing.
//!
//! The batch shares one transaction; each id runs under a savepoint so a bad
//! id only loses its own writes. A batch where nothing succeeded is rolled
//! back as a whole.

use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::applications::hire::hire_in;
use crate::applications::status::BulkAction;
use crate::applications::store::{HrStore, PgHrTx};
use crate::errors::AppError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkOutcome {
    pub processed_count: usize,
    pub hired_count: usize,
    pub failed_ids: Vec<Uuid>,
}

impl BulkOutcome {
    pub fn should_commit(&self) -> bool {
        self.processed_count > 0
    }
}

/// Applies `action` to every id against `store`. Per-id failures are
/// recorded and skipped; only savepoint bookkeeping errors abort the batch.
pub async fn apply_bulk_action(
    store: &mut dyn HrStore,
    action: BulkAction,
    application_ids: &[Uuid],
) -> Result<BulkOutcome, AppError> {
    let mut outcome = BulkOutcome::default();

    for &id in application_ids {
        store.savepoint().await?;

        let result = match action {
            BulkAction::HireSelected => hire_in(store, id, None).await.map(|_| true),
            other => {
                store
                    .set_application_status(id, other.target_status(), None)
                    .await
            }
        };

        match result {
            Ok(true) => {
                store.release_savepoint().await?;
                outcome.processed_count += 1;
                if action == BulkAction::HireSelected {
                    outcome.hired_count += 1;
                }
            }
            Ok(false) => {
                warn!("Bulk {action:?}: application {id} not found, skipping");
                store.release_savepoint().await?;
                outcome.failed_ids.push(id);
            }
            Err(e) => {
                warn!("Bulk {action:?}: application {id} failed, skipping: {e}");
                store.rollback_to_savepoint().await?;
                outcome.failed_ids.push(id);
            }
        }
    }

    Ok(outcome)
}

/// Runs a bulk action in one transaction, committing only if some id succeeded.
pub async fn process_bulk_action(
    pool: &PgPool,
    action: BulkAction,
    application_ids: &[Uuid],
) -> Result<BulkOutcome, AppError> {
    if application_ids.is_empty() {
        return Err(AppError::Validation(
            "Select at least one application".to_string(),
        ));
    }

    let mut tx = PgHrTx::begin(pool).await?;
    let outcome = apply_bulk_action(&mut tx, action, application_ids).await?;

    if !outcome.should_commit() {
        tx.rollback().await?;
        return Err(AppError::Validation(format!(
            "No applications were updated ({} failed)",
            outcome.failed_ids.len()
        )));
    }

    tx.commit().await?;
    info!(
        "Bulk {action:?}: processed {} of {}, hired {}",
        outcome.processed_count,
        application_ids.len(),
        outcome.hired_count
    );
    Ok(outcome)
}
