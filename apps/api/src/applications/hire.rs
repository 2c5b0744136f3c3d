//! Hire conversion: turns a candidate into an employee and materializes the
//! onboarding artifacts they need.
//!
//! Flow: application → job department → user role flip → onboarding tasks →
//!       training modules → required documents.
//!
//! All steps run on the caller's transaction. Every insert is keyed on its
//! natural unique constraint, so re-hiring the same application is a no-op
//! apart from refreshing the user's department and position.

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::applications::status::ApplicationStatus;
use crate::applications::store::HrStore;
use crate::errors::AppError;
use crate::models::onboarding::REQUIRED_DOCUMENTS;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HireOutcome {
    pub application_id: Uuid,
    pub employee_id: Uuid,
    pub department: String,
    pub onboarding_tasks_assigned: u64,
    pub training_modules_assigned: u64,
    pub documents_created: u64,
}

/// Runs the hire steps against `store`. Commit and rollback belong to the caller.
pub async fn hire_in(
    store: &mut dyn HrStore,
    application_id: Uuid,
    notes: Option<&str>,
) -> Result<HireOutcome, AppError> {
    let application = store
        .application(application_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {application_id} not found")))?;

    // Step 1: mark hired
    if !store
        .set_application_status(application_id, ApplicationStatus::Hired, notes)
        .await?
    {
        return Err(AppError::NotFound(format!(
            "Application {application_id} not found"
        )));
    }

    // Step 2: the job decides the department
    let job = store
        .job_position(application.job_position_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Job position {} for application {application_id} not found",
                application.job_position_id
            ))
        })?;

    // Step 3: candidate becomes employee
    let employee_id = application.candidate_id;
    store
        .promote_to_employee(employee_id, &job.department, job.id)
        .await?;

    // Steps 4-6: idempotent materialization
    let onboarding_tasks_assigned = store
        .assign_onboarding_tasks(employee_id, &job.department)
        .await?;
    let training_modules_assigned = store
        .assign_training_modules(employee_id, &job.department)
        .await?;
    let documents_created = store
        .ensure_required_documents(employee_id, &REQUIRED_DOCUMENTS)
        .await?;

    info!(
        "Hired application {application_id}: employee {employee_id} in {} \
         ({onboarding_tasks_assigned} tasks, {training_modules_assigned} modules, {documents_created} documents)",
        job.department
    );

    Ok(HireOutcome {
        application_id,
        employee_id,
        department: job.department,
        onboarding_tasks_assigned,
        training_modules_assigned,
        documents_created,
    })
}
