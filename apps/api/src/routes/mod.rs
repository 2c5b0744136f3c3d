pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::applications::handlers as applications;
use crate::jobs::handlers as jobs;
use crate::onboarding::handlers as onboarding;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Job positions
        .route(
            "/api/v1/jobs",
            get(jobs::handle_list_jobs).post(jobs::handle_create_job),
        )
        .route("/api/v1/jobs/:id/close", patch(jobs::handle_close_job))
        // Applications
        .route(
            "/api/v1/applications",
            get(applications::handle_list_applications)
                .post(applications::handle_submit_application),
        )
        .route(
            "/api/v1/applications/mine",
            get(applications::handle_my_applications),
        )
        .route(
            "/api/v1/applications/bulk",
            post(applications::handle_bulk_action),
        )
        .route(
            "/api/v1/applications/:id",
            get(applications::handle_get_application),
        )
        .route(
            "/api/v1/applications/:id/status",
            patch(applications::handle_update_status),
        )
        // HR
        .route("/api/v1/hr/dashboard", get(applications::handle_hr_dashboard))
        .route(
            "/api/v1/hr/documents/:id/review",
            patch(onboarding::handle_review_document),
        )
        // Employee portal
        .route(
            "/api/v1/employee/dashboard",
            get(onboarding::handle_employee_dashboard),
        )
        .route(
            "/api/v1/employee/onboarding",
            get(onboarding::handle_list_onboarding),
        )
        .route(
            "/api/v1/employee/onboarding/:task_id/complete",
            post(onboarding::handle_complete_task),
        )
        .route(
            "/api/v1/employee/training",
            get(onboarding::handle_list_training),
        )
        .route(
            "/api/v1/employee/training/:module_id",
            patch(onboarding::handle_update_training),
        )
        .route(
            "/api/v1/employee/documents",
            get(onboarding::handle_list_documents),
        )
        .route(
            "/api/v1/employee/documents/:document_type",
            post(onboarding::handle_upload_document),
        )
        .with_state(state)
}
