use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::onboarding::EmployeeDocumentRow;
use crate::storage::file_extension;

pub const ALLOWED_DOCUMENT_EXTENSIONS: [&str; 6] = ["pdf", "doc", "docx", "jpg", "jpeg", "png"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl TrainingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrainingStatus::NotStarted => "not_started",
            TrainingStatus::InProgress => "in_progress",
            TrainingStatus::Completed => "completed",
        }
    }
}

/// Clamps `progress` to 0..=100 and derives the module status from it.
pub fn training_state_for(progress: i32) -> (TrainingStatus, i32) {
    let progress = progress.clamp(0, 100);
    let status = match progress {
        0 => TrainingStatus::NotStarted,
        100 => TrainingStatus::Completed,
        _ => TrainingStatus::InProgress,
    };
    (status, progress)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl ReviewDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewDecision::Approved => "approved",
            ReviewDecision::Rejected => "rejected",
        }
    }

    pub fn parse(decision: &str) -> Result<Self, AppError> {
        match decision.trim().to_ascii_lowercase().as_str() {
            "approved" => Ok(ReviewDecision::Approved),
            "rejected" => Ok(ReviewDecision::Rejected),
            other => Err(AppError::Validation(format!(
                "Review decision must be 'approved' or 'rejected', got '{other}'"
            ))),
        }
    }
}

/// An approved document is final; every other slot accepts a new file.
pub fn ensure_uploadable(document: &EmployeeDocumentRow) -> Result<(), AppError> {
    if document.status == "approved" {
        return Err(AppError::Validation(format!(
            "{} has already been approved",
            document.document_name
        )));
    }
    Ok(())
}

/// Result of the guarded submit write: no row back means the slot was
/// approved while the file was uploading.
pub fn submitted_or_locked(
    updated: Option<EmployeeDocumentRow>,
    document_name: &str,
) -> Result<EmployeeDocumentRow, AppError> {
    updated.ok_or_else(|| {
        AppError::Validation(format!("{document_name} has already been approved"))
    })
}

/// Only slots holding a file can be reviewed.
pub fn ensure_reviewable(document: &EmployeeDocumentRow) -> Result<(), AppError> {
    if document.file_path.is_none() || document.status == "pending" {
        return Err(AppError::Validation(format!(
            "{} has not been submitted yet",
            document.document_name
        )));
    }
    Ok(())
}

/// Returns the lowercased extension of an acceptable document upload.
pub fn validate_document_file(
    filename: &str,
    size: usize,
    max_bytes: usize,
) -> Result<String, AppError> {
    if size == 0 {
        return Err(AppError::Validation("Document file is empty".to_string()));
    }
    if size > max_bytes {
        return Err(AppError::Validation(format!(
            "Document exceeds the {} MB limit",
            max_bytes / (1024 * 1024)
        )));
    }
    match file_extension(filename) {
        Some(ext) if ALLOWED_DOCUMENT_EXTENSIONS.contains(&ext.as_str()) => Ok(ext),
        _ => Err(AppError::Validation(format!(
            "Unsupported document type; allowed: {}",
            ALLOWED_DOCUMENT_EXTENSIONS.join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn slot(status: &str, file_path: Option<&str>) -> EmployeeDocumentRow {
        EmployeeDocumentRow {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            document_type: "bank_details_form".to_string(),
            document_name: "Bank Details Form".to_string(),
            status: status.to_string(),
            file_path: file_path.map(str::to_string),
            is_required: true,
            submitted_at: None,
            reviewed_at: None,
            reviewer_notes: None,
        }
    }

    #[test]
    fn test_training_state_boundaries() {
        assert_eq!(training_state_for(0), (TrainingStatus::NotStarted, 0));
        assert_eq!(training_state_for(1), (TrainingStatus::InProgress, 1));
        assert_eq!(training_state_for(99), (TrainingStatus::InProgress, 99));
        assert_eq!(training_state_for(100), (TrainingStatus::Completed, 100));
    }

    #[test]
    fn test_training_progress_is_clamped() {
        assert_eq!(training_state_for(-20), (TrainingStatus::NotStarted, 0));
        assert_eq!(training_state_for(250), (TrainingStatus::Completed, 100));
    }

    #[test]
    fn test_review_decision_accepts_only_two_values() {
        assert_eq!(ReviewDecision::parse("Approved").unwrap(), ReviewDecision::Approved);
        assert_eq!(ReviewDecision::parse(" rejected ").unwrap(), ReviewDecision::Rejected);
        assert!(matches!(
            ReviewDecision::parse("submitted"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_approved_slot_is_locked() {
        assert!(ensure_uploadable(&slot("pending", None)).is_ok());
        assert!(ensure_uploadable(&slot("rejected", Some("k"))).is_ok());
        assert!(ensure_uploadable(&slot("approved", Some("k"))).is_err());
    }

    #[test]
    fn test_approval_during_upload_rejects_submit() {
        let err = submitted_or_locked(None, "Bank Details Form").unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("already been approved")));

        let row = slot("submitted", Some("k"));
        let kept = submitted_or_locked(Some(row.clone()), "Bank Details Form").unwrap();
        assert_eq!(kept.id, row.id);
    }

    #[test]
    fn test_pending_slot_cannot_be_reviewed() {
        assert!(ensure_reviewable(&slot("pending", None)).is_err());
        assert!(ensure_reviewable(&slot("submitted", Some("k"))).is_ok());
    }

    #[test]
    fn test_document_file_checks() {
        assert_eq!(validate_document_file("id.PNG", 10, 100).unwrap(), "png");
        assert!(validate_document_file("id.exe", 10, 100).is_err());
        assert!(validate_document_file("id.pdf", 0, 100).is_err());
        assert!(validate_document_file("id.pdf", 101, 100).is_err());
    }
}
