use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// An onboarding task assignment joined with its template.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct OnboardingAssignment {
    pub task_id: Uuid,
    pub task_name: String,
    pub description: String,
    pub is_mandatory: bool,
    pub order_sequence: i32,
    pub status: String,
    pub completed_at: Option<DateTime<Utc>>,
}

/// A training module assignment joined with its template.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TrainingAssignment {
    pub module_id: Uuid,
    pub module_name: String,
    pub description: String,
    pub is_mandatory: bool,
    pub duration_hours: i32,
    pub order_sequence: i32,
    pub status: String,
    pub progress_percentage: i32,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EmployeeDocumentRow {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub document_type: String,
    pub document_name: String,
    pub status: String,
    pub file_path: Option<String>,
    pub is_required: bool,
    pub submitted_at: Option<DateTime<Utc>>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewer_notes: Option<String>,
}

/// A document slot every new employee must fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequiredDocument {
    pub document_type: &'static str,
    pub document_name: &'static str,
}

/// The fixed catalog materialized at hire time.
pub const REQUIRED_DOCUMENTS: [RequiredDocument; 5] = [
    RequiredDocument {
        document_type: "employment_contract",
        document_name: "Employment Contract",
    },
    RequiredDocument {
        document_type: "personal_information_form",
        document_name: "Personal Information Form",
    },
    RequiredDocument {
        document_type: "bank_details_form",
        document_name: "Bank Details Form",
    },
    RequiredDocument {
        document_type: "id_copy",
        document_name: "ID Copy",
    },
    RequiredDocument {
        document_type: "educational_certificates",
        document_name: "Educational Certificates",
    },
];
