use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub job_position_id: Uuid,
    pub resume_filename: String,
    pub resume_path: String,
    pub api_response: Option<Value>,
    pub extracted_skills: Option<Value>,
    pub extracted_experience: Option<Value>,
    pub extracted_education: Option<Value>,
    pub extracted_contact: Option<Value>,
    pub match_percentage: f64,
    pub status: String,
    pub hr_notes: Option<String>,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Identity and current status of an application; enough to drive a transition.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct ApplicationRef {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub job_position_id: Uuid,
    pub status: String,
}

/// Values written when a candidate submits a resume.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub candidate_id: Uuid,
    pub job_position_id: Uuid,
    pub resume_filename: String,
    pub resume_path: String,
    pub api_response: Value,
    pub extracted_skills: Value,
    pub extracted_experience: Value,
    pub extracted_education: Value,
    pub extracted_contact: Value,
    pub match_percentage: f64,
}

/// One row of the HR listing: application joined with candidate and job.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ApplicationListItem {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub candidate_name: String,
    pub candidate_email: String,
    pub job_position_id: Uuid,
    pub job_title: String,
    pub match_percentage: f64,
    pub status: String,
    pub applied_at: DateTime<Utc>,
}

/// A candidate's own view of an application.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CandidateApplicationItem {
    pub id: Uuid,
    pub job_position_id: Uuid,
    pub job_title: String,
    pub department: String,
    pub match_percentage: f64,
    pub status: String,
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
