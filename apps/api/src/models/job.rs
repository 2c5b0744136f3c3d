use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobPositionRow {
    pub id: Uuid,
    pub title: String,
    pub department: String,
    pub description: String,
    /// Comma-separated, e.g. "React, Node, SQL".
    pub required_skills: String,
    pub experience_level: String,
    pub status: String,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

impl JobPositionRow {
    pub fn is_active(&self) -> bool {
        self.status == "active"
    }

    pub fn requirements(&self) -> JobRequirements {
        JobRequirements {
            required_skills: self.required_skills.clone(),
            experience_level: self.experience_level.parse().ok(),
        }
    }
}

/// The subset of a job position the match scorer reads.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobRequirements {
    pub required_skills: String,
    /// `None` when the stored level is not one we recognise.
    pub experience_level: Option<ExperienceLevel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "entry",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
        }
    }
}

impl FromStr for ExperienceLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "entry" => Ok(ExperienceLevel::Entry),
            "mid" => Ok(ExperienceLevel::Mid),
            "senior" => Ok(ExperienceLevel::Senior),
            other => Err(AppError::Validation(format!(
                "Unknown experience level '{other}' (expected entry, mid or senior)"
            ))),
        }
    }
}
