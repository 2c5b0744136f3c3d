use serde::{Deserialize, Serialize};

use crate::models::onboarding::{EmployeeDocumentRow, OnboardingAssignment, TrainingAssignment};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskProgress {
    pub completed: usize,
    pub total: usize,
    pub percentage: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingProgress {
    pub completed: usize,
    pub total: usize,
    /// Completed mandatory modules over mandatory modules.
    pub completion_percentage: i64,
    /// Over mandatory modules: completed count 100 points, in-progress ones
    /// their own progress.
    pub weighted_progress: i64,
    /// Plain mean of the stored progress column.
    pub average_progress: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentProgress {
    pub approved: usize,
    pub total: usize,
    pub percentage: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    pub tasks: TaskProgress,
    pub training: TrainingProgress,
    pub documents: DocumentProgress,
    pub overall: i64,
}

/// `part / whole` as a rounded percentage; 0 when there is nothing to count.
fn percentage(part: f64, whole: f64) -> i64 {
    if whole <= 0.0 {
        return 0;
    }
    (part / whole * 100.0).round() as i64
}

pub fn summarize_tasks(tasks: &[OnboardingAssignment]) -> TaskProgress {
    let mandatory: Vec<_> = tasks.iter().filter(|t| t.is_mandatory).collect();
    let completed = mandatory.iter().filter(|t| t.status == "completed").count();

    TaskProgress {
        completed,
        total: mandatory.len(),
        percentage: percentage(completed as f64, mandatory.len() as f64),
    }
}

pub fn summarize_training(modules: &[TrainingAssignment]) -> TrainingProgress {
    let mandatory: Vec<_> = modules.iter().filter(|m| m.is_mandatory).collect();
    let completed = mandatory.iter().filter(|m| m.status == "completed").count();

    let points: f64 = mandatory
        .iter()
        .map(|m| match m.status.as_str() {
            "completed" => 100.0,
            "in_progress" => f64::from(m.progress_percentage),
            _ => 0.0,
        })
        .sum();

    let stored: f64 = modules
        .iter()
        .map(|m| f64::from(m.progress_percentage))
        .sum();
    let average_progress = if modules.is_empty() {
        0
    } else {
        (stored / modules.len() as f64).round() as i64
    };

    TrainingProgress {
        completed,
        total: mandatory.len(),
        completion_percentage: percentage(completed as f64, mandatory.len() as f64),
        weighted_progress: percentage(points, 100.0 * mandatory.len() as f64),
        average_progress,
    }
}

pub fn summarize_documents(documents: &[EmployeeDocumentRow]) -> DocumentProgress {
    let required: Vec<_> = documents.iter().filter(|d| d.is_required).collect();
    let approved = required.iter().filter(|d| d.status == "approved").count();

    DocumentProgress {
        approved,
        total: required.len(),
        percentage: percentage(approved as f64, required.len() as f64),
    }
}

/// Equal-weight blend of tasks, average training progress and documents.
pub fn compute_progress_summary(
    tasks: &[OnboardingAssignment],
    modules: &[TrainingAssignment],
    documents: &[EmployeeDocumentRow],
) -> ProgressSummary {
    let tasks = summarize_tasks(tasks);
    let training = summarize_training(modules);
    let documents = summarize_documents(documents);

    let overall =
        ((tasks.percentage + training.average_progress + documents.percentage) as f64 / 3.0)
            .round() as i64;

    ProgressSummary {
        tasks,
        training,
        documents,
        overall,
    }
}
