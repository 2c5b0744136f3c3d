use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Lifecycle of an application. HR may assign any status from any other;
/// only the move into `Hired` has side effects (see `hire::hire_in`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Selected,
    Rejected,
    WaitingInterview,
    InterviewCompleted,
    OfferSent,
    OfferAccepted,
    OfferRejected,
    Hired,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 9] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Selected,
        ApplicationStatus::Rejected,
        ApplicationStatus::WaitingInterview,
        ApplicationStatus::InterviewCompleted,
        ApplicationStatus::OfferSent,
        ApplicationStatus::OfferAccepted,
        ApplicationStatus::OfferRejected,
        ApplicationStatus::Hired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Selected => "selected",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::WaitingInterview => "waiting_interview",
            ApplicationStatus::InterviewCompleted => "interview_completed",
            ApplicationStatus::OfferSent => "offer_sent",
            ApplicationStatus::OfferAccepted => "offer_accepted",
            ApplicationStatus::OfferRejected => "offer_rejected",
            ApplicationStatus::Hired => "hired",
        }
    }

    /// Statuses after which HR normally stops editing. Not enforced.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Rejected | ApplicationStatus::OfferRejected | ApplicationStatus::Hired
        )
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| AppError::Validation(format!("Unknown application status '{s}'")))
    }
}

/// What a status change will do once applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEffect {
    /// Plain field write of status, notes and timestamp.
    FieldWrite,
    /// Runs the hire conversion workflow.
    Hire,
}

/// Classifies a transition. Every pair is legal; only the target decides
/// whether the hire workflow runs.
pub fn transition_effect(_from: ApplicationStatus, to: ApplicationStatus) -> TransitionEffect {
    if to == ApplicationStatus::Hired {
        TransitionEffect::Hire
    } else {
        TransitionEffect::FieldWrite
    }
}

/// True when HR moves an application out of `hired`. Allowed, but the
/// employee account is not reverted, so callers log it.
pub fn leaves_hired(from: ApplicationStatus, to: ApplicationStatus) -> bool {
    from == ApplicationStatus::Hired && to != ApplicationStatus::Hired
}

/// Bulk actions offered on the HR listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    ApproveSelected,
    RejectSelected,
    InterviewSelected,
    HireSelected,
}

impl BulkAction {
    pub fn target_status(&self) -> ApplicationStatus {
        match self {
            BulkAction::ApproveSelected => ApplicationStatus::Selected,
            BulkAction::RejectSelected => ApplicationStatus::Rejected,
            BulkAction::InterviewSelected => ApplicationStatus::WaitingInterview,
            BulkAction::HireSelected => ApplicationStatus::Hired,
        }
    }
}
