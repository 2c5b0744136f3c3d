//! Match scoring: a pluggable, trait-based scorer that measures a parsed resume
//! against a job position's requirements.
//!
//! Default: `HeuristicMatchScorer` (pure-Rust, deterministic, fully testable).
//!
//! `AppState` holds an `Arc<dyn MatchScorer>`, chosen at startup.

use serde::Serialize;
use tracing::error;
use uuid::Uuid;

use crate::applications::store::HrStore;
use crate::models::job::{ExperienceLevel, JobRequirements};
use crate::resume_parser::ParsedResume;

const SKILL_WEIGHT: f64 = 0.7;
const EXPERIENCE_WEIGHT: f64 = 0.3;
/// Experience score when the resume has no work history at all.
const DEFAULT_EXPERIENCE_PERCENTAGE: f64 = 50.0;

// ────────────────────────────────────────────────────────────────────────────
// Output data model
// ────────────────────────────────────────────────────────────────────────────

/// Breakdown of a match score. `overall` is what gets persisted as the
/// application's `match_percentage`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchBreakdown {
    pub overall: f64,                // 0 – 100, two decimals
    pub skill_percentage: f64,       // 0 – 100
    pub experience_percentage: f64,  // tier table value
    pub matched_skills: Vec<String>, // required skills covered by the resume
    pub missing_skills: Vec<String>,
    pub years_experience: Option<usize>,
    pub scorer_backend: String,
}

impl MatchBreakdown {
    /// The result reported when job requirements could not be loaded.
    pub fn unavailable(backend: &str) -> Self {
        Self {
            overall: 0.0,
            skill_percentage: 0.0,
            experience_percentage: 0.0,
            matched_skills: vec![],
            missing_skills: vec![],
            years_experience: None,
            scorer_backend: backend.to_string(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The match scorer trait. Implement this to swap backends without touching
/// the submission pipeline or handlers.
pub trait MatchScorer: Send + Sync {
    fn score(&self, resume: &ParsedResume, job: &JobRequirements) -> MatchBreakdown;

    fn backend(&self) -> &'static str;
}

/// Weighted containment over skills (70%) plus an experience tier lookup (30%).
///
/// Algorithm:
/// 1. Lowercase and trim both skill lists, dropping empty tokens.
/// 2. A required skill matches when a candidate skill contains it or is
///    contained by it.
/// 3. Years of experience = number of work-history entries, mapped by tier.
/// 4. overall = round2(skill% × 0.7 + experience% × 0.3)
pub struct HeuristicMatchScorer;

impl MatchScorer for HeuristicMatchScorer {
    fn score(&self, resume: &ParsedResume, job: &JobRequirements) -> MatchBreakdown {
        compute_match_score(resume, job)
    }

    fn backend(&self) -> &'static str {
        "heuristic"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core algorithm
// ────────────────────────────────────────────────────────────────────────────

pub fn compute_match_score(resume: &ParsedResume, job: &JobRequirements) -> MatchBreakdown {
    let required = normalize_skills(job.required_skills.split(','));
    let candidate = normalize_skills(resume.skills.iter().map(String::as_str));

    let (matched_skills, missing_skills): (Vec<String>, Vec<String>) = required
        .iter()
        .cloned()
        .partition(|req| skill_matches(req, &candidate));

    let skill_percentage = if required.is_empty() {
        0.0
    } else {
        matched_skills.len() as f64 / required.len() as f64 * 100.0
    };

    let years_experience = resume.work_experience.as_ref().map(Vec::len);
    let experience_percentage = experience_percentage(job.experience_level, years_experience);

    let overall = round2(skill_percentage * SKILL_WEIGHT + experience_percentage * EXPERIENCE_WEIGHT)
        .clamp(0.0, 100.0);

    MatchBreakdown {
        overall,
        skill_percentage: round2(skill_percentage),
        experience_percentage,
        matched_skills,
        missing_skills,
        years_experience,
        scorer_backend: "heuristic".to_string(),
    }
}

/// Scores a resume against a job loaded through `store`.
///
/// A failed lookup yields a zero score and is logged; it never fails the caller.
pub async fn score_for_job(
    store: &mut dyn HrStore,
    scorer: &dyn MatchScorer,
    resume: &ParsedResume,
    job_position_id: Uuid,
) -> MatchBreakdown {
    match store.job_position(job_position_id).await {
        Ok(Some(job)) => scorer.score(resume, &job.requirements()),
        Ok(None) => {
            error!("Match scoring: job position {job_position_id} not found");
            MatchBreakdown::unavailable(scorer.backend())
        }
        Err(e) => {
            error!("Match scoring: failed to load requirements for job {job_position_id}: {e}");
            MatchBreakdown::unavailable(scorer.backend())
        }
    }
}

fn normalize_skills<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    raw.map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Bidirectional containment: loose on purpose so "react" covers "react.js".
fn skill_matches(required: &str, candidate: &[String]) -> bool {
    candidate
        .iter()
        .any(|c| required.contains(c.as_str()) || c.contains(required))
}

/// Tier table keyed on the job's level and the count of work-history entries.
fn experience_percentage(level: Option<ExperienceLevel>, years: Option<usize>) -> f64 {
    let Some(years) = years else {
        return DEFAULT_EXPERIENCE_PERCENTAGE;
    };
    match level {
        // Any work-history list satisfies an entry-level role.
        Some(ExperienceLevel::Entry) => 100.0,
        Some(ExperienceLevel::Mid) => {
            if years >= 1 {
                100.0
            } else {
                60.0
            }
        }
        Some(ExperienceLevel::Senior) => {
            if years >= 3 {
                100.0
            } else if years >= 2 {
                80.0
            } else {
                50.0
            }
        }
        None => DEFAULT_EXPERIENCE_PERCENTAGE,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
