//! Resume submission: the candidate side of the application lifecycle.
//!
//! Flow: job check → duplicate check → file validation → upload → parse →
//!       match score → INSERT (status='pending').
//!
//! The duplicate check runs before anything touches storage or the parser.
//! A parsing failure leaves no application row behind.

use bytes::Bytes;
use serde::Serialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::applications::store::HrStore;
use crate::errors::AppError;
use crate::matching::match_score::{score_for_job, MatchBreakdown, MatchScorer};
use crate::models::application::NewApplication;
use crate::resume_parser::ResumeParser;
use crate::storage::{content_type_for, file_extension, resume_key, FileStore};

pub const ALLOWED_RESUME_EXTENSIONS: [&str; 3] = ["pdf", "doc", "docx"];

/// A resume file received from the candidate.
#[derive(Debug, Clone)]
pub struct ResumeUpload {
    pub filename: String,
    pub bytes: Bytes,
}

/// External collaborators the submission needs besides the database.
pub struct SubmissionDeps<'a> {
    pub files: &'a dyn FileStore,
    pub parser: &'a dyn ResumeParser,
    pub scorer: &'a dyn MatchScorer,
    pub max_resume_bytes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    pub application_id: Uuid,
    pub job_position_id: Uuid,
    pub status: String,
    pub match_report: MatchBreakdown,
}

pub async fn submit_application(
    store: &mut dyn HrStore,
    deps: SubmissionDeps<'_>,
    candidate_id: Uuid,
    job_position_id: Uuid,
    upload: ResumeUpload,
) -> Result<SubmissionReceipt, AppError> {
    // Step 1: the job must exist and still be open
    let job = store
        .job_position(job_position_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job position {job_position_id} not found")))?;
    if !job.is_active() {
        return Err(AppError::Validation(format!(
            "Job position '{}' is no longer accepting applications",
            job.title
        )));
    }

    // Step 2: one application per candidate and job
    if store.application_exists(candidate_id, job_position_id).await? {
        return Err(AppError::Conflict(
            "You have already applied for this position".to_string(),
        ));
    }

    // Step 3: file checks
    let extension = validate_resume_file(&upload, deps.max_resume_bytes)?;

    // Step 4: store the original
    let key = resume_key(candidate_id, &upload.filename);
    let resume_path = deps
        .files
        .put(&key, upload.bytes.clone(), content_type_for(&extension))
        .await?;

    // Step 5: third-party parse
    let parsed = deps
        .parser
        .parse(&upload.filename, upload.bytes)
        .await
        .map_err(|e| AppError::ResumeParsing(e.to_string()))?;

    // Step 6: match score
    let match_report = score_for_job(store, deps.scorer, &parsed.resume, job_position_id).await;

    // Step 7: persist
    let resume = &parsed.resume;
    let new = NewApplication {
        candidate_id,
        job_position_id,
        resume_filename: upload.filename,
        resume_path,
        api_response: parsed.raw.clone(),
        extracted_skills: json!(resume.skills),
        extracted_experience: json!(resume.work_experience.clone().unwrap_or_default()),
        extracted_education: json!(resume.education),
        extracted_contact: resume.personal_info.clone(),
        match_percentage: match_report.overall,
    };
    let application_id = store.insert_application(&new).await?;

    info!(
        "Application {application_id}: candidate {candidate_id} → job {job_position_id}, match {:.2}%",
        match_report.overall
    );

    Ok(SubmissionReceipt {
        application_id,
        job_position_id,
        status: "pending".to_string(),
        match_report,
    })
}

/// Checks presence, size and type. Returns the lowercased extension.
pub fn validate_resume_file(upload: &ResumeUpload, max_bytes: usize) -> Result<String, AppError> {
    if upload.bytes.is_empty() {
        return Err(AppError::Validation("Resume file is empty".to_string()));
    }
    if upload.bytes.len() > max_bytes {
        return Err(AppError::Validation(format!(
            "Resume exceeds the {} MB limit",
            max_bytes / (1024 * 1024)
        )));
    }
    match file_extension(&upload.filename) {
        Some(ext) if ALLOWED_RESUME_EXTENSIONS.contains(&ext.as_str()) => Ok(ext),
        _ => Err(AppError::Validation(format!(
            "Unsupported resume type; allowed: {}",
            ALLOWED_RESUME_EXTENSIONS.join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::applications::status::ApplicationStatus;
    use crate::applications::store::memory::MemoryDb;
    use crate::matching::match_score::HeuristicMatchScorer;
    use crate::models::user::UserRole;
    use crate::resume_parser::{ParseOutcome, ParsedResume, ParserError};

    #[derive(Default)]
    struct RecordingStore {
        keys: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl FileStore for RecordingStore {
        async fn put(&self, key: &str, _body: Bytes, _ct: &str) -> Result<String, AppError> {
            self.keys.lock().unwrap().push(key.to_string());
            Ok(key.to_string())
        }
    }

    struct FakeParser {
        calls: AtomicUsize,
        fail: bool,
    }

    impl FakeParser {
        fn ok() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }
    }

    #[async_trait]
    impl ResumeParser for FakeParser {
        async fn parse(&self, _filename: &str, _content: Bytes) -> Result<ParseOutcome, ParserError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ParserError::Rejected("Unreadable document".to_string()));
            }
            let raw = json!({
                "personal_info": {"email": "dana@example.com"},
                "work_experience": [{"company": "A"}, {"company": "B"}],
                "skills": ["react", "sql", "docker"]
            });
            let resume: ParsedResume = serde_json::from_value(raw.clone()).unwrap();
            Ok(ParseOutcome { resume, raw })
        }
    }

    fn upload(name: &str) -> ResumeUpload {
        ResumeUpload {
            filename: name.to_string(),
            bytes: Bytes::from_static(b"%PDF-1.7 resume"),
        }
    }

    fn deps<'a>(files: &'a RecordingStore, parser: &'a FakeParser) -> SubmissionDeps<'a> {
        SubmissionDeps {
            files,
            parser,
            scorer: &HeuristicMatchScorer,
            max_resume_bytes: 1024,
        }
    }

    #[tokio::test]
    async fn test_submission_scores_and_inserts_pending() {
        let db = MemoryDb::default();
        let candidate = db.add_user(UserRole::Candidate);
        let job = db.add_job("Developer", "IT", "React, Node, SQL", "mid");
        let files = RecordingStore::default();
        let parser = FakeParser::ok();

        let mut tx = db.begin();
        let receipt = submit_application(&mut tx, deps(&files, &parser), candidate, job, upload("cv.pdf"))
            .await
            .unwrap();
        tx.commit();

        assert_eq!(receipt.status, "pending");
        assert_eq!(receipt.match_report.overall, 76.67);
        let data = db.snapshot();
        let stored = &data.applications[&receipt.application_id];
        assert_eq!(stored.status, ApplicationStatus::Pending);
        assert_eq!(stored.match_percentage, 76.67);
        assert_eq!(files.keys.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_rejected_before_upload_or_parse() {
        let db = MemoryDb::default();
        let candidate = db.add_user(UserRole::Candidate);
        let job = db.add_job("Developer", "IT", "SQL", "entry");
        db.add_application(candidate, job, ApplicationStatus::Pending);
        let files = RecordingStore::default();
        let parser = FakeParser::ok();

        let mut tx = db.begin();
        let err = submit_application(&mut tx, deps(&files, &parser), candidate, job, upload("cv.pdf"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
        assert!(files.keys.lock().unwrap().is_empty());
        assert_eq!(parser.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_parse_failure_creates_no_application() {
        let db = MemoryDb::default();
        let candidate = db.add_user(UserRole::Candidate);
        let job = db.add_job("Developer", "IT", "SQL", "entry");
        let files = RecordingStore::default();
        let parser = FakeParser {
            calls: AtomicUsize::new(0),
            fail: true,
        };

        let mut tx = db.begin();
        let err = submit_application(&mut tx, deps(&files, &parser), candidate, job, upload("cv.docx"))
            .await
            .unwrap_err();
        tx.commit();

        assert!(matches!(err, AppError::ResumeParsing(_)));
        assert!(db.snapshot().applications.is_empty());
    }

    #[tokio::test]
    async fn test_closed_job_rejected() {
        let db = MemoryDb::default();
        let candidate = db.add_user(UserRole::Candidate);
        let job = db.add_job("Developer", "IT", "SQL", "entry");
        db.close_job(job);
        let files = RecordingStore::default();
        let parser = FakeParser::ok();

        let mut tx = db.begin();
        let err = submit_application(&mut tx, deps(&files, &parser), candidate, job, upload("cv.pdf"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(parser.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_file_validation() {
        assert_eq!(validate_resume_file(&upload("CV.DOCX"), 1024).unwrap(), "docx");
        assert!(validate_resume_file(&upload("cv.exe"), 1024).is_err());
        assert!(validate_resume_file(&upload("cv"), 1024).is_err());
        assert!(validate_resume_file(&upload("cv.pdf"), 4).is_err());

        let empty = ResumeUpload {
            filename: "cv.pdf".to_string(),
            bytes: Bytes::new(),
        };
        assert!(validate_resume_file(&empty, 1024).is_err());
    }
}
