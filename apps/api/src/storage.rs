//! Path-addressed file storage for resumes and employee documents.
//!
//! Keys are laid out per owner:
//!   resumes/{candidate_id}/{uuid}-{filename}
//!   employees/{employee_id}/documents/{document_type}/{filename}

use async_trait::async_trait;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;

/// Pluggable object store. Carried in `AppState` as `Arc<dyn FileStore>`.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Stores `body` under `key` and returns the key.
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<String, AppError>;
}

/// S3 / MinIO backed store.
#[derive(Clone)]
pub struct S3FileStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3FileStore {
    /// Constructs a client configured for MinIO (local) or AWS (production).
    pub async fn from_config(config: &Config) -> Self {
        let credentials = Credentials::new(
            &config.aws_access_key_id,
            &config.aws_secret_access_key,
            None,
            None,
            "hr-portal-static",
        );

        let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .credentials_provider(credentials)
            .endpoint_url(&config.s3_endpoint)
            .load()
            .await;

        Self {
            client: aws_sdk_s3::Client::new(&s3_config),
            bucket: config.s3_bucket.clone(),
        }
    }
}

#[async_trait]
impl FileStore for S3FileStore {
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<String, AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| AppError::Storage(format!("S3 upload failed: {e}")))?;

        info!("Stored s3://{}/{}", self.bucket, key);
        Ok(key.to_string())
    }
}

pub fn resume_key(candidate_id: Uuid, filename: &str) -> String {
    format!(
        "resumes/{candidate_id}/{}-{}",
        Uuid::new_v4(),
        sanitize_filename(filename)
    )
}

pub fn document_key(employee_id: Uuid, document_type: &str, filename: &str) -> String {
    format!(
        "employees/{employee_id}/documents/{document_type}/{}",
        sanitize_filename(filename)
    )
}

/// Keeps the last path segment and replaces anything outside `[A-Za-z0-9._-]`.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or(filename)
        .trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Lowercased extension, if any.
pub fn file_extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

pub fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_strips_directories_and_odd_characters() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\Users\\me\\My CV (final).pdf"), "My_CV__final_.pdf");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
        assert_eq!(sanitize_filename("   "), "upload");
    }

    #[test]
    fn test_keys_are_grouped_by_owner() {
        let owner = Uuid::new_v4();
        let key = document_key(owner, "id_copy", "passport.png");
        assert_eq!(key, format!("employees/{owner}/documents/id_copy/passport.png"));

        let resume = resume_key(owner, "cv.pdf");
        assert!(resume.starts_with(&format!("resumes/{owner}/")));
        assert!(resume.ends_with("-cv.pdf"));
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("Resume.PDF").as_deref(), Some("pdf"));
        assert_eq!(file_extension("archive.tar.gz").as_deref(), Some("gz"));
        assert_eq!(file_extension("noext"), None);
        assert_eq!(file_extension(".bashrc"), None);
    }

    #[test]
    fn test_content_type_lookup() {
        assert_eq!(content_type_for("pdf"), "application/pdf");
        assert_eq!(content_type_for("exe"), "application/octet-stream");
    }
}
