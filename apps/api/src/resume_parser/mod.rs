/// Resume parser client: the single point of entry for calls to the
/// third-party resume parsing service.
///
/// One attempt per resume. A failed parse is reported to the candidate and
/// no application is created.
use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{multipart, Client};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum ParserError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parser rejected the resume: {0}")]
    Rejected(String),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Structured resume fields returned by the parsing service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParsedResume {
    #[serde(default)]
    pub personal_info: Value,
    /// `None` when the service omitted the key entirely; the match scorer
    /// treats that differently from an empty list.
    #[serde(default)]
    pub work_experience: Option<Vec<Value>>,
    #[serde(default)]
    pub education: Vec<Value>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub languages: Vec<Value>,
    #[serde(default)]
    pub certificates: Vec<Value>,
}

/// A successful parse: typed fields plus the raw payload for auditing.
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    pub resume: ParsedResume,
    pub raw: Value,
}

#[derive(Debug, Deserialize)]
struct ParseEnvelope {
    #[serde(default)]
    success: bool,
    data: Option<Value>,
    error: Option<String>,
}

/// Pluggable resume parser. Carried in `AppState` as `Arc<dyn ResumeParser>`.
#[async_trait]
pub trait ResumeParser: Send + Sync {
    async fn parse(&self, filename: &str, content: Bytes) -> Result<ParseOutcome, ParserError>;
}

/// HTTP client for the hosted parsing service.
#[derive(Clone)]
pub struct HttpResumeParser {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpResumeParser {
    pub fn new(endpoint: String, api_key: String) -> Result<Self> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()?,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl ResumeParser for HttpResumeParser {
    async fn parse(&self, filename: &str, content: Bytes) -> Result<ParseOutcome, ParserError> {
        let part = multipart::Part::bytes(content.to_vec()).file_name(filename.to_string());
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // The service usually explains itself in an {error} body.
            let message = serde_json::from_str::<ParseEnvelope>(&body)
                .ok()
                .and_then(|e| e.error)
                .unwrap_or(body);
            return Err(ParserError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let outcome = interpret_response(&body)?;
        debug!(
            "Parsed resume {filename}: {} skills, {} experience entries",
            outcome.resume.skills.len(),
            outcome
                .resume
                .work_experience
                .as_ref()
                .map(Vec::len)
                .unwrap_or(0)
        );
        Ok(outcome)
    }
}

/// Interprets the service's `{success, data}` / `{error}` envelope.
fn interpret_response(body: &str) -> Result<ParseOutcome, ParserError> {
    let envelope: ParseEnvelope = serde_json::from_str(body)?;

    if let Some(error) = envelope.error {
        return Err(ParserError::Rejected(error));
    }
    if !envelope.success {
        return Err(ParserError::Rejected(
            "parser reported an unsuccessful parse".to_string(),
        ));
    }

    let raw = envelope
        .data
        .ok_or_else(|| ParserError::Rejected("response carried no data".to_string()))?;
    let resume: ParsedResume = serde_json::from_value(raw.clone())?;

    Ok(ParseOutcome { resume, raw })
}
