use anyhow::{Context, Result};

const DEFAULT_MAX_RESUME_BYTES: usize = 5 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub resume_parser_url: String,
    pub resume_parser_api_key: String,
    pub max_resume_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            s3_bucket: require_env("S3_BUCKET")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            resume_parser_url: require_env("RESUME_PARSER_URL")?,
            resume_parser_api_key: require_env("RESUME_PARSER_API_KEY")?,
            max_resume_bytes: parse_or_default(
                std::env::var("MAX_RESUME_BYTES").ok(),
                DEFAULT_MAX_RESUME_BYTES,
            )
            .context("MAX_RESUME_BYTES must be a positive integer")?,
            port: parse_or_default(std::env::var("PORT").ok(), 8080)
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_or_default<T>(raw: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        Some(value) => Ok(value.trim().parse::<T>()?),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_value_uses_default() {
        assert_eq!(parse_or_default::<u16>(None, 8080).unwrap(), 8080);
    }

    #[test]
    fn test_present_value_is_parsed() {
        let bytes = parse_or_default::<usize>(Some(" 1048576 ".to_string()), 0).unwrap();
        assert_eq!(bytes, 1_048_576);
    }

    #[test]
    fn test_invalid_port_is_an_error() {
        assert!(parse_or_default::<u16>(Some("not-a-port".to_string()), 8080).is_err());
    }
}
