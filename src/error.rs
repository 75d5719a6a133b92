//! Error types for soql-extract
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for soql-extract
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Credential / Session Errors
    // ============================================================================
    #[error("Failed to retrieve secret '{secret_id}': {message}")]
    SecretRetrieval { secret_id: String, message: String },

    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ============================================================================
    // Query Errors
    // ============================================================================
    #[error("Malformed query: {message}")]
    MalformedQuery { message: String },

    #[error("Query failed: {message}")]
    Query { message: String },

    #[error("Pagination failed: {message}")]
    Pagination { message: String },

    #[error("Extraction failed: {source}")]
    Extraction {
        #[source]
        source: Box<Error>,
    },

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Rate limited, retry after {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Max retries ({max_retries}) exceeded")]
    MaxRetriesExceeded { max_retries: u32 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a secret retrieval error
    pub fn secret(secret_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SecretRetrieval {
            secret_id: secret_id.into(),
            message: message.into(),
        }
    }

    /// Create an authentication error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create a malformed query error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedQuery {
            message: message.into(),
        }
    }

    /// Create a query error
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create a pagination error
    pub fn pagination(message: impl Into<String>) -> Self {
        Self::Pagination {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Wrap an error raised while an extraction was running.
    ///
    /// Already-wrapped errors are returned unchanged so the chain never
    /// nests `Extraction` inside `Extraction`.
    pub fn extraction(source: Error) -> Self {
        match source {
            err @ Error::Extraction { .. } => err,
            other => Self::Extraction {
                source: Box::new(other),
            },
        }
    }

    /// The innermost error, looking through `Extraction` wrappers
    pub fn cause(&self) -> &Error {
        match self {
            Error::Extraction { source } => source.cause(),
            other => other,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::RateLimited { .. } | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(
        status,
        429 | 500 | 502 | 503 | 504 | 520 | 521 | 522 | 523 | 524
    )
}

/// Result type alias for soql-extract
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::secret("sf/prod", "not found");
        assert_eq!(
            err.to_string(),
            "Failed to retrieve secret 'sf/prod': not found"
        );

        let err = Error::http_status(404, "Not found");
        assert_eq!(err.to_string(), "HTTP 404: Not found");

        let err = Error::extraction(Error::query("INVALID_FIELD"));
        assert_eq!(
            err.to_string(),
            "Extraction failed: Query failed: INVALID_FIELD"
        );
    }

    #[test]
    fn test_extraction_does_not_double_wrap() {
        let once = Error::extraction(Error::pagination("stale locator"));
        let twice = Error::extraction(once);

        match &twice {
            Error::Extraction { source } => {
                assert!(matches!(**source, Error::Pagination { .. }));
            }
            other => panic!("Expected Extraction, got {other:?}"),
        }
    }

    #[test]
    fn test_cause_unwraps_extraction() {
        let err = Error::extraction(Error::malformed("no FROM clause"));
        assert!(matches!(err.cause(), Error::MalformedQuery { .. }));

        let err = Error::auth("bad password");
        assert!(matches!(err.cause(), Error::Authentication { .. }));
    }

    #[test]
    fn test_is_retryable() {
        assert!(Error::RateLimited {
            retry_after_seconds: 60
        }
        .is_retryable());
        assert!(Error::Timeout { timeout_ms: 1000 }.is_retryable());
        assert!(Error::http_status(503, "").is_retryable());

        assert!(Error::http_status(522, "").is_retryable());
        assert!(!Error::http_status(400, "").is_retryable());
        assert!(!Error::query("MALFORMED_QUERY").is_retryable());
        assert!(!Error::auth("INVALID_LOGIN").is_retryable());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
