//! Configuration file
//!
//! The extractor is configured from a YAML file. Every section has defaults;
//! only `secret_id` must be given.
//!
//! ```yaml
//! secret_id: salesforce/prod
//! secrets_file: ./secrets.json
//! credentials:
//!   backend: file        # or `aws` for AWS Secrets Manager
//!   region: cn-north-1
//! salesforce:
//!   api_version: "59.0"
//!   domain: login
//! http:
//!   timeout_secs: 30
//!   max_retries: 3
//!   requests_per_second: 10
//! extract:
//!   batch_size: 2000
//!   fail_fast: false
//! ```

use crate::credentials::{
    CredentialStore, FileCredentialStore, SecretsManagerCredentialStore, DEFAULT_REGION,
};
use crate::engine::{ExtractConfig, DEFAULT_BATCH_SIZE};
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig};
use crate::session::SalesforceSettings;
use crate::types::BackoffType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete extractor configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Identifier of the secret holding the login credentials
    pub secret_id: String,

    /// JSON file backing the file credential store
    #[serde(default = "default_secrets_file")]
    pub secrets_file: PathBuf,

    /// Credential store selection
    #[serde(default)]
    pub credentials: CredentialsSection,

    /// Salesforce connection settings
    #[serde(default)]
    pub salesforce: SalesforceSettings,

    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpConfig,

    /// Extraction defaults
    #[serde(default)]
    pub extract: ExtractSection,
}

fn default_secrets_file() -> PathBuf {
    PathBuf::from("secrets.json")
}

impl Config {
    /// Load and validate a config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;

        let mut config = Self::from_yaml(&content)?;
        // Relative secrets files resolve against the config file's directory
        if config.secrets_file.is_relative() {
            if let Some(dir) = path.parent() {
                config.secrets_file = dir.join(&config.secrets_file);
            }
        }
        Ok(config)
    }

    /// Parse and validate a config from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check field constraints
    pub fn validate(&self) -> Result<()> {
        if self.secret_id.trim().is_empty() {
            return Err(Error::config("secret_id cannot be empty"));
        }

        if self.salesforce.api_version.trim().is_empty() {
            return Err(Error::config("salesforce.api_version cannot be empty"));
        }

        if self.credentials.backend == CredentialBackend::Aws
            && self.credentials.region.trim().is_empty()
        {
            return Err(Error::config(
                "credentials.region cannot be empty for the aws backend",
            ));
        }

        if self.extract.batch_size == 0 {
            return Err(Error::config(
                "extract.batch_size must be greater than zero",
            ));
        }

        Ok(())
    }

    /// Credential store selected by the `credentials` section
    pub fn credential_store(&self) -> Arc<dyn CredentialStore> {
        match self.credentials.backend {
            CredentialBackend::File => Arc::new(FileCredentialStore::new(&self.secrets_file)),
            CredentialBackend::Aws => {
                Arc::new(SecretsManagerCredentialStore::new(&self.credentials.region))
            }
        }
    }

    /// HTTP client configuration for this config
    pub fn http_client_config(&self) -> HttpClientConfig {
        self.http.to_client_config()
    }

    /// Extraction configuration for this config
    pub fn extract_config(&self) -> ExtractConfig {
        ExtractConfig::new()
            .with_batch_size(self.extract.batch_size)
            .with_fail_fast(self.extract.fail_fast)
    }
}

// ============================================================================
// Credentials Config
// ============================================================================

/// Where login credentials are read from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialBackend {
    /// Local JSON secrets file (`secrets_file`)
    #[default]
    File,
    /// AWS Secrets Manager
    Aws,
}

/// Credential store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsSection {
    /// Store backend
    #[serde(default)]
    pub backend: CredentialBackend,

    /// Secrets Manager region
    #[serde(default = "default_region")]
    pub region: String,
}

impl Default for CredentialsSection {
    fn default() -> Self {
        Self {
            backend: CredentialBackend::default(),
            region: default_region(),
        }
    }
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

// ============================================================================
// HTTP Config
// ============================================================================

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Maximum number of retries
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Retry backoff type
    #[serde(default)]
    pub backoff: BackoffType,

    /// Client-side request rate limit; 0 disables it
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            backoff: BackoffType::default(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_requests_per_second() -> u32 {
    10
}

impl HttpConfig {
    /// Build the client configuration
    pub fn to_client_config(&self) -> HttpClientConfig {
        let defaults = HttpClientConfig::default();
        let builder = HttpClientConfig::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .max_retries(self.max_retries)
            .backoff(self.backoff, defaults.initial_backoff, defaults.max_backoff);

        if self.requests_per_second == 0 {
            builder.no_rate_limit().build()
        } else {
            builder
                .rate_limit(RateLimiterConfig::per_second(self.requests_per_second))
                .build()
        }
    }
}

// ============================================================================
// Extract Config
// ============================================================================

/// Extraction defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractSection {
    /// Records per batch for offset batching
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Abort instead of returning partial results
    #[serde(default)]
    pub fail_fast: bool,
}

impl Default for ExtractSection {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            fail_fast: false,
        }
    }
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}
