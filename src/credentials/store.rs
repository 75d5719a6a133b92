//! Credential store implementations

use super::types::{Credentials, SecretValue};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Source of login credentials, keyed by secret identifier
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch and decode the credentials stored under `secret_id`
    async fn get_secret(&self, secret_id: &str) -> Result<Credentials>;
}

// ============================================================================
// In-memory store
// ============================================================================

/// Credential store backed by an in-memory map
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialStore {
    secrets: HashMap<String, SecretValue>,
}

impl StaticCredentialStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw secret payload
    #[must_use]
    pub fn with_secret(mut self, secret_id: impl Into<String>, value: SecretValue) -> Self {
        self.secrets.insert(secret_id.into(), value);
        self
    }

    /// Add already-decoded credentials
    #[must_use]
    pub fn with_credentials(self, secret_id: impl Into<String>, credentials: &Credentials) -> Self {
        // Serializing a struct of strings cannot fail
        let text = serde_json::to_string(credentials).unwrap_or_default();
        self.with_secret(secret_id, SecretValue::Text(text))
    }
}

#[async_trait]
impl CredentialStore for StaticCredentialStore {
    async fn get_secret(&self, secret_id: &str) -> Result<Credentials> {
        let value = self
            .secrets
            .get(secret_id)
            .ok_or_else(|| Error::secret(secret_id, "secret not found"))?;
        value.decode(secret_id)
    }
}

// ============================================================================
// File store
// ============================================================================

/// Credential store backed by a JSON secrets file.
///
/// The file maps secret ids to payloads:
///
/// ```json
/// {
///   "salesforce/prod": {"SecretString": "{\"username\": \"...\", \"password\": \"...\"}"},
///   "salesforce/sandbox": {"SecretBinary": "eyJ1c2VybmFtZSI6..."}
/// }
/// ```
///
/// The file is re-read on every lookup so rotated secrets are picked up.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a store reading from `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the secrets file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn get_secret(&self, secret_id: &str) -> Result<Credentials> {
        debug!("Reading secret {secret_id} from {}", self.path.display());

        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            error!(
                "Failed to read secrets file {} for secret {secret_id}: {e}",
                self.path.display()
            );
            Error::secret(
                secret_id,
                format!("cannot read {}: {e}", self.path.display()),
            )
        })?;

        let mut secrets: HashMap<String, SecretValue> = serde_json::from_str(&content)
            .map_err(|e| Error::secret(secret_id, format!("invalid secrets file: {e}")))?;

        let value = secrets.remove(secret_id).ok_or_else(|| {
            error!("Secret {secret_id} not found in {}", self.path.display());
            Error::secret(secret_id, "secret not found")
        })?;

        value.decode(secret_id)
    }
}
