//! Credential and secret payload types

use crate::error::{Error, Result};
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Login credentials for one org
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Login username
    pub username: String,
    /// Login password
    pub password: String,
    /// Security token appended to the password at login
    #[serde(default)]
    pub security_token: Option<String>,
    /// Login domain: `login` for production, `test` for sandboxes
    #[serde(default)]
    pub domain: Option<String>,
}

impl Credentials {
    /// Create credentials without token or domain
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            security_token: None,
            domain: None,
        }
    }

    /// Set the security token
    #[must_use]
    pub fn with_security_token(mut self, token: impl Into<String>) -> Self {
        self.security_token = Some(token.into());
        self
    }

    /// Set the login domain
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Password as sent to the login endpoint (password followed by token)
    pub fn login_password(&self) -> String {
        format!(
            "{}{}",
            self.password,
            self.security_token.as_deref().unwrap_or("")
        )
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .field("security_token", &self.security_token.as_ref().map(|_| "***"))
            .field("domain", &self.domain)
            .finish()
    }
}

/// Raw secret payload as stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecretValue {
    /// JSON document stored as text
    #[serde(rename = "SecretString")]
    Text(String),
    /// JSON document stored as base64-encoded bytes
    #[serde(rename = "SecretBinary")]
    Binary(String),
}

impl SecretValue {
    /// Wrap raw bytes as a binary secret
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self::Binary(base64::engine::general_purpose::STANDARD.encode(bytes))
    }

    /// Decode the payload into credentials
    pub fn decode(&self, secret_id: &str) -> Result<Credentials> {
        let parsed = match self {
            Self::Text(text) => serde_json::from_str(text),
            Self::Binary(encoded) => {
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(encoded.trim())
                    .map_err(|e| Error::secret(secret_id, format!("invalid base64 payload: {e}")))?;
                serde_json::from_slice(&bytes)
            }
        };
        parsed.map_err(|e| Error::secret(secret_id, format!("invalid credential document: {e}")))
    }
}
