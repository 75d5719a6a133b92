//! Salesforce REST session provider

use super::provider::SessionProvider;
use super::types::Page;
use crate::auth::{Authenticator, SessionToken};
use crate::credentials::{CredentialStore, Credentials};
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Default REST/SOAP API version
pub const DEFAULT_API_VERSION: &str = "59.0";

/// Connection settings that do not come from the secret
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SalesforceSettings {
    /// API version used for login and queries (e.g. `59.0`)
    pub api_version: String,
    /// Login domain used when the secret has none (`login` or `test`)
    pub domain: Option<String>,
    /// Full login host, overriding the domain entirely
    pub login_url: Option<String>,
    /// Client name reported in SOAP call options
    pub client_name: String,
}

impl Default for SalesforceSettings {
    fn default() -> Self {
        Self {
            api_version: DEFAULT_API_VERSION.to_string(),
            domain: None,
            login_url: None,
            client_name: "soql-extract".to_string(),
        }
    }
}

impl SalesforceSettings {
    /// Login host for the given credentials
    pub fn login_base(&self, credentials: &Credentials) -> String {
        if let Some(url) = &self.login_url {
            return url.trim_end_matches('/').to_string();
        }
        let domain = credentials
            .domain
            .as_deref()
            .or(self.domain.as_deref())
            .unwrap_or("login");
        format!("https://{domain}.salesforce.com")
    }
}

/// An authenticated Salesforce session
#[derive(Debug)]
pub struct SalesforceSession {
    token: SessionToken,
    api_version: String,
    client: HttpClient,
    authenticator: Authenticator,
}

impl SalesforceSession {
    /// Instance URL all REST calls go to
    pub fn instance_url(&self) -> &str {
        &self.token.instance_url
    }

    /// API version of this session
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Path of the REST query resource
    pub fn query_path(&self) -> String {
        format!("/services/data/v{}/query", self.api_version)
    }
}

/// Session provider for the Salesforce REST API.
///
/// Credentials are looked up in a [`CredentialStore`] on every `connect`, so
/// rotated secrets take effect on the next session.
pub struct SalesforceProvider {
    store: Arc<dyn CredentialStore>,
    secret_id: String,
    settings: SalesforceSettings,
    http_config: HttpClientConfig,
}

impl SalesforceProvider {
    /// Create a provider reading credentials from `store` under `secret_id`
    pub fn new(store: Arc<dyn CredentialStore>, secret_id: impl Into<String>) -> Self {
        Self {
            store,
            secret_id: secret_id.into(),
            settings: SalesforceSettings::default(),
            http_config: HttpClientConfig::default(),
        }
    }

    /// Set connection settings
    #[must_use]
    pub fn with_settings(mut self, settings: SalesforceSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the HTTP configuration shared by login and query clients
    #[must_use]
    pub fn with_http_config(mut self, config: HttpClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Secret id credentials are read from
    pub fn secret_id(&self) -> &str {
        &self.secret_id
    }
}

impl std::fmt::Debug for SalesforceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SalesforceProvider")
            .field("secret_id", &self.secret_id)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl SessionProvider for SalesforceProvider {
    type Session = SalesforceSession;

    async fn connect(&self) -> Result<SalesforceSession> {
        let credentials = self.store.get_secret(&self.secret_id).await.map_err(|e| {
            error!("Failed to load credentials from secret {}: {e}", self.secret_id);
            e
        })?;

        let login_config = HttpClientConfig {
            base_url: None,
            ..self.http_config.clone()
        };
        let authenticator = Authenticator::new(HttpClient::with_config(login_config)?)
            .with_client_name(&self.settings.client_name);

        let login_base = self.settings.login_base(&credentials);
        let token = authenticator
            .login(&login_base, &self.settings.api_version, &credentials)
            .await?;

        let query_config = HttpClientConfig {
            base_url: Some(token.instance_url.clone()),
            ..self.http_config.clone()
        };
        let client = HttpClient::with_bearer(query_config, &token.session_id)?;

        info!(
            "Connect successful! Instance: {}, API version: {}",
            token.instance_url, self.settings.api_version
        );

        Ok(SalesforceSession {
            token,
            api_version: self.settings.api_version.clone(),
            client,
            authenticator,
        })
    }

    async fn execute(&self, session: &SalesforceSession, query: &str) -> Result<Page> {
        let request = RequestConfig::new().query("q", query);
        session
            .client
            .get_json_with_config(&session.query_path(), request)
            .await
            .map_err(|e| Error::query(remote_message(&e)))
    }

    async fn continue_query(&self, session: &SalesforceSession, token: &str) -> Result<Page> {
        debug!("Fetching next page: {token}");
        session
            .client
            .get_json(token)
            .await
            .map_err(|e| Error::pagination(remote_message(&e)))
    }

    async fn release(&self, session: SalesforceSession) -> Result<()> {
        session.authenticator.revoke(&session.token).await
    }
}

/// Render a REST error, preferring the API's own `errorCode: message` list
fn remote_message(err: &Error) -> String {
    if let Error::HttpStatus { status, body } = err {
        if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(body) {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|item| {
                    let code = item.get("errorCode")?.as_str()?;
                    let message = item.get("message")?.as_str().unwrap_or_default();
                    Some(format!("{code}: {message}"))
                })
                .collect();
            if !messages.is_empty() {
                return format!("HTTP {status}: {}", messages.join("; "));
            }
        }
    }
    err.to_string()
}
