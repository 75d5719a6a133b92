//! AWS Secrets Manager credential store

use super::store::CredentialStore;
use super::types::{Credentials, SecretValue};
use crate::error::{Error, Result};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use aws_sdk_secretsmanager::operation::get_secret_value::GetSecretValueOutput;
use aws_sdk_secretsmanager::Client;
use tokio::sync::OnceCell;
use tracing::{debug, error};

/// Region used when none is configured
pub const DEFAULT_REGION: &str = "cn-north-1";

/// Credential store backed by AWS Secrets Manager.
///
/// The SDK client is built from the default credential chain on first
/// lookup, pinned to the configured region.
pub struct SecretsManagerCredentialStore {
    region: String,
    client: OnceCell<Client>,
}

impl SecretsManagerCredentialStore {
    /// Create a store for `region`
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            client: OnceCell::new(),
        }
    }

    /// Use an already configured SDK client
    pub fn with_client(region: impl Into<String>, client: Client) -> Self {
        Self {
            region: region.into(),
            client: OnceCell::from(client),
        }
    }

    /// Region the store reads from
    pub fn region(&self) -> &str {
        &self.region
    }

    async fn client(&self) -> &Client {
        self.client
            .get_or_init(|| async {
                debug!("Loading AWS configuration for region {}", self.region);
                let sdk_config = aws_config::defaults(BehaviorVersion::latest())
                    .region(Region::new(self.region.clone()))
                    .load()
                    .await;
                Client::new(&sdk_config)
            })
            .await
    }
}

#[async_trait]
impl CredentialStore for SecretsManagerCredentialStore {
    async fn get_secret(&self, secret_id: &str) -> Result<Credentials> {
        debug!("Fetching secret {secret_id} from Secrets Manager ({})", self.region);

        let output = self
            .client()
            .await
            .get_secret_value()
            .secret_id(secret_id)
            .send()
            .await
            .map_err(|e| {
                let detail = DisplayErrorContext(&e);
                error!("Failed to fetch secret {secret_id} from Secrets Manager: {detail}");
                Error::secret(secret_id, detail.to_string())
            })?;

        secret_payload(&output, secret_id)?.decode(secret_id)
    }
}

impl std::fmt::Debug for SecretsManagerCredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretsManagerCredentialStore")
            .field("region", &self.region)
            .field("connected", &self.client.initialized())
            .finish()
    }
}

/// Raw payload of a `GetSecretValue` response.
///
/// Text secrets win over binary ones. Binary secrets hold base64 text and
/// are decoded by [`SecretValue::decode`].
pub(crate) fn secret_payload(
    output: &GetSecretValueOutput,
    secret_id: &str,
) -> Result<SecretValue> {
    if let Some(text) = output.secret_string() {
        return Ok(SecretValue::Text(text.to_string()));
    }

    let blob = output.secret_binary().ok_or_else(|| {
        Error::secret(secret_id, "secret has no SecretString or SecretBinary")
    })?;
    let encoded = std::str::from_utf8(blob.as_ref()).map_err(|e| {
        Error::secret(secret_id, format!("binary secret is not base64 text: {e}"))
    })?;
    Ok(SecretValue::Binary(encoded.to_string()))
}
