//! Credential store module
//!
//! Loads login credentials for the remote org from a secret store.
//!
//! Secrets arrive either as a JSON text payload or as base64-encoded binary
//! JSON (the two shapes a secrets-manager `GetSecretValue` call can return);
//! both decode to the same [`Credentials`].
//!
//! Stores: [`SecretsManagerCredentialStore`] reads AWS Secrets Manager,
//! [`FileCredentialStore`] reads a local JSON file of the same shape and
//! [`StaticCredentialStore`] holds secrets in memory.

mod secrets_manager;
mod store;
mod types;

pub use secrets_manager::{SecretsManagerCredentialStore, DEFAULT_REGION};
pub use store::{CredentialStore, FileCredentialStore, StaticCredentialStore};
pub use types::{Credentials, SecretValue};
