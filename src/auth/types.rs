//! Auth result types

use crate::error::Result;
use url::Url;

/// A logged-in session
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken {
    /// Session id, sent as the bearer token
    pub session_id: String,
    /// SOAP server URL returned by login
    pub server_url: String,
    /// Scheme and host of `server_url` (e.g. `https://acme.my.salesforce.com`)
    pub instance_url: String,
    /// Id of the logged-in user, when reported
    pub user_id: Option<String>,
    /// Id of the org, when reported
    pub organization_id: Option<String>,
}

impl SessionToken {
    /// Build a token from the raw login fields
    pub fn new(session_id: impl Into<String>, server_url: impl Into<String>) -> Result<Self> {
        let server_url = server_url.into();
        let instance_url = instance_url_of(&server_url)?;
        Ok(Self {
            session_id: session_id.into(),
            server_url,
            instance_url,
            user_id: None,
            organization_id: None,
        })
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionToken")
            .field("session_id", &"***")
            .field("instance_url", &self.instance_url)
            .field("user_id", &self.user_id)
            .field("organization_id", &self.organization_id)
            .finish_non_exhaustive()
    }
}

/// Reduce a server URL to `scheme://host[:port]`
fn instance_url_of(server_url: &str) -> Result<String> {
    let url = Url::parse(server_url)?;
    Ok(url.origin().ascii_serialization())
}

#[cfg(test)]
mod type_tests {
    use super::*;

    #[test]
    fn test_instance_url_from_server_url() {
        let token = SessionToken::new(
            "00D!abc",
            "https://acme.my.salesforce.com/services/Soap/u/59.0/00D000000000001",
        )
        .unwrap();
        assert_eq!(token.instance_url, "https://acme.my.salesforce.com");
    }

    #[test]
    fn test_instance_url_keeps_port() {
        let token = SessionToken::new("s", "http://127.0.0.1:8080/services/Soap/u/59.0").unwrap();
        assert_eq!(token.instance_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_invalid_server_url() {
        assert!(SessionToken::new("s", "not a url").is_err());
    }

    #[test]
    fn test_debug_masks_session() {
        let token = SessionToken::new("secret-session", "https://x.salesforce.com/").unwrap();
        assert!(!format!("{token:?}").contains("secret-session"));
    }
}
