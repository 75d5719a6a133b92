//! Authenticator implementation
//!
//! Performs the SOAP partner `login` call and revokes sessions on release.

use super::types::SessionToken;
use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, error, warn};

static SESSION_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(?:\w+:)?sessionId>([^<]+)</(?:\w+:)?sessionId>").unwrap());
static SERVER_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(?:\w+:)?serverUrl>([^<]+)</(?:\w+:)?serverUrl>").unwrap());
static USER_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(?:\w+:)?userId>([^<]+)</(?:\w+:)?userId>").unwrap());
static ORG_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(?:\w+:)?organizationId>([^<]+)</(?:\w+:)?organizationId>").unwrap()
});
static FAULT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(?:\w+:)?faultstring>([^<]*)</(?:\w+:)?faultstring>").unwrap());

/// Authenticator logs in and out of the remote org
pub struct Authenticator {
    /// Unauthenticated client used for the login and revoke calls
    http_client: HttpClient,
    /// Value of the `CallOptions.client` SOAP header
    client_name: String,
}

impl Authenticator {
    /// Create an authenticator using the given HTTP client
    pub fn new(http_client: HttpClient) -> Self {
        Self {
            http_client,
            client_name: "soql-extract".to_string(),
        }
    }

    /// Set the client name reported in the SOAP call options
    #[must_use]
    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = name.into();
        self
    }

    /// Log in with username and password(+security token).
    ///
    /// `login_base` is the login host, e.g. `https://login.salesforce.com`.
    pub async fn login(
        &self,
        login_base: &str,
        api_version: &str,
        credentials: &Credentials,
    ) -> Result<SessionToken> {
        let url = format!(
            "{}/services/Soap/u/{api_version}",
            login_base.trim_end_matches('/')
        );
        debug!("Logging in as {} via {url}", credentials.username);

        let envelope = login_envelope(credentials, &self.client_name);
        // SOAP faults come back as HTTP 500; retrying a rejected login only
        // risks locking the user out.
        let request = RequestConfig::new()
            .header("SOAPAction", "login")
            .text("text/xml; charset=UTF-8", envelope)
            .retries(0);

        let response = match self.http_client.post_with_config(&url, request).await {
            Ok(response) => response,
            Err(Error::HttpStatus { status, body }) => {
                let reason = fault_string(&body)
                    .unwrap_or_else(|| format!("login endpoint returned HTTP {status}"));
                error!("Login rejected for {}: {reason}", credentials.username);
                return Err(Error::auth(reason));
            }
            Err(e) => {
                error!("Login request failed: {e}");
                return Err(Error::auth(format!("login request failed: {e}")));
            }
        };

        let body = response
            .text()
            .await
            .map_err(|e| Error::auth(format!("failed to read login response: {e}")))?;
        parse_login_response(&body)
    }

    /// Revoke a session so it cannot be reused
    pub async fn revoke(&self, token: &SessionToken) -> Result<()> {
        let url = format!("{}/services/oauth2/revoke", token.instance_url);
        let request = RequestConfig::new()
            .form(&[("token", token.session_id.as_str())])
            .retries(0);

        match self.http_client.post_with_config(&url, request).await {
            Ok(_) => {
                debug!("Session revoked on {}", token.instance_url);
                Ok(())
            }
            Err(e) => {
                warn!("Session revoke failed: {e}");
                Err(Error::auth(format!("session revoke failed: {e}")))
            }
        }
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("client_name", &self.client_name)
            .finish_non_exhaustive()
    }
}

/// Build the SOAP `login` envelope
pub fn login_envelope(credentials: &Credentials, client_name: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8" ?>
<env:Envelope xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:env="http://schemas.xmlsoap.org/soap/envelope/" xmlns:urn="urn:partner.soap.sforce.com">
  <env:Header>
    <urn:CallOptions><urn:client>{client}</urn:client></urn:CallOptions>
  </env:Header>
  <env:Body>
    <n1:login xmlns:n1="urn:partner.soap.sforce.com">
      <n1:username>{username}</n1:username>
      <n1:password>{password}</n1:password>
    </n1:login>
  </env:Body>
</env:Envelope>"#,
        client = xml_escape(client_name),
        username = xml_escape(&credentials.username),
        password = xml_escape(&credentials.login_password()),
    )
}

/// Parse a successful `loginResponse` body
pub fn parse_login_response(body: &str) -> Result<SessionToken> {
    if let Some(fault) = fault_string(body) {
        return Err(Error::auth(fault));
    }

    let session_id = capture(&SESSION_ID, body)
        .ok_or_else(|| Error::auth("login response has no sessionId"))?;
    let server_url = capture(&SERVER_URL, body)
        .ok_or_else(|| Error::auth("login response has no serverUrl"))?;

    let mut token = SessionToken::new(session_id, server_url)
        .map_err(|e| Error::auth(format!("login returned an invalid serverUrl: {e}")))?;
    token.user_id = capture(&USER_ID, body);
    token.organization_id = capture(&ORG_ID, body);
    Ok(token)
}

fn fault_string(body: &str) -> Option<String> {
    capture(&FAULT, body)
}

fn capture(re: &Regex, body: &str) -> Option<String> {
    re.captures(body)
        .and_then(|c| c.get(1))
        .map(|m| xml_unescape(m.as_str().trim()))
}

fn xml_escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn xml_unescape(value: &str) -> String {
    value
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
