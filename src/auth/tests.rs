//! Tests for the auth module

use super::*;
use crate::credentials::Credentials;
use crate::error::Error;
use crate::http::{HttpClient, HttpClientConfig};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn login_success_body(server_uri: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns="urn:partner.soap.sforce.com">
  <soapenv:Body>
    <loginResponse>
      <result>
        <metadataServerUrl>{server_uri}/services/Soap/m/59.0/00D000000000001</metadataServerUrl>
        <passwordExpired>false</passwordExpired>
        <sandbox>true</sandbox>
        <serverUrl>{server_uri}/services/Soap/u/59.0/00D000000000001</serverUrl>
        <sessionId>00D000000000001!AQ0AQ.session</sessionId>
        <userId>005000000000001</userId>
        <userInfo><organizationId>00D000000000001</organizationId></userInfo>
      </result>
    </loginResponse>
  </soapenv:Body>
</soapenv:Envelope>"#
    )
}

const LOGIN_FAULT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/" xmlns:sf="urn:fault.partner.soap.sforce.com">
  <soapenv:Body>
    <soapenv:Fault>
      <faultcode>INVALID_LOGIN</faultcode>
      <faultstring>INVALID_LOGIN: Invalid username, password, security token; or user locked out.</faultstring>
    </soapenv:Fault>
  </soapenv:Body>
</soapenv:Envelope>"#;

fn authenticator() -> Authenticator {
    let config = HttpClientConfig::builder().no_rate_limit().build();
    Authenticator::new(HttpClient::with_config(config).unwrap())
}

fn credentials() -> Credentials {
    Credentials::new("etl@acme.com", "p&ss<word>").with_security_token("TOK")
}

#[test]
fn test_login_envelope_escapes_values() {
    let envelope = login_envelope(&credentials(), "etl-job");

    assert!(envelope.contains("<n1:username>etl@acme.com</n1:username>"));
    assert!(envelope.contains("<n1:password>p&amp;ss&lt;word&gt;TOK</n1:password>"));
    assert!(envelope.contains("<urn:client>etl-job</urn:client>"));
}

#[test]
fn test_parse_login_response() {
    let token = parse_login_response(&login_success_body("https://acme.my.salesforce.com")).unwrap();

    assert_eq!(token.session_id, "00D000000000001!AQ0AQ.session");
    assert_eq!(token.instance_url, "https://acme.my.salesforce.com");
    assert_eq!(token.user_id.as_deref(), Some("005000000000001"));
    assert_eq!(token.organization_id.as_deref(), Some("00D000000000001"));
}

#[test]
fn test_parse_login_fault() {
    match parse_login_response(LOGIN_FAULT) {
        Err(Error::Authentication { message }) => assert!(message.starts_with("INVALID_LOGIN")),
        other => panic!("Expected Authentication, got {other:?}"),
    }
}

#[test]
fn test_parse_login_missing_session() {
    let body = "<loginResponse><result><serverUrl>https://x.salesforce.com</serverUrl></result></loginResponse>";
    assert!(matches!(
        parse_login_response(body),
        Err(Error::Authentication { .. })
    ));
}

#[tokio::test]
async fn test_login_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/services/Soap/u/59.0"))
        .and(header("SOAPAction", "login"))
        .and(body_string_contains("<n1:username>etl@acme.com</n1:username>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(login_success_body(&server.uri())))
        .expect(1)
        .mount(&server)
        .await;

    let token = authenticator()
        .login(&server.uri(), "59.0", &credentials())
        .await
        .unwrap();

    assert_eq!(token.instance_url, server.uri());
}

#[tokio::test]
async fn test_login_rejected_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/services/Soap/u/59.0"))
        .respond_with(ResponseTemplate::new(500).set_body_string(LOGIN_FAULT))
        .expect(1)
        .mount(&server)
        .await;

    let err = authenticator()
        .login(&server.uri(), "59.0", &credentials())
        .await
        .unwrap_err();

    match err {
        Error::Authentication { message } => assert!(message.contains("INVALID_LOGIN")),
        other => panic!("Expected Authentication, got {other:?}"),
    }
}

#[tokio::test]
async fn test_revoke() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/services/oauth2/revoke"))
        .and(body_string_contains("token=abc"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let token = SessionToken::new("abc", format!("{}/services/Soap/u/59.0", server.uri())).unwrap();
    authenticator().revoke(&token).await.unwrap();
}

#[tokio::test]
async fn test_revoke_failure_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/services/oauth2/revoke"))
        .respond_with(ResponseTemplate::new(400).set_body_string("unsupported_token_type"))
        .mount(&server)
        .await;

    let token = SessionToken::new("abc", server.uri()).unwrap();
    assert!(authenticator().revoke(&token).await.is_err());
}
