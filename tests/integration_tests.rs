//! Integration tests using mock HTTP server
//!
//! Tests the full end-to-end flow: YAML config → file secret → SOAP login →
//! REST queries → extraction outcome → session revoke

use serde_json::json;
use soql_extract::cli::Runner;
use soql_extract::engine::{batch_observer, BatchEvent, BatchTotal, Strategy};
use soql_extract::{Config, Error};
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const QUERY_PATH: &str = "/services/data/v59.0/query";

// ============================================================================
// Fixtures
// ============================================================================

/// Config file plus secrets file pointing at the mock org
fn write_config(server: &MockServer, dir: &TempDir, extra: &str) -> Config {
    let secrets = json!({
        "salesforce/test": {
            "SecretString": json!({
                "username": "etl@acme.com",
                "password": "pw",
                "security_token": "TOKEN"
            }).to_string()
        }
    });
    fs::write(dir.path().join("secrets.json"), secrets.to_string()).unwrap();

    let yaml = format!(
        "secret_id: salesforce/test\n\
         secrets_file: secrets.json\n\
         salesforce:\n  login_url: {}\n\
         http:\n  max_retries: 0\n  requests_per_second: 0\n\
         {extra}",
        server.uri()
    );
    let config_path = dir.path().join("soql-extract.yaml");
    fs::write(&config_path, yaml).unwrap();

    Config::from_file(&config_path).unwrap()
}

async fn mount_login(server: &MockServer) {
    let body = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <soapenv:Envelope xmlns:soapenv=\"http://schemas.xmlsoap.org/soap/envelope/\">\
         <soapenv:Body><loginResponse><result>\
         <serverUrl>{}/services/Soap/u/59.0/00D000000000001</serverUrl>\
         <sessionId>00D!SESSION</sessionId>\
         <userId>005000000000001</userId>\
         </result></loginResponse></soapenv:Body></soapenv:Envelope>",
        server.uri()
    );

    Mock::given(method("POST"))
        .and(path("/services/Soap/u/59.0"))
        .and(header("SOAPAction", "login"))
        .and(body_string_contains("<n1:username>etl@acme.com</n1:username>"))
        .and(body_string_contains("<n1:password>pwTOKEN</n1:password>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_revoke(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/services/oauth2/revoke"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_query(server: &MockServer, soql: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(QUERY_PATH))
        .and(query_param("q", soql))
        .and(header("Authorization", "Bearer 00D!SESSION"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn account(id: &str) -> serde_json::Value {
    json!({
        "attributes": {"type": "Account", "url": format!("/services/data/v59.0/sobjects/Account/{id}")},
        "Id": id,
        "Name": format!("Account {id}")
    })
}

// ============================================================================
// Offset batching
// ============================================================================

#[tokio::test]
async fn test_offset_batching_end_to_end() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_login(&server).await;
    mount_revoke(&server).await;

    mount_query(
        &server,
        "select count() FROM Account WHERE IsDeleted = false ",
        json!({"totalSize": 3, "done": true, "records": []}),
    )
    .await;
    mount_query(
        &server,
        "SELECT Id, Name FROM Account WHERE IsDeleted = false  LIMIT 2 OFFSET 0 ORDER BY Id",
        json!({"totalSize": 2, "done": true, "records": [account("001A"), account("001B")]}),
    )
    .await;
    mount_query(
        &server,
        "SELECT Id, Name FROM Account WHERE IsDeleted = false  LIMIT 2 OFFSET 2 ORDER BY Id",
        json!({"totalSize": 1, "done": true, "records": [account("001C")]}),
    )
    .await;

    let config = write_config(&server, &dir, "extract:\n  batch_size: 2\n");
    let mut engine = Runner::engine(&config);

    let mut totals = Vec::new();
    let mut observer = batch_observer(|event: &BatchEvent<'_>| {
        totals.push((event.number, event.total));
        Ok(())
    });

    let extraction = engine
        .query_in_batches(
            "SELECT Id, Name FROM Account WHERE IsDeleted = false ORDER BY Id",
            config.extract.batch_size,
            Some(&mut observer),
        )
        .await
        .unwrap();
    drop(observer);

    assert!(extraction.completed);
    assert_eq!(extraction.total_count, 3);
    let ids: Vec<&str> = extraction
        .records
        .iter()
        .map(|r| r["Id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["001A", "001B", "001C"]);
    assert!(extraction.records.iter().all(|r| !r.contains_key("attributes")));
    assert_eq!(
        totals,
        vec![(1, BatchTotal::Batches(2)), (2, BatchTotal::Batches(2))]
    );

    engine.close().await.unwrap();
}

// ============================================================================
// Cursor pagination
// ============================================================================

#[tokio::test]
async fn test_cursor_pagination_end_to_end() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_login(&server).await;
    mount_revoke(&server).await;

    mount_query(
        &server,
        "SELECT Id, Name FROM Account",
        json!({
            "totalSize": 3,
            "done": false,
            "nextRecordsUrl": "/services/data/v59.0/query/01gD0000002HU6KIAW-2000",
            "records": [account("001A"), account("001B")]
        }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/services/data/v59.0/query/01gD0000002HU6KIAW-2000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalSize": 3,
            "done": true,
            "records": [account("001C")]
        })))
        .mount(&server)
        .await;

    let config = write_config(&server, &dir, "");
    let mut engine = Runner::engine(&config);

    let mut seen = Vec::new();
    let mut observer = batch_observer(|event: &BatchEvent<'_>| {
        seen.push((event.number, event.total));
        Ok(())
    });

    let extraction = engine
        .query("SELECT Id, Name FROM Account", true, Some(&mut observer))
        .await
        .unwrap();
    drop(observer);

    assert!(extraction.completed);
    assert_eq!(extraction.len(), 3);
    assert_eq!(extraction.batches, 2);
    assert_eq!(
        seen,
        vec![(1, BatchTotal::Records(3)), (2, BatchTotal::Records(3))]
    );
    assert_eq!(engine.stats().pages_fetched, 2);

    engine.close().await.unwrap();
}

#[tokio::test]
async fn test_cursor_expired_locator_is_partial() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_login(&server).await;
    mount_revoke(&server).await;

    mount_query(
        &server,
        "SELECT Id FROM Contact",
        json!({
            "totalSize": 4,
            "done": false,
            "nextRecordsUrl": "/services/data/v59.0/query/01gEXPIRED-2",
            "records": [{"attributes": {"type": "Contact"}, "Id": "003A"}, {"attributes": {"type": "Contact"}, "Id": "003B"}]
        }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/services/data/v59.0/query/01gEXPIRED-2"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!([
            {"message": "invalid query locator", "errorCode": "INVALID_QUERY_LOCATOR"}
        ])))
        .mount(&server)
        .await;

    let config = write_config(&server, &dir, "");
    let mut engine = Runner::engine(&config);

    let extraction = engine
        .extract("SELECT Id FROM Contact", Strategy::Cursor, None)
        .await
        .unwrap();

    assert!(!extraction.completed);
    assert_eq!(extraction.len(), 2);
    match &extraction.error {
        Some(Error::Pagination { message }) => {
            assert!(message.contains("INVALID_QUERY_LOCATOR"));
        }
        other => panic!("Expected Pagination error, got {other:?}"),
    }

    engine.close().await.unwrap();
}

// ============================================================================
// Full pull
// ============================================================================

#[tokio::test]
async fn test_full_pull_follows_continuations() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_login(&server).await;
    mount_revoke(&server).await;

    mount_query(
        &server,
        "SELECT Id, Name FROM Account",
        json!({
            "totalSize": 2,
            "done": false,
            "nextRecordsUrl": "/services/data/v59.0/query/01gFULL-1",
            "records": [account("001A")]
        }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/services/data/v59.0/query/01gFULL-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "totalSize": 2,
            "done": true,
            "records": [account("001B")]
        })))
        .mount(&server)
        .await;

    let config = write_config(&server, &dir, "");
    let mut engine = Runner::engine(&config);

    let extraction = engine
        .query("SELECT Id, Name FROM Account", false, None)
        .await
        .unwrap();

    assert!(extraction.completed);
    assert_eq!(extraction.len(), 2);
    assert_eq!(extraction.records[1]["Name"], "Account 001B");

    engine.close().await.unwrap();
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_invalid_login_aborts_extraction() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/services/Soap/u/59.0"))
        .respond_with(ResponseTemplate::new(500).set_body_string(
            "<soapenv:Envelope><soapenv:Body><soapenv:Fault>\
             <faultcode>INVALID_LOGIN</faultcode>\
             <faultstring>INVALID_LOGIN: Invalid username, password, security token; or user locked out.</faultstring>\
             </soapenv:Fault></soapenv:Body></soapenv:Envelope>",
        ))
        .mount(&server)
        .await;

    let config = write_config(&server, &dir, "");
    let mut engine = Runner::engine(&config);

    let err = engine
        .query("SELECT Id FROM Account", true, None)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Extraction { .. }));
    match err.cause() {
        Error::Authentication { message } => assert!(message.contains("INVALID_LOGIN")),
        other => panic!("Expected Authentication, got {other:?}"),
    }

    // Nothing to release
    engine.close().await.unwrap();
}

#[tokio::test]
async fn test_unknown_secret_aborts_extraction() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let mut config = write_config(&server, &dir, "");
    config.secret_id = "salesforce/missing".to_string();

    let mut engine = Runner::engine(&config);
    let err = engine.query_count("SELECT Id FROM Account").await.unwrap_err();

    assert!(matches!(err, Error::SecretRetrieval { .. }));
    engine.close().await.unwrap();
}
