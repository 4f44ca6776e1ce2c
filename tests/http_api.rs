//! Integration tests for the HTTP client and drivers using a wiremock server.

use std::time::Duration;

use authmigrate::api::{
    AccountApi, ApiError, DownloadAccountRequest, HttpAccountApi, DOWNLOAD_ACCOUNT_PATH,
    UPLOAD_ACCOUNT_PATH,
};
use authmigrate::model::UserRecord;
use authmigrate::sync::{into_batches, Exporter, Importer, RecordWriter, SyncError};
use authmigrate::validate::{validate_hash_options, FileFormat, HashOptions, RawHashOptions};

use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, body_partial_json, body_string_contains, header, method, path},
};

fn client(server: &MockServer) -> HttpAccountApi {
    HttpAccountApi::new(&server.uri(), "test-token", Duration::from_secs(5)).unwrap()
}

fn download_request(token: Option<&str>) -> DownloadAccountRequest {
    DownloadAccountRequest {
        target_project_id: "test-project-id".to_string(),
        max_results: 1000,
        next_page_token: token.map(String::from),
    }
}

#[tokio::test]
async fn test_download_sends_bearer_token_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(DOWNLOAD_ACCOUNT_PATH))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(json!({"targetProjectId": "test-project-id", "maxResults": 1000})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{"localId": "1", "email": "a@test.org", "version": 0, "passwordHash": "aGFzaA"}],
            "nextPageToken": "next"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client(&server)
        .download_accounts(&download_request(None))
        .await
        .unwrap();

    assert_eq!(page.users.len(), 1);
    assert_eq!(page.users[0].local_id, "1");
    assert_eq!(page.next_page_token.as_deref(), Some("next"));
}

#[tokio::test]
async fn test_error_status_uses_service_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(DOWNLOAD_ACCOUNT_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "INVALID_PROJECT_ID"}
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .download_accounts(&download_request(None))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ApiError::Status {
            status: 400,
            message: "INVALID_PROJECT_ID".to_string()
        }
    );
    assert!(!err.is_transient());
}

#[tokio::test]
async fn test_slow_response_is_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(DOWNLOAD_ACCOUNT_PATH))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let api = HttpAccountApi::new(&server.uri(), "t", Duration::from_millis(50)).unwrap();
    let err = api.download_accounts(&download_request(None)).await.unwrap_err();

    assert_eq!(err, ApiError::Timeout);
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_export_walks_pages_over_http() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(DOWNLOAD_ACCOUNT_PATH))
        .and(body_partial_json(json!({"nextPageToken": "A"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{"localId": "3", "displayName": "Doe, Jane"}]
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(DOWNLOAD_ACCOUNT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{"localId": "1"}, {"localId": "2", "emailVerified": true}],
            "nextPageToken": "A"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server);
    let mut exporter = Exporter::new(
        &api,
        "test-project-id",
        RecordWriter::new(Vec::new(), FileFormat::Csv),
    );
    let stats = exporter.export().await.unwrap();
    let out = String::from_utf8(exporter.into_writer().into_inner()).unwrap();

    assert_eq!(stats.pages, 2);
    assert_eq!(stats.accounts, 3);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].starts_with("2,,true,"));
    assert!(lines[2].starts_with("3,,false,,,\"Doe, Jane\","));
}

#[tokio::test]
async fn test_export_gives_up_after_repeated_timeouts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(DOWNLOAD_ACCOUNT_PATH))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
        .expect(6)
        .mount(&server)
        .await;

    let api = HttpAccountApi::new(&server.uri(), "t", Duration::from_millis(30)).unwrap();
    let mut exporter = Exporter::new(&api, "p", RecordWriter::new(Vec::new(), FileFormat::Json));
    let err = exporter.export().await.unwrap_err();

    assert!(matches!(
        err,
        SyncError::RetriesExhausted {
            attempts: 6,
            exported: 0
        }
    ));
}

#[tokio::test]
async fn test_upload_body_matches_wire_shape() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(UPLOAD_ACCOUNT_PATH))
        .and(body_json(json!({
            "targetProjectId": "test-project-id",
            "hashAlgorithm": "HMAC_SHA1",
            "signerKey": "a2V5MTIz",
            "users": [{"email": "test0@test.org", "localId": "0"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .expect(1)
        .mount(&server)
        .await;

    let options = validate_hash_options(&RawHashOptions {
        hash_algo: Some("HMAC_SHA1".to_string()),
        hash_key: Some("a2V5MTIz".to_string()),
        ..RawHashOptions::default()
    })
    .unwrap();
    let records = vec![UserRecord {
        email: Some("test0@test.org".to_string()),
        ..UserRecord::new("0")
    }];

    let api = client(&server);
    let report = Importer::new(&api, "test-project-id", options)
        .import_batches(&into_batches(records, 1000))
        .await;

    assert!(report.is_success());
    assert_eq!(report.imported(), 1);
}

#[tokio::test]
async fn test_import_reports_per_account_errors_and_continues() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(UPLOAD_ACCOUNT_PATH))
        .and(body_string_contains(r#""localId":"2""#))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": [{"index": "0", "message": "email exists"}]
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(UPLOAD_ACCOUNT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let records: Vec<UserRecord> = (0..3).map(|i| UserRecord::new(i.to_string())).collect();
    let api = client(&server);
    let report = Importer::new(&api, "p", HashOptions::default())
        .import_batches(&into_batches(records, 2))
        .await;

    assert_eq!(report.batches, 2);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].batch, 1);
    assert_eq!(report.errors[0].local_id.as_deref(), Some("2"));
    assert_eq!(report.errors[0].message, "email exists");
    assert_eq!(report.imported(), 2);
}
