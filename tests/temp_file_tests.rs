//! Temp file store tests against a mock service

use podcast_gen::application::ports::{ApiError, TempFileApi};
use podcast_gen::domain::config::ServiceCredentials;
use podcast_gen::domain::generation::PageQuery;
use podcast_gen::infrastructure::HttpTempFileApi;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn api(server: &MockServer) -> HttpTempFileApi {
    let credentials = ServiceCredentials::new(server.uri(), "test-key", "v1").unwrap();
    HttpTempFileApi::new(reqwest::Client::new(), &credentials).unwrap()
}

fn body_text(request: &Request) -> String {
    String::from_utf8_lossy(&request.body).into_owned()
}

#[tokio::test]
async fn upload_posts_multipart_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/podcast/tempfiles/[0-9a-f-]{36}$"))
        .and(query_param("api-version", "v1"))
        .and(header("Ocp-Apim-Subscription-Key", "test-key"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "t1",
            "name": "doc.pdf",
            "sizeInBytes": 8,
            "expiresDateTime": "2026-01-02T10:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = dir.path().join("doc.pdf");
    std::fs::write(&file, "%PDF-1.4").unwrap();

    let uploaded = api(&server).upload(&file, Some(60)).await.unwrap();
    assert_eq!(uploaded.id, "t1");
    assert_eq!(uploaded.size_in_bytes, Some(8));

    let requests = server.received_requests().await.unwrap();
    let content_type = requests[0]
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("multipart/form-data"));

    let body = body_text(&requests[0]);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("filename=\"doc.pdf\""));
    assert!(body.contains("application/octet-stream"));
    assert!(body.contains("%PDF-1.4"));
    assert!(body.contains("name=\"expiresAfterInMins\""));
    assert!(body.contains("60"));
}

#[tokio::test]
async fn upload_without_expiry_omits_field() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "t2" })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = dir.path().join("notes.txt");
    std::fs::write(&file, "hello").unwrap();

    api(&server).upload(&file, None).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(!body_text(&requests[0]).contains("expiresAfterInMins"));
}

#[tokio::test]
async fn upload_missing_file_sends_nothing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let err = api(&server)
        .upload(&dir.path().join("missing.pdf"), None)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::FileNotFound(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn list_returns_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/podcast/tempfiles"))
        .and(query_param("skip", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{ "id": "t1" }, { "id": "t2" }]
        })))
        .mount(&server)
        .await;

    let page = api(&server)
        .list(PageQuery {
            skip: Some(5),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(page.value.len(), 2);
    assert!(page.is_last());
}

#[tokio::test]
async fn get_expired_file_is_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/podcast/tempfiles/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    assert!(api(&server).get("gone").await.unwrap().is_none());
}

#[tokio::test]
async fn delete_requires_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/podcast/tempfiles/t1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/podcast/tempfiles/t2"))
        .respond_with(ResponseTemplate::new(500).set_body_string("storage offline"))
        .mount(&server)
        .await;

    let api = api(&server);
    api.delete("t1").await.unwrap();

    let err = api.delete("t2").await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(err.to_string().contains("storage offline"));
}
