use crate::fixtures::dropbox::file_entry;
use crate::fixtures::test_app::test_settings;
use boxgate_services::{DropboxApi, DropboxClient, ServiceError};
use serde_json::{Value, json};
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client() -> (MockServer, DropboxClient) {
    let server = MockServer::start().await;
    let settings = test_settings(&server.uri());
    let client = DropboxClient::new(&settings.dropbox);
    (server, client)
}

#[tokio::test]
async fn list_folder_sends_bearer_and_path() {
    let (server, client) = client().await;

    Mock::given(method("POST"))
        .and(path("/2/files/list_folder"))
        .and(header("authorization", "Bearer tok"))
        .and(body_json(json!({ "path": "" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "entries": [file_entry("a.txt", 1)],
            "cursor": "c1",
            "has_more": false,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let page = client.list_folder("tok", "").await.unwrap();
    assert_eq!(page.entries.len(), 1);
    assert_eq!(page.cursor, "c1");
    assert!(!page.has_more);
}

#[tokio::test]
async fn download_reads_metadata_from_result_header() {
    let (server, client) = client().await;

    Mock::given(method("POST"))
        .and(path("/content/2/files/download"))
        .and(header("dropbox-api-arg", r#"{"path":"/a.txt"}"#))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Dropbox-API-Result", r#"{"name":"A.txt","size":5}"#)
                .set_body_bytes(b"hello".to_vec()),
        )
        .mount(&server)
        .await;

    let file = client.download("tok", "/a.txt").await.unwrap();
    assert_eq!(file.bytes, b"hello");
    assert_eq!(file.metadata["name"], "A.txt");
}

#[tokio::test]
async fn upload_header_is_ascii_only() {
    let (server, client) = client().await;

    Mock::given(method("POST"))
        .and(path("/content/2/files/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_entry("ç.txt", 2)))
        .mount(&server)
        .await;

    client.upload("tok", "/ç.txt", b"hi".to_vec()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let raw = requests[0].headers.get("dropbox-api-arg").unwrap().as_bytes();
    assert!(raw.is_ascii());
    let arg: Value = serde_json::from_slice(raw).unwrap();
    assert_eq!(arg["path"], "/ç.txt");
}

#[tokio::test]
async fn token_request_posts_form_and_parses_response() {
    let (server, client) = client().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=xyz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "sl.new",
            "refresh_token": "r",
            "expires_in": 14400,
            "account_id": "dbid:1",
        })))
        .mount(&server)
        .await;

    let resp = client
        .request_token(&[("grant_type", "authorization_code"), ("code", "xyz")])
        .await
        .unwrap();
    assert_eq!(resp.access_token, "sl.new");
    assert_eq!(resp.refresh_token.as_deref(), Some("r"));
    assert_eq!(resp.expires_in, Some(14400));
}

#[tokio::test]
async fn token_errors_carry_description_and_status() {
    let (server, client) = client().await;

    Mock::given(method("POST"))
        .and(path("/oauth2/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "code doesn't exist or has expired",
        })))
        .mount(&server)
        .await;

    match client.request_token(&[("code", "old")]).await {
        Err(ServiceError::Upstream { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "code doesn't exist or has expired");
        }
        other => panic!("expected upstream error, got {:?}", other),
    }
}

#[tokio::test]
async fn plain_text_error_body_is_passed_through() {
    let (server, client) = client().await;

    Mock::given(method("POST"))
        .and(path("/2/files/delete_v2"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    match client.delete("tok", "/x").await {
        Err(ServiceError::Upstream { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "Service Unavailable");
        }
        other => panic!("expected upstream error, got {:?}", other),
    }
}
