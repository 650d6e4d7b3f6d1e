use serde_json::{Value, json};
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Mock, ResponseTemplate};

use super::test_app::TestApp;

pub const BEARER_VALID: &str = "Bearer sl.valid-token";

/// A Dropbox `FileMetadata` entry as `list_folder` returns it.
pub fn file_entry(name: &str, size: u64) -> Value {
    json!({
        ".tag": "file",
        "name": name,
        "id": format!("id:{}", name),
        "path_lower": format!("/{}", name.to_lowercase()),
        "path_display": format!("/{}", name),
        "client_modified": "2024-05-01T10:00:00Z",
        "server_modified": "2024-05-01T10:00:05Z",
        "rev": "015f1",
        "size": size,
    })
}

pub fn folder_entry(name: &str) -> Value {
    json!({
        ".tag": "folder",
        "name": name,
        "id": format!("id:{}", name),
        "path_lower": format!("/{}", name.to_lowercase()),
        "path_display": format!("/{}", name),
    })
}

impl TestApp {
    /// Token endpoint answers a refresh grant with `access_token`.
    pub async fn mock_refresh(&self, access_token: &str, expected_calls: u64) {
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": access_token,
                "token_type": "bearer",
                "expires_in": 14400,
            })))
            .expect(expected_calls)
            .mount(&self.dropbox)
            .await;
    }

    pub async fn mock_refresh_failure(&self) {
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "refresh token is invalid or revoked",
            })))
            .mount(&self.dropbox)
            .await;
    }

    /// `get_temporary_link` for `dropbox_path`, pointing back at the mock
    /// server under `/tmp-link/<name>`.
    pub async fn mock_temporary_link(&self, dropbox_path: &str, name: &str) -> String {
        let link = format!("{}/tmp-link/{}", self.dropbox.uri(), name);
        Mock::given(method("POST"))
            .and(path("/2/files/get_temporary_link"))
            .and(header("authorization", BEARER_VALID))
            .and(body_json(json!({ "path": dropbox_path })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "metadata": file_entry(name, 4),
                "link": link,
            })))
            .mount(&self.dropbox)
            .await;
        link
    }
}
