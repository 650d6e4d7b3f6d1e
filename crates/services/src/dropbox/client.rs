use async_trait::async_trait;
use boxgate_config::DropboxSettings;
use reqwest::{Client, Response, header::CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::fmt::Write;

use super::{DownloadedFile, DropboxApi, FetchedContent, ListFolderPage, TemporaryLink, TokenResponse};
use crate::error::{ServiceError, ServiceResult};

const API_ARG_HEADER: &str = "Dropbox-API-Arg";
const API_RESULT_HEADER: &str = "Dropbox-API-Result";

pub struct DropboxClient {
    client: Client,
    token_url: String,
    api_url: String,
    content_url: String,
}

impl DropboxClient {
    pub fn new(settings: &DropboxSettings) -> Self {
        Self {
            client: Client::new(),
            token_url: settings.token_url.clone(),
            api_url: settings.api_url.trim_end_matches('/').to_string(),
            content_url: settings.content_url.trim_end_matches('/').to_string(),
        }
    }

    async fn rpc<T: DeserializeOwned>(
        &self,
        access_token: &str,
        endpoint: &str,
        arg: Value,
    ) -> ServiceResult<T> {
        let resp = self
            .client
            .post(format!("{}/{}", self.api_url, endpoint))
            .bearer_auth(access_token)
            .json(&arg)
            .send()
            .await?;

        let resp = ensure_success(resp).await?;
        resp.json::<T>().await.map_err(|e| {
            ServiceError::upstream(502, format!("Failed to parse {} response: {}", endpoint, e))
        })
    }
}

#[async_trait]
impl DropboxApi for DropboxClient {
    async fn request_token(&self, form: &[(&str, &str)]) -> ServiceResult<TokenResponse> {
        let resp = self.client.post(&self.token_url).form(form).send().await?;
        let resp = ensure_success(resp).await?;
        resp.json::<TokenResponse>()
            .await
            .map_err(|e| ServiceError::upstream(502, format!("Failed to parse token: {}", e)))
    }

    async fn list_folder(&self, access_token: &str, path: &str) -> ServiceResult<ListFolderPage> {
        self.rpc(access_token, "files/list_folder", json!({ "path": path }))
            .await
    }

    async fn list_folder_continue(
        &self,
        access_token: &str,
        cursor: &str,
    ) -> ServiceResult<ListFolderPage> {
        self.rpc(
            access_token,
            "files/list_folder/continue",
            json!({ "cursor": cursor }),
        )
        .await
    }

    async fn upload(
        &self,
        access_token: &str,
        path: &str,
        contents: Vec<u8>,
    ) -> ServiceResult<Value> {
        let arg = json!({
            "path": path,
            "mode": "add",
            "autorename": true,
            "mute": false,
            "strict_conflict": false,
        });

        let resp = self
            .client
            .post(format!("{}/files/upload", self.content_url))
            .bearer_auth(access_token)
            .header(API_ARG_HEADER, header_safe_json(&arg))
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(contents)
            .send()
            .await?;

        let resp = ensure_success(resp).await?;
        resp.json::<Value>()
            .await
            .map_err(|e| ServiceError::upstream(502, format!("Failed to parse upload: {}", e)))
    }

    async fn download(&self, access_token: &str, path: &str) -> ServiceResult<DownloadedFile> {
        let resp = self
            .client
            .post(format!("{}/files/download", self.content_url))
            .bearer_auth(access_token)
            .header(API_ARG_HEADER, header_safe_json(&json!({ "path": path })))
            .send()
            .await?;

        let resp = ensure_success(resp).await?;
        let metadata = resp
            .headers()
            .get(API_RESULT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| serde_json::from_str::<Value>(v).ok())
            .unwrap_or(Value::Null);
        let bytes = resp.bytes().await?;

        Ok(DownloadedFile {
            metadata,
            bytes: bytes.to_vec(),
        })
    }

    async fn delete(&self, access_token: &str, path: &str) -> ServiceResult<Value> {
        let result: Value = self
            .rpc(access_token, "files/delete_v2", json!({ "path": path }))
            .await?;
        Ok(result.get("metadata").cloned().unwrap_or(Value::Null))
    }

    async fn temporary_link(
        &self,
        access_token: &str,
        path: &str,
    ) -> ServiceResult<TemporaryLink> {
        self.rpc(
            access_token,
            "files/get_temporary_link",
            json!({ "path": path }),
        )
        .await
    }

    async fn fetch(&self, url: &str) -> ServiceResult<FetchedContent> {
        let resp = self.client.get(url).send().await?;
        let resp = ensure_success(resp).await?;
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let bytes = resp.bytes().await?;

        Ok(FetchedContent {
            bytes: bytes.to_vec(),
            content_type,
        })
    }
}

async fn ensure_success(resp: Response) -> ServiceResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    let message = error_message(&body)
        .unwrap_or_else(|| format!("Dropbox returned {}", status));
    tracing::warn!(status = status.as_u16(), "Dropbox call failed: {}", message);
    Err(ServiceError::upstream(status.as_u16(), message))
}

/// Picks the most descriptive message out of a Dropbox error body.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }

    let Ok(json) = serde_json::from_str::<Value>(trimmed) else {
        return Some(trimmed.to_string());
    };

    ["error_summary", "error_description", "error"]
        .iter()
        .find_map(|key| json.get(*key).and_then(Value::as_str))
        .map(|s| s.to_string())
        .or_else(|| Some(trimmed.to_string()))
}

/// Serializes `value` for the `Dropbox-API-Arg` header, which only accepts
/// ASCII. Every other character is written as a JSON `\uXXXX` escape.
fn header_safe_json(value: &Value) -> String {
    let raw = value.to_string();
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_ascii() {
            out.push(ch);
            continue;
        }
        let mut units = [0u16; 2];
        for unit in ch.encode_utf16(&mut units) {
            let _ = write!(out, "\\u{:04x}", unit);
        }
    }
    out
}
