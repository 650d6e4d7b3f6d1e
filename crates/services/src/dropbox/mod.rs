mod client;

pub use client::DropboxClient;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ServiceResult;

/// Body of a successful `oauth2/token` call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default)]
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    pub account_id: Option<String>,
    pub uid: Option<String>,
    pub expires_in: Option<i64>,
}

/// One page of `files/list_folder` or `files/list_folder/continue`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListFolderPage {
    #[serde(default)]
    pub entries: Vec<Value>,
    #[serde(default)]
    pub cursor: String,
    #[serde(default)]
    pub has_more: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemporaryLink {
    pub link: Option<String>,
    #[serde(default)]
    pub metadata: Value,
}

#[derive(Debug, Clone)]
pub struct DownloadedFile {
    pub metadata: Value,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct FetchedContent {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// The Dropbox HTTP surface this service depends on.
#[async_trait]
pub trait DropboxApi: Send + Sync {
    /// POST a grant to the OAuth token endpoint.
    async fn request_token(&self, form: &[(&str, &str)]) -> ServiceResult<TokenResponse>;
    async fn list_folder(&self, access_token: &str, path: &str) -> ServiceResult<ListFolderPage>;
    async fn list_folder_continue(
        &self,
        access_token: &str,
        cursor: &str,
    ) -> ServiceResult<ListFolderPage>;
    /// Adds a new file, letting Dropbox rename it on conflict.
    async fn upload(&self, access_token: &str, path: &str, contents: Vec<u8>)
    -> ServiceResult<Value>;
    async fn download(&self, access_token: &str, path: &str) -> ServiceResult<DownloadedFile>;
    async fn delete(&self, access_token: &str, path: &str) -> ServiceResult<Value>;
    async fn temporary_link(&self, access_token: &str, path: &str)
    -> ServiceResult<TemporaryLink>;
    /// Plain GET of a temporary link. No credentials are attached.
    async fn fetch(&self, url: &str) -> ServiceResult<FetchedContent>;
}
