use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::dropbox::DropboxApi;
use crate::error::{ServiceError, ServiceResult};
use crate::tokens::TokenManager;

pub const OCTET_STREAM: &str = "application/octet-stream";

/// Listing entry as returned to the browser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileEntry {
    #[serde(rename = "tag")]
    pub kind: String,
    pub name: Option<String>,
    pub id: Option<String>,
    pub path_lower: Option<String>,
    pub client_modified: Option<String>,
    pub server_modified: Option<String>,
    pub size: u64,
}

impl FileEntry {
    /// Projects a raw Dropbox metadata entry. Anything but files and
    /// folders (deleted entries) yields `None`.
    pub fn from_metadata(entry: &Value) -> Option<Self> {
        let kind = entry.get(".tag").and_then(Value::as_str)?;
        if kind != "file" && kind != "folder" {
            return None;
        }
        let text = |key: &str| entry.get(key).and_then(Value::as_str).map(|s| s.to_string());

        Some(Self {
            kind: kind.to_string(),
            name: text("name"),
            id: text("id"),
            path_lower: text("path_lower"),
            client_modified: text("client_modified").filter(|s| !s.is_empty()),
            server_modified: text("server_modified").filter(|s| !s.is_empty()),
            size: entry.get("size").and_then(Value::as_u64).unwrap_or(0),
        })
    }
}

/// File bytes plus the headers needed to serve them.
#[derive(Debug, Clone)]
pub struct FileContent {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Proxies file operations to Dropbox on behalf of the stored account.
pub struct FileService {
    tokens: Arc<TokenManager>,
    api: Arc<dyn DropboxApi>,
}

impl FileService {
    pub fn new(tokens: Arc<TokenManager>, api: Arc<dyn DropboxApi>) -> Self {
        Self { tokens, api }
    }

    /// Lists the root folder, following the cursor until Dropbox reports no
    /// further pages.
    pub async fn list(&self) -> ServiceResult<Vec<FileEntry>> {
        let token = self.tokens.access_token().await?;

        tracing::info!("List");
        let mut page = self.api.list_folder(&token, "").await?;
        let mut entries = std::mem::take(&mut page.entries);
        while page.has_more {
            let cursor = std::mem::take(&mut page.cursor);
            page = self.api.list_folder_continue(&token, &cursor).await?;
            entries.append(&mut page.entries);
        }

        Ok(entries.iter().filter_map(FileEntry::from_metadata).collect())
    }

    /// Stores `contents` at the root under `file_name`. An existing file of
    /// the same name is kept and Dropbox picks a suffixed name instead.
    pub async fn upload(&self, file_name: &str, contents: Vec<u8>) -> ServiceResult<Value> {
        let name = base_name(file_name);
        if name.is_empty() {
            return Err(ServiceError::Validation(
                "File not sent (field \"file\")".to_string(),
            ));
        }
        let path = format!("/{}", name);
        let token = self.tokens.access_token().await?;

        tracing::info!(path = %path, size = contents.len(), "Upload");
        self.api.upload(&token, &path, contents).await
    }

    pub async fn download(&self, raw_path: &str) -> ServiceResult<FileContent> {
        let path = normalize_path(raw_path)?;
        let token = self.tokens.access_token().await?;

        tracing::info!(path = %path, "Download");
        let file = self.api.download(&token, &path).await?;

        Ok(FileContent {
            file_name: name_or_last_segment(&file.metadata, &path),
            content_type: OCTET_STREAM.to_string(),
            bytes: file.bytes,
        })
    }

    pub async fn delete(&self, raw_path: &str) -> ServiceResult<Value> {
        let path = normalize_path(raw_path)?;
        let token = self.tokens.access_token().await?;

        tracing::info!(path = %path, "Delete");
        self.api.delete(&token, &path).await
    }

    /// Returns a short-lived direct link to the file. The link carries no
    /// credentials of ours.
    pub async fn preview_link(&self, raw_path: &str) -> ServiceResult<String> {
        let path = normalize_path(raw_path)?;
        let token = self.tokens.access_token().await?;

        tracing::info!(path = %path, "Preview");
        let tmp = self.api.temporary_link(&token, &path).await?;
        tmp.link
            .filter(|l| !l.is_empty())
            .ok_or_else(|| ServiceError::upstream(500, "Failed to generate temporary link"))
    }

    /// Fetches the file through its temporary link and labels it for inline
    /// display.
    pub async fn preview_inline(&self, raw_path: &str) -> ServiceResult<FileContent> {
        let path = normalize_path(raw_path)?;
        let token = self.tokens.access_token().await?;

        tracing::info!(path = %path, "Inline preview");
        let tmp = self.api.temporary_link(&token, &path).await?;
        let file_name = name_or_last_segment(&tmp.metadata, &path);
        let link = tmp
            .link
            .filter(|l| !l.is_empty())
            .ok_or_else(|| ServiceError::upstream(500, "Failed to generate temporary link"))?;

        let fetched = self.api.fetch(&link).await?;
        let content_type = content_type_for(&file_name)
            .map(|c| c.to_string())
            .or(fetched.content_type.filter(|c| !c.is_empty()))
            .unwrap_or_else(|| OCTET_STREAM.to_string());

        Ok(FileContent {
            file_name,
            content_type,
            bytes: fetched.bytes,
        })
    }
}

/// Ensures a single leading `/`. Empty input is rejected.
pub fn normalize_path(raw: &str) -> ServiceResult<String> {
    if raw.is_empty() {
        return Err(ServiceError::Validation("Path missing".to_string()));
    }
    let trimmed = raw.trim_start_matches('/');
    if trimmed.is_empty() {
        return Err(ServiceError::Validation("Path missing".to_string()));
    }
    Ok(format!("/{}", trimmed))
}

/// MIME type for the previewable extensions.
pub fn content_type_for(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "txt" => "text/plain; charset=utf-8",
        _ => return None,
    };
    Some(mime)
}

fn base_name(file_name: &str) -> &str {
    file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .trim()
}

fn name_or_last_segment(metadata: &Value, path: &str) -> String {
    metadata
        .get("name")
        .and_then(Value::as_str)
        .filter(|n| !n.is_empty())
        .map(|n| n.to_string())
        .unwrap_or_else(|| path.rsplit('/').next().unwrap_or_default().to_string())
}
