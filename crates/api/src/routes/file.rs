use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, Query, State, multipart::MultipartRejection},
    http::{StatusCode, header},
    response::Response,
};
use boxgate_services::files::FileContent;
use serde::Deserialize;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct PathQuery {
    pub path: Option<String>,
}

impl PathQuery {
    fn required(self) -> Result<String, ApiError> {
        self.path
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ApiError::BadRequest("Query parameter \"path\" is required".to_string()))
    }
}

/// GET /files
pub async fn list(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let files = state.files.list().await?;
    Ok(Json(serde_json::json!({ "files": files })))
}

/// POST /upload
/// Multipart form with a single `file` field.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let mut file_data: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Multipart error: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("unnamed").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;
        file_data = Some((filename, bytes.to_vec()));
        break;
    }

    let (filename, bytes) = file_data
        .ok_or_else(|| ApiError::BadRequest("File not sent (field \"file\")".to_string()))?;

    let entry = state.files.upload(&filename, bytes).await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!({ "entry": entry }))))
}

/// GET /download/{*path}
pub async fn download(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Response, ApiError> {
    let file = state.files.download(&path).await?;
    file_response(file, "attachment")
}

/// DELETE /delete/{*path}
pub async fn delete(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let metadata = state.files.delete(&path).await?;
    Ok(Json(serde_json::json!({ "deleted": metadata })))
}

/// `/download/` and `/delete/` with nothing after the slash.
pub async fn missing_path() -> ApiError {
    ApiError::BadRequest("Path missing".to_string())
}

/// GET /preview?path=
pub async fn preview(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let path = query.required()?;
    let url = state.files.preview_link(&path).await?;
    Ok(Json(serde_json::json!({ "url": url })))
}

/// GET /preview/inline?path=
pub async fn preview_inline(
    State(state): State<AppState>,
    Query(query): Query<PathQuery>,
) -> Result<Response, ApiError> {
    let path = query.required()?;
    let file = state.files.preview_inline(&path).await?;
    file_response(file, "inline")
}

fn file_response(file: FileContent, disposition: &str) -> Result<Response, ApiError> {
    Response::builder()
        .header(header::CONTENT_TYPE, &file.content_type)
        .header(header::CONTENT_LENGTH, file.bytes.len())
        .header(
            header::CONTENT_DISPOSITION,
            format!(
                "{}; filename=\"{}\"",
                disposition,
                encode_file_name(&file.file_name)
            ),
        )
        .body(Body::from(file.bytes))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}

/// Percent-encodes a filename for `Content-Disposition`, leaving the
/// unreserved marks `( ) ! ' *` readable.
fn encode_file_name(name: &str) -> String {
    let mut encoded = urlencoding::encode(name).into_owned();
    for (escaped, mark) in [("%28", "("), ("%29", ")"), ("%21", "!"), ("%27", "'"), ("%2A", "*")] {
        encoded = encoded.replace(escaped, mark);
    }
    encoded
}
