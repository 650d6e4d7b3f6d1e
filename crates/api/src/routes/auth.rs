use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use crate::{error::ApiError, pages, state::AppState};

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// GET /auth/url
pub async fn url(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let url = state.auth.authorization_url()?;
    tracing::info!(url = %url, "Authorization URL generated");
    Ok(Json(serde_json::json!({ "url": url })))
}

/// GET /auth/callback
/// Redirect target registered with Dropbox. Runs inside the login popup.
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackQuery>,
) -> Result<Response, ApiError> {
    if let Some(error) = params.error.as_deref().filter(|e| !e.is_empty()) {
        tracing::error!(
            error = %error,
            description = ?params.error_description,
            "Authorization callback returned an error"
        );
        let page = pages::login_failed(error, params.error_description.as_deref());
        return Ok((StatusCode::BAD_REQUEST, Html(page)).into_response());
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        return Ok((StatusCode::BAD_REQUEST, "Missing code parameter").into_response());
    };

    state.auth.exchange_code(&code).await?;
    tracing::info!(path = %state.settings.tokens.path, "Login completed");

    Ok(Html(pages::login_complete()).into_response())
}

/// GET /auth/status
/// Never fails: any problem obtaining a usable token reads as logged out.
pub async fn status(State(state): State<AppState>) -> Json<serde_json::Value> {
    let authenticated = match state.tokens.ensure_valid().await {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!("Not authenticated: {}", e);
            false
        }
    };
    Json(serde_json::json!({ "authenticated": authenticated }))
}
