pub mod error;
pub mod pages;
pub mod routes;
pub mod state;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, StatusCode},
    routing::{delete, get, post},
};
use state::AppState;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.app.cors_origins);
    let body_limit = DefaultBodyLimit::max(state.settings.app.max_upload_bytes);

    let auth_routes = Router::new()
        .route("/url", get(routes::auth::url))
        .route("/callback", get(routes::auth::callback))
        .route("/status", get(routes::auth::status));

    // Wildcards do not match an empty tail, so `/download/` gets its own route.
    let file_routes = Router::new()
        .route("/files", get(routes::file::list))
        .route("/upload", post(routes::file::upload))
        .route("/download/", get(routes::file::missing_path))
        .route("/download/{*path}", get(routes::file::download))
        .route("/delete/", delete(routes::file::missing_path))
        .route("/delete/{*path}", delete(routes::file::delete))
        .route("/preview", get(routes::file::preview))
        .route("/preview/inline", get(routes::file::preview_inline));

    Router::new()
        .route("/health", get(health_check))
        .nest("/auth", auth_routes)
        .merge(file_routes)
        .fallback(not_found)
        .layer(body_limit)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": "Route not found" })),
    )
}
