use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use boxgate_services::ServiceError;
use serde::Serialize;

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Configuration(String),
    Upstream(StatusCode, String),
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Upstream(status, _) => *status,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn into_message(self) -> String {
        match self {
            ApiError::NotFound(msg)
            | ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Configuration(msg)
            | ApiError::Upstream(_, msg)
            | ApiError::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Request-shape errors go back as-is; everything else is tagged with
        // a correlation id that also lands in the server log.
        let id = match &self {
            ApiError::NotFound(_) | ApiError::BadRequest(_) => None,
            other => {
                let id = uuid::Uuid::new_v4().simple().to_string();
                tracing::error!(id = %id, status = status.as_u16(), "Request failed: {:?}", other);
                Some(id)
            }
        };

        let body = ErrorResponse {
            error: self.into_message(),
            id,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Configuration(msg) => ApiError::Configuration(msg),
            ServiceError::Unauthenticated | ServiceError::ReauthRequired => {
                ApiError::Unauthorized(err.to_string())
            }
            ServiceError::Upstream { status, message } => {
                let status = StatusCode::from_u16(status)
                    .ok()
                    .filter(|s| s.is_client_error() || s.is_server_error())
                    .unwrap_or(StatusCode::BAD_GATEWAY);
                ApiError::Upstream(status, message)
            }
            ServiceError::Validation(msg) => ApiError::BadRequest(msg),
            ServiceError::Storage(msg) => ApiError::Internal(msg),
        }
    }
}
