use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Required deployment setting is missing.
    #[error("{0}")]
    Configuration(String),
    #[error("Not authenticated. Complete the login at /auth/url.")]
    Unauthenticated,
    #[error("Refresh token missing. Log in again.")]
    ReauthRequired,
    /// Dropbox rejected the call or could not be reached.
    #[error("{message}")]
    Upstream { status: u16, message: String },
    #[error("{0}")]
    Validation(String),
    #[error("Token storage error: {0}")]
    Storage(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn upstream(status: u16, message: impl Into<String>) -> Self {
        ServiceError::Upstream {
            status,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        let status = err.status().map(|s| s.as_u16()).unwrap_or(502);
        ServiceError::upstream(status, format!("Dropbox request failed: {}", err))
    }
}
