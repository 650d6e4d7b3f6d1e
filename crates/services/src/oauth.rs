use boxgate_config::DropboxSettings;
use chrono::Utc;
use reqwest::Url;
use std::sync::Arc;

use crate::dropbox::DropboxApi;
use crate::error::{ServiceError, ServiceResult};
use crate::tokens::{TokenSet, TokenStore};

pub const SCOPES: &str = "files.metadata.read files.content.read files.content.write";

/// Builds the Dropbox consent URL requesting offline access.
///
/// No `state` parameter is sent, so the callback cannot tell a forged
/// redirect from a genuine one.
pub fn build_authorization_url(settings: &DropboxSettings) -> ServiceResult<String> {
    if !settings.has_client_id() {
        return Err(ServiceError::Configuration(
            "DROPBOX_CLIENT_ID is not set. Configure the environment and restart the server."
                .to_string(),
        ));
    }
    if !settings.has_redirect_uri() {
        return Err(ServiceError::Configuration(
            "DROPBOX_REDIRECT_URI is not set. Configure the environment and restart the server."
                .to_string(),
        ));
    }

    let url = Url::parse_with_params(
        &settings.authorize_url,
        &[
            ("client_id", settings.client_id.as_str()),
            ("redirect_uri", settings.redirect_uri.as_str()),
            ("response_type", "code"),
            ("token_access_type", "offline"),
            ("force_reapprove", "false"),
            ("scope", SCOPES),
        ],
    )
    .map_err(|e| ServiceError::Configuration(format!("Invalid authorize URL: {}", e)))?;

    Ok(url.to_string())
}

/// Login handshake: consent URL out, authorization code in.
pub struct AuthorizationFlow {
    settings: DropboxSettings,
    api: Arc<dyn DropboxApi>,
    store: Arc<dyn TokenStore>,
}

impl AuthorizationFlow {
    pub fn new(
        settings: DropboxSettings,
        api: Arc<dyn DropboxApi>,
        store: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            settings,
            api,
            store,
        }
    }

    pub fn authorization_url(&self) -> ServiceResult<String> {
        build_authorization_url(&self.settings)
    }

    /// Trades an authorization code for the first token set and stores it.
    pub async fn exchange_code(&self, code: &str) -> ServiceResult<TokenSet> {
        let s = &self.settings;
        if !s.has_client_id() || !s.has_client_secret() || !s.has_redirect_uri() {
            return Err(ServiceError::Configuration(
                "Dropbox settings missing. Check DROPBOX_CLIENT_ID, DROPBOX_CLIENT_SECRET and DROPBOX_REDIRECT_URI."
                    .to_string(),
            ));
        }
        if code.trim().is_empty() {
            return Err(ServiceError::Validation("Missing code parameter".to_string()));
        }

        let form = [
            ("code", code),
            ("grant_type", "authorization_code"),
            ("client_id", s.client_id.as_str()),
            ("client_secret", s.client_secret.as_str()),
            ("redirect_uri", s.redirect_uri.as_str()),
        ];

        let resp = self.api.request_token(&form).await?;
        if resp.access_token.is_empty() {
            return Err(ServiceError::upstream(
                502,
                "Token endpoint returned no access_token",
            ));
        }

        let tokens = TokenSet::from_response(resp, Utc::now());
        self.store.save(&tokens).await?;
        tracing::info!(account_id = ?tokens.account_id, "Authorization code exchanged");

        Ok(tokens)
    }
}
