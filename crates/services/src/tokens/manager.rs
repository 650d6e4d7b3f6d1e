use boxgate_config::DropboxSettings;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{TokenSet, TokenStore};
use crate::dropbox::DropboxApi;
use crate::error::{ServiceError, ServiceResult};

/// Hands out a usable token set, refreshing lazily when the stored access
/// token is about to expire.
///
/// Refresh is single-flight: concurrent callers that find an expired token
/// queue on `refresh_lock`, and whoever enters after a refresh completed
/// reuses the freshly stored set.
pub struct TokenManager {
    store: Arc<dyn TokenStore>,
    api: Arc<dyn DropboxApi>,
    settings: DropboxSettings,
    refresh_lock: Mutex<()>,
}

impl TokenManager {
    pub fn new(
        store: Arc<dyn TokenStore>,
        api: Arc<dyn DropboxApi>,
        settings: DropboxSettings,
    ) -> Self {
        Self {
            store,
            api,
            settings,
            refresh_lock: Mutex::new(()),
        }
    }

    /// Loads the stored set and makes sure it is usable.
    pub async fn ensure_valid(&self) -> ServiceResult<TokenSet> {
        let current = self.store.load().await;
        self.ensure_valid_from(current).await
    }

    pub async fn access_token(&self) -> ServiceResult<String> {
        Ok(self.ensure_valid().await?.access_token)
    }

    pub async fn ensure_valid_from(&self, current: Option<TokenSet>) -> ServiceResult<TokenSet> {
        let tokens = current.ok_or(ServiceError::Unauthenticated)?;
        if tokens.is_usable() {
            return Ok(tokens);
        }

        let _guard = self.refresh_lock.lock().await;

        // Another request may have refreshed while we were waiting.
        let latest = match self.store.load().await {
            Some(stored) if stored.is_usable() => return Ok(stored),
            Some(stored) => stored,
            None => tokens,
        };

        self.refresh(&latest).await
    }

    /// Performs a single refresh-grant attempt and persists the result.
    pub async fn refresh(&self, tokens: &TokenSet) -> ServiceResult<TokenSet> {
        let refresh_token = tokens.refresh_token().ok_or(ServiceError::ReauthRequired)?;

        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.settings.client_id.as_str()),
            ("client_secret", self.settings.client_secret.as_str()),
        ];

        let resp = self.api.request_token(&form).await?;
        if resp.access_token.is_empty() {
            return Err(ServiceError::upstream(
                502,
                "Token endpoint returned no access_token",
            ));
        }

        let updated = tokens.merge_refresh(resp, Utc::now());
        self.store.save(&updated).await?;
        tracing::info!(expires_at = ?updated.expires_at, "Access token refreshed");

        Ok(updated)
    }
}
