use async_trait::async_trait;
use std::path::PathBuf;
use tokio::sync::RwLock;

use super::TokenSet;
use crate::error::{ServiceError, ServiceResult};

/// Durable home of the single token set.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Missing or unreadable data is reported as `None`, never as an error.
    async fn load(&self) -> Option<TokenSet>;
    async fn save(&self, tokens: &TokenSet) -> ServiceResult<()>;
}

/// Pretty-printed JSON file on local disk.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "tokens.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Option<TokenSet> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), "No token file: {}", e);
                return None;
            }
        };
        if raw.trim().is_empty() {
            return None;
        }
        match serde_json::from_str::<TokenSet>(&raw) {
            Ok(tokens) if !tokens.access_token.is_empty() => Some(tokens),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Ignoring malformed token file: {}", e);
                None
            }
        }
    }

    async fn save(&self, tokens: &TokenSet) -> ServiceResult<()> {
        let payload = serde_json::to_string_pretty(tokens)
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ServiceError::Storage(format!("Failed to create dir: {}", e)))?;
        }

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, payload)
            .await
            .map_err(|e| ServiceError::Storage(format!("Failed to write tokens: {}", e)))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| ServiceError::Storage(format!("Failed to replace tokens: {}", e)))?;

        tracing::info!(path = %self.path.display(), "Tokens saved");
        Ok(())
    }
}

/// Keeps the token set in process memory only.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: RwLock<Option<TokenSet>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: TokenSet) -> Self {
        Self {
            tokens: RwLock::new(Some(tokens)),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Option<TokenSet> {
        self.tokens
            .read()
            .await
            .clone()
            .filter(|t| !t.access_token.is_empty())
    }

    async fn save(&self, tokens: &TokenSet) -> ServiceResult<()> {
        *self.tokens.write().await = Some(tokens.clone());
        Ok(())
    }
}
