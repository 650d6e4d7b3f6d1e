mod manager;
mod store;

pub use manager::TokenManager;
pub use store::{FileTokenStore, MemoryTokenStore, TokenStore};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::dropbox::TokenResponse;

/// An access token is treated as expired this many seconds before its
/// recorded expiry.
pub const EXPIRY_SKEW_SECS: i64 = 10;

/// The single persisted credential set for the connected Dropbox account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    /// Stored as epoch milliseconds. `None` means the token never expires.
    #[serde(
        default,
        with = "chrono::serde::ts_milliseconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenSet {
    /// Builds a fresh set from an authorization-code grant.
    pub fn from_response(resp: TokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            expires_at: expiry_from(resp.expires_in, now),
            access_token: resp.access_token,
            refresh_token: resp.refresh_token,
            token_type: resp.token_type,
            scope: resp.scope,
            account_id: resp.account_id,
            uid: resp.uid,
        }
    }

    /// Folds a refresh-grant response into this set. Metadata the response
    /// omits is kept; the refresh token is only replaced when a new one is
    /// issued. The expiry always follows the response.
    pub fn merge_refresh(&self, resp: TokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            expires_at: expiry_from(resp.expires_in, now),
            access_token: resp.access_token,
            refresh_token: resp.refresh_token.or_else(|| self.refresh_token.clone()),
            token_type: resp.token_type.or_else(|| self.token_type.clone()),
            scope: resp.scope.or_else(|| self.scope.clone()),
            account_id: resp.account_id.or_else(|| self.account_id.clone()),
            uid: resp.uid.or_else(|| self.uid.clone()),
        }
    }

    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        if self.access_token.is_empty() {
            return false;
        }
        match self.expires_at {
            None => true,
            Some(expires_at) => expires_at
                .checked_sub_signed(Duration::seconds(EXPIRY_SKEW_SECS))
                .is_some_and(|deadline| now < deadline),
        }
    }

    pub fn is_usable(&self) -> bool {
        self.is_usable_at(Utc::now())
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// A lifetime too large to represent is treated as no expiry.
fn expiry_from(expires_in: Option<i64>, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let secs = expires_in.filter(|secs| *secs > 0)?;
    Duration::try_seconds(secs).and_then(|lifetime| now.checked_add_signed(lifetime))
}
