use chrono::{DateTime, Utc};
use std::fmt;

use super::types::TokenData;

/// Called with the new access token and its absolute expiry after a refresh
pub type AccessTokenUpdatedCallback = Box<dyn FnMut(&str, DateTime<Utc>) + Send + Sync>;

/// Authentication manager
/// Owns the client's token state and the token-updated observer.
///
/// Tokens start empty. The access token is set by the caller after login and
/// replaced by the refresh coordinator. The refresh token is only ever set by
/// the caller.
#[derive(Default)]
pub struct AuthManager {
    /// Current access token
    access_token: String,

    /// Current refresh token
    refresh_token: String,

    /// Expiry of the access token, when known from a refresh
    expires_at: Option<DateTime<Utc>>,

    /// Observer for refreshed tokens
    on_access_token_updated: Option<AccessTokenUpdatedCallback>,
}

impl AuthManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.access_token = token.into();
    }

    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    pub fn set_refresh_token(&mut self, token: impl Into<String>) {
        self.refresh_token = token.into();
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Register the observer invoked after every successful refresh
    pub fn set_access_token_updated_callback(&mut self, callback: AccessTokenUpdatedCallback) {
        self.on_access_token_updated = Some(callback);
    }

    /// Store a refreshed access token and notify the observer.
    /// The refresh token is left as the caller set it.
    pub fn apply_refreshed(&mut self, token_data: &TokenData) {
        self.access_token = token_data.access_token.clone();
        self.expires_at = Some(token_data.expires_at);

        if let Some(callback) = self.on_access_token_updated.as_mut() {
            callback(&self.access_token, token_data.expires_at);
        }
    }
}

impl fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthManager")
            .field("access_token", &redact(&self.access_token))
            .field("refresh_token", &redact(&self.refresh_token))
            .field("expires_at", &self.expires_at)
            .field("has_callback", &self.on_access_token_updated.is_some())
            .finish()
    }
}

/// First characters of a token, for logs
pub(crate) fn redact(token: &str) -> String {
    match token.get(..8) {
        Some(prefix) if token.len() > 8 => format!("{}...", prefix),
        _ => token.to_string(),
    }
}
