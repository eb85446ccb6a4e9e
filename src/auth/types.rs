// Authentication types

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// New access token extracted from a refresh response
#[derive(Debug, Clone, PartialEq)]
pub struct TokenData {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    pub refresh_token: Option<String>,
}

/// Identity service token response (`tokens` object of refresh and login)
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    pub tokens: TokenPair,
}

#[derive(Debug, Deserialize)]
pub struct TokenPair {
    pub access: TokenInfo,
    pub refresh: Option<TokenInfo>,
}

/// A single token with its expiry in epoch seconds
#[derive(Debug, Deserialize)]
pub struct TokenInfo {
    pub token: String,
    pub expires_at: Option<i64>,
    #[serde(rename = "type")]
    pub token_type: Option<String>,
}
