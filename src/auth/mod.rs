// Authentication module
// Auth strategies, token state and the refresh-and-replay coordinator

mod manager;
mod refresh;
mod strategy;
mod types;

pub use manager::{AccessTokenUpdatedCallback, AuthManager};
pub use refresh::parse_refresh_response;
pub use strategy::{AuthScheme, AuthStrategy};
pub use types::{RefreshResponse, TokenData, TokenInfo, TokenPair};
