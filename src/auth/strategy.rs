// Credential attachment policies

use crate::config::ClientConfig;
use crate::error::Result;
use crate::request::{BasicCredentials, PendingRequest};

use super::manager::AuthManager;

/// Which credential an endpoint expects, as stored in the endpoint table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// Unauthenticated (token refresh)
    None,
    /// Application id and secret as HTTP basic credentials
    Basic,
    /// The client's current access token
    Bearer,
}

/// Resolved credential policy for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStrategy {
    None,
    Basic {
        app_id: String,
        secret: Option<String>,
    },
    Bearer,
}

impl AuthStrategy {
    /// Resolve an endpoint's scheme against the client configuration
    pub fn resolve(scheme: AuthScheme, config: &ClientConfig) -> Self {
        match scheme {
            AuthScheme::None => AuthStrategy::None,
            AuthScheme::Basic => AuthStrategy::Basic {
                app_id: config.app_id.clone(),
                secret: config.secret.clone(),
            },
            AuthScheme::Bearer => AuthStrategy::Bearer,
        }
    }

    /// Attach credentials to a request.
    ///
    /// Bearer reads the access token at this moment; an empty token still
    /// produces a header and is left for the service to reject.
    pub fn apply(&self, request: &mut PendingRequest, tokens: &AuthManager) -> Result<()> {
        match self {
            AuthStrategy::None => Ok(()),
            AuthStrategy::Basic { app_id, secret } => {
                request.basic_auth = Some(BasicCredentials {
                    username: app_id.clone(),
                    password: secret.clone(),
                });
                Ok(())
            }
            AuthStrategy::Bearer => request.set_bearer_token(tokens.access_token()),
        }
    }
}
