use reqwest::header::HeaderMap;

use crate::client::SwsClient;
use crate::endpoint::Operation;
use crate::error::Result;
use crate::request::Params;
use crate::response::ApiResponse;

/// Identity service: login and token refresh
pub struct Identity<'a> {
    client: &'a mut SwsClient,
}

impl<'a> Identity<'a> {
    pub(crate) fn new(client: &'a mut SwsClient) -> Self {
        Self { client }
    }

    /// Exchange a refresh token for a new access token.
    /// Never triggers automatic refresh itself.
    pub async fn token_refresh(self, refresh_token: &str) -> Result<ApiResponse> {
        let fields = Params::new().with("refresh_token", refresh_token);
        self.client
            .call_once(Operation::TokenRefresh, &[], fields, HeaderMap::new())
            .await
    }

    /// Log a user in with the application's basic credentials.
    /// The returned tokens are not stored on the client.
    pub async fn login(
        self,
        email_address: &str,
        password: &str,
        device_id: &str,
        device_name: &str,
    ) -> Result<ApiResponse> {
        let fields = Params::new()
            .with("email_address", email_address)
            .with("password", password)
            .with("device_id", device_id)
            .with("device_name", device_name);
        self.client
            .call(Operation::Login, &[], fields, HeaderMap::new())
            .await
    }
}
