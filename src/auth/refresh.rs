// Token refresh logic
// Reacts to a rejected access token: refresh once, then replay the request once

use chrono::{TimeZone, Utc};

use crate::client::SwsClient;
use crate::error::Result;
use crate::http_client::AuthFailure;
use crate::response::ApiResponse;

use super::manager::redact;
use super::types::{RefreshResponse, TokenData};

/// Extract the new access token from a refresh response.
///
/// Returns `None` when the payload has no `tokens.access.token` string with an
/// integer `tokens.access.expires_at`, or the token is empty.
pub fn parse_refresh_response(response: &ApiResponse) -> Option<TokenData> {
    let data: RefreshResponse = response.json().ok()?;
    let access = data.tokens.access;
    if access.token.is_empty() {
        return None;
    }

    let expires_at = Utc.timestamp_opt(access.expires_at?, 0).single()?;

    Some(TokenData {
        access_token: access.token,
        expires_at,
        refresh_token: data.tokens.refresh.map(|r| r.token),
    })
}

/// Result of the refresh step
enum RefreshStep {
    /// Auto refresh is off; hand back the original failure
    Disabled,
    /// The refresh call itself did not succeed
    Failed(ApiResponse),
    /// The refresh call succeeded but carried no usable access token
    Malformed(ApiResponse),
    /// New token obtained
    Refreshed(TokenData),
}

impl SwsClient {
    /// Obtain a new access token with the stored refresh token.
    /// The refresh request is never itself refreshed.
    async fn refresh_access_token(&mut self) -> Result<RefreshStep> {
        if !self.config.auto_refresh {
            return Ok(RefreshStep::Disabled);
        }

        let refresh_token = self.auth.refresh_token().to_string();
        tracing::info!(
            refresh_token = %redact(&refresh_token),
            "Refreshing access token via identity service..."
        );

        let response = self.identity().token_refresh(&refresh_token).await?;

        if !response.is_success() {
            tracing::error!(
                status = response.status().as_u16(),
                response_body = %response.text(),
                "Token refresh failed"
            );
            return Ok(RefreshStep::Failed(response));
        }

        match parse_refresh_response(&response) {
            Some(token_data) => Ok(RefreshStep::Refreshed(token_data)),
            None => {
                tracing::error!("Token refresh response does not contain an access token");
                Ok(RefreshStep::Malformed(response))
            }
        }
    }

    /// Handle a response rejected for an invalid or expired access token.
    ///
    /// With auto refresh on, refreshes the access token, notifies the token
    /// observer, rewrites the `Authorization` header of the failed service's
    /// pending request and resends that same request. Whatever the resend
    /// returns goes back to the caller, including another rejection.
    /// Without a new token the refresh response (or the original one when auto
    /// refresh is off) is returned and nothing is replayed.
    pub(crate) async fn handle_invalid_access_token(
        &mut self,
        failure: AuthFailure,
    ) -> Result<ApiResponse> {
        // The refresh goes through the identity slot, so the failed request
        // must be held aside before it can be overwritten.
        let pending = self.service(failure.service).last_request().cloned();

        let token_data = match self.refresh_access_token().await? {
            RefreshStep::Disabled => {
                tracing::debug!(
                    service = %failure.service,
                    "Auto refresh disabled, returning rejected response"
                );
                return Ok(failure.response);
            }
            RefreshStep::Failed(response) | RefreshStep::Malformed(response) => {
                return Ok(response);
            }
            RefreshStep::Refreshed(token_data) => token_data,
        };

        self.auth.apply_refreshed(&token_data);

        tracing::info!(
            service = %failure.service,
            expires = %token_data.expires_at.to_rfc3339(),
            "Access token refreshed, replaying request"
        );

        let Some(mut request) = pending else {
            tracing::warn!(
                service = %failure.service,
                "No pending request to replay"
            );
            return Ok(failure.response);
        };
        request.set_bearer_token(&token_data.access_token)?;
        self.service_mut(failure.service).track(request);

        let replayed = self.resend(failure.service).await?.into_response();

        tracing::debug!(
            service = %failure.service,
            status = %replayed.status(),
            "Replayed request completed"
        );

        Ok(replayed)
    }
}
