use reqwest::{Client, StatusCode};
use std::time::Duration;

use crate::error::Result;
use crate::request::PendingRequest;
use crate::response::ApiResponse;
use crate::service::ServiceName;

/// Service error code for an access token the service does not accept (with 403)
pub const INVALID_ACCESS_TOKEN_CODE: i64 = 2001;

/// Service error code for an expired access token (with 401)
pub const EXPIRED_ACCESS_TOKEN_CODE: i64 = 2002;

/// A response rejected because of the access token
#[derive(Debug, Clone)]
pub struct AuthFailure {
    pub status: StatusCode,
    pub code: i64,
    pub service: ServiceName,
    pub response: ApiResponse,
}

/// Outcome of one send
#[derive(Debug)]
pub enum Dispatch {
    /// Any response that is not an access token rejection, successful or not
    Completed(ApiResponse),
    /// The service rejected the access token (403/2001 or 401/2002)
    InvalidAccessToken(AuthFailure),
}

impl Dispatch {
    /// Collapse to the response, dropping the auth-failure classification
    pub fn into_response(self) -> ApiResponse {
        match self {
            Dispatch::Completed(response) => response,
            Dispatch::InvalidAccessToken(failure) => failure.response,
        }
    }
}

/// Whether a status and service error code mean "invalid or expired access token"
pub fn is_invalid_access_token(status: StatusCode, code: i64) -> bool {
    (status == StatusCode::FORBIDDEN && code == INVALID_ACCESS_TOKEN_CODE)
        || (status == StatusCode::UNAUTHORIZED && code == EXPIRED_ACCESS_TOKEN_CODE)
}

/// HTTP transport for all services.
/// Sends one request at a time and classifies failed responses.
#[derive(Debug, Clone)]
pub struct SwsHttpClient {
    client: Client,
}

impl SwsHttpClient {
    /// Create a transport with a uniform per-request timeout
    pub fn new(request_timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(request_timeout).build()?;
        Ok(Self { client })
    }

    /// Send a request and classify the response.
    /// Transport failures are returned as errors; HTTP failures never are.
    pub async fn send(&self, service: ServiceName, request: &PendingRequest) -> Result<Dispatch> {
        tracing::debug!(
            service = %service,
            method = %request.method,
            url = %request.url,
            "Sending HTTP request"
        );

        let response = match request.to_reqwest(&self.client).send().await {
            Ok(response) => response,
            Err(e) => {
                let error_kind = if e.is_timeout() {
                    "timeout"
                } else if e.is_connect() {
                    "connection_failed"
                } else if e.is_request() {
                    "request_error"
                } else if e.is_body() {
                    "body_error"
                } else {
                    "unknown"
                };

                tracing::warn!(
                    service = %service,
                    error_kind = error_kind,
                    error = %e,
                    url = %request.url,
                    "HTTP request error"
                );
                return Err(e.into());
            }
        };

        let response = ApiResponse::from_reqwest(response).await?;
        let status = response.status();

        tracing::debug!(status = %status, "Received HTTP response");

        if status.is_success() {
            return Ok(Dispatch::Completed(response));
        }

        let Some(code) = response.error_code() else {
            tracing::warn!(
                service = %service,
                status = status.as_u16(),
                "Received error response without a service error code"
            );
            return Ok(Dispatch::Completed(response));
        };

        if is_invalid_access_token(status, code) {
            tracing::warn!(
                service = %service,
                status = status.as_u16(),
                code = code,
                "Access token rejected"
            );
            return Ok(Dispatch::InvalidAccessToken(AuthFailure {
                status,
                code,
                service,
                response,
            }));
        }

        tracing::warn!(
            service = %service,
            status = status.as_u16(),
            code = code,
            "Received error response"
        );
        Ok(Dispatch::Completed(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognized_token_failures() {
        assert!(is_invalid_access_token(StatusCode::FORBIDDEN, 2001));
        assert!(is_invalid_access_token(StatusCode::UNAUTHORIZED, 2002));
    }

    #[test]
    fn test_status_and_code_must_pair() {
        assert!(!is_invalid_access_token(StatusCode::UNAUTHORIZED, 2001));
        assert!(!is_invalid_access_token(StatusCode::FORBIDDEN, 2002));
        assert!(!is_invalid_access_token(StatusCode::UNAUTHORIZED, 9999));
        assert!(!is_invalid_access_token(StatusCode::INTERNAL_SERVER_ERROR, 2001));
    }

    #[test]
    fn test_client_creation() {
        assert!(SwsHttpClient::new(Duration::from_secs(30)).is_ok());
    }
}
