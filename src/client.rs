// Top-level client: configuration, token state, transport and service slots

use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::auth::{AuthManager, AuthStrategy};
use crate::config::ClientConfig;
use crate::endpoint::Operation;
use crate::error::{Result, SdkError};
use crate::firewall::{cdn_auth_value, FirewallHeader, HeaderGenerator, CDN_AUTH_HEADER};
use crate::http_client::{Dispatch, SwsHttpClient};
use crate::request::{Params, PendingRequest, RequestBuilder};
use crate::response::ApiResponse;
use crate::service::{Service, ServiceName};
use crate::services::{CloudLib, Ecom, Identity, License};

/// Client for the Serato Web Services.
///
/// Every call borrows the client mutably and completes its round trip
/// (including at most one refresh and one replay) before returning, so token
/// state and the per-service replay slots are never shared between calls.
pub struct SwsClient {
    pub(crate) config: ClientConfig,
    pub(crate) auth: AuthManager,
    pub(crate) http: SwsHttpClient,
    header_generator: Box<dyn HeaderGenerator>,
    identity: Service,
    license: Service,
    ecom: Service,
    cloudlib: Service,
}

impl SwsClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        if config.app_id.trim().is_empty() {
            return Err(SdkError::Config("app_id is required".to_string()));
        }

        let http = SwsHttpClient::new(config.timeout)?;

        tracing::debug!(
            app_id = %config.app_id,
            user_id = config.user_id,
            auto_refresh = config.auto_refresh,
            test_env = config.test_env,
            "Creating SWS client"
        );

        Ok(Self {
            identity: Service::new(
                ServiceName::Identity,
                config.service_uri(ServiceName::Identity),
            ),
            license: Service::new(ServiceName::License, config.service_uri(ServiceName::License)),
            ecom: Service::new(ServiceName::Ecom, config.service_uri(ServiceName::Ecom)),
            cloudlib: Service::new(
                ServiceName::CloudLib,
                config.service_uri(ServiceName::CloudLib),
            ),
            config,
            auth: AuthManager::new(),
            http,
            header_generator: Box::new(FirewallHeader::new()),
        })
    }

    /// Replace the anti-automation header generator used in test mode
    pub fn with_header_generator(mut self, generator: Box<dyn HeaderGenerator>) -> Self {
        self.header_generator = generator;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // === Facades ===

    pub fn identity(&mut self) -> Identity<'_> {
        Identity::new(self)
    }

    pub fn license(&mut self) -> License<'_> {
        License::new(self)
    }

    pub fn ecom(&mut self) -> Ecom<'_> {
        Ecom::new(self)
    }

    pub fn cloudlib(&mut self) -> CloudLib<'_> {
        CloudLib::new(self)
    }

    // === Token state ===

    pub fn access_token(&self) -> &str {
        self.auth.access_token()
    }

    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.auth.set_access_token(token);
    }

    pub fn refresh_token(&self) -> &str {
        self.auth.refresh_token()
    }

    /// Set the refresh token used by automatic refresh. Login does not set it.
    pub fn set_refresh_token(&mut self, token: impl Into<String>) {
        self.auth.set_refresh_token(token);
    }

    /// Register a callback invoked with the new token and its expiry after
    /// every automatic refresh
    pub fn set_access_token_updated_callback<F>(&mut self, callback: F)
    where
        F: FnMut(&str, DateTime<Utc>) + Send + Sync + 'static,
    {
        self.auth.set_access_token_updated_callback(Box::new(callback));
    }

    // === Per-service state ===

    pub fn service(&self, name: ServiceName) -> &Service {
        match name {
            ServiceName::Identity => &self.identity,
            ServiceName::License => &self.license,
            ServiceName::Ecom => &self.ecom,
            ServiceName::CloudLib => &self.cloudlib,
        }
    }

    pub(crate) fn service_mut(&mut self, name: ServiceName) -> &mut Service {
        match name {
            ServiceName::Identity => &mut self.identity,
            ServiceName::License => &mut self.license,
            ServiceName::Ecom => &mut self.ecom,
            ServiceName::CloudLib => &mut self.cloudlib,
        }
    }

    /// The last request built for a service, if any
    pub fn last_request(&self, name: ServiceName) -> Option<&PendingRequest> {
        self.service(name).last_request()
    }

    // === Request pipeline ===

    /// Build the request for an operation without sending it
    pub fn build_request(
        &self,
        operation: Operation,
        path_args: &[(&str, String)],
        fields: Params,
        headers: HeaderMap,
    ) -> Result<PendingRequest> {
        let descriptor = operation.descriptor();
        let path = descriptor.render_path(self.config.user_id, path_args);
        let url = self.service(descriptor.service).endpoint_url(&path)?;

        let mut builder = RequestBuilder::new(descriptor.method, url)
            .fields(fields)
            .auth(AuthStrategy::resolve(descriptor.auth, &self.config));

        if let (Some(id), Some(secret)) = (&self.config.cdn_auth_id, &self.config.cdn_auth_secret) {
            let value = HeaderValue::from_str(&cdn_auth_value(id, secret))
                .map_err(|_| SdkError::InvalidHeader(CDN_AUTH_HEADER.to_string()))?;
            builder = builder.header(HeaderName::from_static(CDN_AUTH_HEADER), value);
        }

        let generator = self
            .config
            .test_env
            .then_some(self.header_generator.as_ref());

        builder.headers(headers).build(&self.auth, generator)
    }

    /// Build, send, and route an access-token rejection to the refresh coordinator
    pub(crate) async fn call(
        &mut self,
        operation: Operation,
        path_args: &[(&str, String)],
        fields: Params,
        headers: HeaderMap,
    ) -> Result<ApiResponse> {
        let service = operation.descriptor().service;
        let request = self.build_request(operation, path_args, fields, headers)?;

        match self.dispatch(service, request).await? {
            Dispatch::Completed(response) => Ok(response),
            Dispatch::InvalidAccessToken(failure) => self.handle_invalid_access_token(failure).await,
        }
    }

    /// Build and send once. An access-token rejection is returned as a plain
    /// response and never triggers a refresh.
    pub(crate) async fn call_once(
        &mut self,
        operation: Operation,
        path_args: &[(&str, String)],
        fields: Params,
        headers: HeaderMap,
    ) -> Result<ApiResponse> {
        let service = operation.descriptor().service;
        let request = self.build_request(operation, path_args, fields, headers)?;
        Ok(self.dispatch(service, request).await?.into_response())
    }

    /// Record the request as the service's pending request, then send it
    async fn dispatch(&mut self, service: ServiceName, request: PendingRequest) -> Result<Dispatch> {
        self.service_mut(service).track(request);
        self.resend(service).await
    }

    /// Resend the service's pending request exactly as stored
    pub(crate) async fn resend(&self, service: ServiceName) -> Result<Dispatch> {
        let request = self
            .service(service)
            .last_request()
            .ok_or(SdkError::NoPendingRequest(service))?;
        self.http.send(service, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::ACCEPT;
    use reqwest::Method;

    struct FixedHeader;

    impl HeaderGenerator for FixedHeader {
        fn generate(&self) -> (String, String) {
            ("x-serato-firewall".to_string(), "\"ser~fixed\"".to_string())
        }
    }

    fn client(user_id: u64) -> SwsClient {
        let config = ClientConfig::new("myClientAppId")
            .unwrap()
            .with_secret("myclientapppassword")
            .with_user_id(user_id)
            .with_service_uri(ServiceName::License, "http://192.168.4.6");
        SwsClient::new(config).unwrap()
    }

    #[test]
    fn test_service_uris_from_config() {
        let client = client(0);
        assert_eq!(client.service(ServiceName::License).base_uri(), "http://192.168.4.6");
        assert_eq!(client.service(ServiceName::Identity).base_uri(), "id.serato.com");
    }

    #[test]
    fn test_build_me_licenses_request() {
        let mut client = client(0);
        client.set_access_token("TOKEN");
        let req = client
            .build_request(
                Operation::GetLicenses,
                &[],
                Params::new().with("app_name", "serato_dj"),
                HeaderMap::new(),
            )
            .unwrap();

        assert_eq!(req.method, Method::GET);
        assert_eq!(req.url.as_str(), "http://192.168.4.6/api/v1/me/licenses");
        assert_eq!(req.query, vec![("app_name".to_string(), "serato_dj".to_string())]);
        assert_eq!(req.authorization(), Some("Bearer TOKEN"));
        assert!(req.headers.get("x-serato-firewall").is_none());
    }

    #[test]
    fn test_build_user_scoped_request() {
        let client = client(1000);
        let req = client
            .build_request(Operation::GetLicenses, &[], Params::new(), HeaderMap::new())
            .unwrap();
        assert_eq!(req.url.path(), "/api/v1/users/1000/licenses");
    }

    #[test]
    fn test_build_login_uses_basic_auth() {
        let client = client(0);
        let req = client
            .build_request(
                Operation::Login,
                &[],
                Params::new().with("email_address", "test.user@serato.com"),
                HeaderMap::new(),
            )
            .unwrap();
        assert_eq!(req.url.as_str(), "https://id.serato.com/api/v1/login");
        assert_eq!(req.basic_auth.as_ref().unwrap().username, "myClientAppId");
        assert!(req.authorization().is_none());
    }

    #[test]
    fn test_test_env_adds_generated_header() {
        let config = ClientConfig::new("app").unwrap().with_test_env(true);
        let client = SwsClient::new(config)
            .unwrap()
            .with_header_generator(Box::new(FixedHeader));
        let req = client
            .build_request(Operation::GetOrders, &[], Params::new(), HeaderMap::new())
            .unwrap();
        assert_eq!(req.headers.get("x-serato-firewall").unwrap(), "\"ser~fixed\"");
    }

    #[test]
    fn test_cdn_auth_header() {
        let config = ClientConfig::new("app")
            .unwrap()
            .with_cdn_auth("test_id", "test_secret");
        let client = SwsClient::new(config).unwrap();
        let req = client
            .build_request(Operation::TokenRefresh, &[], Params::new(), HeaderMap::new())
            .unwrap();
        assert_eq!(
            req.headers.get(CDN_AUTH_HEADER).unwrap(),
            "dGVzdF9pZDp0ZXN0X3NlY3JldA=="
        );
    }

    #[test]
    fn test_header_overrides_reach_request() {
        let client = client(0);
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/pdf"));
        let req = client
            .build_request(
                Operation::GetInvoice,
                &[("order_id", "1".to_string()), ("invoice_id", "2".to_string())],
                Params::new(),
                headers,
            )
            .unwrap();
        assert_eq!(req.headers.get(ACCEPT).unwrap(), "application/pdf");
    }

    #[test]
    fn test_repeated_builds_are_identical() {
        let client = client(1000);
        let build = || {
            client
                .build_request(
                    Operation::GetSubscription,
                    &[("subscription_id", "abc".to_string())],
                    Params::new(),
                    HeaderMap::new(),
                )
                .unwrap()
        };
        assert_eq!(build(), build());
    }

    #[tokio::test]
    async fn test_resend_without_pending_request() {
        let client = client(0);
        assert!(matches!(
            client.resend(ServiceName::Ecom).await,
            Err(SdkError::NoPendingRequest(ServiceName::Ecom))
        ));
    }
}
