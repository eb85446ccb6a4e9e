use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::error::SdkError;
use crate::service::ServiceName;

/// Default request timeout applied to every call
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client configuration. Immutable once handed to the client.
#[derive(Clone)]
pub struct ClientConfig {
    // Application credentials
    pub app_id: String,
    pub secret: Option<String>,

    /// Acting user. 0 means the authenticated caller (`/me/...` endpoints)
    pub user_id: u64,

    // Service base URIs, keyed by service
    service_uris: HashMap<ServiceName, String>,

    // HTTP client
    pub timeout: Duration,

    /// Refresh the access token and replay when a service rejects it
    pub auto_refresh: bool,

    /// Send the anti-automation header with every request
    pub test_env: bool,

    // Test stack CDN credentials
    pub cdn_auth_id: Option<String>,
    pub cdn_auth_secret: Option<String>,
}

impl ClientConfig {
    /// Create a configuration for an application. Fails if `app_id` is empty.
    pub fn new(app_id: impl Into<String>) -> std::result::Result<Self, SdkError> {
        let app_id = app_id.into();
        if app_id.trim().is_empty() {
            return Err(SdkError::Config("app_id is required".to_string()));
        }

        Ok(Self {
            app_id,
            secret: None,
            user_id: 0,
            service_uris: HashMap::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            auto_refresh: true,
            test_env: false,
            cdn_auth_id: None,
            cdn_auth_secret: None,
        })
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn with_user_id(mut self, user_id: u64) -> Self {
        self.user_id = user_id;
        self
    }

    /// Override the base URI of one service
    pub fn with_service_uri(mut self, service: ServiceName, uri: impl Into<String>) -> Self {
        self.service_uris.insert(service, uri.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_auto_refresh(mut self, enabled: bool) -> Self {
        self.auto_refresh = enabled;
        self
    }

    pub fn with_test_env(mut self, enabled: bool) -> Self {
        self.test_env = enabled;
        self
    }

    pub fn with_cdn_auth(mut self, id: impl Into<String>, secret: impl Into<String>) -> Self {
        self.cdn_auth_id = Some(id.into());
        self.cdn_auth_secret = Some(secret.into());
        self
    }

    /// Base URI for a service, falling back to the production default
    pub fn service_uri(&self, service: ServiceName) -> &str {
        self.service_uris
            .get(&service)
            .map(String::as_str)
            .unwrap_or_else(|| service.default_uri())
    }

    /// Load configuration from the environment (and `.env` if present)
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    /// Unset or unparseable optional values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app_id = lookup("SWS_APP_ID").context("SWS_APP_ID is required")?;
        let mut config = Self::new(app_id).context("Invalid SWS_APP_ID")?;

        config.secret = lookup("SWS_APP_SECRET");

        if let Some(user_id) = lookup("SWS_USER_ID") {
            config.user_id = user_id
                .trim()
                .parse()
                .with_context(|| format!("SWS_USER_ID is not a valid user id: {}", user_id))?;
        }

        for service in ServiceName::ALL {
            if let Some(uri) = lookup(&service_uri_var(service)) {
                config.service_uris.insert(service, uri);
            }
        }

        config.timeout = Duration::from_secs(
            lookup("SWS_TIMEOUT_SECS")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        );

        config.auto_refresh = lookup("SWS_AUTO_REFRESH")
            .map(|s| parse_bool(&s))
            .unwrap_or(true);

        config.test_env = lookup("SWS_TEST_ENV")
            .map(|s| parse_bool(&s))
            .unwrap_or(false);

        config.cdn_auth_id = lookup("SWS_CDN_AUTH_ID");
        config.cdn_auth_secret = lookup("SWS_CDN_AUTH_SECRET");

        Ok(config)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("app_id", &self.app_id)
            .field("secret", &mask(&self.secret))
            .field("user_id", &self.user_id)
            .field("service_uris", &self.service_uris)
            .field("timeout", &self.timeout)
            .field("auto_refresh", &self.auto_refresh)
            .field("test_env", &self.test_env)
            .field("cdn_auth_id", &self.cdn_auth_id)
            .field("cdn_auth_secret", &mask(&self.cdn_auth_secret))
            .finish()
    }
}

/// Secrets are shown only as present or absent
fn mask(secret: &Option<String>) -> Option<&'static str> {
    secret.as_ref().map(|_| "***")
}

/// Environment variable overriding a service base URI (`SWS_ID_URI`, ...)
fn service_uri_var(service: ServiceName) -> String {
    format!("SWS_{}_URI", service.key().to_uppercase())
}

/// Parse a boolean flag from string
fn parse_bool(s: &str) -> bool {
    matches!(s.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_new_requires_app_id() {
        assert!(matches!(ClientConfig::new(""), Err(SdkError::Config(_))));
        assert!(matches!(ClientConfig::new("   "), Err(SdkError::Config(_))));
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("myClientAppId").unwrap();
        assert_eq!(config.app_id, "myClientAppId");
        assert_eq!(config.secret, None);
        assert_eq!(config.user_id, 0);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(config.auto_refresh);
        assert!(!config.test_env);
        assert_eq!(config.service_uri(ServiceName::Identity), "id.serato.com");
        assert_eq!(config.service_uri(ServiceName::License), "license.serato.com");
    }

    #[test]
    fn test_service_uri_override() {
        let config = ClientConfig::new("app")
            .unwrap()
            .with_service_uri(ServiceName::Identity, "http://192.168.4.7");
        assert_eq!(config.service_uri(ServiceName::Identity), "http://192.168.4.7");
        assert_eq!(config.service_uri(ServiceName::Ecom), "ecom.serato.com");
    }

    #[test]
    fn test_from_lookup_full() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("SWS_APP_ID", "app"),
            ("SWS_APP_SECRET", "secret"),
            ("SWS_USER_ID", "1000"),
            ("SWS_LICENSE_URI", "http://localhost:8686"),
            ("SWS_CLOUDLIB_URI", "http://localhost:8888"),
            ("SWS_TIMEOUT_SECS", "5"),
            ("SWS_AUTO_REFRESH", "false"),
            ("SWS_TEST_ENV", "TRUE"),
            ("SWS_CDN_AUTH_ID", "test_id"),
            ("SWS_CDN_AUTH_SECRET", "test_secret"),
        ]))
        .unwrap();

        assert_eq!(config.secret.as_deref(), Some("secret"));
        assert_eq!(config.user_id, 1000);
        assert_eq!(config.service_uri(ServiceName::License), "http://localhost:8686");
        assert_eq!(config.service_uri(ServiceName::CloudLib), "http://localhost:8888");
        assert_eq!(config.service_uri(ServiceName::Identity), "id.serato.com");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(!config.auto_refresh);
        assert!(config.test_env);
        assert_eq!(config.cdn_auth_id.as_deref(), Some("test_id"));
    }

    #[test]
    fn test_from_lookup_missing_app_id() {
        let err = ClientConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains("SWS_APP_ID"));
    }

    #[test]
    fn test_from_lookup_invalid_user_id() {
        let result = ClientConfig::from_lookup(lookup_from(&[
            ("SWS_APP_ID", "app"),
            ("SWS_USER_ID", "not-a-number"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_from_lookup_bad_timeout_uses_default() {
        let config = ClientConfig::from_lookup(lookup_from(&[
            ("SWS_APP_ID", "app"),
            ("SWS_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap();
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = ClientConfig::new("myClientAppId")
            .unwrap()
            .with_secret("myclientapppassword")
            .with_cdn_auth("test_id", "cdn-secret-value");
        let debug = format!("{:?}", config);

        assert!(debug.contains("myClientAppId"));
        assert!(debug.contains("test_id"));
        assert!(!debug.contains("myclientapppassword"));
        assert!(!debug.contains("cdn-secret-value"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn test_service_uri_var() {
        assert_eq!(service_uri_var(ServiceName::Identity), "SWS_ID_URI");
        assert_eq!(service_uri_var(ServiceName::CloudLib), "SWS_CLOUDLIB_URI");
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool("1"));
        assert!(parse_bool(" Yes "));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool(""));
    }
}
