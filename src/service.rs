// Per-service state: base URI and the replay slot

use std::fmt;

use url::Url;

use crate::error::Result;
use crate::request::PendingRequest;

/// The backend services the SDK talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceName {
    Identity,
    License,
    Ecom,
    CloudLib,
}

impl ServiceName {
    pub const ALL: [ServiceName; 4] = [
        ServiceName::Identity,
        ServiceName::License,
        ServiceName::Ecom,
        ServiceName::CloudLib,
    ];

    /// Short key used in configuration (`id`, `license`, `ecom`, `cloudlib`)
    pub fn key(self) -> &'static str {
        match self {
            ServiceName::Identity => "id",
            ServiceName::License => "license",
            ServiceName::Ecom => "ecom",
            ServiceName::CloudLib => "cloudlib",
        }
    }

    /// Production base URI used when none is configured
    pub fn default_uri(self) -> &'static str {
        match self {
            ServiceName::Identity => "id.serato.com",
            ServiceName::License => "license.serato.com",
            ServiceName::Ecom => "ecom.serato.com",
            ServiceName::CloudLib => "cloudlib.serato.com",
        }
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ServiceName::Identity => "identity",
            ServiceName::License => "license",
            ServiceName::Ecom => "ecom",
            ServiceName::CloudLib => "cloudlib",
        };
        f.write_str(name)
    }
}

/// One backend service as seen by the client.
///
/// Holds the single replay slot for that service. Every call overwrites
/// `last_request`; the refresh coordinator restores it with the new token and
/// resends it.
/// Two calls racing on the same `Service` would clobber each other's slot,
/// which the `&mut` borrow on the owning client rules out.
#[derive(Debug, Clone)]
pub struct Service {
    name: ServiceName,
    base_uri: String,
    last_request: Option<PendingRequest>,
}

impl Service {
    pub fn new(name: ServiceName, base_uri: impl Into<String>) -> Self {
        Self {
            name,
            base_uri: base_uri.into(),
            last_request: None,
        }
    }

    pub fn name(&self) -> ServiceName {
        self.name
    }

    pub fn base_uri(&self) -> &str {
        &self.base_uri
    }

    /// Absolute URL for a path on this service.
    /// `https://` is prepended unless the base URI already carries a scheme.
    pub fn endpoint_url(&self, path: &str) -> Result<Url> {
        let base = if self.base_uri.contains("://") {
            self.base_uri.clone()
        } else {
            format!("https://{}", self.base_uri)
        };
        Ok(Url::parse(&format!("{}{}", base, path))?)
    }

    pub fn last_request(&self) -> Option<&PendingRequest> {
        self.last_request.as_ref()
    }

    /// Record the request about to be sent, replacing the previous one
    pub(crate) fn track(&mut self, request: PendingRequest) -> &PendingRequest {
        self.last_request.insert(request)
    }
}
