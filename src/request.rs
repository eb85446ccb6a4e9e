// Request building
// Turns an endpoint call into a fully specified, replayable request

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde_json::{Map, Value};
use url::Url;

use crate::auth::{AuthManager, AuthStrategy};
use crate::error::{Result, SdkError};
use crate::firewall::HeaderGenerator;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Named request values. Null values (`None`) are dropped on insert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, Value)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value. `None` and `Value::Null` are skipped.
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        if !value.is_null() {
            self.entries.push((name.to_string(), value));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Render as text pairs for a query string or form body
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.clone(), value_to_text(value)))
            .collect()
    }

    /// Render as a JSON object
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self.entries.iter().cloned().collect();
        Value::Object(map)
    }
}

/// Plain-text form of a value: strings verbatim, everything else as JSON
fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Encoded request body
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(String),
    Form(Vec<(String, String)>),
}

/// HTTP basic credentials, applied by the transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: Option<String>,
}

/// A fully built request, kept per service so it can be replayed verbatim
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    pub basic_auth: Option<BasicCredentials>,
}

impl PendingRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: None,
            basic_auth: None,
        }
    }

    /// Set or replace the `Authorization: Bearer` header
    pub fn set_bearer_token(&mut self, token: &str) -> Result<()> {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| SdkError::InvalidHeader("authorization".to_string()))?;
        self.headers.insert(AUTHORIZATION, value);
        Ok(())
    }

    pub fn authorization(&self) -> Option<&str> {
        self.headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
    }

    /// JSON body text, if the body is JSON
    pub fn json_body(&self) -> Option<&str> {
        match &self.body {
            Some(RequestBody::Json(text)) => Some(text),
            _ => None,
        }
    }

    /// Translate into a reqwest builder. Called for the first send and replays.
    /// Basic credentials take precedence over an `Authorization` header, so a
    /// replayed basic-auth request carries a single credential.
    pub(crate) fn to_reqwest(&self, client: &reqwest::Client) -> reqwest::RequestBuilder {
        let mut headers = self.headers.clone();
        if self.basic_auth.is_some() {
            headers.remove(AUTHORIZATION);
        }

        let mut builder = client
            .request(self.method.clone(), self.url.clone())
            .headers(headers);

        if !self.query.is_empty() {
            builder = builder.query(&self.query);
        }

        if let Some(creds) = &self.basic_auth {
            builder = builder.basic_auth(&creds.username, creds.password.as_ref());
        }

        match &self.body {
            Some(RequestBody::Json(text)) => builder.body(text.clone()),
            Some(RequestBody::Form(pairs)) => builder.form(pairs),
            None => builder,
        }
    }
}

/// Builds a `PendingRequest` from an endpoint call. No I/O.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    method: Method,
    url: Url,
    fields: Params,
    query: Params,
    headers: HeaderMap,
    auth: AuthStrategy,
}

impl RequestBuilder {
    /// Start a request with fresh default headers
    pub fn new(method: Method, url: Url) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));

        Self {
            method,
            url,
            fields: Params::new(),
            query: Params::new(),
            headers,
            auth: AuthStrategy::None,
        }
    }

    /// Body fields (query parameters for GET and DELETE)
    pub fn fields(mut self, fields: Params) -> Self {
        self.fields = fields;
        self
    }

    /// Explicit query parameters, sent in addition to any body
    pub fn query(mut self, query: Params) -> Self {
        self.query = query;
        self
    }

    /// Merge header overrides on top of the defaults
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        for (name, value) in headers.iter() {
            self.headers.insert(name.clone(), value.clone());
        }
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn auth(mut self, auth: AuthStrategy) -> Self {
        self.auth = auth;
        self
    }

    fn is_form(&self) -> bool {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with(FORM_CONTENT_TYPE))
            .unwrap_or(false)
    }

    /// Produce the request. `generator`, when given, adds its header.
    pub fn build(
        self,
        tokens: &AuthManager,
        generator: Option<&dyn HeaderGenerator>,
    ) -> Result<PendingRequest> {
        let is_form = self.is_form();
        let mut request = PendingRequest::new(self.method, self.url);
        request.headers = self.headers;

        if request.method == Method::GET || request.method == Method::DELETE {
            request.query = self.fields.to_pairs();
            request.query.extend(self.query.to_pairs());
        } else if request.method == Method::POST
            || request.method == Method::PUT
            || request.method == Method::PATCH
        {
            request.body = Some(if is_form {
                RequestBody::Form(self.fields.to_pairs())
            } else {
                RequestBody::Json(serde_json::to_string(&self.fields.to_json())?)
            });
            request.query = self.query.to_pairs();
        } else {
            request.query = self.query.to_pairs();
        }

        if let Some(generator) = generator {
            let (name, value) = generator.generate();
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| SdkError::InvalidHeader(name.clone()))?;
            let value = HeaderValue::from_str(&value)
                .map_err(|_| SdkError::InvalidHeader(name.to_string()))?;
            request.headers.insert(name, value);
        }

        self.auth.apply(&mut request, tokens)?;

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn url() -> Url {
        Url::parse("https://ecom.serato.com/api/v1/me/paymentmethods").unwrap()
    }

    struct FixedHeader;

    impl HeaderGenerator for FixedHeader {
        fn generate(&self) -> (String, String) {
            ("x-serato-firewall".to_string(), "\"ser~fixed\"".to_string())
        }
    }

    #[test]
    fn test_params_skip_none() {
        let params = Params::new()
            .with("nonce", "abc")
            .with("device_data", None::<String>)
            .with("size", 123)
            .with("enabled", true);
        assert_eq!(params.len(), 3);
        assert!(params.get("device_data").is_none());
        assert_eq!(
            params.to_pairs(),
            vec![
                ("nonce".to_string(), "abc".to_string()),
                ("size".to_string(), "123".to_string()),
                ("enabled".to_string(), "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_default_headers() {
        let req = RequestBuilder::new(Method::GET, url())
            .build(&AuthManager::new(), None)
            .unwrap();
        assert_eq!(req.headers.get(ACCEPT).unwrap(), JSON_CONTENT_TYPE);
        assert_eq!(req.headers.get(CONTENT_TYPE).unwrap(), JSON_CONTENT_TYPE);
    }

    #[test]
    fn test_header_override_merges() {
        let mut overrides = HeaderMap::new();
        overrides.insert(ACCEPT, HeaderValue::from_static("application/pdf"));
        let req = RequestBuilder::new(Method::GET, url())
            .headers(overrides)
            .build(&AuthManager::new(), None)
            .unwrap();
        assert_eq!(req.headers.get(ACCEPT).unwrap(), "application/pdf");
        assert_eq!(req.headers.get(CONTENT_TYPE).unwrap(), JSON_CONTENT_TYPE);
    }

    #[test]
    fn test_get_fields_become_query() {
        let req = RequestBuilder::new(Method::GET, url())
            .fields(Params::new().with("app_name", "serato_dj").with("term", None::<&str>))
            .build(&AuthManager::new(), None)
            .unwrap();
        assert!(req.body.is_none());
        assert_eq!(
            req.query,
            vec![("app_name".to_string(), "serato_dj".to_string())]
        );
    }

    #[test]
    fn test_delete_fields_become_query() {
        let req = RequestBuilder::new(Method::DELETE, url())
            .fields(Params::new().with("reason", "expired"))
            .build(&AuthManager::new(), None)
            .unwrap();
        assert!(req.body.is_none());
        assert_eq!(req.query.len(), 1);
    }

    #[test]
    fn test_post_json_body_omits_nulls() {
        let req = RequestBuilder::new(Method::POST, url())
            .fields(
                Params::new()
                    .with("nonce", "abc")
                    .with("device_data", None::<String>)
                    .with("billing_address_id", "NZ"),
            )
            .build(&AuthManager::new(), None)
            .unwrap();
        assert!(req.query.is_empty());
        let body: Value = serde_json::from_str(req.json_body().unwrap()).unwrap();
        assert_eq!(body, json!({"nonce": "abc", "billing_address_id": "NZ"}));
    }

    #[test]
    fn test_post_without_fields_sends_empty_object() {
        let req = RequestBuilder::new(Method::PUT, url())
            .build(&AuthManager::new(), None)
            .unwrap();
        assert_eq!(req.json_body(), Some("{}"));
    }

    #[test]
    fn test_post_with_explicit_query() {
        let req = RequestBuilder::new(Method::POST, url())
            .fields(Params::new().with("nonce", "abc"))
            .query(Params::new().with("format", "pdf"))
            .build(&AuthManager::new(), None)
            .unwrap();
        assert_eq!(req.query, vec![("format".to_string(), "pdf".to_string())]);
        assert!(req.json_body().is_some());
    }

    #[test]
    fn test_form_urlencoded_body() {
        let req = RequestBuilder::new(Method::POST, url())
            .header(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE))
            .fields(Params::new().with("grant_type", "refresh_token").with("size", 10))
            .build(&AuthManager::new(), None)
            .unwrap();
        assert_eq!(
            req.body,
            Some(RequestBody::Form(vec![
                ("grant_type".to_string(), "refresh_token".to_string()),
                ("size".to_string(), "10".to_string()),
            ]))
        );
    }

    #[test]
    fn test_generator_header_merged() {
        let req = RequestBuilder::new(Method::GET, url())
            .build(&AuthManager::new(), Some(&FixedHeader))
            .unwrap();
        assert_eq!(req.headers.get("x-serato-firewall").unwrap(), "\"ser~fixed\"");
    }

    #[test]
    fn test_set_bearer_token_replaces_header() {
        let mut tokens = AuthManager::new();
        tokens.set_access_token("OLD");
        let mut req = RequestBuilder::new(Method::GET, url())
            .auth(AuthStrategy::Bearer)
            .build(&tokens, None)
            .unwrap();
        assert_eq!(req.authorization(), Some("Bearer OLD"));

        req.set_bearer_token("NEW").unwrap();
        assert_eq!(req.authorization(), Some("Bearer NEW"));
        assert_eq!(req.headers.get_all(AUTHORIZATION).iter().count(), 1);
    }

    #[test]
    fn test_set_bearer_token_rejects_invalid_value() {
        let mut req = PendingRequest::new(Method::GET, url());
        assert!(matches!(
            req.set_bearer_token("bad\ntoken"),
            Err(SdkError::InvalidHeader(_))
        ));
    }

    #[test]
    fn test_basic_credentials_replace_bearer_header_on_send() {
        let mut req = PendingRequest::new(Method::POST, url());
        req.basic_auth = Some(BasicCredentials {
            username: "myClientAppId".to_string(),
            password: Some("myclientapppassword".to_string()),
        });
        req.set_bearer_token("NEW").unwrap();

        let sent = req.to_reqwest(&reqwest::Client::new()).build().unwrap();
        let values: Vec<_> = sent.headers().get_all(AUTHORIZATION).iter().collect();
        assert_eq!(values.len(), 1);
        assert!(values[0].to_str().unwrap().starts_with("Basic "));

        // The stored request keeps the bearer header it was given
        assert_eq!(req.authorization(), Some("Bearer NEW"));
    }

    #[test]
    fn test_builds_are_identical() {
        let build = || {
            RequestBuilder::new(Method::GET, url())
                .fields(Params::new().with("app_name", "dj").with("term", "permanent"))
                .auth(AuthStrategy::Bearer)
                .build(&AuthManager::new(), None)
                .unwrap()
        };
        assert_eq!(build(), build());
    }

    fn field_values() -> impl Strategy<Value = Vec<(String, Option<String>)>> {
        prop::collection::btree_map("[a-z_]{1,12}", prop::option::of("[ -~]{0,16}"), 0..8)
            .prop_map(|m| m.into_iter().collect())
    }

    fn params_from(values: &[(String, Option<String>)]) -> Params {
        values
            .iter()
            .fold(Params::new(), |p, (k, v)| p.with(k, v.clone()))
    }

    proptest! {
        #[test]
        fn prop_get_and_delete_never_carry_a_body(
            values in field_values(),
            delete in any::<bool>(),
        ) {
            let method = if delete { Method::DELETE } else { Method::GET };
            let req = RequestBuilder::new(method, url())
                .fields(params_from(&values))
                .build(&AuthManager::new(), None)
                .unwrap();

            prop_assert!(req.body.is_none());
            let expected: Vec<(String, String)> = values
                .iter()
                .filter_map(|(k, v)| v.clone().map(|v| (k.clone(), v)))
                .collect();
            prop_assert_eq!(req.query, expected);
        }

        #[test]
        fn prop_json_body_holds_exactly_non_null_fields(
            values in field_values(),
            method_idx in 0usize..3,
        ) {
            let method = [Method::POST, Method::PUT, Method::PATCH][method_idx].clone();
            let req = RequestBuilder::new(method, url())
                .fields(params_from(&values))
                .build(&AuthManager::new(), None)
                .unwrap();

            let body: Value = serde_json::from_str(req.json_body().unwrap()).unwrap();
            let object = body.as_object().unwrap();
            let expected: Vec<&(String, Option<String>)> =
                values.iter().filter(|(_, v)| v.is_some()).collect();
            prop_assert_eq!(object.len(), expected.len());
            for (k, v) in expected {
                prop_assert_eq!(object.get(k).and_then(|x| x.as_str()), v.as_deref());
            }
        }
    }
}
