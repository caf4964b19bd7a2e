//! Wire-level request/response types and the transport seam.
//!
//! [`HttpTransport`] sends exactly one request and reports what came back.
//! It knows nothing about tokens or refresh; that policy lives in
//! [`crate::HttpClient`].

use crate::{ApiError, ApiResult, TransportError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::time::Duration;
use storefront_config_and_utils::Config;
use tracing::debug;
use url::Url;

/// Paths that must never go through refresh-and-retry.
const AUTH_ENDPOINTS: &[&str] = &[
    "/api/auth/login",
    "/api/auth/register",
    "/api/auth/refresh",
    "/api/auth/logout",
];

pub const UNAUTHORIZED: u16 = 401;

fn summarize_response_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A single outbound request.
#[derive(Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path relative to the backend base URL, e.g. `/api/orders`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    /// Access token to attach as `Authorization: Bearer`.
    pub bearer: Option<String>,
    /// Set once the request has been re-sent after a refresh.
    pub retried: bool,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            bearer: None,
            retried: false,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_query(mut self, query: Vec<(String, String)>) -> Self {
        self.query = query;
        self
    }

    /// Whether this request targets login, register, refresh, or logout.
    pub fn is_auth_endpoint(&self) -> bool {
        AUTH_ENDPOINTS
            .iter()
            .any(|endpoint| self.path.contains(endpoint))
    }
}

impl fmt::Debug for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiRequest")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("query", &self.query)
            .field("has_body", &self.body.is_some())
            .field("has_bearer", &self.bearer.is_some())
            .field("retried", &self.retried)
            .finish()
    }
}

/// Response as received: status plus the body parsed as JSON.
///
/// Empty bodies become `Value::Null`; non-JSON bodies become `Value::String`.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body into `T`.
    pub fn json<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        serde_json::from_value(self.body.clone()).map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

pub(crate) fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

/// Sends one request, no policy.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;
}

/// Production transport over reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
    base_url: Url,
}

impl ReqwestTransport {
    pub fn new(base_url: Url, timeout: Duration) -> ApiResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn from_config(config: &Config) -> ApiResult<Self> {
        let base_url = config
            .api_base_url()
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Self::new(base_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL joined with the request path, keeping any base path prefix.
    fn url_for(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            request.path.trim_start_matches('/')
        );
        let mut url = Url::parse(&joined)
            .map_err(|e| TransportError::Other(format!("invalid request URL {}: {}", joined, e)))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.url_for(request)?;

        debug!(
            method = %request.method,
            path = %request.path,
            authenticated = request.bearer.is_some(),
            retried = request.retried,
            "Sending request"
        );

        let mut builder = self.http_client.request(request.method.into(), url);
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        if !(200..300).contains(&status) {
            debug!(
                path = %request.path,
                status,
                body_summary = %summarize_response_body(&text),
                "Non-success response"
            );
        }

        Ok(ApiResponse {
            status,
            body: parse_body(&text),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn transport(base: &str) -> ReqwestTransport {
        ReqwestTransport::new(Url::parse(base).unwrap(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_auth_endpoint_detection() {
        for path in [
            "/api/auth/login",
            "/api/auth/register",
            "/api/auth/refresh",
            "/api/auth/logout",
        ] {
            assert!(ApiRequest::new(Method::Post, path).is_auth_endpoint(), "{}", path);
        }
        assert!(!ApiRequest::new(Method::Get, "/api/auth/me").is_auth_endpoint());
        assert!(!ApiRequest::new(Method::Get, "/api/orders").is_auth_endpoint());
    }

    #[test]
    fn test_url_for_keeps_base_prefix_and_query() {
        let t = transport("https://shop.example.com/backend/");
        let request = ApiRequest::new(Method::Get, "/api/products").with_query(vec![
            ("search".to_string(), "red shoes".to_string()),
            ("minPrice".to_string(), "10".to_string()),
        ]);

        let url = t.url_for(&request).unwrap();
        assert_eq!(url.path(), "/backend/api/products");
        assert_eq!(url.query(), Some("search=red+shoes&minPrice=10"));
    }

    #[test]
    fn test_url_for_plain_base() {
        let t = transport("http://localhost:8080");
        let url = t.url_for(&ApiRequest::new(Method::Get, "/api/orders")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/orders");
    }

    #[test]
    fn test_parse_body_variants() {
        assert_eq!(parse_body(""), Value::Null);
        assert_eq!(parse_body("  \n"), Value::Null);
        assert_eq!(parse_body(r#"{"ok":true}"#), json!({"ok": true}));
        assert_eq!(parse_body("Bad Gateway"), json!("Bad Gateway"));
    }

    #[test]
    fn test_response_json_decode_error_names_path() {
        #[derive(Debug, Deserialize)]
        struct Items {
            #[allow(dead_code)]
            items: Vec<u32>,
        }

        let response = ApiResponse::new(200, json!({"items": "nope"}));
        let err = response.json::<Items>("/api/orders").unwrap_err();
        assert!(matches!(err, ApiError::Decode { ref path, .. } if path == "/api/orders"));
    }

    #[test]
    fn test_request_debug_hides_bearer() {
        let mut request = ApiRequest::new(Method::Get, "/api/orders");
        request.bearer = Some("at-secret".to_string());
        let rendered = format!("{:?}", request);
        assert!(!rendered.contains("at-secret"));
        assert!(rendered.contains("has_bearer: true"));
    }

    #[tokio::test]
    async fn test_unreachable_backend_surfaces_transport_error() {
        // Nothing listens on the discard port on loopback.
        let t = transport("http://127.0.0.1:9");
        let err = t
            .send(&ApiRequest::new(Method::Get, "/api/orders"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TransportError::Connect(_) | TransportError::Other(_)
        ));
    }
}
