//! HTTP client core: bearer attachment and refresh-then-retry.

use crate::refresh::{RefreshCoordinator, RefreshOutcome};
use crate::state::{AuthStore, Transition};
use crate::transport::{ApiRequest, ApiResponse, HttpTransport, Method, UNAUTHORIZED};
use crate::{ApiError, ApiResult};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use token_store::TokenStore;
use tracing::{debug, info};

/// Per-call options.
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    pub query: Vec<(String, String)>,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Add a query parameter only when a value is present.
    pub fn query_opt<V: ToString>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }
}

/// Outbound request pipeline shared by every API client.
///
/// Clones share the token store, auth state, refresh coordinator, and the
/// closed flag.
#[derive(Clone)]
pub struct HttpClient {
    transport: Arc<dyn HttpTransport>,
    tokens: TokenStore,
    auth: AuthStore,
    refresher: RefreshCoordinator,
    closed: Arc<AtomicBool>,
}

impl HttpClient {
    pub fn new(transport: Arc<dyn HttpTransport>, tokens: TokenStore, auth: AuthStore) -> Self {
        let refresher = RefreshCoordinator::new(transport.clone(), tokens.clone(), auth.clone());
        Self {
            transport,
            tokens,
            auth,
            refresher,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn refresher(&self) -> &RefreshCoordinator {
        &self.refresher
    }

    /// Reject every later request with [`ApiError::Closed`].
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Send a request with the stored access token attached.
    ///
    /// A 401 is recovered at most once: auth endpoints and already-retried
    /// requests fail immediately. If the stored token changed since the
    /// request was sent it is re-sent with that token; otherwise the token is
    /// refreshed (shared with any concurrent callers) and the request is
    /// re-sent with the new token. If the refresh fails the caller gets the
    /// original 401.
    /// Transport errors and other statuses pass through untouched.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        config: Option<RequestConfig>,
    ) -> ApiResult<ApiResponse> {
        if self.is_closed() {
            return Err(ApiError::Closed);
        }

        let mut request = ApiRequest::new(method, path);
        request.body = body;
        request.query = config.unwrap_or_default().query;
        request.bearer = self.tokens.access_token();

        let response = self.transport.send(&request).await?;
        if response.status != UNAUTHORIZED {
            return into_result(&request, response);
        }

        let original = unauthorized(&request, response);
        if request.is_auth_endpoint() {
            debug!(path = %request.path, "401 on auth endpoint, not refreshing");
            return Err(original);
        }
        if request.retried {
            return Err(original);
        }

        // Another caller already refreshed while this request was in flight.
        let current = self.tokens.access_token();
        if current.is_some() && current != request.bearer {
            debug!(path = %request.path, "401 with a stale token, retrying with the current one");
            request.retried = true;
            request.bearer = current;
            return self.resend(&request).await;
        }

        let Some(refresh_token) = self.tokens.refresh_token() else {
            info!(path = %request.path, "401 with no refresh token, clearing session");
            self.tokens.clear();
            self.auth.apply(Transition::Logout);
            return Err(original);
        };

        request.retried = true;
        match self.refresher.refresh(refresh_token).await {
            RefreshOutcome::Refreshed(pair) => {
                debug!(path = %request.path, "Retrying after refresh");
                request.bearer = Some(pair.access_token);
                self.resend(&request).await
            }
            RefreshOutcome::Failed => Err(original),
        }
    }

    async fn resend(&self, request: &ApiRequest) -> ApiResult<ApiResponse> {
        let response = self.transport.send(request).await?;
        if response.status == UNAUTHORIZED {
            return Err(unauthorized(request, response));
        }
        into_result(request, response)
    }

    /// [`request`](Self::request) and decode the body.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        config: Option<RequestConfig>,
    ) -> ApiResult<T> {
        self.request(method, path, body, config).await?.json(path)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, config: Option<RequestConfig>) -> ApiResult<T> {
        self.request_json(Method::Get, path, None, config).await
    }

    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: Value) -> ApiResult<T> {
        self.request_json(Method::Post, path, Some(body), None).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.request_json(Method::Delete, path, None, None).await
    }
}

fn unauthorized(request: &ApiRequest, response: ApiResponse) -> ApiError {
    ApiError::Unauthorized {
        path: request.path.clone(),
        body: response.body,
    }
}

fn into_result(request: &ApiRequest, response: ApiResponse) -> ApiResult<ApiResponse> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(ApiError::Status {
            status: response.status,
            path: request.path.clone(),
            body: response.body,
        })
    }
}
