//! The session context object.
//!
//! A [`Session`] owns one token store, one auth state, and one HTTP client
//! core. It is created explicitly, hydrated or bootstrapped once, handed to
//! whatever needs to make API calls, and disposed when the process is done
//! with it. Nothing here is global, so tests (or a multi-account process)
//! can run any number of independent sessions.

use crate::auth_api::{AuthApi, LogoutOutcome};
use crate::claims;
use crate::client::{HttpClient, RequestConfig};
use crate::state::{AuthSnapshot, AuthStore, ListenerId, Transition, User};
use crate::transport::{ApiResponse, HttpTransport, Method, ReqwestTransport};
use crate::ApiResult;
use serde_json::Value;
use std::sync::Arc;
use storefront_config_and_utils::{Config, Paths};
use token_store::{TokenPair, TokenStore};
use tracing::{info, warn};

pub struct Session {
    tokens: TokenStore,
    auth: AuthStore,
    client: HttpClient,
    api: AuthApi,
}

impl Session {
    /// Assemble a session over an explicit transport and token store.
    pub fn new(transport: Arc<dyn HttpTransport>, tokens: TokenStore) -> Self {
        let auth = AuthStore::new();
        let client = HttpClient::new(transport, tokens.clone(), auth.clone());
        let api = AuthApi::new(client.clone(), tokens.clone());
        Self {
            tokens,
            auth,
            client,
            api,
        }
    }

    /// Production session: reqwest transport from `config`, tokens persisted
    /// in the session file under `paths`.
    pub fn create(config: &Config, paths: &Paths) -> ApiResult<Self> {
        let transport = ReqwestTransport::from_config(config)?;
        info!(api_base_url = %transport.base_url(), "Creating session");
        Ok(Self::new(
            Arc::new(transport),
            token_store::create_token_store(paths),
        ))
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    pub fn auth_api(&self) -> &AuthApi {
        &self.api
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub(crate) fn auth_store(&self) -> &AuthStore {
        &self.auth
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.auth.snapshot()
    }

    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&AuthSnapshot) + Send + Sync + 'static,
    {
        self.auth.subscribe(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.auth.unsubscribe(id)
    }

    /// See [`HttpClient::request`].
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        config: Option<RequestConfig>,
    ) -> ApiResult<ApiResponse> {
        self.client.request(method, path, body, config).await
    }

    /// Store a freshly issued pair and mark the session authenticated.
    ///
    /// Does not fetch the profile; chain [`load_me`](Self::load_me) for that.
    pub fn login(&self, pair: &TokenPair) -> AuthSnapshot {
        self.tokens.persist(pair);
        self.auth.apply(Transition::Login)
    }

    /// Credentials login: backend login, [`login`](Self::login), then a
    /// profile fetch. A failed profile fetch leaves the session authenticated
    /// without a user.
    pub async fn login_with_password(&self, email: &str, password: &str) -> ApiResult<AuthSnapshot> {
        let pair = self.api.login(email, password).await?;
        self.login(&pair);
        if let Err(e) = self.load_me().await {
            warn!(error = %e, "Profile fetch after login failed");
        }
        Ok(self.snapshot())
    }

    /// Fetch the profile and attach it to the session.
    pub async fn load_me(&self) -> ApiResult<User> {
        let user = self.api.me().await?;
        self.auth.apply(Transition::ProfileLoaded(user.clone()));
        Ok(user)
    }

    /// Restore state from stored tokens.
    ///
    /// Without any stored token this settles logged out with no network call.
    /// Otherwise it fetches the profile; on failure tokens are cleared.
    pub async fn hydrate(&self) -> AuthSnapshot {
        if !self.tokens.has_any() {
            return self.auth.apply(Transition::HydrateFailure);
        }

        self.auth.apply(Transition::HydrateStart);
        match self.api.me().await {
            Ok(user) => {
                info!(user_id = %user.user_id, "Session hydrated");
                self.auth.apply(Transition::HydrateSuccess(user))
            }
            Err(e) => {
                warn!(error = %e, "Hydration failed, clearing tokens");
                self.tokens.clear();
                self.auth.apply(Transition::HydrateFailure)
            }
        }
    }

    /// Clear tokens and mark the session logged out. Idempotent.
    pub fn logout(&self) -> AuthSnapshot {
        self.tokens.clear();
        self.auth.apply(Transition::Logout)
    }

    /// Revoke on the backend (best effort), then [`logout`](Self::logout).
    pub async fn sign_out(&self) -> LogoutOutcome {
        let outcome = match self.api.logout().await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "Backend logout failed, logging out locally");
                LogoutOutcome {
                    ok: false,
                    skipped: false,
                }
            }
        };
        self.logout();
        outcome
    }

    /// User to show in the UI: the profile if loaded, else a best-effort
    /// projection of the access token's claims.
    pub fn display_user(&self) -> Option<User> {
        self.snapshot()
            .user
            .or_else(|| self.tokens.access_token().and_then(|t| claims::project_user(&t)))
    }

    /// End the session's lifecycle: later requests fail with
    /// [`crate::ApiError::Closed`] and listeners are dropped. Stored tokens
    /// are kept for the next process.
    pub fn dispose(&self) {
        self.client.close();
        self.auth.clear_listeners();
        info!("Session disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.client.is_closed()
    }
}
