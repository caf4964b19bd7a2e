//! Backend auth endpoints.

use crate::client::HttpClient;
use crate::state::User;
use crate::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use token_store::{TokenPair, TokenStore};
use tracing::{debug, info};

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REGISTER_PATH: &str = "/api/auth/register";
pub const LOGOUT_PATH: &str = "/api/auth/logout";
pub const ME_PATH: &str = "/api/auth/me";

/// Result of a backend logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutOutcome {
    pub ok: bool,
    /// No refresh token was stored, so the backend was not called.
    pub skipped: bool,
}

#[derive(Debug, Deserialize)]
struct MeResponse {
    user: User,
}

/// Typed client for `/api/auth/*`.
#[derive(Clone)]
pub struct AuthApi {
    client: HttpClient,
    tokens: TokenStore,
}

impl AuthApi {
    pub fn new(client: HttpClient, tokens: TokenStore) -> Self {
        Self { client, tokens }
    }

    /// Exchange credentials for a token pair. Does not store it.
    pub async fn login(&self, email: &str, password: &str) -> ApiResult<TokenPair> {
        debug!(email, "Login request");
        let pair: TokenPair = self
            .client
            .post(LOGIN_PATH, json!({ "email": email, "password": password }))
            .await?;
        if pair.access_token.is_empty() || pair.refresh_token.is_empty() {
            return Err(ApiError::Protocol {
                path: LOGIN_PATH.to_string(),
                reason: "login returned an empty token".to_string(),
            });
        }
        info!(email, "Login succeeded");
        Ok(pair)
    }

    /// Create an account. The response shape is backend-defined.
    pub async fn register(&self, email: &str, password: &str) -> ApiResult<Value> {
        debug!(email, "Register request");
        self.client
            .post(REGISTER_PATH, json!({ "email": email, "password": password }))
            .await
    }

    /// Revoke the stored refresh token on the backend.
    ///
    /// Skipped without a network call when no refresh token is stored. Local
    /// tokens are left alone; see [`crate::Session::sign_out`].
    pub async fn logout(&self) -> ApiResult<LogoutOutcome> {
        let Some(refresh_token) = self.tokens.refresh_token() else {
            debug!("Logout skipped, no refresh token");
            return Ok(LogoutOutcome {
                ok: true,
                skipped: true,
            });
        };

        self.client
            .request(
                crate::Method::Post,
                LOGOUT_PATH,
                Some(json!({ "refreshToken": refresh_token })),
                None,
            )
            .await?;
        info!("Backend logout succeeded");
        Ok(LogoutOutcome {
            ok: true,
            skipped: false,
        })
    }

    /// Fetch the authoritative profile of the current user.
    pub async fn me(&self) -> ApiResult<User> {
        let response: MeResponse = self.client.get(ME_PATH, None).await?;
        Ok(response.user)
    }
}
