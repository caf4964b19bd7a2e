//! Authenticated HTTP session manager for the storefront client.
//!
//! This crate provides:
//! - [`HttpClient`]: attaches the stored access token to every request and
//!   recovers a 401 with a single refresh-then-retry
//! - [`RefreshCoordinator`]: at most one refresh call in flight, later
//!   callers queued FIFO and resumed with the outcome
//! - [`AuthStore`]: observable `{is_authenticated, user, loading}` state
//! - [`Session`]: the explicit context object tying them together
//! - [`bootstrap`]: one silent refresh at startup
//! - [`AuthApi`]: typed `/api/auth/*` endpoints
//! - [`claims::project_user`]: best-effort display identity from a JWT

mod auth_api;
mod bootstrap;
pub mod claims;
mod client;
mod error;
mod refresh;
mod session;
mod state;
mod transport;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use auth_api::{AuthApi, LogoutOutcome, LOGIN_PATH, LOGOUT_PATH, ME_PATH, REGISTER_PATH};
pub use bootstrap::{bootstrap, BootstrapOutcome};
pub use client::{HttpClient, RequestConfig};
pub use error::{ApiError, ApiResult, TransportError};
pub use refresh::refresh_machine;
pub use refresh::{
    RefreshCoordinator, RefreshMachine, RefreshMachineInput, RefreshMachineState,
    RefreshOutcome, REFRESH_PATH,
};
pub use session::Session;
pub use state::{AuthListener, AuthSnapshot, AuthStore, ListenerId, Transition, User};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, ReqwestTransport};

pub use token_store::TokenPair;
