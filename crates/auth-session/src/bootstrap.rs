//! Startup session restore.

use crate::refresh::RefreshOutcome;
use crate::session::Session;
use crate::state::Transition;
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapOutcome {
    /// No refresh token stored; nothing was sent.
    NoSession,
    /// Refresh succeeded and the session is authenticated.
    Restored,
    /// Refresh failed; tokens were cleared.
    Expired,
}

/// One silent refresh attempt with the stored refresh token.
///
/// Run once at startup and await it before acting on auth state: when it
/// returns, the snapshot is settled (`loading == false`) either way.
pub async fn bootstrap(session: &Session) -> BootstrapOutcome {
    let Some(refresh_token) = session.tokens().refresh_token() else {
        info!("No stored session");
        session.auth_store().apply(Transition::HydrateFailure);
        return BootstrapOutcome::NoSession;
    };

    match session.client().refresher().refresh(refresh_token).await {
        RefreshOutcome::Refreshed(pair) => {
            session.login(&pair);
            info!("Session restored");
            BootstrapOutcome::Restored
        }
        RefreshOutcome::Failed => {
            warn!("Stored session could not be refreshed");
            session.logout();
            BootstrapOutcome::Expired
        }
    }
}
