//! Best-effort identity projection from an access token's claims.
//!
//! The payload is decoded without verifying the signature. The result is for
//! display only (e.g. showing an email before `/api/auth/me` has answered)
//! and must never drive an authorization decision. The profile endpoint is
//! the only authoritative source of [`User`].

use crate::state::User;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::Value;

/// Decode the JWT payload segment into a display [`User`].
///
/// Returns `None` for anything that is not a three-segment token with a JSON
/// payload carrying `user_id` or `sub`.
pub fn project_user(access_token: &str) -> Option<User> {
    let mut segments = access_token.split('.');
    let (_header, payload, _signature) = (segments.next()?, segments.next()?, segments.next()?);
    if segments.next().is_some() {
        return None;
    }

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .ok()?;
    let claims: Value = serde_json::from_slice(&bytes).ok()?;

    let user_id = claim_string(&claims, "user_id").or_else(|| claim_string(&claims, "sub"))?;
    Some(User {
        user_id,
        email: claim_string(&claims, "email").unwrap_or_default(),
        name: claim_string(&claims, "name"),
        role: claim_string(&claims, "role"),
    })
}

fn claim_string(claims: &Value, key: &str) -> Option<String> {
    match claims.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
