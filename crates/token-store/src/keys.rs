//! Storage key constants.

/// Fixed keys the session tokens are persisted under.
pub struct StorageKeys;

impl StorageKeys {
    /// Short-lived bearer credential
    pub const ACCESS_TOKEN: &'static str = "accessToken";

    /// Long-lived credential exchanged for new access tokens
    pub const REFRESH_TOKEN: &'static str = "refreshToken";
}
