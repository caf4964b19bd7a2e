//! Token-level API over a storage backend.

use crate::{SecureStorage, StorageKeys, StorageResult};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Access/refresh pair as issued by the backend's login and refresh endpoints.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl TokenPair {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"***")
            .field("refresh_token", &"***")
            .finish()
    }
}

/// The session's token store.
///
/// Reads and writes never fail outward: a backend error is logged and treated
/// as "token absent". An empty string is never stored; setting `""` deletes
/// the key. Cloning shares the same backend.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn SecureStorage>,
    /// Serializes pair-level operations so readers never observe half a pair.
    pair_lock: Arc<Mutex<()>>,
}

impl TokenStore {
    pub fn new(storage: Arc<dyn SecureStorage>) -> Self {
        Self {
            storage,
            pair_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Token store over a fresh in-memory backend.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(crate::MemoryStorage::new()))
    }

    pub fn access_token(&self) -> Option<String> {
        let _guard = self.pair_lock.lock();
        self.read(StorageKeys::ACCESS_TOKEN)
    }

    pub fn refresh_token(&self) -> Option<String> {
        let _guard = self.pair_lock.lock();
        self.read(StorageKeys::REFRESH_TOKEN)
    }

    /// Both tokens, read under one lock. `None` unless both are present.
    pub fn pair(&self) -> Option<TokenPair> {
        let _guard = self.pair_lock.lock();
        let access_token = self.read(StorageKeys::ACCESS_TOKEN)?;
        let refresh_token = self.read(StorageKeys::REFRESH_TOKEN)?;
        Some(TokenPair {
            access_token,
            refresh_token,
        })
    }

    /// Whether any token is stored at all.
    pub fn has_any(&self) -> bool {
        let _guard = self.pair_lock.lock();
        self.read(StorageKeys::ACCESS_TOKEN).is_some()
            || self.read(StorageKeys::REFRESH_TOKEN).is_some()
    }

    pub fn set_access_token(&self, token: &str) {
        let _guard = self.pair_lock.lock();
        self.write(StorageKeys::ACCESS_TOKEN, token);
    }

    pub fn set_refresh_token(&self, token: &str) {
        let _guard = self.pair_lock.lock();
        self.write(StorageKeys::REFRESH_TOKEN, token);
    }

    /// Store both tokens of a freshly issued pair.
    pub fn persist(&self, pair: &TokenPair) {
        let _guard = self.pair_lock.lock();
        debug!("persisting token pair");
        self.write(StorageKeys::ACCESS_TOKEN, &pair.access_token);
        self.write(StorageKeys::REFRESH_TOKEN, &pair.refresh_token);
    }

    /// Remove both tokens.
    pub fn clear(&self) {
        let _guard = self.pair_lock.lock();
        debug!("clearing tokens");
        self.remove(StorageKeys::ACCESS_TOKEN);
        self.remove(StorageKeys::REFRESH_TOKEN);
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(key, error = %e, "token read failed, treating as absent");
                None
            }
        }
    }

    fn write(&self, key: &str, token: &str) {
        if token.is_empty() {
            self.remove(key);
            return;
        }
        if let Err(e) = self.storage.set(key, token) {
            warn!(key, error = %e, "token write failed");
        }
    }

    fn remove(&self, key: &str) {
        let result: StorageResult<bool> = self.storage.delete(key);
        if let Err(e) = result {
            warn!(key, error = %e, "token delete failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStorage, StorageError};

    /// Backend whose every operation fails.
    struct BrokenStorage;

    impl SecureStorage for BrokenStorage {
        fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
            Err(StorageError::Backend("disk on fire".to_string()))
        }

        fn get(&self, _key: &str) -> StorageResult<Option<String>> {
            Err(StorageError::Backend("disk on fire".to_string()))
        }

        fn delete(&self, _key: &str) -> StorageResult<bool> {
            Err(StorageError::Backend("disk on fire".to_string()))
        }
    }

    #[test]
    fn test_persist_and_read_pair() {
        let store = TokenStore::in_memory();
        assert!(store.pair().is_none());
        assert!(!store.has_any());

        store.persist(&TokenPair::new("at-1", "rt-1"));
        assert_eq!(store.access_token().as_deref(), Some("at-1"));
        assert_eq!(store.refresh_token().as_deref(), Some("rt-1"));
        assert_eq!(store.pair(), Some(TokenPair::new("at-1", "rt-1")));
        assert!(store.has_any());
    }

    #[test]
    fn test_empty_string_deletes_instead_of_storing() {
        let storage = Arc::new(MemoryStorage::new());
        let store = TokenStore::new(storage.clone());

        store.set_access_token("at-1");
        store.set_access_token("");
        assert_eq!(store.access_token(), None);
        assert_eq!(storage.get(StorageKeys::ACCESS_TOKEN).unwrap(), None);
    }

    #[test]
    fn test_stored_empty_value_reads_as_absent() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(StorageKeys::REFRESH_TOKEN, "").unwrap();

        let store = TokenStore::new(storage);
        assert_eq!(store.refresh_token(), None);
        assert!(!store.has_any());
    }

    #[test]
    fn test_clear_removes_both() {
        let store = TokenStore::in_memory();
        store.persist(&TokenPair::new("at-1", "rt-1"));

        store.clear();
        assert_eq!(store.access_token(), None);
        assert_eq!(store.refresh_token(), None);

        // Clearing an empty store is fine.
        store.clear();
    }

    #[test]
    fn test_refresh_only_counts_as_evidence() {
        let store = TokenStore::in_memory();
        store.set_refresh_token("rt-1");
        assert!(store.has_any());
        assert!(store.pair().is_none());
    }

    #[test]
    fn test_clones_share_backend() {
        let store = TokenStore::in_memory();
        let other = store.clone();

        store.persist(&TokenPair::new("at-1", "rt-1"));
        assert_eq!(other.access_token().as_deref(), Some("at-1"));
    }

    #[test]
    fn test_backend_failure_degrades_to_absent() {
        let store = TokenStore::new(Arc::new(BrokenStorage));

        store.persist(&TokenPair::new("at-1", "rt-1"));
        store.clear();
        assert_eq!(store.access_token(), None);
        assert_eq!(store.refresh_token(), None);
        assert!(!store.has_any());
    }

    #[test]
    fn test_debug_hides_token_values() {
        let rendered = format!("{:?}", TokenPair::new("at-secret", "rt-secret"));
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn test_token_pair_wire_format() {
        let pair: TokenPair =
            serde_json::from_str(r#"{"accessToken":"at-2","refreshToken":"rt-2"}"#).unwrap();
        assert_eq!(pair, TokenPair::new("at-2", "rt-2"));
    }
}
