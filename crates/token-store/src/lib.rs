//! Persistent storage for the session's bearer tokens.
//!
//! This crate provides:
//! - A [`SecureStorage`] backend trait
//! - [`FileStorage`]: the single persistent backend, a JSON document at
//!   `~/.storefront/session.json` written atomically with owner-only permissions
//! - [`MemoryStorage`]: process-local backend for tests and ephemeral sessions
//! - [`TokenStore`]: the token-level API used by the session manager
//!
//! Tokens have no local lifetime. They stay on disk until the session manager
//! clears them (logout, failed refresh, or a 401 with nothing to refresh with).

mod file;
mod keys;
mod memory;
mod tokens;
mod traits;

pub use file::FileStorage;
pub use keys::StorageKeys;
pub use memory::MemoryStorage;
pub use tokens::{TokenPair, TokenStore};
pub use traits::SecureStorage;

use std::sync::Arc;
use storefront_config_and_utils::Paths;
use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Backend-specific failure
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Create the default persistent storage backend.
pub fn create_storage(paths: &Paths) -> Arc<dyn SecureStorage> {
    Arc::new(FileStorage::new(paths.session_file()))
}

/// Create a token store over the default persistent backend.
pub fn create_token_store(paths: &Paths) -> TokenStore {
    TokenStore::new(create_storage(paths))
}
