//! File-backed storage.
//!
//! All keys live in one JSON object. Writes go to a sibling temp file that is
//! then renamed over the original, so a crash never leaves a torn document.

use crate::{SecureStorage, StorageError, StorageResult};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// JSON-document storage at a fixed path.
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> StorageResult<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    /// Current document for a read-modify-write. An undecodable document is
    /// discarded so the write replaces it; the flag reports that case.
    fn read_for_write(&self) -> StorageResult<(BTreeMap<String, String>, bool)> {
        match self.read_all() {
            Ok(data) => Ok((data, false)),
            Err(StorageError::Encoding(e)) => {
                warn!(path = %self.path.display(), error = %e, "session file is corrupt, discarding it");
                Ok((BTreeMap::new(), true))
            }
            Err(e) => Err(e),
        }
    }

    fn write_all(&self, data: &BTreeMap<String, String>) -> StorageResult<()> {
        if data.is_empty() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(StorageError::Io(e)),
            };
        }

        let parent = self
            .path
            .parent()
            .ok_or_else(|| StorageError::Backend(format!("{} has no parent", self.path.display())))?;
        fs::create_dir_all(parent)?;

        let tmp_path = self.path.with_extension("json.tmp");
        {
            let mut file = open_private(&tmp_path)?;
            file.write_all(serde_json::to_string_pretty(data)?.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        debug!(path = %self.path.display(), keys = data.len(), "session file written");
        Ok(())
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

impl SecureStorage for FileStorage {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let _guard = self.lock.lock();
        let (mut data, _) = self.read_for_write()?;
        data.insert(key.to_string(), value.to_string());
        self.write_all(&data)
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let _guard = self.lock.lock();
        Ok(self.read_all()?.remove(key))
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        let _guard = self.lock.lock();
        let (mut data, corrupt) = self.read_for_write()?;
        let existed = data.remove(key).is_some();
        if existed || corrupt {
            self.write_all(&data)?;
        }
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_storage_set_get_delete() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("session.json"));

        assert_eq!(storage.get("accessToken").unwrap(), None);

        storage.set("accessToken", "at-1").unwrap();
        storage.set("refreshToken", "rt-1").unwrap();
        assert_eq!(storage.get("accessToken").unwrap(), Some("at-1".to_string()));
        assert!(storage.has("refreshToken").unwrap());

        assert!(storage.delete("accessToken").unwrap());
        assert!(!storage.delete("accessToken").unwrap());
        assert_eq!(storage.get("refreshToken").unwrap(), Some("rt-1".to_string()));
    }

    #[test]
    fn test_file_removed_when_last_key_deleted() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        let storage = FileStorage::new(&path);

        storage.set("refreshToken", "rt-1").unwrap();
        assert!(path.exists());

        storage.delete("refreshToken").unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_creates_missing_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("session.json");
        let storage = FileStorage::new(&path);

        storage.set("accessToken", "at-1").unwrap();
        assert_eq!(storage.get("accessToken").unwrap(), Some("at-1".to_string()));
    }

    #[test]
    fn test_corrupt_file_surfaces_encoding_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let storage = FileStorage::new(&path);
        assert!(matches!(storage.get("accessToken"), Err(StorageError::Encoding(_))));
    }

    #[test]
    fn test_write_replaces_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let storage = FileStorage::new(&path);
        storage.set("refreshToken", "rt-1").unwrap();
        assert_eq!(storage.get("refreshToken").unwrap(), Some("rt-1".to_string()));
    }

    #[test]
    fn test_delete_removes_corrupt_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "{not json").unwrap();

        let storage = FileStorage::new(&path);
        assert!(!storage.delete("accessToken").unwrap());
        assert!(!path.exists());
        assert_eq!(storage.get("accessToken").unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        FileStorage::new(&path).set("accessToken", "at-1").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
