//! Durable key-value storage for the session.
//!
//! The session is persisted under three string keys (`accessToken`,
//! `refreshToken`, `user`). [`FileStore`] keeps them in a JSON object on disk
//! and rewrites the whole file on every mutation (temp file + rename), so a
//! crash never leaves a half-written session behind. [`MemoryStore`] is the
//! non-persistent variant used by tests and ephemeral runs.
//!
//! Stored values include bearer tokens: the file is created with owner-only
//! permissions on Unix and values must never be logged.

use crate::error::{Error, Result};
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::RwLock,
};
use tracing::{debug, instrument};

pub const ACCESS_TOKEN_KEY: &str = "accessToken";
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
pub const USER_KEY: &str = "user";

pub trait KeyValueStore: Send + Sync {
    /// # Errors
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// # Errors
    /// Returns an error if the backing store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key is not an error.
    ///
    /// # Errors
    /// Returns an error if the backing store cannot be written.
    fn remove(&self, key: &str) -> Result<()>;
}

fn poisoned() -> Error {
    Error::Storage("storage lock poisoned".to_string())
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.remove(key);
        Ok(())
    }
}

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens the store at `path`, loading existing entries. A missing file is
    /// an empty store; it is created on the first write.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    #[instrument]
    pub fn open(path: &Path) -> Result<Self> {
        let entries = match fs::read_to_string(path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw).map_err(|err| {
                Error::Storage(format!("Failed to parse {}: {err}", path.display()))
            })?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("no session file yet");
                BTreeMap::new()
            }
            Err(err) => {
                return Err(Error::Storage(format!(
                    "Failed to read {}: {err}",
                    path.display()
                )))
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            entries: RwLock::new(entries),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let storage_err =
            |err: std::io::Error| Error::Storage(format!("{}: {err}", self.path.display()));

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(storage_err)?;
        }

        let payload = serde_json::to_vec_pretty(entries)
            .map_err(|err| Error::Storage(format!("Failed to encode session: {err}")))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, payload).map_err(storage_err)?;
        restrict_permissions(&tmp).map_err(storage_err)?;
        fs::rename(&tmp, &self.path).map_err(storage_err)?;

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(0o600))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    struct TempPath(PathBuf);

    impl TempPath {
        fn new(name: &str) -> Self {
            let path = std::env::temp_dir()
                .join(format!("twitter-client-{}", uuid::Uuid::new_v4()))
                .join(name);
            Self(path)
        }
    }

    impl Drop for TempPath {
        fn drop(&mut self) {
            if let Some(parent) = self.0.parent() {
                let _ = fs::remove_dir_all(parent);
            }
        }
    }

    #[test]
    fn memory_store_set_get_remove() -> Result<()> {
        let store = MemoryStore::new();
        assert_eq!(store.get(ACCESS_TOKEN_KEY)?, None);

        store.set(ACCESS_TOKEN_KEY, "a")?;
        assert_eq!(store.get(ACCESS_TOKEN_KEY)?, Some("a".to_string()));

        store.remove(ACCESS_TOKEN_KEY)?;
        store.remove(ACCESS_TOKEN_KEY)?;
        assert_eq!(store.get(ACCESS_TOKEN_KEY)?, None);
        Ok(())
    }

    #[test]
    fn file_store_missing_file_is_empty() -> Result<()> {
        let tmp = TempPath::new("session.json");
        let store = FileStore::open(&tmp.0)?;
        assert_eq!(store.get(USER_KEY)?, None);
        assert!(!tmp.0.exists());
        Ok(())
    }

    #[test]
    fn file_store_persists_across_reopen() -> Result<()> {
        let tmp = TempPath::new("session.json");

        let store = FileStore::open(&tmp.0)?;
        store.set(ACCESS_TOKEN_KEY, "access")?;
        store.set(REFRESH_TOKEN_KEY, "refresh")?;
        store.remove(REFRESH_TOKEN_KEY)?;

        let reopened = FileStore::open(&tmp.0)?;
        assert_eq!(reopened.get(ACCESS_TOKEN_KEY)?, Some("access".to_string()));
        assert_eq!(reopened.get(REFRESH_TOKEN_KEY)?, None);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn file_store_is_owner_only() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempPath::new("session.json");
        let store = FileStore::open(&tmp.0)?;
        store.set(ACCESS_TOKEN_KEY, "access")?;

        let mode = fs::metadata(&tmp.0)?.permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
        Ok(())
    }

    #[test]
    fn file_store_rejects_corrupt_file() -> Result<()> {
        let tmp = TempPath::new("session.json");
        if let Some(parent) = tmp.0.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&tmp.0, "not json")?;

        let result = FileStore::open(&tmp.0);
        assert!(matches!(result, Err(Error::Storage(_))));
        Ok(())
    }
}
