//! Keyed storage backends for the session store.
//!
//! The layout mirrors browser local storage: one entry holding the bearer
//! token and one holding the serialized user profile.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing::debug;

/// Key of the bearer token entry.
pub const TOKEN_KEY: &str = "token";

/// Key of the serialized user profile entry.
pub const USER_KEY: &str = "user";

/// Storage error types.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for mia_core::MiaError {
    fn from(err: StoreError) -> Self {
        mia_core::MiaError::Storage(err.to_string())
    }
}

/// String key/value storage.
pub trait SessionStorage: Send + Sync {
    fn read(&self, key: &str) -> StoreResult<Option<String>>;
    fn write(&self, key: &str, value: &str) -> StoreResult<()>;
    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> StoreResult<()>;
}

/// Process-local storage; nothing survives the process.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SessionStorage for MemoryStorage {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries().remove(key);
        Ok(())
    }
}

/// One file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl SessionStorage for FileStorage {
    fn read(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error(&path, e)),
        }
    }

    /// Writes go through a temporary file and a rename so a crash never
    /// leaves a half-written entry behind.
    fn write(&self, key: &str, value: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.dir).map_err(|e| io_error(&self.dir, e))?;

        let tmp = self.dir.join(format!(".{}.tmp", key));
        let mut file = std::fs::File::create(&tmp).map_err(|e| io_error(&tmp, e))?;
        restrict_permissions(&file, &tmp)?;
        file.write_all(value.as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| io_error(&tmp, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| io_error(&path, e))?;

        debug!(key, dir = %self.dir.display(), "Stored session entry");
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(&path, e)),
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(file: &std::fs::File, path: &Path) -> StoreResult<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_error(path, e))
}

#[cfg(not(unix))]
fn restrict_permissions(_file: &std::fs::File, _path: &Path) -> StoreResult<()> {
    Ok(())
}
