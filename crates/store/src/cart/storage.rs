//! Local cart persistence.
//!
//! The cart is serialized as a JSON array of entries and written back on
//! every mutation; loading it back must reproduce the same entries in the
//! same order. The file backend is the durable store for a browsing session;
//! the in-memory backend exists for tests and ephemeral sessions.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use creamline_core::CartEntry;

/// Errors from the local cart store.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("cart storage I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("cart storage serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A place to persist one session's cart.
pub trait CartStorage: Send + Sync {
    /// Load the persisted entries; an absent record is an empty cart.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the record exists but cannot be read or
    /// parsed.
    fn load(&self) -> Result<Vec<CartEntry>, StorageError>;

    /// Persist the given entries, replacing any previous record.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the record cannot be written.
    fn save(&self, entries: &[CartEntry]) -> Result<(), StorageError>;
}

/// File-backed cart storage; one JSON file per session.
#[derive(Debug)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Storage writing to the given file path.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The backing file path.
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl CartStorage for JsonFileStorage {
    fn load(&self) -> Result<Vec<CartEntry>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, entries: &[CartEntry]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string(entries)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

/// In-memory cart storage.
///
/// Stores the serialized JSON rather than the entries themselves so that a
/// load goes through the same round-trip as the file backend.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    raw: Mutex<Option<String>>,
}

impl MemoryStorage {
    /// Empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl CartStorage for MemoryStorage {
    fn load(&self) -> Result<Vec<CartEntry>, StorageError> {
        let guard = self.raw.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match guard.as_deref() {
            Some(raw) => Ok(serde_json::from_str(raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, entries: &[CartEntry]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(entries)?;
        let mut guard = self.raw.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = Some(raw);
        Ok(())
    }
}
