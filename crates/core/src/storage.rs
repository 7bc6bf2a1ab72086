//! Key-value persistence capability used by the cart.
//!
//! The cart never talks to a storage medium directly. It is handed something
//! that implements [`KeyValueStore`]: a JSON file on disk in the storefront,
//! a [`MemoryStore`] in tests.

use std::collections::HashMap;

use thiserror::Error;

/// Errors a storage backend can report.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying I/O failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing data could not be encoded or decoded.
    #[error("storage encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// The backend refused the write (e.g. quota exceeded).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A string-to-string store, read at startup and written on every change.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;

    /// Apply several writes as one change. `None` removes the key.
    ///
    /// The default applies them one at a time. Backends that can commit a
    /// batch atomically should override it.
    ///
    /// # Errors
    ///
    /// Returns the first error the backend reports.
    fn set_many(&mut self, entries: &[(&str, Option<&str>)]) -> Result<(), StorageError> {
        for (key, value) in entries {
            match value {
                Some(value) => self.set(key, value)?,
                None => self.remove(key)?,
            }
        }
        Ok(())
    }
}

/// In-memory [`KeyValueStore`].
///
/// Cloning copies the contents, which is how tests simulate a reload: clone
/// the store a cart wrote to and load a fresh cart from the clone.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    read_only: bool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that rejects every write, standing in for a full disk or an
    /// exhausted browser quota.
    #[must_use]
    pub fn read_only() -> Self {
        Self {
            entries: HashMap::new(),
            read_only: true,
        }
    }

    /// Builder-style insert that bypasses the read-only flag.
    #[must_use]
    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_owned(), value.to_owned());
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Unavailable("store is read-only".to_string()));
        }
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Unavailable("store is read-only".to_string()));
        }
        self.entries.remove(key);
        Ok(())
    }

    fn set_many(&mut self, entries: &[(&str, Option<&str>)]) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Unavailable("store is read-only".to_string()));
        }
        for (key, value) in entries {
            match value {
                Some(value) => self.entries.insert((*key).to_owned(), (*value).to_owned()),
                None => self.entries.remove(*key),
            };
        }
        Ok(())
    }
}
