//! JSON file key-value store.
//!
//! The whole store is one JSON object (`{"cart_items": "...", ...}`) read
//! once on open and rewritten on every change. Writes go to a sibling temp
//! file which is then renamed over the target, so a concurrent reader sees
//! either the old or the new snapshot, never a partial one. Two processes
//! writing the same file still race: the last rename wins.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use bakehouse_core::{KeyValueStore, StorageError};
use tracing::{debug, warn};

/// A [`KeyValueStore`] persisted to a single JSON file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open the store at `path`.
    ///
    /// A missing file is an empty store. An unreadable or malformed file is
    /// logged and also treated as empty; the next write replaces it.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match read_entries(&path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable store file");
                BTreeMap::new()
            }
        };

        debug!(path = %path.display(), keys = entries.len(), "Opened store");
        Self { path, entries }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write all entries to disk.
    fn flush(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec_pretty(&self.entries)?;
        let tmp = temp_path(&self.path);
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    /// Apply every entry in memory, then rewrite the file once.
    fn set_many(&mut self, entries: &[(&str, Option<&str>)]) -> Result<(), StorageError> {
        for (key, value) in entries {
            match value {
                Some(value) => self.entries.insert((*key).to_owned(), (*value).to_owned()),
                None => self.entries.remove(*key),
            };
        }
        self.flush()
    }
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, String>, StorageError> {
    match fs::read(path) {
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(e.into()),
    }
}

/// `dir/cart.json` -> `dir/.cart.json.tmp`
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map_or_else(|| "store".into(), |name| name.to_string_lossy());
    path.with_file_name(format!(".{name}.tmp"))
}
