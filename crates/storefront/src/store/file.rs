//! JSON file key-value store.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::{KeyValueStore, StoreError};

/// Name of the data file inside the store directory.
const DATA_FILE: &str = "store.json";

type Entries = BTreeMap<String, String>;

/// [`KeyValueStore`] persisted as a single JSON object on disk.
///
/// Every write rewrites the whole file through a uniquely named temporary
/// sibling and a rename, so a crash mid-write leaves either the old or the
/// new content.
/// Writers inside one process are serialized; writers in other processes
/// resolve as last-write-wins.
///
/// # Security Warning
///
/// Values are stored in plain text with no encryption at rest.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing data file.
    #[must_use]
    pub fn data_path(&self) -> PathBuf {
        self.dir.join(DATA_FILE)
    }

    fn load(&self) -> Result<Entries, StoreError> {
        let path = self.data_path();
        if !path.exists() {
            return Ok(Entries::new());
        }

        let json = std::fs::read_to_string(&path)?;
        let entries = serde_json::from_str(&json)?;
        Ok(entries)
    }

    /// Load for a read-modify-write cycle. Unreadable content is replaced
    /// rather than blocking every future write.
    fn load_for_write(&self) -> Entries {
        self.load().unwrap_or_else(|e| {
            warn!(path = %self.data_path().display(), error = %e, "Discarding unreadable store file");
            Entries::new()
        })
    }

    fn save(&self, entries: &Entries) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.data_path();
        let json = serde_json::to_string_pretty(entries)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.persist(&path).map_err(|e| e.error)?;

        debug!(path = %path.display(), keys = entries.len(), "Store file written");
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut Entries)) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut entries = self.load_for_write();
        apply(&mut entries);
        self.save(&entries)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.insert(key.to_owned(), value.to_owned());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.load()?.into_keys().collect())
    }

    fn set_many(&self, batch: &[(&str, &str)]) -> Result<(), StoreError> {
        self.update(|entries| {
            for (key, value) in batch {
                entries.insert((*key).to_owned(), (*value).to_owned());
            }
        })
    }
}
