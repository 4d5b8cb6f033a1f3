//! Local key-value persistence for the storefront.
//!
//! The storefront has no server. Everything that must survive a reload lives
//! in one key-value store holding plain-text values under fixed keys:
//!
//! - `rekurstore_users` - JSON list of `{email, password}` records
//! - `rekurstore_session` - the email of the signed-in user
//!
//! Protocol code only sees the [`KeyValueStore`] trait, so the medium can be
//! swapped: [`MemoryStore`] for tests, [`FileStore`] for the terminal front end.
//!
//! # Guarantees
//!
//! Deliberately weak. A single writer is assumed; concurrent writers resolve
//! as last-write-wins on the whole collection. There is no integrity check,
//! and unreadable content degrades to "no users / no session" in
//! [`CredentialStore`].

pub mod credentials;
mod file;
mod memory;

use std::sync::Arc;

use thiserror::Error;

pub use credentials::CredentialStore;
pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors raised by a key-value medium.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored content could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A previous writer panicked while holding the store lock.
    #[error("store lock poisoned")]
    Poisoned,
}

/// Minimal string key-value persistence.
///
/// Every call is synchronous and completes before returning, so writes from
/// one call site are observed in order.
pub trait KeyValueStore {
    /// Read the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the medium cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the medium cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;

    /// List every key currently stored, in ascending order.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the medium cannot be read.
    fn keys(&self) -> Result<Vec<String>, StoreError>;

    /// Store several entries as one write.
    ///
    /// The default applies them one by one; media that can commit them in a
    /// single step override this.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the medium cannot be written. Entries applied
    /// before the failure stay applied unless the medium overrides this.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        for (key, value) in entries {
            self.set(key, value)?;
        }
        Ok(())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        (**self).remove(key)
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        (**self).keys()
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), StoreError> {
        (**self).set_many(entries)
    }
}
