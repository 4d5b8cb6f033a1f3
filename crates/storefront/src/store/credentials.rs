//! Credential store: registered users plus the single session slot.
//!
//! Reads fail soft. A missing, unreadable or unparseable value is treated as
//! "no users" / "no session" and logged, never returned as an error; this is
//! a convenience store and losing it only means signing in again. Writes do
//! return `StoreError` so callers can keep their pre-write state.

use tracing::{debug, instrument, warn};

use rekurstore_core::Email;

use super::{KeyValueStore, StoreError};
use crate::models::session::keys;
use crate::models::{Session, UserRecord};

/// Typed access to accounts and the session slot over a [`KeyValueStore`].
#[derive(Debug, Clone)]
pub struct CredentialStore<S> {
    store: S,
}

impl<S: KeyValueStore> CredentialStore<S> {
    /// Wrap a key-value store.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying key-value store.
    #[must_use]
    pub const fn inner(&self) -> &S {
        &self.store
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// List all registered users.
    ///
    /// Returns an empty list if the stored value is missing or corrupt.
    #[must_use]
    pub fn list_users(&self) -> Vec<UserRecord> {
        let raw = match self.store.get(keys::USERS) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "User list unreadable, treating store as empty");
                return Vec::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "User list corrupt, treating store as empty");
            Vec::new()
        })
    }

    /// Find a user by normalized email.
    #[must_use]
    pub fn find_user(&self, email: &Email) -> Option<UserRecord> {
        self.list_users()
            .into_iter()
            .find(|record| record.has_email(email))
    }

    /// Insert a user unless one with the same email already exists.
    ///
    /// Returns `true` if the record was written. A duplicate is ignored and
    /// the existing credential is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the updated user list cannot be written.
    #[instrument(skip(self, record), fields(email = %record.email))]
    pub fn insert_user(&self, record: UserRecord) -> Result<bool, StoreError> {
        let Some(users) = self.users_with(record) else {
            debug!("User already registered, insert ignored");
            return Ok(false);
        };

        self.store.set(keys::USERS, &serde_json::to_string(&users)?)?;
        debug!(total = users.len(), "User inserted");
        Ok(true)
    }

    /// Insert a user and open a session for them in one write.
    ///
    /// Follows [`insert_user`](Self::insert_user) semantics for duplicates:
    /// the existing credential is kept, and the session is still set.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be written.
    #[instrument(skip(self, record), fields(email = %record.email))]
    pub fn register(&self, record: UserRecord) -> Result<bool, StoreError> {
        let email = record.email.clone();

        let Some(users) = self.users_with(record) else {
            warn!("Email registered concurrently, keeping existing credential");
            self.set_session(&email)?;
            return Ok(false);
        };

        let users_json = serde_json::to_string(&users)?;
        self.store.set_many(&[
            (keys::USERS, users_json.as_str()),
            (keys::SESSION, email.as_str()),
        ])?;
        debug!(total = users.len(), "User registered and session opened");
        Ok(true)
    }

    /// Current users plus `record`, or `None` if the email is taken.
    fn users_with(&self, record: UserRecord) -> Option<Vec<UserRecord>> {
        let mut users = self.list_users();
        if users.iter().any(|existing| existing.has_email(&record.email)) {
            return None;
        }
        users.push(record);
        Some(users)
    }

    // =========================================================================
    // Session
    // =========================================================================

    /// Mark `email` as the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be written.
    pub fn set_session(&self, email: &Email) -> Result<(), StoreError> {
        self.store.set(keys::SESSION, email.as_str())
    }

    /// Clear the session slot.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the store cannot be written.
    pub fn clear_session(&self) -> Result<(), StoreError> {
        self.store.remove(keys::SESSION)
    }

    /// Read the session slot.
    ///
    /// Returns `None` if it is empty, unreadable, or does not hold an email.
    #[must_use]
    pub fn get_session(&self) -> Option<Session> {
        let raw = match self.store.get(keys::SESSION) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Session slot unreadable, treating as signed out");
                return None;
            }
        };

        match Email::normalized(&raw) {
            Ok(email) => Some(Session::new(email)),
            Err(e) => {
                warn!(error = %e, "Session slot corrupt, treating as signed out");
                None
            }
        }
    }
}
