//! User domain types.

use serde::{Deserialize, Serialize};

use rekurstore_core::{Email, normalize_email};

/// A registered storefront account.
///
/// Created once the registration code is verified; never updated or deleted.
/// The password is stored and compared as typed, with no hashing, matching
/// the storefront's local-storage "backend". Implements `Debug` manually to
/// redact it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Normalized email, unique across the store.
    pub email: Email,
    /// Password exactly as entered at registration.
    pub password: String,
}

impl UserRecord {
    /// Create a user record.
    #[must_use]
    pub fn new(email: Email, password: impl Into<String>) -> Self {
        Self {
            email,
            password: password.into(),
        }
    }

    /// Whether this record is keyed by `normalized_email`.
    ///
    /// Records written by older clients may not be normalized, so the stored
    /// side is normalized before comparing.
    #[must_use]
    pub fn has_email(&self, normalized_email: &Email) -> bool {
        normalize_email(self.email.as_str()) == normalized_email.as_str()
    }

    /// Exact, case-sensitive password comparison.
    #[must_use]
    pub fn password_matches(&self, candidate: &str) -> bool {
        self.password == candidate
    }
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}
