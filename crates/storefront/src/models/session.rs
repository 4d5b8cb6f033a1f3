//! Session-related types.
//!
//! Types stored in the key-value store for authentication state.

use serde::{Deserialize, Serialize};

use rekurstore_core::Email;

/// The currently authenticated identity.
///
/// At most one exists per store. Persists across reloads until an explicit
/// logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Normalized email of the signed-in user.
    pub email: Email,
}

impl Session {
    /// Create a session for `email`.
    #[must_use]
    pub const fn new(email: Email) -> Self {
        Self { email }
    }
}

/// Store keys for authentication data.
pub mod keys {
    /// Key for the JSON list of registered users.
    pub const USERS: &str = "rekurstore_users";

    /// Key for the signed-in user's email (stored as a bare string).
    pub const SESSION: &str = "rekurstore_session";
}
