//! Authentication error types.

use thiserror::Error;

use rekurstore_core::ValidationError;

use super::AuthPhase;
use crate::error::validation_message;
use crate::store::StoreError;

/// Errors that can occur during authentication operations.
///
/// Every variant leaves the machine in the state it was in before the failing
/// call, except `CodeExpired` and `TooManyAttempts`, which discard the
/// challenge and return to the registration form.
#[derive(Debug, Error)]
pub enum AuthError {
    /// A required field is missing or malformed.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Unknown email or wrong password.
    #[error("credentials mismatch")]
    CredentialsMismatch,

    /// Registration for an email that already has an account.
    #[error("already registered")]
    AlreadyRegistered,

    /// Submitted code does not match the outstanding challenge.
    #[error("code mismatch")]
    CodeMismatch,

    /// The challenge outlived the configured TTL.
    #[error("verification code expired")]
    CodeExpired,

    /// The configured number of failed code attempts was reached.
    #[error("too many verification attempts")]
    TooManyAttempts,

    /// Operation not valid in the current state.
    #[error("cannot {action} while {phase}")]
    InvalidTransition {
        /// What was attempted.
        action: &'static str,
        /// State the machine was in.
        phase: AuthPhase,
    },

    /// The store could not be written.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl AuthError {
    /// Whether the user can correct the input and resubmit.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InvalidTransition { .. })
    }

    /// Inline message shown next to the form.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Validation(err) => validation_message(err),
            Self::CredentialsMismatch => "Email atau kata sandi salah.",
            Self::AlreadyRegistered => "Email ini sudah terdaftar. Silakan login.",
            Self::CodeMismatch => "Kode verifikasi salah. Silakan cek ulang.",
            Self::CodeExpired => "Kode verifikasi kedaluwarsa. Silakan minta kode baru.",
            Self::TooManyAttempts => "Terlalu banyak percobaan. Silakan minta kode baru.",
            Self::InvalidTransition { .. } => "Permintaan tidak valid. Silakan muat ulang.",
            Self::Storage(_) => "Gagal menyimpan data. Silakan coba lagi.",
        }
    }
}
