//! Unified error handling.
//!
//! Each service has its own error type; `AppError` collects them for front
//! ends that drive several services. Every variant maps to the inline
//! message the storefront shows next to the failing form.

use thiserror::Error;

use rekurstore_core::ValidationError;

use crate::config::ConfigError;
use crate::services::auth::AuthError;
use crate::services::checkout::CheckoutError;
use crate::store::StoreError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Checkout operation failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Key-value store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// Environment configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AppError {
    /// Whether the user can correct the input and retry the same step.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::Auth(err) => err.is_recoverable(),
            Self::Checkout(err) => err.is_recoverable(),
            Self::Storage(_) | Self::Config(_) => false,
        }
    }

    /// Message to show the user. Internal details are never exposed.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Auth(err) => err.user_message(),
            Self::Checkout(err) => err.user_message(),
            Self::Storage(_) => "Gagal menyimpan data. Silakan coba lagi.",
            Self::Config(_) => "Konfigurasi toko tidak valid. Silakan hubungi admin.",
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Inline message for a validation failure.
#[must_use]
pub fn validation_message(err: &ValidationError) -> &'static str {
    match err {
        ValidationError::MissingField {
            field: "email" | "password",
        } => "Email dan kata sandi wajib diisi",
        ValidationError::MissingField { field: "code" } => "Kode verifikasi wajib diisi",
        ValidationError::MissingField {
            field: "contact_email" | "destination",
        } => "Email dan nomor tujuan wajib diisi",
        ValidationError::MissingField { .. } => "Data wajib diisi",
        ValidationError::PasswordTooShort { .. } => "Kata sandi minimal 6 karakter",
        ValidationError::InvalidEmail(_) => "Format email tidak valid",
    }
}
