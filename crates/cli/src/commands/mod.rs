//! Command implementations.

pub mod account;
pub mod shop;

use std::sync::Arc;

use thiserror::Error;

use rekurstore_storefront::config::ConfigError;
use rekurstore_storefront::services::auth::AuthError;
use rekurstore_storefront::services::checkout::CheckoutError;
use rekurstore_storefront::store::{FileStore, StoreError};
use rekurstore_storefront::{AppError, Storefront, StorefrontConfig};

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// A storefront operation failed.
    #[error("{}", .0.user_message())]
    App(#[from] AppError),

    /// Reading from the terminal failed.
    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// The user gave up.
    #[error("Dibatalkan.")]
    Cancelled,
}

impl From<AuthError> for CommandError {
    fn from(err: AuthError) -> Self {
        Self::App(err.into())
    }
}

impl From<CheckoutError> for CommandError {
    fn from(err: CheckoutError) -> Self {
        Self::App(err.into())
    }
}

impl From<StoreError> for CommandError {
    fn from(err: StoreError) -> Self {
        Self::App(err.into())
    }
}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        Self::App(err.into())
    }
}

/// The storefront as configured by the environment, with its session restored.
pub type App = Storefront<Arc<FileStore>>;

/// Load configuration and open the store.
///
/// # Errors
///
/// Returns `CommandError::App` if the configuration is invalid.
pub fn open_storefront() -> Result<App, CommandError> {
    let config = StorefrontConfig::from_env()?;
    tracing::debug!(data_dir = %config.data_dir.display(), "Opening storefront");
    Ok(Storefront::open(&config))
}
