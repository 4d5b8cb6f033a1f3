//! Application shell shared by front ends.
//!
//! Owns the credential store and the signed-in identity, and decides whether
//! "buy" starts checkout or asks the user to sign in first.

use std::sync::Arc;

use tracing::{info, warn};

use rekurstore_core::{CatalogEntry, Email};

use crate::config::StorefrontConfig;
use crate::services::auth::{AuthConfig, AuthMachine, Notifier};
use crate::services::checkout::{CheckoutContext, CheckoutMachine};
use crate::store::{CredentialStore, FileStore, KeyValueStore, StoreError};

/// Outcome of pressing "buy".
pub enum Purchase<S, N> {
    /// No session: the login form is open. Sign in, then buy again.
    SignInRequired(AuthMachine<S, N>),
    /// Checkout started for the signed-in user.
    Checkout(CheckoutMachine),
}

/// Storefront application state.
pub struct Storefront<S> {
    credentials: CredentialStore<S>,
    auth_config: AuthConfig,
    checkout: Arc<CheckoutContext>,
    current_user: Option<Email>,
}

impl Storefront<Arc<FileStore>> {
    /// Open the file store named by `config` and restore its session.
    #[must_use]
    pub fn open(config: &StorefrontConfig) -> Self {
        let store = Arc::new(FileStore::new(&config.data_dir));
        let mut storefront = Self::new(store, config.auth, config.checkout_context());
        storefront.restore_session();
        storefront
    }
}

impl<S: KeyValueStore + Clone> Storefront<S> {
    /// Create a signed-out storefront over `store`.
    #[must_use]
    pub fn new(store: S, auth_config: AuthConfig, checkout: CheckoutContext) -> Self {
        Self {
            credentials: CredentialStore::new(store),
            auth_config,
            checkout: Arc::new(checkout),
            current_user: None,
        }
    }

    /// Get a reference to the credential store.
    #[must_use]
    pub const fn credentials(&self) -> &CredentialStore<S> {
        &self.credentials
    }

    /// Get a reference to the checkout collaborators.
    #[must_use]
    pub fn checkout_context(&self) -> &CheckoutContext {
        &self.checkout
    }

    /// The signed-in user, if any.
    #[must_use]
    pub const fn current_user(&self) -> Option<&Email> {
        self.current_user.as_ref()
    }

    /// Pick up the session left by a previous run.
    ///
    /// A session naming an unknown user is cleared.
    pub fn restore_session(&mut self) -> Option<&Email> {
        self.current_user = None;
        let session = self.credentials.get_session()?;

        if self.credentials.find_user(&session.email).is_none() {
            warn!(email = %session.email, "Session names an unknown user, clearing it");
            if let Err(e) = self.credentials.clear_session() {
                warn!(error = %e, "Failed to clear dangling session");
            }
            return None;
        }

        info!(email = %session.email, "Session restored");
        self.current_user = Some(session.email);
        self.current_user.as_ref()
    }

    /// A fresh auth machine for the auth modal.
    #[must_use]
    pub fn auth_machine<N: Notifier>(&self, notifier: N) -> AuthMachine<S, N> {
        AuthMachine::new(self.credentials.clone(), notifier, self.auth_config)
    }

    /// Adopt the identity of a machine that reached `LoggedIn`.
    ///
    /// Returns the signed-in user; a machine that never signed in changes nothing.
    pub fn finish_auth<N: Notifier>(&mut self, machine: AuthMachine<S, N>) -> Option<&Email> {
        if let Some(email) = machine.authenticated_email() {
            self.current_user = Some(email.clone());
        }
        machine.cancel();
        self.current_user.as_ref()
    }

    /// Sign out.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the session slot cannot be cleared; the user
    /// stays signed in.
    pub fn logout(&mut self) -> Result<(), StoreError> {
        self.credentials.clear_session()?;
        if let Some(email) = self.current_user.take() {
            info!(email = %email, "Signed out");
        }
        Ok(())
    }

    /// Press "buy" on `entry`, with whatever was typed in the quick-entry field.
    #[must_use]
    pub fn begin_purchase<N: Notifier>(
        &self,
        entry: CatalogEntry,
        prefill_destination: Option<&str>,
        notifier: N,
    ) -> Purchase<S, N> {
        if self.current_user.is_none() {
            info!(product = %entry.name, "Purchase needs sign-in");
            return Purchase::SignInRequired(AuthMachine::for_login(
                self.credentials.clone(),
                notifier,
                self.auth_config,
            ));
        }

        Purchase::Checkout(CheckoutMachine::start(
            Arc::clone(&self.checkout),
            entry,
            prefill_destination,
        ))
    }
}
