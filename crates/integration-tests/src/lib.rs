//! Integration tests for RekurStore.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rekurstore-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `auth_flows` - Registration, login and verification end to end
//! - `checkout_flows` - Buy gating, checkout and hand-off
//! - `persistence` - File store behaviour across restarts
//!
//! This crate holds the fixtures shared by those tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::{Arc, Mutex, PoisonError};

use rekurstore_core::{CatalogEntry, Email};
use rekurstore_storefront::Storefront;
use rekurstore_storefront::services::auth::{AuthConfig, Notifier, VerificationNotice};
use rekurstore_storefront::services::checkout::CheckoutContext;
use rekurstore_storefront::store::MemoryStore;

/// A code shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub destination: Email,
    pub code: String,
    pub body: String,
}

/// Notifier that records every delivery instead of showing it.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    deliveries: Arc<Mutex<Vec<Delivery>>>,
}

impl RecordingNotifier {
    /// Everything delivered so far.
    #[must_use]
    pub fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recent code, if any.
    #[must_use]
    pub fn last_code(&self) -> Option<String> {
        self.deliveries().last().map(|delivery| delivery.code.clone())
    }
}

impl Notifier for RecordingNotifier {
    fn deliver(&self, destination: &Email, notice: &VerificationNotice) {
        self.deliveries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Delivery {
                destination: destination.clone(),
                code: notice.code().to_owned(),
                body: notice.body().to_owned(),
            });
    }
}

/// A 4-digit code guaranteed to differ from `code`.
#[must_use]
pub fn other_code(code: &str) -> String {
    if code == "1000" { "1001" } else { "1000" }.to_owned()
}

/// Storefront over a fresh in-memory store with no simulated delay.
#[must_use]
pub fn memory_storefront() -> (Storefront<Arc<MemoryStore>>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let storefront = Storefront::new(
        Arc::clone(&store),
        AuthConfig::instant(),
        CheckoutContext::default(),
    );
    (storefront, store)
}

/// The catalog entry used in checkout scenarios.
#[must_use]
pub fn plan_x() -> CatalogEntry {
    CatalogEntry::new("Plan X", "Streaming", "Rp 10.000")
}
