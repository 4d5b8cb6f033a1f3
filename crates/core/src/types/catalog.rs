//! Catalog entry consumed by checkout.
//!
//! The catalog itself (names, prices, icons) lives in the presentation layer.
//! Checkout only needs the three fields below, passed through unchanged.

use serde::{Deserialize, Serialize};

/// A product the buyer clicked "buy" on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Product name, e.g. "Pulsa - 10.000".
    pub name: String,
    /// Category, e.g. "PPOB" or "Streaming".
    pub category: String,
    /// Display price, e.g. "Rp 10.000". Never parsed.
    pub unit_price: String,
}

impl CatalogEntry {
    /// Category used for prepaid top-ups.
    pub const PPOB: &'static str = "PPOB";

    /// Create a catalog entry.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        unit_price: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            unit_price: unit_price.into(),
        }
    }

    /// Whether this is a prepaid top-up rather than a subscription.
    #[must_use]
    pub fn is_ppob(&self) -> bool {
        self.category == Self::PPOB
    }

    /// Label for the destination field: top-ups go to a number or customer ID,
    /// subscriptions are delivered over WhatsApp.
    #[must_use]
    pub fn destination_label(&self) -> &'static str {
        if self.is_ppob() { "Nomor / ID" } else { "WhatsApp" }
    }
}
