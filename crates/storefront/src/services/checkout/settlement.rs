//! Static settlement table: where the buyer sends money for each method.

use std::collections::HashMap;

use rekurstore_core::{PaymentMethod, SettlementDetail};

/// Account holder shown for the QR code and bank accounts.
pub const OFFICIAL_ACCOUNT_NAME: &str = "RekurStore Official";

/// Account holder shown for e-wallet transfers.
pub const ADMIN_ACCOUNT_NAME: &str = "RekurStore Admin";

/// Payload encoded in the QRIS code.
pub const QRIS_PAYLOAD: &str = "RekurstorePayment";

/// Lookup from payment method to settlement details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementTable {
    entries: HashMap<PaymentMethod, SettlementDetail>,
}

impl SettlementTable {
    /// The storefront's table. E-wallets settle to `admin_phone_display`.
    #[must_use]
    pub fn storefront(admin_phone_display: &str) -> Self {
        let ewallet = || SettlementDetail::new(admin_phone_display, ADMIN_ACCOUNT_NAME);

        Self::empty()
            .with(
                PaymentMethod::Qris,
                SettlementDetail::new(QRIS_PAYLOAD, OFFICIAL_ACCOUNT_NAME),
            )
            .with(
                PaymentMethod::Bca,
                SettlementDetail::new("1234-5678-90", OFFICIAL_ACCOUNT_NAME),
            )
            .with(
                PaymentMethod::Mandiri,
                SettlementDetail::new("123-00-0000000-0", OFFICIAL_ACCOUNT_NAME),
            )
            .with(
                PaymentMethod::Bri,
                SettlementDetail::new("0000-01-000000-50-0", OFFICIAL_ACCOUNT_NAME),
            )
            .with(PaymentMethod::Dana, ewallet())
            .with(PaymentMethod::Ovo, ewallet())
            .with(PaymentMethod::GoPay, ewallet())
            .with(PaymentMethod::ShopeePay, ewallet())
    }

    /// A table with no entries.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Add or replace the entry for `method`.
    #[must_use]
    pub fn with(mut self, method: PaymentMethod, detail: SettlementDetail) -> Self {
        self.entries.insert(method, detail);
        self
    }

    /// Settlement details for `method`, if configured.
    #[must_use]
    pub fn lookup(&self, method: PaymentMethod) -> Option<&SettlementDetail> {
        self.entries.get(&method)
    }
}

impl Default for SettlementTable {
    fn default() -> Self {
        Self::storefront("0899-5942-945")
    }
}
