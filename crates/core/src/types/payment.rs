//! Payment methods accepted at checkout and their settlement details.

use serde::{Deserialize, Serialize};

/// How a payment method is settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    /// Scanned QR code, settles automatically.
    Auto,
    /// Manual bank transfer.
    Transfer,
    /// E-wallet transfer to the admin number.
    Ewallet,
}

/// Payment methods offered at checkout.
///
/// The set is closed: every variant has an entry in the default settlement
/// table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    #[default]
    #[serde(rename = "QRIS")]
    Qris,
    #[serde(rename = "BCA")]
    Bca,
    Mandiri,
    #[serde(rename = "BRI")]
    Bri,
    #[serde(rename = "DANA")]
    Dana,
    #[serde(rename = "OVO")]
    Ovo,
    GoPay,
    ShopeePay,
}

impl PaymentMethod {
    /// All methods, in the order they are offered.
    pub const ALL: [Self; 8] = [
        Self::Qris,
        Self::Bca,
        Self::Mandiri,
        Self::Bri,
        Self::Dana,
        Self::Ovo,
        Self::GoPay,
        Self::ShopeePay,
    ];

    /// Short identifier, as it appears in order messages.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Qris => "QRIS",
            Self::Bca => "BCA",
            Self::Mandiri => "Mandiri",
            Self::Bri => "BRI",
            Self::Dana => "DANA",
            Self::Ovo => "OVO",
            Self::GoPay => "GoPay",
            Self::ShopeePay => "ShopeePay",
        }
    }

    /// Human-readable name for selection lists.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bca => "Bank BCA",
            Self::Bri => "Bank BRI",
            other => other.id(),
        }
    }

    /// Settlement kind.
    #[must_use]
    pub const fn kind(self) -> PaymentKind {
        match self {
            Self::Qris => PaymentKind::Auto,
            Self::Bca | Self::Mandiri | Self::Bri => PaymentKind::Transfer,
            Self::Dana | Self::Ovo | Self::GoPay | Self::ShopeePay => PaymentKind::Ewallet,
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Error returned when a string names no known payment method.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown payment method: {0}")]
pub struct UnknownPaymentMethod(pub String);

impl std::str::FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    /// Parses the method id, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|method| method.id().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownPaymentMethod(s.to_owned()))
    }
}

/// Where the buyer sends the money for a given method.
///
/// Static display data, shown verbatim on the payment step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementDetail {
    /// Account number, phone number, or QR payload.
    pub account_number_or_qr: String,
    /// Name the account is registered under.
    pub account_name: String,
}

impl SettlementDetail {
    /// Create a settlement detail.
    #[must_use]
    pub fn new(account_number_or_qr: impl Into<String>, account_name: impl Into<String>) -> Self {
        Self {
            account_number_or_qr: account_number_or_qr.into(),
            account_name: account_name.into(),
        }
    }
}
