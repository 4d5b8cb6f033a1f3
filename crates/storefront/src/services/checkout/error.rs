//! Checkout error types.

use thiserror::Error;

use rekurstore_core::{PaymentMethod, ValidationError};

use super::CheckoutPhase;
use crate::error::validation_message;
use crate::services::handoff::HandoffError;

/// Errors that can occur while walking through checkout.
///
/// The machine keeps its pre-failure state for every variant.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// A required field is missing.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The settlement table has no entry for the chosen method.
    #[error("no settlement details configured for {0}")]
    Config(PaymentMethod),

    /// Confirmation attempted without the "I have paid" acknowledgment.
    #[error("payment not acknowledged")]
    PaymentNotAcknowledged,

    /// The order was already handed off.
    #[error("order already completed")]
    AlreadyCompleted,

    /// Operation not valid in the current state.
    #[error("cannot {action} while {phase}")]
    InvalidTransition {
        /// What was attempted.
        action: &'static str,
        /// State the machine was in.
        phase: CheckoutPhase,
    },

    /// The hand-off payload could not be built.
    #[error("hand-off failed: {0}")]
    Dispatch(#[from] HandoffError),
}

impl CheckoutError {
    /// Whether the user can correct the input and resubmit.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::PaymentNotAcknowledged)
    }

    /// Inline message shown on the checkout step.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Validation(err) => validation_message(err),
            Self::PaymentNotAcknowledged => "Selesaikan pembayaran terlebih dahulu.",
            Self::AlreadyCompleted => "Pesanan ini sudah dikirim ke admin.",
            Self::Config(_) | Self::Dispatch(_) => {
                "Metode pembayaran tidak tersedia. Silakan hubungi admin."
            }
            Self::InvalidTransition { .. } => "Permintaan tidak valid. Silakan muat ulang.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_not_recoverable() {
        assert!(!CheckoutError::Config(PaymentMethod::Ovo).is_recoverable());
        assert!(!CheckoutError::AlreadyCompleted.is_recoverable());
        assert!(CheckoutError::PaymentNotAcknowledged.is_recoverable());
        assert!(CheckoutError::from(ValidationError::missing("destination")).is_recoverable());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            CheckoutError::Config(PaymentMethod::Ovo).to_string(),
            "no settlement details configured for OVO"
        );
        assert_eq!(
            CheckoutError::InvalidTransition {
                action: "confirm payment",
                phase: CheckoutPhase::Collecting,
            }
            .to_string(),
            "cannot confirm payment while collecting"
        );
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            CheckoutError::from(ValidationError::missing("contact_email")).user_message(),
            "Email dan nomor tujuan wajib diisi"
        );
    }
}
