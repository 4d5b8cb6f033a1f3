//! Checkout service.
//!
//! Walks one purchase through three steps over an in-memory [`OrderDraft`]:
//!
//! ```text
//! Collecting -> AwaitingSettlement -> Completed
//!      ^               |
//!      +-- edit -------+
//! ```
//!
//! Nothing here is persisted. Dropping the machine before `Completed`
//! discards the order with no side effects; reaching `Completed` builds the
//! hand-off payload exactly once.

mod error;
mod settlement;

pub use error::CheckoutError;
pub use settlement::{
    ADMIN_ACCOUNT_NAME, OFFICIAL_ACCOUNT_NAME, QRIS_PAYLOAD, SettlementTable,
};

use std::sync::Arc;

use tracing::{debug, info, instrument};
use uuid::Uuid;

use rekurstore_core::{CatalogEntry, PaymentMethod, SettlementDetail, required};

use crate::services::handoff::{HandoffDispatcher, HandoffPayload, OrderSummary};

/// Shared, read-only collaborators of every checkout.
#[derive(Debug, Clone, Default)]
pub struct CheckoutContext {
    /// Settlement details per payment method.
    pub settlements: SettlementTable,
    /// Formats the confirmed order.
    pub dispatcher: HandoffDispatcher,
}

impl CheckoutContext {
    /// Create a checkout context.
    #[must_use]
    pub const fn new(settlements: SettlementTable, dispatcher: HandoffDispatcher) -> Self {
        Self {
            settlements,
            dispatcher,
        }
    }
}

/// The order being assembled. Lives only as long as its checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    catalog: CatalogEntry,
    contact_email: String,
    destination_id: String,
    payment_method: PaymentMethod,
}

impl OrderDraft {
    /// Product being bought.
    #[must_use]
    pub const fn catalog(&self) -> &CatalogEntry {
        &self.catalog
    }

    /// Buyer's contact email, as typed.
    #[must_use]
    pub fn contact_email(&self) -> &str {
        &self.contact_email
    }

    /// Phone number or customer ID the product is delivered to.
    #[must_use]
    pub fn destination_id(&self) -> &str {
        &self.destination_id
    }

    /// Selected payment method.
    #[must_use]
    pub const fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    fn summary(&self) -> OrderSummary {
        OrderSummary::new(
            &self.catalog,
            self.payment_method,
            self.destination_id.clone(),
            self.contact_email.clone(),
        )
    }
}

/// Where a [`CheckoutMachine`] is, without the state's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckoutPhase {
    Collecting,
    AwaitingSettlement,
    Completed,
}

impl std::fmt::Display for CheckoutPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Collecting => "collecting",
            Self::AwaitingSettlement => "awaiting_settlement",
            Self::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Checkout state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutState {
    /// Details form is open.
    Collecting,
    /// Payment instructions are shown.
    AwaitingSettlement {
        settlement: SettlementDetail,
        paid_acknowledged: bool,
    },
    /// Order handed off.
    Completed { handoff: HandoffPayload },
}

impl CheckoutState {
    /// The state's tag.
    #[must_use]
    pub const fn phase(&self) -> CheckoutPhase {
        match self {
            Self::Collecting => CheckoutPhase::Collecting,
            Self::AwaitingSettlement { .. } => CheckoutPhase::AwaitingSettlement,
            Self::Completed { .. } => CheckoutPhase::Completed,
        }
    }
}

/// One checkout attempt.
#[derive(Debug)]
pub struct CheckoutMachine {
    attempt_id: Uuid,
    context: Arc<CheckoutContext>,
    draft: OrderDraft,
    state: CheckoutState,
}

impl CheckoutMachine {
    /// Start checkout for `catalog`, prefilling the destination typed upstream.
    ///
    /// The payment method starts at the default (QRIS).
    #[must_use]
    pub fn start(
        context: Arc<CheckoutContext>,
        catalog: CatalogEntry,
        prefill_destination: Option<&str>,
    ) -> Self {
        let attempt_id = Uuid::new_v4();
        info!(attempt = %attempt_id, product = %catalog.name, "Checkout started");

        Self {
            attempt_id,
            context,
            draft: OrderDraft {
                catalog,
                contact_email: String::new(),
                destination_id: prefill_destination.unwrap_or_default().trim().to_owned(),
                payment_method: PaymentMethod::default(),
            },
            state: CheckoutState::Collecting,
        }
    }

    /// Identifier used to correlate log events of this attempt.
    #[must_use]
    pub const fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    /// Current order draft.
    #[must_use]
    pub const fn draft(&self) -> &OrderDraft {
        &self.draft
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// Current state's tag.
    #[must_use]
    pub const fn phase(&self) -> CheckoutPhase {
        self.state.phase()
    }

    /// The hand-off payload, once `Completed`.
    #[must_use]
    pub const fn handoff(&self) -> Option<&HandoffPayload> {
        match &self.state {
            CheckoutState::Completed { handoff } => Some(handoff),
            _ => None,
        }
    }

    /// Submit the details form and show payment instructions.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Validation` if the contact email or destination is empty.
    /// Returns `CheckoutError::Config` if `method` has no settlement entry.
    /// Returns `CheckoutError::InvalidTransition` outside `Collecting`.
    #[instrument(skip_all, fields(attempt = %self.attempt_id, method = %method))]
    pub fn submit_details(
        &mut self,
        contact_email: &str,
        destination_id: &str,
        method: PaymentMethod,
    ) -> Result<SettlementDetail, CheckoutError> {
        self.expect_phase(CheckoutPhase::Collecting, "submit details")?;

        let contact_email = required("contact_email", contact_email)?;
        let destination_id = required("destination", destination_id)?;
        let settlement = self
            .context
            .settlements
            .lookup(method)
            .cloned()
            .ok_or(CheckoutError::Config(method))?;

        self.draft.contact_email = contact_email.to_owned();
        self.draft.destination_id = destination_id.to_owned();
        self.draft.payment_method = method;
        self.state = CheckoutState::AwaitingSettlement {
            settlement: settlement.clone(),
            paid_acknowledged: false,
        };

        debug!("Details accepted, awaiting settlement");
        Ok(settlement)
    }

    /// Set or clear the "I have paid" acknowledgment.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidTransition` outside `AwaitingSettlement`.
    pub fn acknowledge_payment(&mut self, paid: bool) -> Result<(), CheckoutError> {
        let action = "acknowledge payment";
        match &mut self.state {
            CheckoutState::AwaitingSettlement {
                paid_acknowledged, ..
            } => {
                *paid_acknowledged = paid;
                Ok(())
            }
            other => Err(CheckoutError::InvalidTransition {
                action,
                phase: other.phase(),
            }),
        }
    }

    /// Go back to the details form.
    ///
    /// Typed fields are kept; the payment method returns to the default.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidTransition` outside `AwaitingSettlement`.
    pub fn edit_details(&mut self) -> Result<(), CheckoutError> {
        self.expect_phase(CheckoutPhase::AwaitingSettlement, "edit details")?;

        self.draft.payment_method = PaymentMethod::default();
        self.state = CheckoutState::Collecting;

        debug!(attempt = %self.attempt_id, "Back to details");
        Ok(())
    }

    /// Confirm payment and build the hand-off payload.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::PaymentNotAcknowledged` until [`acknowledge_payment`](Self::acknowledge_payment)
    /// has been called with `true`.
    /// Returns `CheckoutError::AlreadyCompleted` after a successful confirmation.
    /// Returns `CheckoutError::Dispatch` if the payload cannot be built.
    /// Returns `CheckoutError::InvalidTransition` in `Collecting`.
    #[instrument(skip_all, fields(attempt = %self.attempt_id))]
    pub fn confirm_payment(&mut self) -> Result<HandoffPayload, CheckoutError> {
        match &self.state {
            CheckoutState::Collecting => {
                return Err(CheckoutError::InvalidTransition {
                    action: "confirm payment",
                    phase: CheckoutPhase::Collecting,
                });
            }
            CheckoutState::Completed { .. } => return Err(CheckoutError::AlreadyCompleted),
            CheckoutState::AwaitingSettlement {
                paid_acknowledged: false,
                ..
            } => return Err(CheckoutError::PaymentNotAcknowledged),
            CheckoutState::AwaitingSettlement { .. } => {}
        }

        let handoff = self.context.dispatcher.dispatch(&self.draft.summary())?;
        self.state = CheckoutState::Completed {
            handoff: handoff.clone(),
        };

        info!(
            product = %self.draft.catalog.name,
            method = %self.draft.payment_method,
            channel = %handoff.channel,
            "Order handed off"
        );
        Ok(handoff)
    }

    /// Close checkout. An unconfirmed draft is discarded.
    pub fn cancel(self) {
        debug!(attempt = %self.attempt_id, phase = %self.phase(), "Checkout closed");
    }

    fn expect_phase(&self, phase: CheckoutPhase, action: &'static str) -> Result<(), CheckoutError> {
        if self.phase() == phase {
            Ok(())
        } else {
            Err(CheckoutError::InvalidTransition {
                action,
                phase: self.phase(),
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rekurstore_core::ValidationError;

    use super::*;
    use crate::services::handoff::HandoffChannel;

    fn plan_x() -> CatalogEntry {
        CatalogEntry::new("Plan X", "Streaming", "Rp 10.000")
    }

    fn checkout() -> CheckoutMachine {
        CheckoutMachine::start(Arc::new(CheckoutContext::default()), plan_x(), None)
    }

    #[test]
    fn test_start_seeds_draft() {
        let machine = CheckoutMachine::start(
            Arc::new(CheckoutContext::default()),
            CatalogEntry::new("Pulsa - 10.000", "PPOB", "Rp 11.500"),
            Some(" 081234567890 "),
        );

        assert_eq!(machine.phase(), CheckoutPhase::Collecting);
        assert_eq!(machine.draft().destination_id(), "081234567890");
        assert_eq!(machine.draft().contact_email(), "");
        assert_eq!(machine.draft().payment_method(), PaymentMethod::Qris);
        assert_eq!(machine.draft().catalog().destination_label(), "Nomor / ID");
    }

    #[test]
    fn test_full_flow() {
        let mut machine = checkout();

        let settlement = machine
            .submit_details("b@x.com", "081234567890", PaymentMethod::Qris)
            .unwrap();
        assert_eq!(settlement.account_number_or_qr, QRIS_PAYLOAD);
        assert_eq!(machine.phase(), CheckoutPhase::AwaitingSettlement);

        machine.acknowledge_payment(true).unwrap();
        let payload = machine.confirm_payment().unwrap();

        for needle in ["Plan X", "Rp 10.000", "QRIS", "081234567890", "b@x.com"] {
            assert!(payload.text.contains(needle), "missing {needle}");
        }
        assert_eq!(payload.channel, HandoffChannel::WhatsApp);
        assert_eq!(machine.phase(), CheckoutPhase::Completed);
        assert_eq!(machine.handoff(), Some(&payload));
    }

    #[test]
    fn test_details_validation_keeps_state() {
        let mut machine = checkout();

        let err = machine
            .submit_details("", "0812", PaymentMethod::Qris)
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Validation(ValidationError::MissingField {
                field: "contact_email"
            })
        ));

        let err = machine
            .submit_details("b@x.com", "   ", PaymentMethod::Qris)
            .unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::Validation(ValidationError::MissingField {
                field: "destination"
            })
        ));

        assert_eq!(machine.phase(), CheckoutPhase::Collecting);
        assert_eq!(machine.draft().contact_email(), "");
    }

    #[test]
    fn test_missing_settlement_is_config_error() {
        let context = CheckoutContext::new(
            SettlementTable::empty().with(
                PaymentMethod::Qris,
                SettlementDetail::new(QRIS_PAYLOAD, OFFICIAL_ACCOUNT_NAME),
            ),
            HandoffDispatcher::default(),
        );
        let mut machine = CheckoutMachine::start(Arc::new(context), plan_x(), None);

        let err = machine
            .submit_details("b@x.com", "0812", PaymentMethod::Ovo)
            .unwrap_err();
        assert!(matches!(err, CheckoutError::Config(PaymentMethod::Ovo)));
        assert!(!err.is_recoverable());
        assert_eq!(machine.phase(), CheckoutPhase::Collecting);
    }

    #[test]
    fn test_confirm_before_details_is_rejected() {
        let mut machine = checkout();
        let err = machine.confirm_payment().unwrap_err();
        assert!(matches!(
            err,
            CheckoutError::InvalidTransition {
                phase: CheckoutPhase::Collecting,
                ..
            }
        ));
        assert!(machine.acknowledge_payment(true).is_err());
    }

    #[test]
    fn test_confirm_requires_acknowledgment() {
        let mut machine = checkout();
        machine
            .submit_details("b@x.com", "0812", PaymentMethod::Bca)
            .unwrap();

        let err = machine.confirm_payment().unwrap_err();
        assert!(matches!(err, CheckoutError::PaymentNotAcknowledged));

        machine.acknowledge_payment(true).unwrap();
        machine.acknowledge_payment(false).unwrap();
        assert!(machine.confirm_payment().is_err());
        assert_eq!(machine.phase(), CheckoutPhase::AwaitingSettlement);
    }

    #[test]
    fn test_confirm_fires_once() {
        let mut machine = checkout();
        machine
            .submit_details("b@x.com", "0812", PaymentMethod::Dana)
            .unwrap();
        machine.acknowledge_payment(true).unwrap();

        let first = machine.confirm_payment().unwrap();
        let err = machine.confirm_payment().unwrap_err();
        assert!(matches!(err, CheckoutError::AlreadyCompleted));
        assert_eq!(machine.handoff(), Some(&first));
        assert!(machine.edit_details().is_err());
    }

    #[test]
    fn test_edit_details_keeps_fields_and_resets_method() {
        let mut machine = checkout();
        machine
            .submit_details(" b@x.com ", "0812", PaymentMethod::ShopeePay)
            .unwrap();
        machine.acknowledge_payment(true).unwrap();

        machine.edit_details().unwrap();
        assert_eq!(machine.phase(), CheckoutPhase::Collecting);
        assert_eq!(machine.draft().contact_email(), "b@x.com");
        assert_eq!(machine.draft().destination_id(), "0812");
        assert_eq!(machine.draft().payment_method(), PaymentMethod::Qris);

        machine
            .submit_details("b@x.com", "0812", PaymentMethod::Mandiri)
            .unwrap();
        let err = machine.confirm_payment().unwrap_err();
        assert!(matches!(err, CheckoutError::PaymentNotAcknowledged));
    }
}
