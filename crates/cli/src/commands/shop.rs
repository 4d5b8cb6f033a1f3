//! Shopping commands: buy, payment-methods.
//!
//! # Usage
//!
//! ```bash
//! # Buy a subscription, prompting for anything not given
//! rekur buy --product "Netflix Premium 1 Bulan" --category Streaming --price "Rp 45.000"
//!
//! # Top up a phone number with a bank transfer
//! rekur buy --product "Pulsa - 10.000" --category PPOB --price "Rp 11.500" \
//!     --destination 081234567890 --method BCA
//!
//! # List payment methods and where to send the money
//! rekur payment-methods
//! ```

use rekurstore_core::{CatalogEntry, PaymentKind, PaymentMethod, SettlementDetail};
use rekurstore_storefront::Purchase;
use rekurstore_storefront::services::checkout::{CheckoutContext, CheckoutError, CheckoutMachine};
use rekurstore_storefront::services::handoff::HandoffPayload;

use super::account::{sign_in, sign_up};
use super::{App, CommandError, open_storefront};
use crate::ui::{self, TerminalNotifier};

/// Order details given on the command line.
#[derive(Debug, Default)]
pub struct BuyArgs {
    pub destination: Option<String>,
    pub contact_email: Option<String>,
    pub method: Option<PaymentMethod>,
}

/// Buy a catalog entry.
///
/// Signs in first if needed, then walks through details, payment
/// instructions and confirmation, and prints the hand-off link.
///
/// # Errors
///
/// Returns `CommandError` on a non-recoverable failure or Ctrl-C.
pub async fn buy(entry: CatalogEntry, args: BuyArgs) -> Result<(), CommandError> {
    let mut app = open_storefront()?;
    let mut checkout = start_checkout(&mut app, &entry, args.destination.as_deref()).await?;

    ui::header("Detail Pesanan");
    ui::key_value("Produk", &entry.name);
    ui::key_value("Kategori", &entry.category);
    ui::key_value("Harga", &entry.unit_price);

    let default_email = app.current_user().map(|email| email.as_str().to_owned());
    let mut contact_email = args.contact_email.or(default_email);
    let mut method = args.method;
    let mut needs_details = true;

    let handoff = loop {
        if needs_details {
            let settlement = collect_details(&mut checkout, contact_email.take(), method.take())?;
            show_settlement(checkout.draft().payment_method(), &settlement);
            needs_details = false;
        }

        let choice = ui::select(
            "Pembayaran",
            &["Saya sudah bayar", "Ubah data pesanan", "Batal"],
            0,
        )?;
        match choice {
            0 => {
                let paid = ui::confirm(
                    "Saya menyatakan sudah melakukan pembayaran sesuai nominal",
                    false,
                )?;
                match settle(&mut checkout, paid) {
                    Ok(Some(handoff)) => break handoff,
                    Ok(None) => {
                        ui::warning("Pesanan baru dikirim setelah pembayaran dikonfirmasi.");
                    }
                    Err(e) if e.is_recoverable() => ui::error(e.user_message()),
                    Err(e) => return Err(e.into()),
                }
            }
            1 => {
                contact_email = Some(checkout.draft().contact_email().to_owned());
                checkout.edit_details()?;
                needs_details = true;
            }
            _ => {
                checkout.cancel();
                return Err(CommandError::Cancelled);
            }
        }
    };

    ui::success("Pesanan siap dikirim ke admin");
    ui::separator();
    ui::block(&handoff.text);
    ui::separator();
    ui::key_value("Buka", handoff.target.as_str());
    Ok(())
}

/// Record the payment acknowledgment and confirm once it is given.
///
/// Returns `Ok(None)` when the user has not paid yet; the checkout stays
/// awaiting settlement.
fn settle(
    checkout: &mut CheckoutMachine,
    paid: bool,
) -> Result<Option<HandoffPayload>, CheckoutError> {
    checkout.acknowledge_payment(paid)?;
    if !paid {
        return Ok(None);
    }
    checkout.confirm_payment().map(Some)
}

/// List payment methods with their settlement details.
///
/// # Errors
///
/// Returns `CommandError` if the configuration is invalid.
pub fn payment_methods() -> Result<(), CommandError> {
    let app = open_storefront()?;
    print_methods(app.checkout_context());
    Ok(())
}

fn print_methods(context: &CheckoutContext) {
    ui::header("Metode Pembayaran");
    for method in PaymentMethod::ALL {
        match context.settlements.lookup(method) {
            Some(detail) => ui::key_value(
                method.label(),
                &format!(
                    "{} a.n. {} ({})",
                    detail.account_number_or_qr,
                    detail.account_name,
                    kind_label(method.kind())
                ),
            ),
            None => ui::key_value(method.label(), "tidak tersedia"),
        }
    }
}

/// Get to a checkout, signing in first if the storefront has no session.
async fn start_checkout(
    app: &mut App,
    entry: &CatalogEntry,
    prefill_destination: Option<&str>,
) -> Result<CheckoutMachine, CommandError> {
    loop {
        match app.begin_purchase(entry.clone(), prefill_destination, TerminalNotifier) {
            Purchase::Checkout(checkout) => return Ok(checkout),
            Purchase::SignInRequired(machine) => {
                ui::info("Silakan login terlebih dahulu untuk membeli.");
                let choice = ui::select("Akun", &["Masuk", "Daftar akun baru"], 0)?;
                let machine = if choice == 0 {
                    sign_in(machine, None).await?
                } else {
                    sign_up(machine, None).await?
                };
                app.finish_auth(machine);
            }
        }
    }
}

/// Prompt for details until the machine accepts them.
fn collect_details(
    checkout: &mut CheckoutMachine,
    mut contact_email: Option<String>,
    mut method: Option<PaymentMethod>,
) -> Result<SettlementDetail, CommandError> {
    let label = checkout.draft().catalog().destination_label();

    loop {
        let email = match contact_email.take() {
            Some(email) => ui::input_with_default("Email", &email)?,
            None => ui::input("Email")?,
        };
        let destination = match checkout.draft().destination_id() {
            "" => ui::input(label)?,
            prefilled => ui::input_with_default(label, prefilled)?,
        };
        let method = match method.take() {
            Some(method) => method,
            None => pick_method()?,
        };

        match checkout.submit_details(&email, &destination, method) {
            Ok(settlement) => return Ok(settlement),
            Err(e) if e.is_recoverable() => {
                ui::error(e.user_message());
                contact_email = Some(email);
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn pick_method() -> Result<PaymentMethod, CommandError> {
    let labels: Vec<&str> = PaymentMethod::ALL.iter().map(|m| m.label()).collect();
    let index = ui::select("Metode pembayaran", &labels, 0)?;
    Ok(PaymentMethod::ALL
        .get(index)
        .copied()
        .unwrap_or_default())
}

fn show_settlement(method: PaymentMethod, settlement: &SettlementDetail) {
    ui::header(&format!("Pembayaran via {}", method.label()));
    match method.kind() {
        PaymentKind::Auto => {
            ui::info("Scan QRIS berikut:");
            ui::qr_code(&settlement.account_number_or_qr);
        }
        PaymentKind::Transfer => {
            ui::key_value("No. Rekening", &settlement.account_number_or_qr);
        }
        PaymentKind::Ewallet => {
            ui::key_value("Nomor", &settlement.account_number_or_qr);
        }
    }
    ui::key_value("Atas nama", &settlement.account_name);
}

const fn kind_label(kind: PaymentKind) -> &'static str {
    match kind {
        PaymentKind::Auto => "otomatis",
        PaymentKind::Transfer => "transfer bank",
        PaymentKind::Ewallet => "e-wallet",
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use rekurstore_storefront::services::checkout::CheckoutPhase;

    use super::*;

    fn awaiting_settlement() -> CheckoutMachine {
        let entry = CatalogEntry::new("Plan X", "Streaming", "Rp 10.000");
        let mut checkout =
            CheckoutMachine::start(Arc::new(CheckoutContext::default()), entry, None);
        checkout
            .submit_details("b@x.com", "0812", PaymentMethod::Qris)
            .unwrap();
        checkout
    }

    #[test]
    fn test_declining_payment_keeps_the_order() {
        let mut checkout = awaiting_settlement();

        assert!(settle(&mut checkout, false).unwrap().is_none());
        assert!(settle(&mut checkout, false).unwrap().is_none());
        assert_eq!(checkout.phase(), CheckoutPhase::AwaitingSettlement);
        assert!(checkout.handoff().is_none());

        let handoff = settle(&mut checkout, true).unwrap().unwrap();
        assert!(handoff.text.contains("Plan X"));
        assert_eq!(checkout.phase(), CheckoutPhase::Completed);
    }

    #[test]
    fn test_settle_after_completion_is_rejected() {
        let mut checkout = awaiting_settlement();
        settle(&mut checkout, true).unwrap();

        let err = settle(&mut checkout, true).unwrap_err();
        assert!(!err.is_recoverable());
    }
}
