//! Hand-off of a confirmed order to a human-operated channel.
//!
//! Formatting only: the dispatcher turns an [`OrderSummary`] into message
//! text plus a deep link. Opening the link is up to the front end.

use std::str::FromStr;

use thiserror::Error;
use url::Url;

use rekurstore_core::{CatalogEntry, PaymentMethod};

/// Errors that can occur while building a hand-off payload.
#[derive(Debug, Error)]
pub enum HandoffError {
    /// The configured recipient produced an unparseable link.
    #[error("invalid hand-off target: {0}")]
    InvalidTarget(#[from] url::ParseError),
}

/// Where the order confirmation is sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HandoffChannel {
    /// `wa.me` deep link with the message pre-filled.
    #[default]
    WhatsApp,
    /// `mailto:` link with subject and body pre-filled.
    Email,
}

impl HandoffChannel {
    /// Configuration name of the channel.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::WhatsApp => "whatsapp",
            Self::Email => "email",
        }
    }
}

impl std::fmt::Display for HandoffChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HandoffChannel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "whatsapp" | "wa" => Ok(Self::WhatsApp),
            "email" | "mail" => Ok(Self::Email),
            other => Err(format!("unknown hand-off channel: {other}")),
        }
    }
}

/// Fixed recipients of hand-off messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffRecipients {
    /// WhatsApp number in international form without `+`, e.g. `628995942945`.
    pub whatsapp_phone: String,
    /// Address for the email channel.
    pub email: String,
}

impl Default for HandoffRecipients {
    fn default() -> Self {
        Self {
            whatsapp_phone: "628995942945".to_owned(),
            email: "admin@rekurstore.id".to_owned(),
        }
    }
}

/// Everything the admin needs to fulfil an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub product: String,
    pub category: String,
    pub price: String,
    pub method: PaymentMethod,
    pub destination_id: String,
    pub contact_email: String,
}

impl OrderSummary {
    /// Summarize a purchase of `entry`.
    #[must_use]
    pub fn new(
        entry: &CatalogEntry,
        method: PaymentMethod,
        destination_id: impl Into<String>,
        contact_email: impl Into<String>,
    ) -> Self {
        Self {
            product: entry.name.clone(),
            category: entry.category.clone(),
            price: entry.unit_price.clone(),
            method,
            destination_id: destination_id.into(),
            contact_email: contact_email.into(),
        }
    }
}

/// Message text shared by every channel.
#[must_use]
pub fn order_message(summary: &OrderSummary) -> String {
    format!(
        "Halo Admin *RekurStore Official* 👋,\n\n\
         Saya ingin konfirmasi pembayaran pesanan baru:\n\n\
         📦 *DETAIL PESANAN*\n\
         • Produk: {product}\n\
         • Kategori: {category}\n\
         • Harga: {price}\n\
         • Pembayaran via: {method}\n\n\
         👤 *DATA PELANGGAN*\n\
         • ID/Tujuan: {destination}\n\
         • Email: {email}\n\n\
         Mohon diproses. Terima kasih!",
        product = summary.product,
        category = summary.category,
        price = summary.price,
        method = summary.method.id(),
        destination = summary.destination_id,
        email = summary.contact_email,
    )
}

/// Subject line for the email channel.
#[must_use]
pub fn order_subject(summary: &OrderSummary) -> String {
    format!("Konfirmasi Pembayaran - {}", summary.product)
}

/// A formatted hand-off, ready for the front end to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandoffPayload {
    /// Plain message text.
    pub text: String,
    /// Channel the target link belongs to.
    pub channel: HandoffChannel,
    /// Deep link with the text pre-filled.
    pub target: Url,
}

/// Builds hand-off payloads for a configured channel and recipients.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandoffDispatcher {
    channel: HandoffChannel,
    recipients: HandoffRecipients,
}

impl HandoffDispatcher {
    /// Create a dispatcher.
    #[must_use]
    pub const fn new(channel: HandoffChannel, recipients: HandoffRecipients) -> Self {
        Self {
            channel,
            recipients,
        }
    }

    /// Configured channel.
    #[must_use]
    pub const fn channel(&self) -> HandoffChannel {
        self.channel
    }

    /// Configured recipients.
    #[must_use]
    pub const fn recipients(&self) -> &HandoffRecipients {
        &self.recipients
    }

    /// Build the payload for the configured channel.
    ///
    /// # Errors
    ///
    /// Returns `HandoffError::InvalidTarget` if the recipient makes an invalid link.
    pub fn dispatch(&self, summary: &OrderSummary) -> Result<HandoffPayload, HandoffError> {
        self.dispatch_to(self.channel, summary)
    }

    /// Build the payload for a specific channel.
    ///
    /// # Errors
    ///
    /// Returns `HandoffError::InvalidTarget` if the recipient makes an invalid link.
    pub fn dispatch_to(
        &self,
        channel: HandoffChannel,
        summary: &OrderSummary,
    ) -> Result<HandoffPayload, HandoffError> {
        let text = order_message(summary);

        let target = match channel {
            HandoffChannel::WhatsApp => Url::parse(&format!(
                "https://wa.me/{}?text={}",
                self.recipients.whatsapp_phone,
                urlencoding::encode(&text)
            ))?,
            HandoffChannel::Email => Url::parse(&format!(
                "mailto:{}?subject={}&body={}",
                self.recipients.email,
                urlencoding::encode(&order_subject(summary)),
                urlencoding::encode(&text)
            ))?,
        };

        Ok(HandoffPayload {
            text,
            channel,
            target,
        })
    }
}
