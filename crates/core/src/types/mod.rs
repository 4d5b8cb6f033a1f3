//! Core types for RekurStore.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod email;
pub mod payment;
pub mod validation;

pub use catalog::CatalogEntry;
pub use email::{Email, EmailError, normalize_email};
pub use payment::{PaymentKind, PaymentMethod, SettlementDetail, UnknownPaymentMethod};
pub use validation::{ValidationError, required};
