//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Registration, login and code verification
//! - `checkout` - The three-step purchase flow and settlement table
//! - `handoff` - Order confirmation as a deep link

pub mod auth;
pub mod checkout;
pub mod handoff;
