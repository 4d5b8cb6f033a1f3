//! RekurStore Core - Shared types library.
//!
//! This crate provides common types used across all RekurStore components:
//! - `storefront` - Credential, session and checkout protocols
//! - `cli` - Terminal front end driving those protocols
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no persistence,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Validated emails, payment methods, settlement details and catalog entries

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
