//! RekurStore storefront library.
//!
//! The two protocols behind the storefront's modals, with no server:
//!
//! - [`services::auth`] - registration with a one-time code, login, logout
//! - [`services::checkout`] - order details, payment instructions, confirmation
//! - [`services::handoff`] - the confirmed order as a WhatsApp or email link
//!
//! State that must survive a restart lives in a [`store::KeyValueStore`].
//! [`state::Storefront`] ties them together for a front end.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod store;

pub use config::StorefrontConfig;
pub use error::AppError;
pub use state::{Purchase, Storefront};
