//! Domain models for the storefront.
//!
//! - [`user::UserRecord`] - a registered account as persisted in the store
//! - [`session::Session`] - the signed-in identity

pub mod session;
pub mod user;

pub use session::Session;
pub use user::UserRecord;
