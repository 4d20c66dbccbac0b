//! Domain models for the storefront.
//!
//! These are the shapes exchanged with the backend and kept in storage.

pub mod product;
pub mod session;
pub mod user;

pub use product::Product;
pub use user::UserProfile;
