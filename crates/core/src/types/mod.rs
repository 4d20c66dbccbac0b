//! Core types for Unishop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod payment;
pub mod price;
pub mod quantity;
pub mod role;
pub mod token;

pub use email::{Email, EmailError};
pub use id::*;
pub use payment::{PaymentMethod, UnknownPaymentMethod};
pub use price::{CurrencyCode, Price};
pub use quantity::Quantity;
pub use role::UserRole;
pub use token::AccessToken;
