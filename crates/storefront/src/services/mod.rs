//! Business logic services for the storefront.
//!
//! # Services
//!
//! - `auth` - Account operations (sign in/up/out, profile, deletion, password reset)

pub mod auth;

pub use auth::{AuthError, AuthService, RegistrationForm};
