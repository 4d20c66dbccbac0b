//! Unishop Storefront library.
//!
//! Client-side storefront state for Unishop: the cart, the checkout wizard,
//! the signed-in session, and a typed client for the backend REST API.
//!
//! # Architecture
//!
//! - [`store`] - key-value persistence behind a trait (memory or files)
//! - [`cart`] - cart line items with write-through persistence
//! - [`checkout`] - the checkout step machine and order confirmation
//! - [`session`] - the explicitly owned user/token context
//! - [`api`] - async REST client for auth, profile, upload and catalog
//! - [`services`] - account operations tying the API to the session
//!
//! Cart, checkout and session are synchronous and single-owner. Only the
//! [`api`] client is async.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod session;
pub mod store;
pub mod validation;
pub mod wishlist;
