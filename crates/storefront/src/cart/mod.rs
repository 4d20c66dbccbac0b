//! Cart manager.
//!
//! Holds the shopper's line items and writes the full list through to the
//! key-value store after every mutation. Totals are never stored: call
//! [`CartManager::snapshot`] whenever they are needed.
//!
//! # Invariants
//!
//! - At most one line per product id.
//! - Every quantity is within `1..=10` ([`Quantity`] clamps on every path,
//!   including loading from storage).
//! - Every unit price is positive and at most [`MAX_UNIT_PRICE`].

mod item;

pub use item::{CartItem, CartSnapshot, MAX_UNIT_PRICE};

use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::instrument;

use unishop_core::{ProductId, Quantity};

use crate::error::add_breadcrumb;
use crate::models::session::keys;
use crate::store::{self, KeyValueStore, StoreError};

/// Flat delivery fee charged on non-empty carts, in shillings.
pub const DEFAULT_DELIVERY_FEE: Decimal = Decimal::from_parts(180, 0, 0, false, 0);

/// Errors from cart mutations.
#[derive(Debug, Error)]
pub enum CartError {
    /// An item was offered with a non-positive or out-of-range unit price.
    #[error("product {0} has no valid price")]
    InvalidPrice(ProductId),

    /// The mutation applied but could not be persisted.
    #[error("failed to save cart: {0}")]
    Store(#[from] StoreError),
}

/// The shopper's cart, persisted under [`keys::CART`].
pub struct CartManager {
    store: Arc<dyn KeyValueStore>,
    items: Vec<CartItem>,
    delivery_fee: Decimal,
}

impl std::fmt::Debug for CartManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartManager")
            .field("items", &self.items)
            .field("delivery_fee", &self.delivery_fee)
            .finish_non_exhaustive()
    }
}

impl CartManager {
    /// Load the cart from `store`.
    ///
    /// Missing or unparsable stored data yields an empty cart. Duplicate
    /// lines are merged and lines without a valid price are dropped.
    #[must_use]
    pub fn load(store: Arc<dyn KeyValueStore>, delivery_fee: Decimal) -> Self {
        let stored: Vec<CartItem> = store::read_json(store.as_ref(), keys::CART).unwrap_or_default();

        let mut items: Vec<CartItem> = Vec::with_capacity(stored.len());
        for item in stored {
            if !item.has_valid_price() {
                tracing::warn!(product_id = %item.id, "Dropping stored cart line without a valid price");
                continue;
            }
            match items.iter_mut().find(|existing| existing.id == item.id) {
                Some(existing) => {
                    let merged = i64::from(existing.quantity.get()) + i64::from(item.quantity.get());
                    existing.quantity = Quantity::clamped(merged);
                }
                None => items.push(item),
            }
        }

        tracing::debug!(lines = items.len(), "Cart loaded");
        Self {
            store,
            items,
            delivery_fee,
        }
    }

    /// Current line items, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Line for `id`, if present.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Add one unit of `item`.
    ///
    /// An existing line gains one unit (capped at [`Quantity::MAX`]); a new
    /// product is appended with quantity 1 regardless of `item.quantity`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidPrice` for a price outside
    /// `(0, MAX_UNIT_PRICE]` (the cart is left untouched) or
    /// `CartError::Store` if the write-through fails.
    #[instrument(skip(self, item), fields(product_id = %item.id))]
    pub fn add_item(&mut self, item: CartItem) -> Result<(), CartError> {
        if !item.has_valid_price() {
            return Err(CartError::InvalidPrice(item.id));
        }

        let id = item.id;
        if let Some(existing) = self.items.iter_mut().find(|line| line.id == id) {
            existing.quantity = existing.quantity.incremented();
        } else {
            self.items.push(CartItem {
                quantity: Quantity::ONE,
                ..item
            });
        }

        let product_id = id.to_string();
        add_breadcrumb("cart", "Added item", Some(&[("product_id", product_id.as_str())]));
        self.persist()
    }

    /// Set the quantity of an existing line, clamped to `1..=10`.
    ///
    /// Does nothing if `id` is not in the cart.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the write-through fails.
    #[instrument(skip(self))]
    pub fn set_quantity(&mut self, id: ProductId, requested: i64) -> Result<(), CartError> {
        let Some(line) = self.items.iter_mut().find(|line| line.id == id) else {
            tracing::debug!("Quantity change for product not in cart ignored");
            return Ok(());
        };

        line.quantity = Quantity::clamped(requested);
        let (product_id, quantity) = (id.to_string(), line.quantity.to_string());
        add_breadcrumb(
            "cart",
            "Changed quantity",
            Some(&[("product_id", product_id.as_str()), ("quantity", quantity.as_str())]),
        );
        self.persist()
    }

    /// Remove the line for `id`. Removing an absent id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the write-through fails.
    #[instrument(skip(self))]
    pub fn remove_item(&mut self, id: ProductId) -> Result<(), CartError> {
        let before = self.items.len();
        self.items.retain(|line| line.id != id);
        if self.items.len() == before {
            return Ok(());
        }

        let product_id = id.to_string();
        add_breadcrumb("cart", "Removed item", Some(&[("product_id", product_id.as_str())]));
        self.persist()
    }

    /// Remove every line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Store` if the write-through fails.
    pub fn clear(&mut self) -> Result<(), CartError> {
        self.items.clear();
        add_breadcrumb("cart", "Cleared cart", None);
        self.persist()
    }

    /// Totals for the current items.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        CartSnapshot::compute(&self.items, self.delivery_fee)
    }

    fn persist(&self) -> Result<(), CartError> {
        store::write_json(self.store.as_ref(), keys::CART, &self.items).map_err(|e| {
            tracing::error!(error = %e, "Failed to persist cart");
            CartError::Store(e)
        })
    }
}
