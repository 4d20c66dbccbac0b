//! Saved-for-later products.
//!
//! The wishlist lives only for the current process; it is not persisted.

use unishop_core::ProductId;

use crate::cart::{CartError, CartManager};
use crate::models::Product;

/// Products the shopper has saved, in the order they were added.
#[derive(Debug, Clone, Default)]
pub struct Wishlist {
    items: Vec<Product>,
}

impl Wishlist {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn items(&self) -> &[Product] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.items.iter().any(|product| product.id == id)
    }

    /// Save `product`. Adding one already saved is a no-op.
    pub fn add(&mut self, product: Product) {
        if !self.contains(product.id) {
            self.items.push(product);
        }
    }

    /// Drop `id` if saved. Returns the removed product.
    pub fn remove(&mut self, id: ProductId) -> Option<Product> {
        let index = self.items.iter().position(|product| product.id == id)?;
        Some(self.items.remove(index))
    }

    /// Add `id` to `cart` and drop it from the wishlist.
    ///
    /// Returns `Ok(false)` if `id` is not on the wishlist.
    ///
    /// # Errors
    ///
    /// Returns the [`CartError`] if the cart refuses the product; the
    /// product then stays on the wishlist.
    pub fn move_to_cart(&mut self, id: ProductId, cart: &mut CartManager) -> Result<bool, CartError> {
        let Some(product) = self.items.iter().find(|product| product.id == id) else {
            return Ok(false);
        };
        cart.add_item(product.to_cart_item())?;
        self.remove(id);
        Ok(true)
    }
}
