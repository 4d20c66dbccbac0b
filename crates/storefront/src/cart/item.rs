//! Cart line items and the derived cart snapshot.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use unishop_core::{Price, ProductId, Quantity};

/// Highest unit price the cart accepts, in shillings.
pub const MAX_UNIT_PRICE: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// One product entry in the cart.
///
/// Serialized exactly as the stored cart list: `id`, `name`, `price` (JSON
/// number), `quantity`, `image`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    /// Unit price in the store currency.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub quantity: Quantity,
    #[serde(default)]
    pub image: String,
}

impl CartItem {
    /// A single-unit line.
    #[must_use]
    pub fn new(id: ProductId, name: impl Into<String>, price: Decimal, image: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            quantity: Quantity::ONE,
            image: image.into(),
        }
    }

    /// Whether the unit price is within `(0, MAX_UNIT_PRICE]`.
    #[must_use]
    pub fn has_valid_price(&self) -> bool {
        self.price > Decimal::ZERO && self.price <= MAX_UNIT_PRICE
    }

    /// Unit price times quantity. Saturates instead of overflowing.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity.get()))
    }
}

/// Derived view of the cart. Computed on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSnapshot {
    pub items: Vec<CartItem>,
    /// Total units across all lines.
    pub item_count: u32,
    pub subtotal: Decimal,
    /// Flat fee, charged only when the cart has items.
    pub delivery_fee: Decimal,
    pub total: Decimal,
}

impl CartSnapshot {
    /// Compute totals for `items` with the given flat delivery fee.
    #[must_use]
    pub fn compute(items: &[CartItem], flat_delivery_fee: Decimal) -> Self {
        let subtotal = items
            .iter()
            .map(CartItem::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add);
        let delivery_fee = if items.is_empty() {
            Decimal::ZERO
        } else {
            flat_delivery_fee
        };
        let item_count = items.iter().map(|item| u32::from(item.quantity.get())).sum();

        Self {
            items: items.to_vec(),
            item_count,
            subtotal,
            delivery_fee,
            total: subtotal.saturating_add(delivery_fee),
        }
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn subtotal_price(&self) -> Price {
        Price::store(self.subtotal)
    }

    #[must_use]
    pub fn delivery_fee_price(&self) -> Price {
        Price::store(self.delivery_fee)
    }

    #[must_use]
    pub fn total_price(&self) -> Price {
        Price::store(self.total)
    }
}
