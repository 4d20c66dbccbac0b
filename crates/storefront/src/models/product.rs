//! Catalog products.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use unishop_core::{Price, ProductId};

use crate::cart::CartItem;

/// Image shown for products the catalog has no picture for.
pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/100";

/// A product from `GET /api/products`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Unit price in the store currency. The backend sends a JSON number.
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Product {
    /// Price formatted in the store currency.
    #[must_use]
    pub fn display_price(&self) -> String {
        Price::store(self.price).to_string()
    }

    /// Build a single-unit cart line for this product.
    #[must_use]
    pub fn to_cart_item(&self) -> CartItem {
        CartItem::new(
            self.id,
            self.name.clone(),
            self.price,
            self.image_url
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_numeric_price() {
        let product: Product =
            serde_json::from_str(r#"{"id":10,"name":"P47 Bluetooth Headphone","price":499}"#)
                .unwrap();
        assert_eq!(product.price, Decimal::new(499, 0));
        assert_eq!(product.display_price(), "Ksh 499.00");
    }

    #[test]
    fn test_to_cart_item_uses_placeholder_image() {
        let product: Product =
            serde_json::from_str(r#"{"id":11,"name":"220 Inverter","price":1500.5}"#).unwrap();
        let item = product.to_cart_item();
        assert_eq!(item.id, ProductId::new(11));
        assert_eq!(item.quantity.get(), 1);
        assert_eq!(item.image, PLACEHOLDER_IMAGE);
        assert_eq!(item.price, Decimal::new(15005, 1));
    }
}
