//! Confirmed orders and delivery details.
//!
//! Orders are created locally when the shopper confirms the review step and
//! live only as long as the confirmation view. Nothing here is persisted or
//! sent to the backend.

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use unishop_core::PaymentMethod;

use super::forms::{BillingInfo, ShippingInfo};
use crate::cart::CartSnapshot;

/// Pickup station used when none is configured.
pub const DEFAULT_PICKUP_STATION: &str = "Tech Hub Station";

/// Exclusive upper bound of the numeric part of an order number.
const ORDER_NUMBER_RANGE: u32 = 1_000_000;

/// Human-facing order identifier, e.g. `ORD482913`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Draw a fresh order number from `rng`.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self(format!("ORD{}", rng.random_range(0..ORDER_NUMBER_RANGE)))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Where and when the order can be collected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryDetails {
    pub pickup_station: String,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
}

impl DeliveryDetails {
    /// `2025-03-01 to 2025-03-05`
    #[must_use]
    pub fn date_range(&self) -> String {
        format!(
            "{} to {}",
            self.window_start.format("%Y-%m-%d"),
            self.window_end.format("%Y-%m-%d")
        )
    }
}

impl Default for DeliveryDetails {
    fn default() -> Self {
        Self {
            pickup_station: DEFAULT_PICKUP_STATION.to_string(),
            window_start: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap_or(NaiveDate::MIN),
            window_end: NaiveDate::from_ymd_opt(2025, 3, 5).unwrap_or(NaiveDate::MIN),
        }
    }
}

/// A confirmed order, as shown on the confirmation and invoice view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub order_number: OrderNumber,
    pub placed_at: DateTime<Utc>,
    pub shipping: ShippingInfo,
    /// Present only for card payments.
    pub billing: Option<BillingInfo>,
    pub payment_method: PaymentMethod,
    pub cart: CartSnapshot,
    pub delivery: DeliveryDetails,
}

impl Order {
    /// Invoice lines in display order.
    #[must_use]
    pub fn invoice_lines(&self) -> Vec<(&'static str, String)> {
        let mut lines = vec![
            ("Order Number", self.order_number.to_string()),
            ("Pick-up Station", self.delivery.pickup_station.clone()),
            ("Delivery Date Range", self.delivery.date_range()),
            ("Customer Name", self.shipping.full_name.clone()),
            ("Payment Method", self.payment_method.to_string()),
        ];
        if let Some(billing) = &self.billing {
            lines.push(("Card", format!("ending with {}", billing.card_last_four())));
        }
        lines.push(("Total", self.cart.total_price().to_string()));
        lines
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_order_number_format() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let number = OrderNumber::generate(&mut rng);
            let digits = number.as_str().strip_prefix("ORD").unwrap();
            let value: u32 = digits.parse().unwrap();
            assert!(value < ORDER_NUMBER_RANGE);
        }
    }

    #[test]
    fn test_default_delivery_window() {
        let delivery = DeliveryDetails::default();
        assert_eq!(delivery.pickup_station, "Tech Hub Station");
        assert_eq!(delivery.date_range(), "2025-03-01 to 2025-03-05");
    }
}
