//! Payment methods offered at checkout.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Payment method chosen in the checkout wizard.
///
/// Only [`PaymentMethod::BankCard`] requires billing details; every other
/// method goes straight from method selection to review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    #[serde(rename = "Bank Card")]
    BankCard,
    #[serde(rename = "Mpesa")]
    Mpesa,
    #[serde(rename = "PayPal")]
    PayPal,
    #[default]
    #[serde(rename = "Simulated Payment")]
    Simulated,
}

/// Returned when parsing an unrecognised payment method label.
#[derive(Debug, Clone, Error)]
#[error("unknown payment method: {0}")]
pub struct UnknownPaymentMethod(pub String);

impl PaymentMethod {
    /// All methods, in the order they are offered.
    pub const ALL: [Self; 4] = [Self::BankCard, Self::Mpesa, Self::PayPal, Self::Simulated];

    /// Human-readable label, as shown to the shopper.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BankCard => "Bank Card",
            Self::Mpesa => "Mpesa",
            Self::PayPal => "PayPal",
            Self::Simulated => "Simulated Payment",
        }
    }

    /// Whether this method needs card billing details.
    #[must_use]
    pub const fn requires_billing(self) -> bool {
        matches!(self, Self::BankCard)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = UnknownPaymentMethod;

    /// Accepts the display label or a compact slug (`bank-card`, `mpesa`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "bankcard" | "card" => Ok(Self::BankCard),
            "mpesa" => Ok(Self::Mpesa),
            "paypal" => Ok(Self::PayPal),
            "simulatedpayment" | "simulated" => Ok(Self::Simulated),
            _ => Err(UnknownPaymentMethod(s.to_string())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_only_bank_card_requires_billing() {
        let billing: Vec<_> = PaymentMethod::ALL
            .iter()
            .filter(|m| m.requires_billing())
            .collect();
        assert_eq!(billing, vec![&PaymentMethod::BankCard]);
    }

    #[test]
    fn test_parse_labels_and_slugs() {
        assert_eq!("Bank Card".parse::<PaymentMethod>().unwrap(), PaymentMethod::BankCard);
        assert_eq!("bank-card".parse::<PaymentMethod>().unwrap(), PaymentMethod::BankCard);
        assert_eq!("MPESA".parse::<PaymentMethod>().unwrap(), PaymentMethod::Mpesa);
        assert_eq!("simulated".parse::<PaymentMethod>().unwrap(), PaymentMethod::Simulated);
        assert!("cash".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_serializes_as_label() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Simulated).unwrap(),
            "\"Simulated Payment\""
        );
    }
}
