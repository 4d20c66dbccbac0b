//! Shipping and billing forms.

use serde::{Deserialize, Serialize};

use crate::validation::FieldErrors;

/// Fields of the shipping address form, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShippingField {
    FullName,
    Address,
    City,
    PostalCode,
    Country,
}

impl ShippingField {
    pub const ALL: [Self; 5] = [
        Self::FullName,
        Self::Address,
        Self::City,
        Self::PostalCode,
        Self::Country,
    ];

    /// Wire name used as the error key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::FullName => "fullName",
            Self::Address => "address",
            Self::City => "city",
            Self::PostalCode => "postalCode",
            Self::Country => "country",
        }
    }

    /// Label shown next to the input.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::FullName => "Full Name",
            Self::Address => "Address",
            Self::City => "City",
            Self::PostalCode => "Postal Code",
            Self::Country => "Country",
        }
    }
}

/// Fields of the card billing form, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BillingField {
    NameOnCard,
    CardNumber,
    Expiry,
    Cvv,
}

impl BillingField {
    pub const ALL: [Self; 4] = [Self::NameOnCard, Self::CardNumber, Self::Expiry, Self::Cvv];

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::NameOnCard => "nameOnCard",
            Self::CardNumber => "cardNumber",
            Self::Expiry => "expiry",
            Self::Cvv => "cvv",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NameOnCard => "Name on Card",
            Self::CardNumber => "Card Number",
            Self::Expiry => "Expiry",
            Self::Cvv => "CVV",
        }
    }
}

/// Shipping address. Every field is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

impl ShippingInfo {
    #[must_use]
    pub fn get(&self, field: ShippingField) -> &str {
        match field {
            ShippingField::FullName => &self.full_name,
            ShippingField::Address => &self.address,
            ShippingField::City => &self.city,
            ShippingField::PostalCode => &self.postal_code,
            ShippingField::Country => &self.country,
        }
    }

    pub fn set(&mut self, field: ShippingField, value: impl Into<String>) {
        let slot = match field {
            ShippingField::FullName => &mut self.full_name,
            ShippingField::Address => &mut self.address,
            ShippingField::City => &mut self.city,
            ShippingField::PostalCode => &mut self.postal_code,
            ShippingField::Country => &mut self.country,
        };
        *slot = value.into();
    }

    /// One "`<Label>` is required" error per blank field.
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for field in ShippingField::ALL {
            if self.get(field).trim().is_empty() {
                errors.insert(field.key(), format!("{} is required", field.label()));
            }
        }
        errors
    }
}

/// Card details, collected only for [`unishop_core::PaymentMethod::BankCard`].
///
/// `Debug` masks the card number and omits the CVV.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct BillingInfo {
    pub name_on_card: String,
    pub card_number: String,
    pub expiry: String,
    pub cvv: String,
}

impl BillingInfo {
    #[must_use]
    pub fn get(&self, field: BillingField) -> &str {
        match field {
            BillingField::NameOnCard => &self.name_on_card,
            BillingField::CardNumber => &self.card_number,
            BillingField::Expiry => &self.expiry,
            BillingField::Cvv => &self.cvv,
        }
    }

    pub fn set(&mut self, field: BillingField, value: impl Into<String>) {
        let slot = match field {
            BillingField::NameOnCard => &mut self.name_on_card,
            BillingField::CardNumber => &mut self.card_number,
            BillingField::Expiry => &mut self.expiry,
            BillingField::Cvv => &mut self.cvv,
        };
        *slot = value.into();
    }

    /// One "`<Label>` is required" error per blank field.
    #[must_use]
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for field in BillingField::ALL {
            if self.get(field).trim().is_empty() {
                errors.insert(field.key(), format!("{} is required", field.label()));
            }
        }
        errors
    }

    /// Last four digits of the card number, ignoring spaces and dashes.
    #[must_use]
    pub fn card_last_four(&self) -> String {
        let digits: Vec<char> = self
            .card_number
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        let skip = digits.len().saturating_sub(4);
        digits.into_iter().skip(skip).collect()
    }
}

impl std::fmt::Debug for BillingInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BillingInfo")
            .field("name_on_card", &self.name_on_card)
            .field("card_number", &format_args!("****{}", self.card_last_four()))
            .field("expiry", &self.expiry)
            .finish_non_exhaustive()
    }
}
