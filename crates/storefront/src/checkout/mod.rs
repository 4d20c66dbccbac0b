//! Multi-step checkout.
//!
//! The wizard takes a [`CartSnapshot`] at entry and never touches the cart
//! again. It walks `Shipping → PaymentMethod → [Billing] → Review` with
//! per-step validation and ends in the terminal `Confirmed` state holding
//! the locally generated [`Order`].

mod forms;
mod order;
mod step;

pub use forms::{BillingField, BillingInfo, ShippingField, ShippingInfo};
pub use order::{DEFAULT_PICKUP_STATION, DeliveryDetails, Order, OrderNumber};
pub use step::CheckoutStep;

use chrono::Utc;
use rand::Rng;
use thiserror::Error;
use tracing::instrument;

use unishop_core::PaymentMethod;

use crate::cart::CartSnapshot;
use crate::error::add_breadcrumb;
use crate::validation::FieldErrors;

/// Checkout failures. All of them leave the wizard usable.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Your cart is empty")]
    EmptyCart,

    #[error("{0}")]
    Validation(FieldErrors),

    #[error("Cannot {action} from the {step} step")]
    InvalidTransition {
        step: &'static str,
        action: &'static str,
    },
}

impl CheckoutError {
    const fn invalid(step: &CheckoutStep, action: &'static str) -> Self {
        Self::InvalidTransition {
            step: step.name(),
            action,
        }
    }
}

/// What the review step shows before confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSummary {
    pub shipping: ShippingInfo,
    pub payment_method: PaymentMethod,
    /// Only for card payments.
    pub card_last_four: Option<String>,
    pub delivery: DeliveryDetails,
    pub cart: CartSnapshot,
}

/// Checkout step machine.
#[derive(Debug, Clone)]
pub struct CheckoutWizard {
    step: CheckoutStep,
    cart: CartSnapshot,
    delivery: DeliveryDetails,
    shipping: ShippingInfo,
    billing: BillingInfo,
    payment_method: PaymentMethod,
    errors: FieldErrors,
}

impl CheckoutWizard {
    /// Start checkout for `cart` in the shipping step.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::EmptyCart`] if the cart has no lines.
    pub fn new(cart: CartSnapshot, delivery: DeliveryDetails) -> Result<Self, CheckoutError> {
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        add_breadcrumb("checkout", "Started checkout", None);
        Ok(Self {
            step: CheckoutStep::Shipping,
            cart,
            delivery,
            shipping: ShippingInfo::default(),
            billing: BillingInfo::default(),
            payment_method: PaymentMethod::default(),
            errors: FieldErrors::new(),
        })
    }

    #[must_use]
    pub const fn step(&self) -> &CheckoutStep {
        &self.step
    }

    #[must_use]
    pub const fn cart(&self) -> &CartSnapshot {
        &self.cart
    }

    #[must_use]
    pub const fn delivery(&self) -> &DeliveryDetails {
        &self.delivery
    }

    #[must_use]
    pub const fn shipping(&self) -> &ShippingInfo {
        &self.shipping
    }

    #[must_use]
    pub const fn billing(&self) -> &BillingInfo {
        &self.billing
    }

    #[must_use]
    pub const fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Pending validation errors for the current step.
    #[must_use]
    pub const fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// The confirmed order, once checkout is complete.
    #[must_use]
    pub fn order(&self) -> Option<&Order> {
        match &self.step {
            CheckoutStep::Confirmed(order) => Some(order),
            _ => None,
        }
    }

    /// Edit a shipping field and drop its pending error.
    pub fn set_shipping_field(&mut self, field: ShippingField, value: impl Into<String>) {
        self.shipping.set(field, value);
        self.errors.clear_field(field.key());
    }

    /// Edit a billing field and drop its pending error.
    pub fn set_billing_field(&mut self, field: BillingField, value: impl Into<String>) {
        self.billing.set(field, value);
        self.errors.clear_field(field.key());
    }

    /// Choose how to pay.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidTransition`] outside the payment
    /// method step.
    pub fn set_payment_method(&mut self, method: PaymentMethod) -> Result<(), CheckoutError> {
        if self.step != CheckoutStep::PaymentMethod {
            return Err(CheckoutError::invalid(&self.step, "choose a payment method"));
        }
        self.payment_method = method;
        Ok(())
    }

    /// Validate the current step and advance.
    ///
    /// On validation failure the wizard stays put and the errors are both
    /// kept on the wizard and returned.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Validation`] when the current form is
    /// incomplete, or [`CheckoutError::InvalidTransition`] from review or
    /// confirmed.
    #[instrument(skip(self), fields(step = self.step.name()))]
    pub fn next(&mut self) -> Result<&CheckoutStep, CheckoutError> {
        let errors = match self.step {
            CheckoutStep::Shipping => self.shipping.validate(),
            CheckoutStep::Billing => self.billing.validate(),
            _ => FieldErrors::new(),
        };
        if !errors.is_empty() {
            tracing::debug!(fields = errors.len(), "Checkout step incomplete");
            self.errors = errors.clone();
            return Err(CheckoutError::Validation(errors));
        }

        let next = self
            .step
            .forward(self.payment_method)
            .ok_or_else(|| CheckoutError::invalid(&self.step, "continue"))?;
        self.enter(next);
        Ok(&self.step)
    }

    /// Go back one step, honoring the billing skip.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidTransition`] from shipping or
    /// confirmed.
    pub fn back(&mut self) -> Result<&CheckoutStep, CheckoutError> {
        let previous = self
            .step
            .backward(self.payment_method)
            .ok_or_else(|| CheckoutError::invalid(&self.step, "go back"))?;
        self.enter(previous);
        Ok(&self.step)
    }

    /// Data shown on the review step.
    #[must_use]
    pub fn review(&self) -> ReviewSummary {
        ReviewSummary {
            shipping: self.shipping.clone(),
            payment_method: self.payment_method,
            card_last_four: self
                .payment_method
                .requires_billing()
                .then(|| self.billing.card_last_four()),
            delivery: self.delivery.clone(),
            cart: self.cart.clone(),
        }
    }

    /// Place the order using the thread-local RNG for the order number.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidTransition`] outside the review step.
    pub fn confirm(&mut self) -> Result<&Order, CheckoutError> {
        self.confirm_with_rng(&mut rand::rng())
    }

    /// Place the order, drawing the order number from `rng`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::InvalidTransition`] outside the review step.
    #[instrument(skip_all)]
    pub fn confirm_with_rng<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<&Order, CheckoutError> {
        if self.step != CheckoutStep::Review {
            return Err(CheckoutError::invalid(&self.step, "confirm the order"));
        }

        let order = Order {
            order_number: OrderNumber::generate(rng),
            placed_at: Utc::now(),
            shipping: self.shipping.clone(),
            billing: self
                .payment_method
                .requires_billing()
                .then(|| self.billing.clone()),
            payment_method: self.payment_method,
            cart: self.cart.clone(),
            delivery: self.delivery.clone(),
        };

        tracing::info!(
            order_number = %order.order_number,
            payment_method = %order.payment_method,
            total = %order.cart.total,
            "Order placed"
        );
        let order_number = order.order_number.to_string();
        add_breadcrumb(
            "checkout",
            "Order placed",
            Some(&[("order_number", order_number.as_str())]),
        );

        self.enter(CheckoutStep::Confirmed(Box::new(order)));
        match &self.step {
            CheckoutStep::Confirmed(order) => Ok(order),
            _ => Err(CheckoutError::invalid(&self.step, "confirm the order")),
        }
    }

    fn enter(&mut self, step: CheckoutStep) {
        add_breadcrumb(
            "checkout",
            &format!("Entered {} step", step.name()),
            None,
        );
        self.errors.clear();
        self.step = step;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::CartItem;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rust_decimal::Decimal;
    use unishop_core::ProductId;

    fn cart() -> CartSnapshot {
        let item = CartItem::new(
            ProductId::new(1),
            "15 Car Power Inverter",
            Decimal::new(1999, 0),
            "inverter.jpg",
        );
        CartSnapshot::compute(&[item], Decimal::new(180, 0))
    }

    fn wizard() -> CheckoutWizard {
        CheckoutWizard::new(cart(), DeliveryDetails::default()).unwrap()
    }

    fn fill_shipping(wizard: &mut CheckoutWizard) {
        wizard.set_shipping_field(ShippingField::FullName, "Andy Gitau");
        wizard.set_shipping_field(ShippingField::Address, "12 Moi Avenue");
        wizard.set_shipping_field(ShippingField::City, "Nairobi");
        wizard.set_shipping_field(ShippingField::PostalCode, "00100");
        wizard.set_shipping_field(ShippingField::Country, "Kenya");
    }

    fn fill_billing(wizard: &mut CheckoutWizard) {
        wizard.set_billing_field(BillingField::NameOnCard, "Andy Gitau");
        wizard.set_billing_field(BillingField::CardNumber, "4111 1111 1111 4242");
        wizard.set_billing_field(BillingField::Expiry, "08/27");
        wizard.set_billing_field(BillingField::Cvv, "123");
    }

    #[test]
    fn test_empty_cart_is_rejected() {
        let empty = CartSnapshot::compute(&[], Decimal::new(180, 0));
        let result = CheckoutWizard::new(empty, DeliveryDetails::default());
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    }

    #[test]
    fn test_empty_shipping_stays_with_one_error_per_field() {
        let mut wizard = wizard();
        let err = wizard.next().unwrap_err();

        assert!(matches!(err, CheckoutError::Validation(ref e) if e.len() == 5));
        assert_eq!(wizard.step(), &CheckoutStep::Shipping);
        assert_eq!(wizard.errors().len(), 5);
        assert_eq!(wizard.errors().get("country"), Some("Country is required"));
    }

    #[test]
    fn test_editing_a_field_clears_its_error() {
        let mut wizard = wizard();
        wizard.next().unwrap_err();
        wizard.set_shipping_field(ShippingField::City, "Nairobi");

        assert_eq!(wizard.errors().len(), 4);
        assert_eq!(wizard.errors().get("city"), None);
    }

    #[test]
    fn test_mpesa_skips_billing() {
        let mut wizard = wizard();
        fill_shipping(&mut wizard);
        assert_eq!(wizard.next().unwrap(), &CheckoutStep::PaymentMethod);
        wizard.set_payment_method(PaymentMethod::Mpesa).unwrap();
        assert_eq!(wizard.next().unwrap(), &CheckoutStep::Review);

        assert_eq!(wizard.back().unwrap(), &CheckoutStep::PaymentMethod);
        assert_eq!(wizard.review().card_last_four, None);
    }

    #[test]
    fn test_bank_card_goes_through_billing() {
        let mut wizard = wizard();
        fill_shipping(&mut wizard);
        wizard.next().unwrap();
        wizard.set_payment_method(PaymentMethod::BankCard).unwrap();
        assert_eq!(wizard.next().unwrap(), &CheckoutStep::Billing);

        wizard.set_billing_field(BillingField::NameOnCard, "Andy Gitau");
        let err = wizard.next().unwrap_err();
        assert!(matches!(err, CheckoutError::Validation(ref e) if e.len() == 3));
        assert_eq!(wizard.step(), &CheckoutStep::Billing);

        fill_billing(&mut wizard);
        assert_eq!(wizard.next().unwrap(), &CheckoutStep::Review);
        assert_eq!(wizard.review().card_last_four.as_deref(), Some("4242"));
        assert_eq!(wizard.back().unwrap(), &CheckoutStep::Billing);
    }

    #[test]
    fn test_payment_method_only_in_its_step() {
        let mut wizard = wizard();
        let err = wizard.set_payment_method(PaymentMethod::PayPal).unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidTransition { step: "shipping", .. }));
        assert_eq!(wizard.payment_method(), PaymentMethod::Simulated);
    }

    #[test]
    fn test_back_from_shipping_is_rejected() {
        let mut wizard = wizard();
        assert!(matches!(
            wizard.back(),
            Err(CheckoutError::InvalidTransition { action: "go back", .. })
        ));
    }

    #[test]
    fn test_confirm_outside_review_is_rejected() {
        let mut wizard = wizard();
        assert!(wizard.confirm().is_err());
        assert!(wizard.order().is_none());
    }

    #[test]
    fn test_confirm_produces_terminal_order() {
        let mut wizard = wizard();
        fill_shipping(&mut wizard);
        wizard.next().unwrap();
        wizard.set_payment_method(PaymentMethod::BankCard).unwrap();
        wizard.next().unwrap();
        fill_billing(&mut wizard);
        wizard.next().unwrap();

        let mut rng = StdRng::seed_from_u64(42);
        let order = wizard.confirm_with_rng(&mut rng).unwrap().clone();

        assert!(order.order_number.as_str().starts_with("ORD"));
        assert!(order.order_number.as_str().len() > 3);
        assert_eq!(order.cart.total, Decimal::new(2179, 0));
        assert_eq!(order.billing.as_ref().unwrap().card_last_four(), "4242");
        assert!(wizard.step().is_terminal());
        assert_eq!(wizard.order(), Some(&order));

        assert!(wizard.next().is_err());
        assert!(wizard.back().is_err());
        assert!(wizard.confirm().is_err());
    }

    #[test]
    fn test_non_card_order_has_no_billing() {
        let mut wizard = wizard();
        fill_shipping(&mut wizard);
        wizard.next().unwrap();
        wizard.next().unwrap();
        let order = wizard.confirm().unwrap();

        assert_eq!(order.payment_method, PaymentMethod::Simulated);
        assert!(order.billing.is_none());
        let labels: Vec<_> = order.invoice_lines().into_iter().map(|(l, _)| l).collect();
        assert!(!labels.contains(&"Card"));
    }
}
