//! Checkout steps and the transition rules between them.

use unishop_core::PaymentMethod;

use super::order::Order;

/// Where the shopper is in checkout.
///
/// `Billing` is only reachable when the payment method needs card details;
/// [`CheckoutStep::forward`] and [`CheckoutStep::backward`] encode that skip
/// so callers never do step arithmetic. `Confirmed` is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutStep {
    Shipping,
    PaymentMethod,
    Billing,
    Review,
    Confirmed(Box<Order>),
}

impl CheckoutStep {
    /// Step reached by "Next", ignoring validation.
    ///
    /// `None` for `Review` (which advances only through confirmation) and
    /// for the terminal `Confirmed`.
    #[must_use]
    pub const fn forward(&self, method: PaymentMethod) -> Option<Self> {
        match self {
            Self::Shipping => Some(Self::PaymentMethod),
            Self::PaymentMethod if method.requires_billing() => Some(Self::Billing),
            Self::PaymentMethod | Self::Billing => Some(Self::Review),
            Self::Review | Self::Confirmed(_) => None,
        }
    }

    /// Step reached by "Back".
    ///
    /// `None` for the initial `Shipping` step and the terminal `Confirmed`.
    #[must_use]
    pub const fn backward(&self, method: PaymentMethod) -> Option<Self> {
        match self {
            Self::Shipping | Self::Confirmed(_) => None,
            Self::PaymentMethod => Some(Self::Shipping),
            Self::Billing => Some(Self::PaymentMethod),
            Self::Review if method.requires_billing() => Some(Self::Billing),
            Self::Review => Some(Self::PaymentMethod),
        }
    }

    /// Short name for logs and error messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Shipping => "shipping",
            Self::PaymentMethod => "payment method",
            Self::Billing => "billing",
            Self::Review => "review",
            Self::Confirmed(_) => "confirmed",
        }
    }

    /// Title shown above the step.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Shipping => "Shipping Address",
            Self::PaymentMethod => "Payment Method",
            Self::Billing => "Billing Details",
            Self::Review => "Review & Confirm",
            Self::Confirmed(_) => "Order Confirmation",
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_skips_billing_for_non_card_methods() {
        for method in [PaymentMethod::Mpesa, PaymentMethod::PayPal, PaymentMethod::Simulated] {
            assert_eq!(
                CheckoutStep::PaymentMethod.forward(method),
                Some(CheckoutStep::Review)
            );
        }
        assert_eq!(
            CheckoutStep::PaymentMethod.forward(PaymentMethod::BankCard),
            Some(CheckoutStep::Billing)
        );
    }

    #[test]
    fn test_backward_mirrors_the_skip() {
        assert_eq!(
            CheckoutStep::Review.backward(PaymentMethod::BankCard),
            Some(CheckoutStep::Billing)
        );
        assert_eq!(
            CheckoutStep::Review.backward(PaymentMethod::Mpesa),
            Some(CheckoutStep::PaymentMethod)
        );
    }

    #[test]
    fn test_ends_have_no_outgoing_edges() {
        assert_eq!(CheckoutStep::Shipping.backward(PaymentMethod::Mpesa), None);
        assert_eq!(CheckoutStep::Review.forward(PaymentMethod::Mpesa), None);
    }
}
