//! Non-interactive checkout.
//!
//! Drives the checkout wizard with values from the command line: shipping,
//! payment method, billing (card payments only), review, confirmation. The
//! cart is emptied once the order is confirmed.

use unishop_core::PaymentMethod;
use unishop_storefront::checkout::{
    BillingField, CheckoutStep, CheckoutWizard, Order, ReviewSummary, ShippingField,
};
use unishop_storefront::error::AppError;

use super::Context;
use super::cart::print_snapshot;

/// Values entered for checkout. Blank fields are reported by the wizard.
pub struct CheckoutForm {
    pub full_name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
    pub payment: PaymentMethod,
    pub name_on_card: String,
    pub card_number: String,
    pub expiry: String,
    pub cvv: String,
}

pub fn run(ctx: &mut Context, form: &CheckoutForm) -> Result<(), AppError> {
    let mut wizard = CheckoutWizard::new(ctx.cart.snapshot(), ctx.config.delivery.clone())?;

    let shipping = [
        (ShippingField::FullName, &form.full_name),
        (ShippingField::Address, &form.address),
        (ShippingField::City, &form.city),
        (ShippingField::PostalCode, &form.postal_code),
        (ShippingField::Country, &form.country),
    ];
    for (field, value) in shipping {
        wizard.set_shipping_field(field, value.as_str());
    }
    wizard.next()?;

    wizard.set_payment_method(form.payment)?;
    if *wizard.next()? == CheckoutStep::Billing {
        let billing = [
            (BillingField::NameOnCard, &form.name_on_card),
            (BillingField::CardNumber, &form.card_number),
            (BillingField::Expiry, &form.expiry),
            (BillingField::Cvv, &form.cvv),
        ];
        for (field, value) in billing {
            wizard.set_billing_field(field, value.as_str());
        }
        wizard.next()?;
    }

    print_review(&wizard.review());
    let order = wizard.confirm()?;
    print_invoice(order);

    ctx.cart.clear()?;
    Ok(())
}

fn print_review(review: &ReviewSummary) {
    println!("== {} ==", CheckoutStep::Review.title());
    println!("Ship to:   {}", review.shipping.full_name);
    println!("           {}", review.shipping.address);
    println!(
        "           {} {}, {}",
        review.shipping.city, review.shipping.postal_code, review.shipping.country
    );
    println!("Payment:   {}", review.payment_method);
    if let Some(last_four) = &review.card_last_four {
        println!("Card:      ending with {last_four}");
    }
    println!("Pick-up:   {}", review.delivery.pickup_station);
    println!("Delivery:  {}", review.delivery.date_range());
    println!();
    print_snapshot(&review.cart);
    println!();
}

fn print_invoice(order: &Order) {
    println!("Thank you for your order!");
    for (label, value) in order.invoice_lines() {
        println!("{label:<20} {value}");
    }
}
