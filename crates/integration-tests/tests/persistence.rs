//! File-backed cart, session and checkout across process restarts.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use rust_decimal::Decimal;

use unishop_core::{AccessToken, Email, PaymentMethod, ProductId, UserId, UserRole};
use unishop_integration_tests::TempDataDir;
use unishop_storefront::cart::{CartItem, CartManager, DEFAULT_DELIVERY_FEE};
use unishop_storefront::checkout::{
    BillingField, CheckoutStep, CheckoutWizard, DeliveryDetails, ShippingField,
};
use unishop_storefront::models::UserProfile;
use unishop_storefront::session::Session;
use unishop_storefront::store::{FileStore, KeyValueStore};

/// Open the store the way a fresh process would.
fn open(dir: &TempDataDir) -> Arc<dyn KeyValueStore> {
    Arc::new(FileStore::open(dir.path()).unwrap())
}

fn inverter() -> CartItem {
    CartItem::new(
        ProductId::new(1),
        "15 Car Power Inverter",
        Decimal::new(1999, 0),
        "inverter.jpg",
    )
}

fn headphone() -> CartItem {
    CartItem::new(
        ProductId::new(10),
        "P47 Bluetooth Headphone",
        Decimal::new(499, 0),
        "headphone.jpg",
    )
}

#[test]
fn test_cart_survives_restart() {
    let dir = TempDataDir::new();
    {
        let mut cart = CartManager::load(open(&dir), DEFAULT_DELIVERY_FEE);
        cart.add_item(inverter()).unwrap();
        cart.add_item(headphone()).unwrap();
        cart.set_quantity(ProductId::new(10), 3).unwrap();
    }

    let cart = CartManager::load(open(&dir), DEFAULT_DELIVERY_FEE);
    let snapshot = cart.snapshot();
    assert_eq!(snapshot.line_count(), 2);
    assert_eq!(snapshot.item_count, 4);
    assert_eq!(snapshot.subtotal, Decimal::new(1999 + 3 * 499, 0));
    assert_eq!(snapshot.total, snapshot.subtotal + Decimal::new(180, 0));
}

#[test]
fn test_corrupt_cart_file_loads_empty() {
    let dir = TempDataDir::new();
    open(&dir).set("cart", "[{\"id\": 1, \"name\": ").unwrap();

    let cart = CartManager::load(open(&dir), DEFAULT_DELIVERY_FEE);
    assert!(cart.is_empty());
    assert_eq!(cart.snapshot().total, Decimal::ZERO);
}

#[test]
fn test_session_survives_restart_and_logout() {
    let dir = TempDataDir::new();
    let user = UserProfile {
        id: UserId::new(1),
        username: "andy".to_string(),
        email: Email::parse("andy@unishop.com").unwrap(),
        profile_image: "default.jpg".to_string(),
        role: UserRole::Admin,
    };

    Session::load(open(&dir))
        .establish(user.clone(), AccessToken::new("jwt".to_string()))
        .unwrap();

    let mut session = Session::load(open(&dir));
    assert!(session.is_authenticated());
    assert_eq!(session.user(), Some(&user));

    session.clear().unwrap();
    assert!(!Session::load(open(&dir)).is_authenticated());
}

#[test]
fn test_undefined_user_file_signs_out() {
    let dir = TempDataDir::new();
    let store = open(&dir);
    store.set("user", "undefined").unwrap();
    store.set("token", "\"jwt\"").unwrap();

    let session = Session::load(open(&dir));
    assert!(!session.is_authenticated());
    assert_eq!(store.get("token").unwrap(), None);
}

#[test]
fn test_checkout_from_persisted_cart() {
    let dir = TempDataDir::new();
    {
        let mut cart = CartManager::load(open(&dir), DEFAULT_DELIVERY_FEE);
        cart.add_item(inverter()).unwrap();
    }

    let mut cart = CartManager::load(open(&dir), DEFAULT_DELIVERY_FEE);
    let mut wizard = CheckoutWizard::new(cart.snapshot(), DeliveryDetails::default()).unwrap();

    for (field, value) in [
        (ShippingField::FullName, "Andy Gitau"),
        (ShippingField::Address, "12 Moi Avenue"),
        (ShippingField::City, "Nairobi"),
        (ShippingField::PostalCode, "00100"),
        (ShippingField::Country, "Kenya"),
    ] {
        wizard.set_shipping_field(field, value);
    }
    wizard.next().unwrap();
    wizard.set_payment_method(PaymentMethod::BankCard).unwrap();
    assert_eq!(wizard.next().unwrap(), &CheckoutStep::Billing);

    for (field, value) in [
        (BillingField::NameOnCard, "Andy Gitau"),
        (BillingField::CardNumber, "4111 1111 1111 1234"),
        (BillingField::Expiry, "08/27"),
        (BillingField::Cvv, "123"),
    ] {
        wizard.set_billing_field(field, value);
    }
    assert_eq!(wizard.next().unwrap(), &CheckoutStep::Review);

    let order = wizard.confirm().unwrap().clone();
    assert!(order.order_number.as_str().starts_with("ORD"));
    assert_eq!(order.cart.total, Decimal::new(2179, 0));

    let lines = order.invoice_lines();
    assert!(lines.contains(&("Card", "ending with 1234".to_string())));
    assert!(lines.contains(&("Total", "Ksh 2,179.00".to_string())));
    assert!(lines.contains(&("Delivery Date Range", "2025-03-01 to 2025-03-05".to_string())));

    // The wizard never touches the cart; the front end clears it.
    assert_eq!(CartManager::load(open(&dir), DEFAULT_DELIVERY_FEE).items().len(), 1);
    cart.clear().unwrap();
    assert!(CartManager::load(open(&dir), DEFAULT_DELIVERY_FEE).is_empty());
}
