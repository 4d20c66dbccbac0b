//! API client and account service against the stub backend.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use unishop_core::{Email, ProductId};
use unishop_integration_tests::{ANDY_PASSWORD, STUB_TOKEN, StubBackend};
use unishop_storefront::api::{ApiClient, ApiError, ProfileUpdate};
use unishop_storefront::catalog::{FetchStatus, ProductCatalog};
use unishop_storefront::services::{AuthError, AuthService, RegistrationForm};
use unishop_storefront::session::Session;
use unishop_storefront::store::MemoryStore;

async fn setup() -> (StubBackend, ApiClient) {
    let backend = StubBackend::start().await.unwrap();
    let api = ApiClient::new(backend.base_url(), Duration::from_secs(300));
    (backend, api)
}

fn signed_out() -> Session {
    Session::load(Arc::new(MemoryStore::new()))
}

fn password(value: &str) -> SecretString {
    SecretString::from(value)
}

// =============================================================================
// Login / Register
// =============================================================================

#[tokio::test]
async fn test_login_establishes_session() {
    let (_backend, api) = setup().await;
    let mut session = signed_out();

    let mut auth = AuthService::new(&api, &mut session);
    let user = auth.login("andy@unishop.com", &password(ANDY_PASSWORD)).await.unwrap();
    assert_eq!(user.username, "andy");

    assert!(session.is_authenticated());
    assert_eq!(session.token().unwrap().expose(), STUB_TOKEN);
}

#[tokio::test]
async fn test_wrong_password_surfaces_backend_message() {
    let (_backend, api) = setup().await;
    let mut session = signed_out();

    let err = AuthService::new(&api, &mut session)
        .login("andy@unishop.com", &password("not-the-password"))
        .await
        .unwrap_err();

    match err {
        AuthError::Api(api_err @ ApiError::Unauthorized(_)) => {
            assert_eq!(api_err.user_message(), "Invalid email or password");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_register_without_token_signs_in_afterwards() {
    let (_backend, api) = setup().await;
    let mut session = signed_out();

    let form = RegistrationForm {
        username: "wanjiru".to_string(),
        email: "wanjiru@unishop.com".to_string(),
        password: password("another-pass"),
        repeat_password: password("another-pass"),
    };
    let user = AuthService::new(&api, &mut session)
        .register(&form)
        .await
        .unwrap()
        .clone();

    assert_eq!(user.username, "wanjiru");
    assert_eq!(user.email.as_str(), "wanjiru@unishop.com");
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn test_register_taken_email_is_rejected() {
    let (_backend, api) = setup().await;
    let mut session = signed_out();

    let form = RegistrationForm {
        username: "andy2".to_string(),
        email: "andy@unishop.com".to_string(),
        password: password("another-pass"),
        repeat_password: password("another-pass"),
    };
    let err = AuthService::new(&api, &mut session)
        .register(&form)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AuthError::Api(ApiError::Rejected { status: 400, ref message })
            if message == "User with this email already exists"
    ));
}

// =============================================================================
// Profile
// =============================================================================

async fn signed_in(api: &ApiClient) -> Session {
    let mut session = signed_out();
    AuthService::new(api, &mut session)
        .login("andy@unishop.com", &password(ANDY_PASSWORD))
        .await
        .unwrap();
    session
}

#[tokio::test]
async fn test_update_profile_merges_fields_locally() {
    let (backend, api) = setup().await;
    let mut session = signed_in(&api).await;

    let update = ProfileUpdate {
        username: Some("andy_g".to_string()),
        email: Some(Email::parse("andy.g@unishop.com").unwrap()),
        ..ProfileUpdate::default()
    };
    AuthService::new(&api, &mut session)
        .update_profile(update)
        .await
        .unwrap();

    let user = session.user().unwrap();
    assert_eq!(user.username, "andy_g");
    assert_eq!(user.email.as_str(), "andy.g@unishop.com");

    let sent = backend.state().updates();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["username"], "andy_g");
    assert!(sent[0].get("password").is_none());
}

#[tokio::test]
async fn test_upload_profile_image() {
    let (backend, api) = setup().await;
    let mut session = signed_in(&api).await;

    AuthService::new(&api, &mut session)
        .upload_profile_image("me.png", vec![0x89, b'P', b'N', b'G'])
        .await
        .unwrap();

    assert_eq!(
        session.user().unwrap().profile_image,
        "https://cdn.unishop.test/uploads/me.png"
    );
    assert_eq!(backend.state().uploads(), vec![("me.png".to_string(), 4)]);
}

#[tokio::test]
async fn test_delete_account_signs_out() {
    let (backend, api) = setup().await;
    let mut session = signed_in(&api).await;

    AuthService::new(&api, &mut session)
        .delete_account()
        .await
        .unwrap();

    assert!(!session.is_authenticated());
    assert_eq!(backend.state().deleted(), vec![1]);
}

#[tokio::test]
async fn test_bad_token_falls_back_to_default_message() {
    let (_backend, api) = setup().await;
    let token = unishop_core::AccessToken::new("expired".to_string());

    let err = api
        .update_user(&token, unishop_core::UserId::new(1), &ProfileUpdate {
            username: Some("x".to_string()),
            ..ProfileUpdate::default()
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "Profile update failed"));
}

// =============================================================================
// Password reset
// =============================================================================

#[tokio::test]
async fn test_password_reset() {
    let (_backend, api) = setup().await;
    let mut session = signed_out();
    let auth = AuthService::new(&api, &mut session);

    let message = auth.request_password_reset("andy@unishop.com").await.unwrap();
    assert_eq!(message, "Password reset email sent");

    let err = auth
        .request_password_reset("nobody@unishop.com")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Api(ApiError::NotFound(ref m)) if m == "User not found"));
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_product_list_is_cached() {
    let (backend, api) = setup().await;

    let first = api.list_products().await.unwrap();
    let second = api.list_products().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(backend.state().product_requests(), 1);

    api.invalidate_products().await;
    api.list_products().await.unwrap();
    assert_eq!(backend.state().product_requests(), 2);
}

#[tokio::test]
async fn test_catalog_refresh_and_find() {
    let (_backend, api) = setup().await;
    let mut catalog = ProductCatalog::new();

    catalog.refresh(&api).await.unwrap();
    assert_eq!(catalog.status(), &FetchStatus::Succeeded);
    assert_eq!(catalog.products().len(), 2);

    let headphone = catalog.find(ProductId::new(10)).unwrap();
    assert_eq!(headphone.display_price(), "Ksh 499.00");
    assert_eq!(
        headphone.to_cart_item().image,
        "https://via.placeholder.com/100"
    );
}
