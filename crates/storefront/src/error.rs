//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type for front ends. [`AppError::report`]
//! captures internal failures to Sentry, and [`AppError::user_message`] is
//! the only text that should reach the shopper.

use thiserror::Error;

use crate::api::ApiError;
use crate::cart::CartError;
use crate::checkout::CheckoutError;
use crate::config::ConfigError;
use crate::services::auth::AuthError;
use crate::store::StoreError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Local storage failed.
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Backend request failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Account operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Cart mutation failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Checkout step failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad input from the shopper.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Whether this is a failure on our side rather than bad input.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        match self {
            Self::Config(_)
            | Self::Store(_)
            | Self::Auth(AuthError::Store(_) | AuthError::EmptyToken)
            | Self::Cart(CartError::Store(_)) => true,
            Self::Api(err) | Self::Auth(AuthError::Api(err)) => err.is_internal(),
            _ => false,
        }
    }

    /// Message safe to show the shopper.
    ///
    /// Internal details (paths, status codes, parser output) never appear.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(err) => format!("Invalid configuration: {err}"),
            Self::Store(_) | Self::Cart(CartError::Store(_)) | Self::Auth(AuthError::Store(_)) => {
                "Could not save your changes".to_string()
            }
            Self::Api(err) | Self::Auth(AuthError::Api(err)) => err.user_message(),
            Self::Auth(err) => match err {
                AuthError::Validation(errors) => errors.to_string(),
                AuthError::InvalidEmail(e) => e.to_string(),
                AuthError::NotAuthenticated => "Please sign in first".to_string(),
                AuthError::EmptyUpdate => "Nothing to update".to_string(),
                _ => "Authentication error".to_string(),
            },
            Self::Cart(CartError::InvalidPrice(_)) => {
                "This product cannot be added to the cart".to_string()
            }
            Self::Checkout(err) => err.to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::BadRequest(message) => message.clone(),
        }
    }

    /// Log the error and capture internal failures to Sentry.
    pub fn report(&self) {
        if self.is_internal() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Command failed"
            );
        } else {
            tracing::debug!(error = %self, "Command rejected");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "1")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FieldErrors;
    use unishop_core::ProductId;

    fn io_error() -> StoreError {
        StoreError::Io {
            key: "cart".to_string(),
            source: std::io::Error::other("/home/andy/.unishop/cart.json: disk full"),
        }
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Product 7".to_string());
        assert_eq!(err.to_string(), "Not found: Product 7");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_storage_details_are_hidden() {
        let err = AppError::from(CartError::Store(io_error()));
        assert!(err.is_internal());
        assert_eq!(err.user_message(), "Could not save your changes");
        assert!(!err.user_message().contains(".unishop"));
    }

    #[test]
    fn test_validation_errors_are_shown() {
        let mut errors = FieldErrors::new();
        errors.insert("fullName", "Full Name is required");
        let err = AppError::from(CheckoutError::Validation(errors));
        assert!(!err.is_internal());
        assert_eq!(err.user_message(), "Full Name is required");
    }

    #[test]
    fn test_backend_rejection_passes_message_through() {
        let err = AppError::from(AuthError::Api(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        )));
        assert!(!err.is_internal());
        assert_eq!(err.user_message(), "Invalid email or password");
    }

    #[test]
    fn test_other_user_messages() {
        assert_eq!(
            AppError::from(AuthError::NotAuthenticated).user_message(),
            "Please sign in first"
        );
        assert_eq!(
            AppError::from(CartError::InvalidPrice(ProductId::new(3))).user_message(),
            "This product cannot be added to the cart"
        );
        assert_eq!(
            AppError::from(CheckoutError::EmptyCart).user_message(),
            "Your cart is empty"
        );
    }
}
