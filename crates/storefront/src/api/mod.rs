//! Typed client for the Unishop backend REST API.
//!
//! # Endpoints
//!
//! - `POST /auth/login`, `POST /auth/register`, `POST /auth/forgot-password`
//! - `POST /auth/upload` (multipart, field `file`)
//! - `PUT /users/{id}`, `DELETE /users/{id}`
//! - `GET /api/products` (cached in memory via `moka`)
//!
//! Requests are made once. There are no retries and no cancellation; a
//! rate-limited response surfaces as [`ApiError::RateLimited`].
//!
//! # Example
//!
//! ```rust,ignore
//! use unishop_storefront::api::ApiClient;
//!
//! let api = ApiClient::new(&config.api_base_url, config.catalog_cache_ttl);
//! let products = api.list_products().await?;
//! ```

mod client;
pub mod types;

pub use client::ApiClient;
pub use types::{
    AuthResponse, MessageResponse, ProfileUpdate, RegisterResponse, UpdateUserResponse,
    UploadResponse,
};

use reqwest::StatusCode;
use thiserror::Error;

use types::ErrorBody;

/// Errors that can occur when talking to the backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built from the base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Missing, expired or wrong credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status.
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl ApiError {
    /// Build the error for a non-success response.
    ///
    /// The message comes from the body's `message` or `error` field and
    /// falls back to `fallback` when the body has neither.
    pub(crate) fn from_status(status: StatusCode, body: &str, fallback: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or_else(|| fallback.to_string());

        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            _ => Self::Rejected {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Message safe to show the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(_) => "Could not reach the server. Please try again.".to_string(),
            Self::Parse(_) | Self::InvalidUrl(_) => {
                "Unexpected response from the server".to_string()
            }
            Self::Unauthorized(message)
            | Self::NotFound(message)
            | Self::Rejected { message, .. } => message.clone(),
            Self::RateLimited(seconds) => {
                format!("Too many requests. Please try again in {seconds} seconds.")
            }
        }
    }

    /// Whether this is our or the backend's fault rather than the shopper's.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        match self {
            Self::Http(_) | Self::Parse(_) | Self::InvalidUrl(_) => true,
            Self::Rejected { status, .. } => *status >= 500,
            Self::Unauthorized(_) | Self::NotFound(_) | Self::RateLimited(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_uses_body_message() {
        let err = ApiError::from_status(
            StatusCode::UNAUTHORIZED,
            r#"{"error":"Invalid email or password"}"#,
            "Login failed",
        );
        assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "Invalid email or password"));
        assert_eq!(err.user_message(), "Invalid email or password");
    }

    #[test]
    fn test_from_status_falls_back() {
        let err = ApiError::from_status(StatusCode::BAD_REQUEST, "<html>oops</html>", "Registration failed");
        assert!(matches!(
            err,
            ApiError::Rejected { status: 400, ref message } if message == "Registration failed"
        ));
        assert!(!err.is_internal());
    }

    #[test]
    fn test_not_found() {
        let err = ApiError::from_status(StatusCode::NOT_FOUND, r#"{"error":"User not found"}"#, "x");
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[test]
    fn test_server_errors_are_internal() {
        let err = ApiError::from_status(StatusCode::BAD_GATEWAY, "", "Profile update failed");
        assert!(err.is_internal());
        assert_eq!(err.user_message(), "Profile update failed");
        assert!(!ApiError::RateLimited(3).is_internal());
        assert_eq!(
            ApiError::RateLimited(3).user_message(),
            "Too many requests. Please try again in 3 seconds."
        );
    }
}
