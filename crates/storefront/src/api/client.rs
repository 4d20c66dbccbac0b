//! Backend REST client implementation.
//!
//! Uses `reqwest` 0.13 for HTTP and caches the product list with `moka`.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use unishop_core::{AccessToken, Email, UserId};

use super::ApiError;
use super::types::{
    AuthResponse, EmailRequest, LoginRequest, MessageResponse, ProfileUpdate, RegisterRequest,
    RegisterResponse, UpdateUserResponse, UploadResponse,
};
use crate::models::Product;

const PRODUCTS_CACHE_KEY: &str = "products";

/// Client for the Unishop backend.
///
/// Cheap to clone. The product list is cached for the configured TTL.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    products: Cache<String, Arc<Vec<Product>>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client rooted at `base_url`.
    #[must_use]
    pub fn new(base_url: &Url, catalog_cache_ttl: Duration) -> Self {
        let products = Cache::builder()
            .max_capacity(1)
            .time_to_live(catalog_cache_ttl)
            .build();

        Self {
            inner: Arc::new(ApiClientInner {
                client: reqwest::Client::new(),
                base_url: normalize_base(base_url),
                products,
            }),
        }
    }

    /// Root every endpoint path is resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.inner.base_url.join(path)?)
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for wrong credentials, or another
    /// [`ApiError`] if the request fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<AuthResponse, ApiError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("auth/login")?)
            .json(&LoginRequest {
                email: email.as_str(),
                password: password.expose_secret(),
            })
            .send()
            .await?;

        parse_json(response, "Login failed").await
    }

    /// Create an account.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] if the backend refuses the account
    /// (e.g. the email is taken), or another [`ApiError`] if the request
    /// fails.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn register(
        &self,
        username: &str,
        email: &Email,
        password: &SecretString,
    ) -> Result<RegisterResponse, ApiError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("auth/register")?)
            .json(&RegisterRequest {
                username,
                email: email.as_str(),
                password: password.expose_secret(),
            })
            .send()
            .await?;

        parse_json(response, "Registration failed").await
    }

    /// Update profile fields of user `id`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or is rejected.
    #[instrument(skip(self, token, update))]
    pub async fn update_user(
        &self,
        token: &AccessToken,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<UpdateUserResponse, ApiError> {
        let response = self
            .inner
            .client
            .put(self.endpoint(&format!("users/{id}"))?)
            .bearer_auth(token.expose())
            .json(update)
            .send()
            .await?;

        parse_json(response, "Profile update failed").await
    }

    /// Delete user `id`.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or is rejected.
    #[instrument(skip(self, token))]
    pub async fn delete_user(&self, token: &AccessToken, id: UserId) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .delete(self.endpoint(&format!("users/{id}"))?)
            .bearer_auth(token.expose())
            .send()
            .await?;

        check_status(response, "Account deletion failed").await?;
        Ok(())
    }

    /// Upload a profile picture. Returns the URL the backend stored it at.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or is rejected.
    #[instrument(skip(self, token, bytes), fields(size = bytes.len()))]
    pub async fn upload_profile_image(
        &self,
        token: &AccessToken,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse, ApiError> {
        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name.to_string()));

        let response = self
            .inner
            .client
            .post(self.endpoint("auth/upload")?)
            .bearer_auth(token.expose())
            .multipart(form)
            .send()
            .await?;

        parse_json(response, "Profile picture upload failed").await
    }

    /// Fetch the product list.
    ///
    /// Served from memory while the cached copy is younger than the
    /// configured TTL.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] if the request fails or is rejected.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(cached) = self.inner.products.get(PRODUCTS_CACHE_KEY).await {
            debug!(count = cached.len(), "Cache hit for products");
            return Ok(cached.as_ref().clone());
        }

        let response = self
            .inner
            .client
            .get(self.endpoint("api/products")?)
            .send()
            .await?;
        let products: Vec<Product> = parse_json(response, "Failed to load products").await?;

        debug!(count = products.len(), "Fetched products");
        self.inner
            .products
            .insert(PRODUCTS_CACHE_KEY.to_string(), Arc::new(products.clone()))
            .await;
        Ok(products)
    }

    /// Drop the cached product list.
    pub async fn invalidate_products(&self) {
        self.inner.products.invalidate(PRODUCTS_CACHE_KEY).await;
    }

    /// Ask the backend to email a password reset link.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown addresses, or another
    /// [`ApiError`] if the request fails.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn request_password_reset(&self, email: &Email) -> Result<MessageResponse, ApiError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("auth/forgot-password")?)
            .json(&EmailRequest {
                email: email.as_str(),
            })
            .send()
            .await?;

        parse_json(response, "Password reset request failed").await
    }
}

/// Ensure the base path ends with `/` so relative joins append to it.
fn normalize_base(base_url: &Url) -> Url {
    let mut url = base_url.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Read the body of a successful response, mapping failures to [`ApiError`].
async fn check_status(response: reqwest::Response, fallback: &str) -> Result<String, ApiError> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1);
        return Err(ApiError::RateLimited(retry_after));
    }

    let body = response.text().await?;

    if !status.is_success() {
        if status.is_server_error() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Backend returned server error"
            );
        } else {
            debug!(status = %status, "Backend rejected request");
        }
        return Err(ApiError::from_status(status, &body, fallback));
    }

    Ok(body)
}

async fn parse_json<T: DeserializeOwned>(
    response: reqwest::Response,
    fallback: &str,
) -> Result<T, ApiError> {
    let body = check_status(response, fallback).await?;
    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(
            error = %e,
            body = %body.chars().take(500).collect::<String>(),
            "Failed to parse backend response"
        );
        ApiError::Parse(e)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_appends_slash() {
        let url = normalize_base(&Url::parse("http://127.0.0.1:5000").unwrap());
        assert_eq!(url.join("auth/login").unwrap().as_str(), "http://127.0.0.1:5000/auth/login");

        let url = normalize_base(&Url::parse("https://shop.example/backend").unwrap());
        assert_eq!(
            url.join("api/products").unwrap().as_str(),
            "https://shop.example/backend/api/products"
        );
    }

    #[test]
    fn test_user_endpoint() {
        let client = ApiClient::new(
            &Url::parse("http://localhost:5000/").unwrap(),
            Duration::from_secs(300),
        );
        let url = client.endpoint(&format!("users/{}", UserId::new(42))).unwrap();
        assert_eq!(url.path(), "/users/42");
    }

    #[test]
    fn test_debug_shows_base_url_only() {
        let client = ApiClient::new(
            &Url::parse("http://localhost:5000").unwrap(),
            Duration::from_secs(1),
        );
        assert!(format!("{client:?}").contains("http://localhost:5000/"));
    }
}
