//! Product catalog with fetch status.

use unishop_core::ProductId;

use crate::api::{ApiClient, ApiError};
use crate::models::Product;

/// Where the last catalog fetch stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    /// Shopper-facing reason the fetch failed.
    Failed(String),
}

/// Products fetched from the backend.
///
/// A failed refresh keeps the previously fetched products.
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    products: Vec<Product>,
    status: FetchStatus,
}

impl ProductCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn status(&self) -> &FetchStatus {
        &self.status
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Product with `id`, if fetched.
    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    /// Fetch the product list.
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] from the fetch; the status is then
    /// [`FetchStatus::Failed`].
    pub async fn refresh(&mut self, api: &ApiClient) -> Result<&[Product], ApiError> {
        self.status = FetchStatus::Loading;
        match api.list_products().await {
            Ok(products) => {
                tracing::debug!(count = products.len(), "Catalog refreshed");
                self.products = products;
                self.status = FetchStatus::Succeeded;
                Ok(&self.products)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Catalog refresh failed");
                self.status = FetchStatus::Failed(e.user_message());
                Err(e)
            }
        }
    }
}
