//! CLI command implementations.
//!
//! Every command receives a [`Context`] holding the state loaded at start.

pub mod account;
pub mod cart;
pub mod catalog;
pub mod checkout;

use std::sync::Arc;

use unishop_storefront::api::ApiClient;
use unishop_storefront::cart::CartManager;
use unishop_storefront::config::StorefrontConfig;
use unishop_storefront::error::{AppError, set_sentry_user};
use unishop_storefront::session::Session;
use unishop_storefront::store::{FileStore, KeyValueStore};

/// State shared by all commands for one invocation.
pub struct Context {
    pub config: StorefrontConfig,
    pub api: ApiClient,
    pub cart: CartManager,
    pub session: Session,
}

impl Context {
    /// Open the data directory and restore cart and session from it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Store` if the data directory cannot be created.
    pub fn open(config: StorefrontConfig) -> Result<Self, AppError> {
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(config.data_dir.clone())?);
        tracing::debug!(data_dir = %config.data_dir.display(), "Opened data directory");

        let cart = CartManager::load(Arc::clone(&store), config.delivery_fee);
        let session = Session::load(store);
        if let Some((user, _)) = session.credentials() {
            set_sentry_user(&user.id, Some(user.email.as_str()));
        }

        let api = ApiClient::new(&config.api_base_url, config.catalog_cache_ttl);

        Ok(Self {
            config,
            api,
            cart,
            session,
        })
    }
}
