//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//! - `UNISHOP_API_BASE_URL` - Backend REST API root (default: `http://127.0.0.1:5000`)
//! - `UNISHOP_DATA_DIR` - Directory for persisted cart and session (default: `.unishop`)
//! - `UNISHOP_DELIVERY_FEE` - Flat delivery fee in store currency (default: 180)
//! - `UNISHOP_PICKUP_STATION` - Pickup station shown on orders (default: Tech Hub Station)
//! - `UNISHOP_DELIVERY_START` - First delivery date, `YYYY-MM-DD` (default: 2025-03-01)
//! - `UNISHOP_DELIVERY_END` - Last delivery date, `YYYY-MM-DD` (default: 2025-03-05)
//! - `UNISHOP_CATALOG_CACHE_TTL_SECS` - Product list cache lifetime (default: 300)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use url::Url;

use crate::cart::DEFAULT_DELIVERY_FEE;
use crate::checkout::DeliveryDetails;

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_DATA_DIR: &str = ".unishop";
const DEFAULT_CATALOG_CACHE_TTL_SECS: u64 = 300;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Delivery window ends ({end}) before it starts ({start})")]
    InvertedDeliveryWindow { start: NaiveDate, end: NaiveDate },
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Backend REST API root
    pub api_base_url: Url,
    /// Where the file-backed store keeps its `<key>.json` files
    pub data_dir: PathBuf,
    /// Flat delivery fee for non-empty carts
    pub delivery_fee: Decimal,
    /// Pickup station and delivery window shown on orders
    pub delivery: DeliveryDetails,
    /// How long a fetched product list is served from memory
    pub catalog_cache_ttl: Duration,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an unparsable value or
    /// the delivery window is inverted.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// # Errors
    ///
    /// Same as [`StorefrontConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let env = Env(lookup);

        let api_base_url = env.parse_or("UNISHOP_API_BASE_URL", DEFAULT_API_BASE_URL)?;
        let data_dir = PathBuf::from(env.get_or_default("UNISHOP_DATA_DIR", DEFAULT_DATA_DIR));
        let delivery_fee: Decimal = match env.get_optional("UNISHOP_DELIVERY_FEE") {
            Some(raw) => parse_var("UNISHOP_DELIVERY_FEE", &raw)?,
            None => DEFAULT_DELIVERY_FEE,
        };
        if delivery_fee.is_sign_negative() {
            return Err(ConfigError::InvalidEnvVar(
                "UNISHOP_DELIVERY_FEE".to_string(),
                "must not be negative".to_string(),
            ));
        }

        let defaults = DeliveryDetails::default();
        let delivery = DeliveryDetails {
            pickup_station: env
                .get_optional("UNISHOP_PICKUP_STATION")
                .unwrap_or(defaults.pickup_station),
            window_start: env.parse_date_or("UNISHOP_DELIVERY_START", defaults.window_start)?,
            window_end: env.parse_date_or("UNISHOP_DELIVERY_END", defaults.window_end)?,
        };
        if delivery.window_end < delivery.window_start {
            return Err(ConfigError::InvertedDeliveryWindow {
                start: delivery.window_start,
                end: delivery.window_end,
            });
        }

        let ttl_secs = match env.get_optional("UNISHOP_CATALOG_CACHE_TTL_SECS") {
            Some(raw) => parse_var("UNISHOP_CATALOG_CACHE_TTL_SECS", &raw)?,
            None => DEFAULT_CATALOG_CACHE_TTL_SECS,
        };

        Ok(Self {
            api_base_url,
            data_dir,
            delivery_fee,
            delivery,
            catalog_cache_ttl: Duration::from_secs(ttl_secs),
            sentry_dsn: env.get_optional("SENTRY_DSN"),
            sentry_environment: env.get_optional("SENTRY_ENVIRONMENT"),
        })
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_base_url: Url::parse(DEFAULT_API_BASE_URL)
                .unwrap_or_else(|_| unreachable!("default API URL is valid")),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            delivery_fee: DEFAULT_DELIVERY_FEE,
            delivery: DeliveryDetails::default(),
            catalog_cache_ttl: Duration::from_secs(DEFAULT_CATALOG_CACHE_TTL_SECS),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable. Blank values count as unset.
    fn get_optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    /// Get a variable with a default value.
    fn get_or_default(&self, key: &str, default: &str) -> String {
        self.get_optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parse_or<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        parse_var(key, &self.get_or_default(key, default))
    }

    fn parse_date_or(&self, key: &str, default: NaiveDate) -> Result<NaiveDate, ConfigError> {
        self.get_optional(key).map_or(Ok(default), |raw| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
        })
    }
}

fn parse_var<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
