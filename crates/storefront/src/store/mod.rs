//! Key-value persistence for storefront state.
//!
//! The cart, the signed-in user and the bearer token are each stored as one
//! JSON-encoded value under a fixed key (see [`crate::models::session::keys`]).
//! Callers only see the [`KeyValueStore`] trait, so the backend can be swapped
//! between [`MemoryStore`] (tests, ephemeral runs) and [`FileStore`] (the CLI)
//! without touching cart or session logic.
//!
//! # Parse failures
//!
//! [`read_json`] never fails on bad data: a value that does not decode is
//! logged and treated as absent. Only I/O failures surface as [`StoreError`].

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors from a key-value backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the underlying medium failed.
    #[error("storage I/O error for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be encoded for storage.
    #[error("failed to encode value for key {key}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The key contains characters the backend cannot represent.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    /// A previous writer panicked while holding the store lock.
    #[error("storage lock poisoned")]
    Poisoned,
}

/// A string-to-string store with browser `localStorage` semantics.
///
/// Implementations use interior mutability so a single store can be shared
/// between the cart and the session through an `Arc<dyn KeyValueStore>`.
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Read and decode a JSON value, treating unreadable or undecodable data as absent.
pub fn read_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "Failed to read stored value, using default");
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding unparsable stored value");
            None
        }
    }
}

/// Encode `value` as JSON and store it under `key`.
///
/// # Errors
///
/// Returns an error if encoding fails or the backend cannot be written.
pub fn write_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let encoded = serde_json::to_string(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &encoded)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_read_json_missing_key() {
        let store = MemoryStore::new();
        assert_eq!(read_json::<Vec<u32>>(&store, "cart"), None);
    }

    #[test]
    fn test_read_json_discards_garbage() {
        let store = MemoryStore::new();
        store.set("cart", "{not json").unwrap();
        assert_eq!(read_json::<Vec<u32>>(&store, "cart"), None);

        store.set("cart", "\"a string, not a list\"").unwrap();
        assert_eq!(read_json::<Vec<u32>>(&store, "cart"), None);
    }

    #[test]
    fn test_write_then_read_json() {
        let store = MemoryStore::new();
        write_json(&store, "cart", &vec![1_u32, 2, 3]).unwrap();
        assert_eq!(store.get("cart").unwrap().as_deref(), Some("[1,2,3]"));
        assert_eq!(read_json::<Vec<u32>>(&store, "cart"), Some(vec![1, 2, 3]));
    }
}
