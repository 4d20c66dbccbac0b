//! File-backed key-value store.
//!
//! Each key lives in `<dir>/<key>.json`. Writes go to a uniquely named
//! temporary file first and are renamed into place, so a crash mid-write
//! leaves either the old value or the new one.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{KeyValueStore, StoreError};

/// Store that persists every key as a file in one directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a store rooted at `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StoreError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        tracing::debug!(dir = %dir.display(), "Opened file store");
        Ok(Self { dir })
    }

    /// Directory holding the stored values.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let tmp = self
            .dir
            .join(format!(".{key}.{}.tmp", uuid::Uuid::new_v4().simple()));
        let io_err = |source: std::io::Error| StoreError::Io {
            key: key.to_string(),
            source,
        };

        fs::write(&tmp, value).map_err(io_err)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(io_err(e));
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_store() -> FileStore {
        let dir = std::env::temp_dir().join(format!("unishop-store-{}", uuid::Uuid::new_v4()));
        FileStore::open(dir).unwrap()
    }

    #[test]
    fn test_values_survive_reopen() {
        let store = temp_store();
        store.set("cart", "[]").unwrap();

        let reopened = FileStore::open(store.dir()).unwrap();
        assert_eq!(reopened.get("cart").unwrap().as_deref(), Some("[]"));

        fs::remove_dir_all(store.dir()).unwrap();
    }

    #[test]
    fn test_missing_key_and_idempotent_remove() {
        let store = temp_store();
        assert_eq!(store.get("user").unwrap(), None);
        store.remove("user").unwrap();

        store.set("user", "{}").unwrap();
        store.remove("user").unwrap();
        assert_eq!(store.get("user").unwrap(), None);

        fs::remove_dir_all(store.dir()).unwrap();
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let store = temp_store();
        assert!(matches!(
            store.set("../escape", "x"),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(store.get(""), Err(StoreError::InvalidKey(_))));

        fs::remove_dir_all(store.dir()).unwrap();
    }

    #[test]
    fn test_no_temp_files_left_behind() {
        let store = temp_store();
        store.set("token", "\"t\"").unwrap();
        store.set("token", "\"u\"").unwrap();

        let names: Vec<_> = fs::read_dir(store.dir())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["token.json".to_string()]);

        fs::remove_dir_all(store.dir()).unwrap();
    }
}
