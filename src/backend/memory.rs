//! In-memory storage backend.

use std::{collections::HashMap, sync::RwLock};

use bytes::Bytes;

use super::StorageBackend;
use crate::error::{Error, Result};

/// An in-memory storage backend.
///
/// Useful for tests and offline sessions. All data is lost when the backend
/// is dropped.
///
/// # Example
///
/// ```
/// use scrollgrid::backend::{MemoryBackend, StorageBackend};
/// use bytes::Bytes;
///
/// let backend = MemoryBackend::new();
/// backend.put("people.json", Bytes::from("[]"));
/// let data = backend.get("people.json").unwrap();
/// assert_eq!(data, Bytes::from("[]"));
/// ```
#[derive(Debug, Default)]
pub struct MemoryBackend {
    data: RwLock<HashMap<String, Bytes>>,
}

impl MemoryBackend {
    /// Creates a new empty memory backend.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a backend holding a single document.
    pub fn with_document(key: impl Into<String>, data: impl Into<Bytes>) -> Self {
        let mut map = HashMap::new();
        map.insert(key.into(), data.into());
        Self {
            data: RwLock::new(map),
        }
    }

    /// Stores `data` under `key`, replacing any previous document.
    pub fn put(&self, key: impl Into<String>, data: impl Into<Bytes>) {
        if let Ok(mut store) = self.data.write() {
            store.insert(key.into(), data.into());
        }
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Bytes> {
        let data = self
            .data
            .read()
            .map_err(|_| Error::storage("Failed to acquire read lock"))?;

        data.get(key)
            .cloned()
            .ok_or_else(|| Error::storage(format!("Key not found: {}", key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_empty() {
        let backend = MemoryBackend::new();
        assert!(backend.get("people.json").is_err());
    }

    #[test]
    fn test_put_and_get() {
        let backend = MemoryBackend::new();
        backend.put("key", "hello world");

        let retrieved = backend
            .get("key")
            .ok()
            .unwrap_or_else(|| panic!("Should get"));
        assert_eq!(retrieved, Bytes::from("hello world"));
    }

    #[test]
    fn test_missing_key() {
        let backend = MemoryBackend::with_document("a", "[]");
        let err = backend.get("b").unwrap_err();
        assert!(err.to_string().contains("Key not found: b"));
    }

    #[test]
    fn test_put_replaces() {
        let backend = MemoryBackend::with_document("key", "old");
        backend.put("key", "new");
        assert_eq!(backend.get("key").unwrap(), Bytes::from("new"));
    }
}
