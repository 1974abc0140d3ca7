//! Key/value storage
//!
//! The guard only needs string get/set/remove, which is the common subset
//! of `localStorage`, `sessionStorage` and a plain map.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::error::StorageError;

/// String key/value storage area
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Read a key and delete it in one step
    fn take(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self.get(key)?;
        self.remove(key)?;
        Ok(value)
    }
}

/// In-memory storage, used natively and in tests.
///
/// `set_failing(true)` makes every call return `StorageError::Unavailable`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
    failing: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.borrow().contains_key(key)
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.failing.get() {
            Err(StorageError::Unavailable)
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// Browser `Storage` area (WASM only)
#[cfg(target_arch = "wasm32")]
pub struct WebStorage {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl WebStorage {
    /// Durable `localStorage`
    pub fn local() -> Result<Self, StorageError> {
        let storage = web_sys::window()
            .ok_or(StorageError::Unavailable)?
            .local_storage()
            .ok()
            .flatten()
            .ok_or(StorageError::Unavailable)?;
        Ok(Self { storage })
    }

    /// Per-tab `sessionStorage`
    pub fn session() -> Result<Self, StorageError> {
        let storage = web_sys::window()
            .ok_or(StorageError::Unavailable)?
            .session_storage()
            .ok()
            .flatten()
            .ok_or(StorageError::Unavailable)?;
        Ok(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
fn access_error(key: &str, err: wasm_bindgen::JsValue) -> StorageError {
    StorageError::Access {
        key: key.to_string(),
        message: format!("{:?}", err),
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for WebStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage.get_item(key).map_err(|e| access_error(key, e))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| access_error(key, e))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.storage.remove_item(key).map_err(|e| access_error(key, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_reads_and_deletes() {
        let store = MemoryStore::new();
        store.set("k", "v").unwrap();
        assert_eq!(store.take("k").unwrap(), Some("v".to_string()));
        assert!(!store.contains("k"));
        assert_eq!(store.take("k").unwrap(), None);
    }

    #[test]
    fn test_failing_store_errors_everywhere() {
        let store = MemoryStore::new();
        store.set("k", "v").unwrap();
        store.set_failing(true);
        assert_eq!(store.get("k"), Err(StorageError::Unavailable));
        assert_eq!(store.set("k", "w"), Err(StorageError::Unavailable));
        assert_eq!(store.take("k"), Err(StorageError::Unavailable));

        store.set_failing(false);
        assert_eq!(store.get("k").unwrap(), Some("v".to_string()));
    }
}
