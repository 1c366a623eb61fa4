//! Key-value persistence seam: `localStorage` in the browser, a shared map in
//! tests and on hosts without storage.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::PetTapError;

pub trait KeyValueStore {
    fn get(&self, key: &'static str) -> Result<Option<String>, PetTapError>;
    fn set(&mut self, key: &'static str, value: &str) -> Result<(), PetTapError>;
}

/// In-memory store. Clones share the same map, which stands in for the
/// browser keeping data across page reloads.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.borrow().get(key).cloned()
    }

    pub fn insert_raw(&self, key: &str, value: &str) {
        self.inner
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &'static str) -> Result<Option<String>, PetTapError> {
        Ok(self.raw(key))
    }

    fn set(&mut self, key: &'static str, value: &str) -> Result<(), PetTapError> {
        self.insert_raw(key, value);
        Ok(())
    }
}

/// `window.localStorage`.
#[derive(Clone, Debug)]
pub struct BrowserStorage {
    storage: web_sys::Storage,
}

impl BrowserStorage {
    pub fn open() -> Result<Self, PetTapError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or(PetTapError::StorageUnavailable)?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &'static str) -> Result<Option<String>, PetTapError> {
        self.storage
            .get_item(key)
            .map_err(|_| PetTapError::StorageUnavailable)
    }

    fn set(&mut self, key: &'static str, value: &str) -> Result<(), PetTapError> {
        self.storage
            .set_item(key, value)
            .map_err(|_| PetTapError::StorageWrite { key })
    }
}

/// Whichever backend the page could get.
#[derive(Clone, Debug)]
pub enum AnyStore {
    Browser(BrowserStorage),
    Memory(MemoryStore),
}

impl AnyStore {
    /// Browser storage when available (private mode and sandboxed iframes can
    /// refuse it), otherwise a memory store for this page load.
    pub fn detect() -> Self {
        match BrowserStorage::open() {
            Ok(s) => AnyStore::Browser(s),
            Err(e) => {
                log::warn!("{e}; settings will not persist");
                AnyStore::Memory(MemoryStore::new())
            }
        }
    }
}

impl KeyValueStore for AnyStore {
    fn get(&self, key: &'static str) -> Result<Option<String>, PetTapError> {
        match self {
            AnyStore::Browser(s) => s.get(key),
            AnyStore::Memory(s) => s.get(key),
        }
    }

    fn set(&mut self, key: &'static str, value: &str) -> Result<(), PetTapError> {
        match self {
            AnyStore::Browser(s) => s.set(key, value),
            AnyStore::Memory(s) => s.set(key, value),
        }
    }
}
