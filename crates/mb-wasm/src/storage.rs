//! `localStorage` behind the editor's key/value store trait.

use mb_editor::store::{KeyValueStore, MemoryStore, StoreError};
use web_sys::Storage;

/// Browser storage, or process memory where `localStorage` is unavailable
/// (private mode with storage disabled, non-browser hosts).
pub enum LocalStore {
    Browser(Storage),
    Memory(MemoryStore),
}

impl LocalStore {
    pub fn open() -> Self {
        match web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
            Some(storage) => Self::Browser(storage),
            None => {
                log::warn!("localStorage unavailable; changes will not persist");
                Self::Memory(MemoryStore::new())
            }
        }
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> {
        match self {
            Self::Browser(storage) => storage.get_item(key).ok().flatten(),
            Self::Memory(store) => store.get(key),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        match self {
            Self::Browser(storage) => storage
                .set_item(key, value)
                .map_err(|err| StoreError::Backend(format!("{err:?}"))),
            Self::Memory(store) => store.set(key, value),
        }
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        match self {
            Self::Browser(storage) => storage
                .remove_item(key)
                .map_err(|err| StoreError::Backend(format!("{err:?}"))),
            Self::Memory(store) => store.remove(key),
        }
    }
}
