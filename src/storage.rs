//! Synchronous key-value storage.
//!
//! Everything that reads or writes saved state goes through the [`Storage`]
//! trait, so the browser's `localStorage` can be swapped for [`MemoryStorage`]
//! when there is no browser around.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::DomException;


#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("local storage is not available: {0}")]
    Unavailable(String),

    #[error("failed to read {key:?} from storage: {message}")]
    Read {
        key: String,
        message: String,
    },

    #[error("storage quota exceeded while writing {key:?}")]
    QuotaExceeded {
        key: String,
    },

    #[error("failed to write {key:?} to storage: {message}")]
    Write {
        key: String,
        message: String,
    },
}


/// A synchronous, string-keyed store of strings.
pub trait Storage {
    /// Returns `None` if nothing is stored under `key`.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Overwrites whatever was previously stored under `key`.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<'a, S> Storage for &'a S where S: Storage + ?Sized {
    #[inline]
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    #[inline]
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }
}

impl<S> Storage for Rc<S> where S: Storage + ?Sized {
    #[inline]
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    #[inline]
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }
}


fn describe(err: &JsValue) -> String {
    if let Some(err) = err.dyn_ref::<js_sys::Error>() {
        String::from(err.message())

    } else if let Some(message) = err.as_string() {
        message

    } else {
        format!("{:?}", err)
    }
}

fn is_quota_exceeded(err: &JsValue) -> bool {
    err.dyn_ref::<DomException>()
        .map(|err| err.name() == "QuotaExceededError")
        .unwrap_or(false)
}


/// The browser's `window.localStorage`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

impl LocalStorage {
    pub fn new() -> Result<Self, StorageError> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("there is no global window".to_owned()))?;

        // Throws a SecurityError for opaque origins and when storage is blocked
        match window.local_storage() {
            Ok(Some(storage)) => Ok(Self { storage }),
            Ok(None) => Err(StorageError::Unavailable("localStorage is disabled".to_owned())),
            Err(err) => Err(StorageError::Unavailable(describe(&err))),
        }
    }
}

impl Storage for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage.get_item(key).map_err(|err| StorageError::Read {
            key: key.to_owned(),
            message: describe(&err),
        })
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage.set_item(key, value).map_err(|err| {
            if is_quota_exceeded(&err) {
                StorageError::QuotaExceeded { key: key.to_owned() }

            } else {
                StorageError::Write {
                    key: key.to_owned(),
                    message: describe(&err),
                }
            }
        })
    }
}


#[inline]
fn units(s: &str) -> usize {
    s.encode_utf16().count()
}


/// In-memory [`Storage`], optionally limited to a quota.
///
/// The quota counts every key and value in UTF-16 code units, the way
/// browsers account for `localStorage` usage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_quota(quota: usize) -> Self {
        Self {
            items: RefCell::new(BTreeMap::new()),
            quota: Some(quota),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    fn used_without(&self, key: &str) -> usize {
        self.items.borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| units(k) + units(v))
            .sum()
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            if self.used_without(key) + units(key) + units(value) > quota {
                return Err(StorageError::QuotaExceeded { key: key.to_owned() });
            }
        }

        self.items.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
