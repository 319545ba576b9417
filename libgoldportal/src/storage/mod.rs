pub mod customer_directory;
pub mod password_reset;
pub mod preferences;
pub mod search_history;

use serde::de::DeserializeOwned;
use serde::Serialize;
use snafu::{ResultExt, Snafu};
use std::collections::HashMap;
use std::sync::RwLock;

/// Errors that may occur when reading or writing local storage.
#[derive(Debug, Snafu)]
pub enum LocalStorageError {
    /// The storage backend could not complete the operation.
    #[snafu(display("The storage backend failed: {message}"))]
    BackendError { message: String },
    /// The blob stored under a key could not be (de)serialized.
    #[snafu(display("The value stored under {key} is not valid json: {source}"))]
    MalformedValueError {
        key: String,
        source: serde_json::Error,
    },
}

pub type ThreadSafeLocalStorage = dyn LocalStorage + Sync + Send;

/// Opaque key/blob storage that survives reloads of the portal.
///
/// Values are json documents without any schema versioning. Every key is
/// owned by exactly one of the stores in this module or by the session store.
pub trait LocalStorage {
    /// Returns the raw value stored under the key, if any.
    fn get_item(&self, key: &str) -> Result<Option<String>, LocalStorageError>;

    /// Stores the raw value under the key, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), LocalStorageError>;

    /// Removes the key. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), LocalStorageError>;
}

pub fn read_json<T>(storage: &ThreadSafeLocalStorage, key: &str) -> Result<Option<T>, LocalStorageError>
where
    T: DeserializeOwned,
{
    match storage.get_item(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .context(MalformedValueSnafu { key }),
        None => Ok(None),
    }
}

pub fn write_json<T>(storage: &ThreadSafeLocalStorage, key: &str, value: &T) -> Result<(), LocalStorageError>
where
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value).context(MalformedValueSnafu { key })?;
    storage.set_item(key, &raw)
}

pub struct InMemoryLocalStorage {
    items: RwLock<HashMap<String, String>>,
}

impl Default for InMemoryLocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLocalStorage {
    pub fn new() -> InMemoryLocalStorage {
        InMemoryLocalStorage {
            items: RwLock::new(HashMap::new()),
        }
    }
}

impl LocalStorage for InMemoryLocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, LocalStorageError> {
        let items = self.items.read().unwrap();

        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), LocalStorageError> {
        let mut items = self.items.write().unwrap();
        items.insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), LocalStorageError> {
        let mut items = self.items.write().unwrap();
        items.remove(key);

        Ok(())
    }
}
