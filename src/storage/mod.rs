// linemark persistence port
// The collection engine depends only on the `Storage` trait; concrete
// backends live in the submodules.

pub mod file_store;
pub mod memory_store;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::types::errors::StorageError;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;

/// Dataset name for the flat bookmark list.
pub const DATASET_BOOKMARKS: &str = "bookmarks";
/// Dataset name for the flat group list.
pub const DATASET_GROUPS: &str = "bookmarkGroups";

/// Key/value snapshot store. `save` overwrites the full collection under the
/// given logical name and must be durable before returning.
pub trait Storage {
    fn save(&self, dataset: &str, items: &[Value]) -> Result<(), StorageError>;
    /// Returns the last saved snapshot, or `None` if the dataset was never saved.
    fn load(&self, dataset: &str) -> Result<Option<Vec<Value>>, StorageError>;
    fn delete(&self, dataset: &str) -> Result<(), StorageError>;
    fn list_keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Serializes typed records and saves them under `dataset`.
pub fn save_items<T: Serialize>(
    storage: &dyn Storage,
    dataset: &str,
    items: &[T],
) -> Result<(), StorageError> {
    let values = items
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    storage.save(dataset, &values)
}

/// Loads and deserializes the records under `dataset`.
/// A never-saved dataset loads as an empty list.
pub fn load_items<T: DeserializeOwned>(
    storage: &dyn Storage,
    dataset: &str,
) -> Result<Vec<T>, StorageError> {
    match storage.load(dataset)? {
        Some(values) => values
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StorageError::Serialization(e.to_string())),
        None => Ok(Vec::new()),
    }
}
