//! In-memory storage.
//!
//! Same contract as the file store without touching disk. Used by tests and
//! by hosts that want an ephemeral collection.

use std::cell::RefCell;
use std::collections::BTreeMap;

use serde_json::Value;

use crate::storage::Storage;
use crate::types::errors::StorageError;

/// Map-backed store implementing the persistence port.
#[derive(Default)]
pub struct MemoryStore {
    datasets: RefCell<BTreeMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStore {
    fn save(&self, dataset: &str, items: &[Value]) -> Result<(), StorageError> {
        self.datasets
            .borrow_mut()
            .insert(dataset.to_string(), items.to_vec());
        Ok(())
    }

    fn load(&self, dataset: &str) -> Result<Option<Vec<Value>>, StorageError> {
        Ok(self.datasets.borrow().get(dataset).cloned())
    }

    fn delete(&self, dataset: &str) -> Result<(), StorageError> {
        self.datasets.borrow_mut().remove(dataset);
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.datasets.borrow().keys().cloned().collect())
    }
}
