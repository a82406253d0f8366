//! File-backed JSON storage.
//!
//! One JSON object per storage root, held in a single file and keyed by
//! dataset name:
//!
//! ```json
//! { "bookmarks": [ ... ], "bookmarkGroups": [ ... ] }
//! ```
//!
//! Every save rewrites the whole object, creating parent directories on
//! demand.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::platform;
use crate::storage::Storage;
use crate::types::errors::StorageError;

/// JSON file store implementing the persistence port.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Creates a store backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Creates a store for a project.
    ///
    /// If `path_override` is `Some`, uses that file. Otherwise uses the
    /// per-project default under the home dotfolder.
    pub fn for_project(project: &str, path_override: Option<PathBuf>) -> Self {
        let path = match path_override {
            Some(p) => p,
            None => platform::project_store_path(project),
        };
        Self { path }
    }

    /// Returns the file this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the root object, or an empty one if the file does not exist yet.
    fn read_root(&self) -> Result<Map<String, Value>, StorageError> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| StorageError::Io(format!("Failed to read store file: {}", e)))?;

        let root: Value = serde_json::from_str(&content)
            .map_err(|e| StorageError::Serialization(format!("Failed to parse store file: {}", e)))?;

        match root {
            Value::Object(map) => Ok(map),
            other => Err(StorageError::Serialization(format!(
                "Store root must be a JSON object, found: {}",
                value_kind(&other)
            ))),
        }
    }

    /// Writes the root object back to disk, creating parent directories.
    fn write_root(&self, root: &Map<String, Value>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| StorageError::Io(format!("Failed to create store directory: {}", e)))?;
        }

        let json = serde_json::to_string_pretty(&Value::Object(root.clone()))
            .map_err(|e| StorageError::Serialization(format!("Failed to serialize store: {}", e)))?;

        fs::write(&self.path, json)
            .map_err(|e| StorageError::Io(format!("Failed to write store file: {}", e)))?;

        Ok(())
    }
}

impl Storage for FileStore {
    fn save(&self, dataset: &str, items: &[Value]) -> Result<(), StorageError> {
        let mut root = self.read_root()?;
        root.insert(dataset.to_string(), Value::Array(items.to_vec()));
        self.write_root(&root)
    }

    fn load(&self, dataset: &str) -> Result<Option<Vec<Value>>, StorageError> {
        let root = self.read_root()?;
        match root.get(dataset) {
            Some(Value::Array(items)) => Ok(Some(items.clone())),
            Some(other) => Err(StorageError::Serialization(format!(
                "Dataset '{}' must be a JSON array, found: {}",
                dataset,
                value_kind(other)
            ))),
            None => Ok(None),
        }
    }

    fn delete(&self, dataset: &str) -> Result<(), StorageError> {
        let mut root = self.read_root()?;
        if root.remove(dataset).is_some() {
            self.write_root(&root)?;
        }
        Ok(())
    }

    fn list_keys(&self) -> Result<Vec<String>, StorageError> {
        let root = self.read_root()?;
        Ok(root.keys().cloned().collect())
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
