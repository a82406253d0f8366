use std::fmt;

use uuid::Uuid;

// === StorageError ===

/// Errors raised by a persistence backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Reading or writing the backing store failed.
    Io(String),
    /// Encoding or decoding a snapshot failed.
    Serialization(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(msg) => write!(f, "Storage I/O failed: {}", msg),
            StorageError::Serialization(msg) => write!(f, "Storage serialization failed: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}

// === CollectionError ===

/// Errors raised by collection engine mutations.
///
/// Validation variants mean the operation aborted before touching state;
/// `Storage` means the staged mutation was discarded because the snapshot
/// could not be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    /// No group with the given ID exists.
    GroupNotFound(Uuid),
    /// A sibling group under the same parent already has this name.
    DuplicateGroupName(String),
    /// The requested parent is the group itself or one of its descendants.
    InvalidParent(Uuid),
    /// Persisting the snapshot failed; in-memory state is unchanged.
    Storage(StorageError),
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionError::GroupNotFound(id) => write!(f, "Group not found: {}", id),
            CollectionError::DuplicateGroupName(name) => {
                write!(f, "A sibling group is already named: {}", name)
            }
            CollectionError::InvalidParent(id) => {
                write!(f, "Group cannot be moved under itself or a descendant: {}", id)
            }
            CollectionError::Storage(err) => write!(f, "Persistence failed: {}", err),
        }
    }
}

impl std::error::Error for CollectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectionError::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for CollectionError {
    fn from(err: StorageError) -> Self {
        CollectionError::Storage(err)
    }
}
