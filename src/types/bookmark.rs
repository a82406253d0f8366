use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A source location: file path plus zero-based line and column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub path: PathBuf,
    pub line: u32,
    pub column: u32,
}

impl Location {
    pub fn new(path: impl Into<PathBuf>, line: u32, column: u32) -> Self {
        Self {
            path: path.into(),
            line,
            column,
        }
    }
}

/// A named, prioritized bookmark pinned to a source location.
///
/// `location` and `created` are fixed at creation; `label`, `group_id` and
/// `priority` change through engine operations. `group_id = None` means the
/// bookmark lives in the shared "ungrouped" bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: Uuid,
    pub label: String,
    pub location: Location,
    pub created: DateTime<Utc>,
    pub group_id: Option<Uuid>,
    pub priority: i64,
}

/// A node in the group forest. `parent_id = None` means root-level.
///
/// At most one group in the whole collection carries `is_default = true`;
/// sibling groups (same `parent_id`) never share a name. Both invariants are
/// maintained by the engine's mutation operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    pub is_default: bool,
    pub created: DateTime<Utc>,
    pub parent_id: Option<Uuid>,
    pub priority: i64,
}
