use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::bookmark::Location;

/// Direction of a relative move within a sibling bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MoveDirection {
    /// Toward the start of the sorted bucket (higher on screen).
    TowardFront,
    /// Toward the end of the sorted bucket (lower on screen).
    TowardBack,
}

/// One variant per engine mutation, so host adapters hand the engine a
/// statically checked payload instead of a loosely-typed shape object.
///
/// Serialized with an `op` tag and camelCase fields, matching the JSON the
/// host boundary ships.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    AddBookmark {
        location: Location,
        label: String,
    },
    RemoveBookmark {
        id: Uuid,
    },
    RenameBookmark {
        id: Uuid,
        label: String,
    },
    SetBookmarkPriority {
        id: Uuid,
        priority: i64,
    },
    MoveBookmarkToGroup {
        id: Uuid,
        group_id: Option<Uuid>,
    },
    MoveBookmarkRelative {
        id: Uuid,
        direction: MoveDirection,
    },
    CreateGroup {
        name: String,
        is_default: bool,
        parent_id: Option<Uuid>,
    },
    RenameGroup {
        id: Uuid,
        name: String,
    },
    RemoveGroup {
        id: Uuid,
    },
    MoveGroupRelative {
        id: Uuid,
        direction: MoveDirection,
    },
    MoveGroupToParent {
        id: Uuid,
        parent_id: Option<Uuid>,
        insert_before: Option<Uuid>,
    },
    SetGroupAsDefault {
        id: Uuid,
    },
}
