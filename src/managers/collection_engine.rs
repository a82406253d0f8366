//! Hierarchical collection engine for linemark.
//!
//! Implements `CollectionEngineTrait` — all mutations and queries over the
//! flat bookmark and group lists, backed by any `Storage` implementation.
//!
//! The engine owns its state for the lifetime of the process: both datasets
//! are loaded once in `load`, every mutation edits staged copies, persists
//! the full snapshot, and only commits the copies (and fires the change
//! signal) when the persist succeeds. A failed persist leaves both memory
//! and subscribers untouched, so callers never observe a half-applied
//! operation.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{error, warn};
use uuid::Uuid;

use crate::managers::change_notifier::{ChangeNotifier, SubscriptionId};
use crate::ordering::sort_siblings;
use crate::storage::{self, Storage, DATASET_BOOKMARKS, DATASET_GROUPS};
use crate::types::bookmark::{Bookmark, Group, Location};
use crate::types::command::{Command, MoveDirection};
use crate::types::errors::{CollectionError, StorageError};

/// Trait defining the collection engine operations.
pub trait CollectionEngineTrait {
    /// Adds a bookmark at `location`, assigned to the current default group
    /// if one exists. A blank label is a silent no-op returning `Ok(None)`.
    fn add_bookmark(&mut self, location: Location, label: &str)
        -> Result<Option<Uuid>, CollectionError>;
    /// Removes a bookmark. Returns `false` (no-op) if the id is unknown.
    fn remove_bookmark(&mut self, id: Uuid) -> Result<bool, CollectionError>;
    /// Relabels a bookmark. Returns `false` if the id is unknown.
    fn rename_bookmark(&mut self, id: Uuid, label: &str) -> Result<bool, CollectionError>;
    /// Sets a bookmark's raw priority. Any integer is accepted.
    fn set_bookmark_priority(&mut self, id: Uuid, priority: i64) -> Result<bool, CollectionError>;
    /// Reassigns a bookmark's group (`None` = ungrouped). Priority is kept.
    fn move_bookmark_to_group(
        &mut self,
        id: Uuid,
        group_id: Option<Uuid>,
    ) -> Result<bool, CollectionError>;
    /// Swaps the bookmark's priority with its neighbor in the sorted sibling
    /// bucket. Returns `false` if there is no neighbor in that direction.
    fn move_bookmark_relative(
        &mut self,
        id: Uuid,
        direction: MoveDirection,
    ) -> Result<bool, CollectionError>;
    /// Creates a group under `parent_id`. Fails on a sibling name collision.
    fn create_group(
        &mut self,
        name: &str,
        is_default: bool,
        parent_id: Option<Uuid>,
    ) -> Result<Group, CollectionError>;
    /// Renames a group. Returns `false` if the id is unknown; fails if a
    /// different sibling already has the name.
    fn rename_group(&mut self, id: Uuid, name: &str) -> Result<bool, CollectionError>;
    /// Removes a group, its descendants, and re-parents their bookmarks.
    /// Returns `false` if the id is unknown.
    fn remove_group(&mut self, id: Uuid) -> Result<bool, CollectionError>;
    /// Swaps the group's priority with its neighbor in the sorted sibling
    /// bucket. Returns `false` if there is no neighbor in that direction.
    fn move_group_relative(
        &mut self,
        id: Uuid,
        direction: MoveDirection,
    ) -> Result<bool, CollectionError>;
    /// Reparents a group and splices it immediately before `insert_before`
    /// (or at the front), densely renumbering the target sibling bucket.
    fn move_group_to_parent(
        &mut self,
        id: Uuid,
        new_parent_id: Option<Uuid>,
        insert_before: Option<Uuid>,
    ) -> Result<(), CollectionError>;
    /// Makes this the single default group and boosts it to the front of its
    /// sibling bucket. Returns `false` if the id is unknown.
    fn set_group_as_default(&mut self, id: Uuid) -> Result<bool, CollectionError>;
    /// Full sorted view of the collection, recomputed fresh on every call.
    fn bookmarks_grouped(&self) -> GroupedView;
    /// Display path from the root to the group, names joined with `" > "`.
    fn group_path(&self, id: Uuid) -> String;
}

/// Sorted snapshot returned by `bookmarks_grouped`.
///
/// Both maps carry an entry for every group id, so adapters can look up
/// children without special-casing empty groups.
#[derive(Debug, Clone, Default)]
pub struct GroupedView {
    pub ungrouped: Vec<Bookmark>,
    pub root_groups: Vec<Group>,
    pub bookmarks_by_group: HashMap<Uuid, Vec<Bookmark>>,
    pub child_groups: HashMap<Uuid, Vec<Group>>,
}

/// Collection engine backed by a persistence port.
pub struct CollectionEngine {
    bookmarks: Vec<Bookmark>,
    groups: Vec<Group>,
    storage: Box<dyn Storage>,
    notifier: ChangeNotifier,
}

impl CollectionEngine {
    /// Loads both datasets from storage and constructs the engine.
    ///
    /// The load completes before the engine exists, so no mutation can ever
    /// observe pre-load state. Fires one change notification once loaded.
    pub fn load(storage: Box<dyn Storage>) -> Result<Self, StorageError> {
        let bookmarks = storage::load_items(&*storage, DATASET_BOOKMARKS)?;
        let groups = storage::load_items(&*storage, DATASET_GROUPS)?;

        let mut engine = Self {
            bookmarks,
            groups,
            storage,
            notifier: ChangeNotifier::new(),
        };
        engine.notifier.notify();
        Ok(engine)
    }

    /// Registers a change listener; fired after every committed mutation.
    pub fn subscribe(&mut self, listener: impl FnMut() + 'static) -> SubscriptionId {
        self.notifier.subscribe(listener)
    }

    /// Removes a change listener.
    pub fn unsubscribe(&mut self, subscription: SubscriptionId) -> bool {
        self.notifier.unsubscribe(subscription)
    }

    /// Current flat bookmark list, unsorted.
    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    /// Current flat group list, unsorted.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Dispatches a tagged command payload to the matching operation.
    /// Per-operation return values are dropped; hosts re-query after the
    /// change notification fires.
    pub fn apply(&mut self, command: Command) -> Result<(), CollectionError> {
        match command {
            Command::AddBookmark { location, label } => {
                self.add_bookmark(location, &label).map(|_| ())
            }
            Command::RemoveBookmark { id } => self.remove_bookmark(id).map(|_| ()),
            Command::RenameBookmark { id, label } => self.rename_bookmark(id, &label).map(|_| ()),
            Command::SetBookmarkPriority { id, priority } => {
                self.set_bookmark_priority(id, priority).map(|_| ())
            }
            Command::MoveBookmarkToGroup { id, group_id } => {
                self.move_bookmark_to_group(id, group_id).map(|_| ())
            }
            Command::MoveBookmarkRelative { id, direction } => {
                self.move_bookmark_relative(id, direction).map(|_| ())
            }
            Command::CreateGroup {
                name,
                is_default,
                parent_id,
            } => self.create_group(&name, is_default, parent_id).map(|_| ()),
            Command::RenameGroup { id, name } => self.rename_group(id, &name).map(|_| ()),
            Command::RemoveGroup { id } => self.remove_group(id).map(|_| ()),
            Command::MoveGroupRelative { id, direction } => {
                self.move_group_relative(id, direction).map(|_| ())
            }
            Command::MoveGroupToParent {
                id,
                parent_id,
                insert_before,
            } => self.move_group_to_parent(id, parent_id, insert_before),
            Command::SetGroupAsDefault { id } => self.set_group_as_default(id).map(|_| ()),
        }
    }

    /// Persists the staged snapshot, then commits it and notifies.
    /// On failure the staged lists are dropped and state is unchanged.
    fn commit(&mut self, bookmarks: Vec<Bookmark>, groups: Vec<Group>) -> Result<(), CollectionError> {
        let result = storage::save_items(&*self.storage, DATASET_BOOKMARKS, &bookmarks)
            .and_then(|_| storage::save_items(&*self.storage, DATASET_GROUPS, &groups));

        if let Err(err) = result {
            error!("Failed to persist collection snapshot: {}", err);
            return Err(CollectionError::Storage(err));
        }

        self.bookmarks = bookmarks;
        self.groups = groups;
        self.notifier.notify();
        Ok(())
    }

    fn group_exists(&self, id: Uuid) -> bool {
        self.groups.iter().any(|g| g.id == id)
    }

    /// Checks for a sibling group under `parent_id` named `name`, ignoring
    /// `exclude` (the group being renamed or moved).
    fn sibling_name_taken(&self, parent_id: Option<Uuid>, name: &str, exclude: Option<Uuid>) -> bool {
        self.groups
            .iter()
            .any(|g| g.parent_id == parent_id && g.name == name && Some(g.id) != exclude)
    }

    /// Walks parent links from `candidate` to check whether `ancestor` is on
    /// the chain. Bounded by the group count so a corrupt store cannot loop.
    fn is_descendant_of(&self, candidate: Uuid, ancestor: Uuid) -> bool {
        let mut current = Some(candidate);
        let mut hops = self.groups.len();
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            if hops == 0 {
                return false;
            }
            hops -= 1;
            current = self
                .groups
                .iter()
                .find(|g| g.id == id)
                .and_then(|g| g.parent_id);
        }
        false
    }

    fn max_group_priority(&self) -> i64 {
        self.groups.iter().map(|g| g.priority).max().unwrap_or(0)
    }

    /// Sorted bookmark sibling bucket for the given group (`None` = ungrouped).
    fn bookmark_bucket(&self, group_id: Option<Uuid>) -> Vec<&Bookmark> {
        let mut bucket: Vec<&Bookmark> = self
            .bookmarks
            .iter()
            .filter(|b| b.group_id == group_id)
            .collect();
        sort_siblings(&mut bucket);
        bucket
    }

    /// Sorted group sibling bucket for the given parent (`None` = root).
    fn group_bucket(&self, parent_id: Option<Uuid>) -> Vec<&Group> {
        let mut bucket: Vec<&Group> = self
            .groups
            .iter()
            .filter(|g| g.parent_id == parent_id)
            .collect();
        sort_siblings(&mut bucket);
        bucket
    }

    /// Finds the neighbor for a relative move: the entry just before (toward
    /// front) or just after (toward back) position `pos` in a sorted bucket.
    fn neighbor_index(pos: usize, len: usize, direction: MoveDirection) -> Option<usize> {
        match direction {
            MoveDirection::TowardFront => pos.checked_sub(1),
            MoveDirection::TowardBack => {
                let next = pos + 1;
                (next < len).then_some(next)
            }
        }
    }

    /// Removes `id` and all its descendants from `groups`, post-order, and
    /// re-parents each removed group's bookmarks to that group's parent. The
    /// cascade keeps every surviving bookmark pointed at a surviving group.
    fn remove_group_recursive(bookmarks: &mut [Bookmark], groups: &mut Vec<Group>, id: Uuid) {
        let children: Vec<Uuid> = groups
            .iter()
            .filter(|g| g.parent_id == Some(id))
            .map(|g| g.id)
            .collect();
        for child in children {
            Self::remove_group_recursive(bookmarks, groups, child);
        }

        let parent_id = groups.iter().find(|g| g.id == id).and_then(|g| g.parent_id);
        for bookmark in bookmarks.iter_mut() {
            if bookmark.group_id == Some(id) {
                bookmark.group_id = parent_id;
            }
        }
        groups.retain(|g| g.id != id);
    }
}

impl CollectionEngineTrait for CollectionEngine {
    fn add_bookmark(
        &mut self,
        location: Location,
        label: &str,
    ) -> Result<Option<Uuid>, CollectionError> {
        // Cancelled or empty input: nothing to create
        if label.trim().is_empty() {
            return Ok(None);
        }

        let group_id = self.groups.iter().find(|g| g.is_default).map(|g| g.id);
        let bookmark = Bookmark {
            id: Uuid::new_v4(),
            label: label.to_string(),
            location,
            created: Utc::now(),
            group_id,
            priority: 0,
        };
        let id = bookmark.id;

        let mut bookmarks = self.bookmarks.clone();
        bookmarks.push(bookmark);
        self.commit(bookmarks, self.groups.clone())?;
        Ok(Some(id))
    }

    fn remove_bookmark(&mut self, id: Uuid) -> Result<bool, CollectionError> {
        if !self.bookmarks.iter().any(|b| b.id == id) {
            return Ok(false);
        }

        let mut bookmarks = self.bookmarks.clone();
        bookmarks.retain(|b| b.id != id);
        self.commit(bookmarks, self.groups.clone())?;
        Ok(true)
    }

    fn rename_bookmark(&mut self, id: Uuid, label: &str) -> Result<bool, CollectionError> {
        if !self.bookmarks.iter().any(|b| b.id == id) {
            return Ok(false);
        }

        let mut bookmarks = self.bookmarks.clone();
        for bookmark in &mut bookmarks {
            if bookmark.id == id {
                bookmark.label = label.to_string();
            }
        }
        self.commit(bookmarks, self.groups.clone())?;
        Ok(true)
    }

    fn set_bookmark_priority(&mut self, id: Uuid, priority: i64) -> Result<bool, CollectionError> {
        if !self.bookmarks.iter().any(|b| b.id == id) {
            return Ok(false);
        }

        let mut bookmarks = self.bookmarks.clone();
        for bookmark in &mut bookmarks {
            if bookmark.id == id {
                bookmark.priority = priority;
            }
        }
        self.commit(bookmarks, self.groups.clone())?;
        Ok(true)
    }

    fn move_bookmark_to_group(
        &mut self,
        id: Uuid,
        group_id: Option<Uuid>,
    ) -> Result<bool, CollectionError> {
        if !self.bookmarks.iter().any(|b| b.id == id) {
            return Ok(false);
        }
        if let Some(gid) = group_id {
            if !self.group_exists(gid) {
                warn!("Refusing to move bookmark {} into unknown group {}", id, gid);
                return Ok(false);
            }
        }

        let mut bookmarks = self.bookmarks.clone();
        for bookmark in &mut bookmarks {
            if bookmark.id == id {
                bookmark.group_id = group_id;
            }
        }
        self.commit(bookmarks, self.groups.clone())?;
        Ok(true)
    }

    fn move_bookmark_relative(
        &mut self,
        id: Uuid,
        direction: MoveDirection,
    ) -> Result<bool, CollectionError> {
        let Some(bookmark) = self.bookmarks.iter().find(|b| b.id == id) else {
            return Ok(false);
        };

        let bucket = self.bookmark_bucket(bookmark.group_id);
        let Some(pos) = bucket.iter().position(|b| b.id == id) else {
            return Ok(false);
        };
        let Some(neighbor_pos) = Self::neighbor_index(pos, bucket.len(), direction) else {
            return Ok(false);
        };

        let neighbor_id = bucket[neighbor_pos].id;
        let own_priority = bucket[pos].priority;
        let neighbor_priority = bucket[neighbor_pos].priority;

        let mut bookmarks = self.bookmarks.clone();
        for b in &mut bookmarks {
            if b.id == id {
                b.priority = neighbor_priority;
            } else if b.id == neighbor_id {
                b.priority = own_priority;
            }
        }
        self.commit(bookmarks, self.groups.clone())?;
        Ok(true)
    }

    fn create_group(
        &mut self,
        name: &str,
        is_default: bool,
        parent_id: Option<Uuid>,
    ) -> Result<Group, CollectionError> {
        if let Some(pid) = parent_id {
            if !self.group_exists(pid) {
                return Err(CollectionError::GroupNotFound(pid));
            }
        }
        if self.sibling_name_taken(parent_id, name, None) {
            warn!("Group name already used by a sibling: {}", name);
            return Err(CollectionError::DuplicateGroupName(name.to_string()));
        }

        // Max over ALL groups, not just siblings: over-shoots, but only
        // siblings are ever compared, and it guarantees front placement.
        let priority = self.max_group_priority() + 1;
        let group = Group {
            id: Uuid::new_v4(),
            name: name.to_string(),
            is_default,
            created: Utc::now(),
            parent_id,
            priority,
        };

        let mut groups = self.groups.clone();
        if is_default {
            for g in &mut groups {
                g.is_default = false;
            }
        }
        groups.push(group.clone());
        self.commit(self.bookmarks.clone(), groups)?;
        Ok(group)
    }

    fn rename_group(&mut self, id: Uuid, name: &str) -> Result<bool, CollectionError> {
        let Some(group) = self.groups.iter().find(|g| g.id == id) else {
            return Ok(false);
        };
        if self.sibling_name_taken(group.parent_id, name, Some(id)) {
            warn!("Group name already used by a sibling: {}", name);
            return Err(CollectionError::DuplicateGroupName(name.to_string()));
        }

        let mut groups = self.groups.clone();
        for g in &mut groups {
            if g.id == id {
                g.name = name.to_string();
            }
        }
        self.commit(self.bookmarks.clone(), groups)?;
        Ok(true)
    }

    fn remove_group(&mut self, id: Uuid) -> Result<bool, CollectionError> {
        if !self.group_exists(id) {
            return Ok(false);
        }

        let mut bookmarks = self.bookmarks.clone();
        let mut groups = self.groups.clone();
        Self::remove_group_recursive(&mut bookmarks, &mut groups, id);
        self.commit(bookmarks, groups)?;
        Ok(true)
    }

    fn move_group_relative(
        &mut self,
        id: Uuid,
        direction: MoveDirection,
    ) -> Result<bool, CollectionError> {
        let Some(group) = self.groups.iter().find(|g| g.id == id) else {
            return Ok(false);
        };

        let bucket = self.group_bucket(group.parent_id);
        let Some(pos) = bucket.iter().position(|g| g.id == id) else {
            return Ok(false);
        };
        let Some(neighbor_pos) = Self::neighbor_index(pos, bucket.len(), direction) else {
            return Ok(false);
        };

        let neighbor_id = bucket[neighbor_pos].id;
        let own_priority = bucket[pos].priority;
        let neighbor_priority = bucket[neighbor_pos].priority;

        let mut groups = self.groups.clone();
        for g in &mut groups {
            if g.id == id {
                g.priority = neighbor_priority;
            } else if g.id == neighbor_id {
                g.priority = own_priority;
            }
        }
        self.commit(self.bookmarks.clone(), groups)?;
        Ok(true)
    }

    fn move_group_to_parent(
        &mut self,
        id: Uuid,
        new_parent_id: Option<Uuid>,
        insert_before: Option<Uuid>,
    ) -> Result<(), CollectionError> {
        let Some(mover) = self.groups.iter().find(|g| g.id == id) else {
            return Err(CollectionError::GroupNotFound(id));
        };
        let mover_name = mover.name.clone();

        if let Some(pid) = new_parent_id {
            if !self.group_exists(pid) {
                return Err(CollectionError::GroupNotFound(pid));
            }
            // Keep the parent links a forest
            if self.is_descendant_of(pid, id) {
                warn!("Refusing to move group {} under its own subtree", id);
                return Err(CollectionError::InvalidParent(id));
            }
        }
        if self.sibling_name_taken(new_parent_id, &mover_name, Some(id)) {
            warn!(
                "Group name already used under the target parent: {}",
                mover_name
            );
            return Err(CollectionError::DuplicateGroupName(mover_name));
        }

        // Target siblings in their current sorted order, mover excluded
        let mut order: Vec<Uuid> = self
            .group_bucket(new_parent_id)
            .iter()
            .filter(|g| g.id != id)
            .map(|g| g.id)
            .collect();
        let insert_at = insert_before
            .and_then(|before| order.iter().position(|&gid| gid == before))
            .unwrap_or(0);
        order.insert(insert_at, id);

        // Dense renumbering: front position gets `count`, last gets 1
        let count = order.len() as i64;
        let mut groups = self.groups.clone();
        for g in &mut groups {
            if g.id == id {
                g.parent_id = new_parent_id;
            }
            if let Some(pos) = order.iter().position(|&gid| gid == g.id) {
                g.priority = count - pos as i64;
            }
        }
        self.commit(self.bookmarks.clone(), groups)?;
        Ok(())
    }

    fn set_group_as_default(&mut self, id: Uuid) -> Result<bool, CollectionError> {
        if !self.group_exists(id) {
            return Ok(false);
        }

        let priority = self.max_group_priority() + 1;
        let mut groups = self.groups.clone();
        for g in &mut groups {
            g.is_default = g.id == id;
            if g.id == id {
                g.priority = priority;
            }
        }
        self.commit(self.bookmarks.clone(), groups)?;
        Ok(true)
    }

    fn bookmarks_grouped(&self) -> GroupedView {
        let mut view = GroupedView {
            ungrouped: self.bookmark_bucket(None).into_iter().cloned().collect(),
            root_groups: self.group_bucket(None).into_iter().cloned().collect(),
            ..GroupedView::default()
        };

        for group in &self.groups {
            view.bookmarks_by_group.insert(
                group.id,
                self.bookmark_bucket(Some(group.id))
                    .into_iter()
                    .cloned()
                    .collect(),
            );
            view.child_groups.insert(
                group.id,
                self.group_bucket(Some(group.id))
                    .into_iter()
                    .cloned()
                    .collect(),
            );
        }
        view
    }

    fn group_path(&self, id: Uuid) -> String {
        let mut names = Vec::new();
        let mut current = Some(id);
        // Bounded walk: a dangling or corrupt link yields a partial path
        let mut hops = self.groups.len();

        while let Some(gid) = current {
            if hops == 0 {
                break;
            }
            hops -= 1;
            match self.groups.iter().find(|g| g.id == gid) {
                Some(group) => {
                    names.push(group.name.clone());
                    current = group.parent_id;
                }
                None => break,
            }
        }

        names.reverse();
        names.join(" > ")
    }
}
