//! The sibling ordering policy.
//!
//! Wherever siblings are sorted — bookmarks sharing a `group_id`, groups
//! sharing a `parent_id` — the same rule applies: higher priority first,
//! ties broken by earlier creation time. Implemented once over a
//! `(priority, created)` key and reused for both entity kinds.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::types::bookmark::{Bookmark, Group};

/// The `(priority, created)` key the ordering policy compares.
pub trait SiblingOrder {
    fn priority(&self) -> i64;
    fn created(&self) -> DateTime<Utc>;
}

impl SiblingOrder for Bookmark {
    fn priority(&self) -> i64 {
        self.priority
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }
}

impl SiblingOrder for Group {
    fn priority(&self) -> i64 {
        self.priority
    }

    fn created(&self) -> DateTime<Utc> {
        self.created
    }
}

impl<T: SiblingOrder> SiblingOrder for &T {
    fn priority(&self) -> i64 {
        (*self).priority()
    }

    fn created(&self) -> DateTime<Utc> {
        (*self).created()
    }
}

/// Total order over siblings: descending priority, then ascending creation time.
pub fn compare_siblings<T: SiblingOrder>(a: &T, b: &T) -> Ordering {
    b.priority()
        .cmp(&a.priority())
        .then_with(|| a.created().cmp(&b.created()))
}

/// Sorts a sibling bucket in place. Stable, so entities that compare equal
/// keep their relative order.
pub fn sort_siblings<T: SiblingOrder>(items: &mut [T]) {
    items.sort_by(|a, b| compare_siblings(a, b));
}
