//! linemark — prioritized, hierarchically grouped source-location bookmarks.
//!
//! This library crate is the model layer of an editor bookmarking extension:
//! the in-memory collection of bookmarks and nested groups, the sibling
//! ordering policy, the mutation operations that keep the collection
//! consistent, and a file-backed JSON store behind a persistence port.
//! Editor-facing glue (commands, tree views, webviews) lives in the host.

pub mod managers;
pub mod ordering;
pub mod platform;
pub mod storage;
pub mod types;
