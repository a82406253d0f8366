//! Unit tests for relative moves and reparenting.
//!
//! Relative moves are pairwise priority swaps inside one sibling bucket;
//! `move_group_to_parent` is the only operation that renumbers a bucket.

use linemark::managers::collection_engine::{CollectionEngine, CollectionEngineTrait};
use linemark::storage::MemoryStore;
use linemark::types::bookmark::Location;
use linemark::types::command::MoveDirection;
use linemark::types::errors::CollectionError;
use rstest::rstest;
use uuid::Uuid;

fn engine() -> CollectionEngine {
    CollectionEngine::load(Box::new(MemoryStore::new())).expect("load from empty store")
}

fn loc(line: u32) -> Location {
    Location::new("src/lib.rs", line, 0)
}

/// Helper: three ungrouped bookmarks with priorities 30, 20, 10, so the
/// sorted bucket order is exactly the creation order.
fn engine_with_ranked_bookmarks() -> (CollectionEngine, Vec<Uuid>) {
    let mut eng = engine();
    let mut ids = Vec::new();
    for (i, priority) in [30i64, 20, 10].iter().enumerate() {
        let id = eng
            .add_bookmark(loc(i as u32), &format!("b{}", i))
            .unwrap()
            .unwrap();
        eng.set_bookmark_priority(id, *priority).unwrap();
        ids.push(id);
    }
    (eng, ids)
}

fn sorted_ungrouped_ids(eng: &CollectionEngine) -> Vec<Uuid> {
    eng.bookmarks_grouped()
        .ungrouped
        .iter()
        .map(|b| b.id)
        .collect()
}

/// No neighbor in the requested direction: returns false, changes nothing.
#[rstest]
#[case(MoveDirection::TowardFront, 0)]
#[case(MoveDirection::TowardBack, 2)]
fn test_bookmark_boundary_move_is_noop(#[case] direction: MoveDirection, #[case] index: usize) {
    let (mut eng, ids) = engine_with_ranked_bookmarks();
    let before: Vec<i64> = eng.bookmarks().iter().map(|b| b.priority).collect();

    assert!(!eng.move_bookmark_relative(ids[index], direction).unwrap());

    let after: Vec<i64> = eng.bookmarks().iter().map(|b| b.priority).collect();
    assert_eq!(before, after);
}

/// A middle move swaps exactly two priority values and nothing else.
#[rstest]
#[case(MoveDirection::TowardFront, vec![1, 0, 2])]
#[case(MoveDirection::TowardBack, vec![0, 2, 1])]
fn test_bookmark_relative_move_swaps_neighbors(
    #[case] direction: MoveDirection,
    #[case] expected_order: Vec<usize>,
) {
    let (mut eng, ids) = engine_with_ranked_bookmarks();

    assert!(eng.move_bookmark_relative(ids[1], direction).unwrap());

    let expected: Vec<Uuid> = expected_order.into_iter().map(|i| ids[i]).collect();
    assert_eq!(sorted_ungrouped_ids(&eng), expected);

    // Only priorities moved; labels, locations and group membership intact
    for (i, id) in ids.iter().enumerate() {
        let bm = eng.bookmarks().iter().find(|b| b.id == *id).unwrap();
        assert_eq!(bm.label, format!("b{}", i));
        assert_eq!(bm.group_id, None);
    }
    let mut priorities: Vec<i64> = eng.bookmarks().iter().map(|b| b.priority).collect();
    priorities.sort_unstable();
    assert_eq!(priorities, vec![10, 20, 30]);
}

/// Bookmarks in other buckets are invisible to a relative move.
#[test]
fn test_bookmark_relative_move_is_scoped_to_its_bucket() {
    let (mut eng, ids) = engine_with_ranked_bookmarks();
    let grp = eng.create_group("Other", false, None).unwrap();
    let outsider = eng.add_bookmark(loc(99), "outsider").unwrap().unwrap();
    eng.move_bookmark_to_group(outsider, Some(grp.id)).unwrap();
    eng.set_bookmark_priority(outsider, 1000).unwrap();

    // Front of the ungrouped bucket, despite the higher-priority outsider
    assert!(!eng
        .move_bookmark_relative(ids[0], MoveDirection::TowardFront)
        .unwrap());

    // The outsider alone in its bucket cannot move either
    assert!(!eng
        .move_bookmark_relative(outsider, MoveDirection::TowardBack)
        .unwrap());
}

#[test]
fn test_move_unknown_bookmark_returns_false() {
    let (mut eng, _) = engine_with_ranked_bookmarks();
    assert!(!eng
        .move_bookmark_relative(Uuid::new_v4(), MoveDirection::TowardFront)
        .unwrap());
}

/// Group relative moves use the same swap algorithm over the parent bucket.
#[test]
fn test_group_relative_move() {
    let mut eng = engine();
    let a = eng.create_group("A", false, None).unwrap();
    let b = eng.create_group("B", false, None).unwrap();
    let c = eng.create_group("C", false, None).unwrap();

    // Creation order gives ascending priorities, so sorted order is C, B, A
    let order = |eng: &CollectionEngine| -> Vec<Uuid> {
        eng.bookmarks_grouped()
            .root_groups
            .iter()
            .map(|g| g.id)
            .collect()
    };
    assert_eq!(order(&eng), vec![c.id, b.id, a.id]);

    assert!(eng
        .move_group_relative(b.id, MoveDirection::TowardFront)
        .unwrap());
    assert_eq!(order(&eng), vec![b.id, c.id, a.id]);

    // Front of the bucket: no further move toward the front
    assert!(!eng
        .move_group_relative(b.id, MoveDirection::TowardFront)
        .unwrap());
    assert_eq!(order(&eng), vec![b.id, c.id, a.id]);
}

/// Nested buckets are independent: a child bucket move ignores root groups.
#[test]
fn test_group_relative_move_scoped_to_parent_bucket() {
    let mut eng = engine();
    let root = eng.create_group("Root", false, None).unwrap();
    let x = eng.create_group("X", false, Some(root.id)).unwrap();
    let y = eng.create_group("Y", false, Some(root.id)).unwrap();

    assert!(eng.move_group_relative(x.id, MoveDirection::TowardFront).unwrap());

    let children: Vec<Uuid> = eng.bookmarks_grouped().child_groups[&root.id]
        .iter()
        .map(|g| g.id)
        .collect();
    assert_eq!(children, vec![x.id, y.id]);
}

fn child_order(eng: &CollectionEngine, parent: Uuid) -> Vec<Uuid> {
    eng.bookmarks_grouped().child_groups[&parent]
        .iter()
        .map(|g| g.id)
        .collect()
}

/// Reparenting splices the mover before `insert_before` and densely
/// renumbers the whole bucket, front = count down to 1.
#[test]
fn test_move_group_to_parent_with_insertion_point() {
    let mut eng = engine();
    let target = eng.create_group("Target", false, None).unwrap();
    let x = eng.create_group("X", false, Some(target.id)).unwrap();
    let y = eng.create_group("Y", false, Some(target.id)).unwrap();
    let mover = eng.create_group("Mover", false, None).unwrap();

    // Children sort as Y, X (Y created later, higher priority)
    assert_eq!(child_order(&eng, target.id), vec![y.id, x.id]);

    eng.move_group_to_parent(mover.id, Some(target.id), Some(x.id))
        .unwrap();

    assert_eq!(child_order(&eng, target.id), vec![y.id, mover.id, x.id]);
    assert_eq!(
        eng.groups()
            .iter()
            .find(|g| g.id == mover.id)
            .unwrap()
            .parent_id,
        Some(target.id)
    );

    // Dense renumbering of the final bucket: 3, 2, 1
    let priorities: Vec<i64> = eng.bookmarks_grouped().child_groups[&target.id]
        .iter()
        .map(|g| g.priority)
        .collect();
    assert_eq!(priorities, vec![3, 2, 1]);
}

/// With no insertion point the mover lands at the front of the new bucket.
#[test]
fn test_move_group_to_parent_defaults_to_front() {
    let mut eng = engine();
    let target = eng.create_group("Target", false, None).unwrap();
    let x = eng.create_group("X", false, Some(target.id)).unwrap();
    let mover = eng.create_group("Mover", false, None).unwrap();

    eng.move_group_to_parent(mover.id, Some(target.id), None)
        .unwrap();
    assert_eq!(child_order(&eng, target.id), vec![mover.id, x.id]);
}

/// An insertion point that is not among the new siblings degrades to front.
#[test]
fn test_move_group_to_parent_with_unknown_insertion_point() {
    let mut eng = engine();
    let target = eng.create_group("Target", false, None).unwrap();
    let x = eng.create_group("X", false, Some(target.id)).unwrap();
    let mover = eng.create_group("Mover", false, None).unwrap();

    eng.move_group_to_parent(mover.id, Some(target.id), Some(Uuid::new_v4()))
        .unwrap();
    assert_eq!(child_order(&eng, target.id), vec![mover.id, x.id]);
}

/// A name collision among the new siblings rejects the move entirely.
#[test]
fn test_move_group_to_parent_rejects_name_collision() {
    let mut eng = engine();
    let target = eng.create_group("Target", false, None).unwrap();
    eng.create_group("Dup", false, Some(target.id)).unwrap();
    let mover = eng.create_group("Dup", false, None).unwrap();

    let before = eng.groups().to_vec();
    let err = eng
        .move_group_to_parent(mover.id, Some(target.id), None)
        .unwrap_err();
    assert!(matches!(err, CollectionError::DuplicateGroupName(_)));
    assert_eq!(eng.groups(), before.as_slice());
}

/// The parent links stay a forest: a group cannot move under its own subtree.
#[test]
fn test_move_group_under_own_descendant_is_rejected() {
    let mut eng = engine();
    let a = eng.create_group("A", false, None).unwrap();
    let b = eng.create_group("B", false, Some(a.id)).unwrap();

    let err = eng.move_group_to_parent(a.id, Some(b.id), None).unwrap_err();
    assert!(matches!(err, CollectionError::InvalidParent(_)));

    let err = eng.move_group_to_parent(a.id, Some(a.id), None).unwrap_err();
    assert!(matches!(err, CollectionError::InvalidParent(_)));
}

/// Moving back to root level reparents and renumbers the root bucket.
#[test]
fn test_move_group_to_root() {
    let mut eng = engine();
    let a = eng.create_group("A", false, None).unwrap();
    let b = eng.create_group("B", false, Some(a.id)).unwrap();

    eng.move_group_to_parent(b.id, None, None).unwrap();

    let roots: Vec<Uuid> = eng
        .bookmarks_grouped()
        .root_groups
        .iter()
        .map(|g| g.id)
        .collect();
    assert_eq!(roots, vec![b.id, a.id]);
    assert_eq!(
        eng.groups().iter().find(|g| g.id == b.id).unwrap().parent_id,
        None
    );
}

#[test]
fn test_move_unknown_group_fails() {
    let mut eng = engine();
    let err = eng
        .move_group_to_parent(Uuid::new_v4(), None, None)
        .unwrap_err();
    assert!(matches!(err, CollectionError::GroupNotFound(_)));
}
