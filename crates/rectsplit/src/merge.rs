#![forbid(unsafe_code)]

//! Greedy bounding-box merging.
//!
//! [`merge_rects`] folds a list of candidates into a set: each candidate is
//! fused with the first member whose bounding box wastes at most the accepted
//! error, and the fused record goes back into the candidate queue so it can
//! keep growing. Candidates that fit nowhere join the set unchanged. This is
//! first-fit, not an optimal pairing.
//!
//! [`add_split_fuzzy_and_merge`] runs a fuzzy insert and then merges only the
//! records that insert produced, so settled members are not rescanned as
//! candidates.

use crate::error::RegionError;
use crate::fuzzy::add_split_fuzzy;
use crate::list::{RectArena, RectId, RectList};

/// Merge every record of `to_merge` into `rects`, leaving `to_merge` empty.
///
/// The waste of a pair is `outer.area - (a.area + b.area)`; any overlap
/// between the two is ignored.
pub fn merge_rects(
    arena: &mut RectArena,
    rects: &mut RectList,
    to_merge: &mut RectList,
    accepted_error: i64,
) {
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!(
        "merge_rects",
        members = rects.len(),
        candidates = to_merge.len(),
        accepted_error
    );
    #[cfg(feature = "tracing")]
    let _guard = _span.enter();

    while let Some(head) = to_merge.head() {
        let r1 = *arena.rect(head);

        let mut prev: Option<RectId> = None;
        let mut cursor = rects.head();
        let mut merged = false;

        while let Some(member) = cursor {
            let r2 = *arena.rect(member);
            let outer = r1.bounds(&r2);

            if outer.area() - r2.area() - r1.area() <= accepted_error {
                #[cfg(feature = "tracing")]
                tracing::trace!(candidate = %r1, member = %r2, merged = %outer, "merge");
                // The member's record carries the merged box back into the queue.
                if let Some(id) = arena.unlink_next(rects, prev) {
                    arena.replace(id, outer);
                    arena.append_node(to_merge, id);
                }
                merged = true;
                break;
            }

            prev = Some(member);
            cursor = arena.next(member);
        }

        if merged {
            arena.delete_next(to_merge, None);
        } else if let Some(id) = arena.unlink_next(to_merge, None) {
            arena.append_node(rects, id);
        }
    }
}

/// Merge the records that follow `marker` against the records up to it.
///
/// `marker` is the value returned by
/// [`add_split_fuzzy`](crate::fuzzy::add_split_fuzzy); it must still be in
/// `rects`.
pub fn merge_after(
    arena: &mut RectArena,
    rects: &mut RectList,
    marker: RectId,
    accepted_error: i64,
) {
    let mut to_merge = arena.split_after(rects, marker);
    if !to_merge.is_empty() {
        merge_rects(arena, rects, &mut to_merge, accepted_error);
    }
}

/// Fuzzy-insert `node`, then merge the freshly added tail into the rest.
///
/// Nothing is merged when the insertion consumed every earlier record or the
/// list started empty: there is no settled prefix to merge into.
///
/// # Errors
///
/// Propagates [`RegionError::UnreachableSplit`] from the insert.
pub fn add_split_fuzzy_and_merge(
    arena: &mut RectArena,
    rects: &mut RectList,
    node: RectId,
    split_accepted_error: i64,
    merge_accepted_error: i64,
) -> Result<(), RegionError> {
    let marker = add_split_fuzzy(arena, rects, node, split_accepted_error)?;
    if let Some(marker) = marker {
        merge_after(arena, rects, marker, merge_accepted_error);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn list_of(arena: &mut RectArena, rects: &[Rect]) -> RectList {
        let mut list = RectList::new();
        for r in rects {
            arena.append(&mut list, *r);
        }
        list
    }

    fn collect(arena: &RectArena, list: &RectList) -> Vec<Rect> {
        arena.iter(list).map(|(_, r)| *r).collect()
    }

    #[test]
    fn bridging_candidate_merges_all_three() {
        let mut arena = RectArena::new();
        let mut rects = list_of(
            &mut arena,
            &[Rect::new(0, 0, 10, 10), Rect::new(20, 0, 10, 10)],
        );
        let mut candidates = list_of(&mut arena, &[Rect::new(10, 0, 10, 10)]);

        merge_rects(&mut arena, &mut rects, &mut candidates, 100);

        assert!(candidates.is_empty());
        assert_eq!(collect(&arena, &rects), vec![Rect::new(0, 0, 30, 10)]);
        assert_eq!(arena.live_count(), 1);
    }

    #[test]
    fn candidate_too_far_is_moved_unchanged() {
        let mut arena = RectArena::new();
        let mut rects = list_of(&mut arena, &[Rect::new(0, 0, 10, 10)]);
        let mut candidates = list_of(&mut arena, &[Rect::new(50, 50, 10, 10)]);

        merge_rects(&mut arena, &mut rects, &mut candidates, 10);

        assert_eq!(
            collect(&arena, &rects),
            vec![Rect::new(0, 0, 10, 10), Rect::new(50, 50, 10, 10)]
        );
        assert_eq!(arena.live_count(), 2, "moved, not copied");
    }

    #[test]
    fn merge_waste_exactly_at_budget_is_accepted() {
        let mut arena = RectArena::new();
        // Gap of one column, 10 rows: waste = 10.
        let mut rects = list_of(&mut arena, &[Rect::new(0, 0, 5, 10)]);
        let mut candidates = list_of(&mut arena, &[Rect::new(6, 0, 5, 10)]);
        merge_rects(&mut arena, &mut rects, &mut candidates, 10);
        assert_eq!(collect(&arena, &rects), vec![Rect::new(0, 0, 11, 10)]);

        let mut rects = list_of(&mut arena, &[Rect::new(0, 0, 5, 10)]);
        let mut candidates = list_of(&mut arena, &[Rect::new(6, 0, 5, 10)]);
        merge_rects(&mut arena, &mut rects, &mut candidates, 9);
        assert_eq!(rects.len(), 2);
    }

    #[test]
    fn first_fit_picks_earliest_member() {
        let mut arena = RectArena::new();
        let mut rects = list_of(
            &mut arena,
            &[Rect::new(0, 0, 4, 4), Rect::new(10, 0, 4, 4)],
        );
        // Touches the second member exactly, is one column away from the first.
        let mut candidates = list_of(&mut arena, &[Rect::new(5, 0, 5, 4)]);
        merge_rects(&mut arena, &mut rects, &mut candidates, 4);
        // First member wins (waste 4), then the fused box also takes the second.
        assert_eq!(collect(&arena, &rects), vec![Rect::new(0, 0, 14, 4)]);
    }

    #[test]
    fn merge_after_only_touches_tail() {
        let mut arena = RectArena::new();
        let mut rects = list_of(
            &mut arena,
            &[
                Rect::new(0, 0, 10, 10),
                Rect::new(10, 0, 10, 10),
                Rect::new(100, 100, 5, 5),
            ],
        );
        let marker = rects.head().and_then(|h| arena.next(h)).unwrap();

        merge_after(&mut arena, &mut rects, marker, 0);

        // The first two would merge with zero waste, but they are both settled
        // and never compared with each other.
        assert_eq!(
            collect(&arena, &rects),
            vec![
                Rect::new(0, 0, 10, 10),
                Rect::new(10, 0, 10, 10),
                Rect::new(100, 100, 5, 5),
            ]
        );
    }

    #[test]
    fn merge_after_cascade_can_absorb_settled_members() {
        let mut arena = RectArena::new();
        let mut rects = list_of(
            &mut arena,
            &[
                Rect::new(0, 0, 10, 10),
                Rect::new(10, 0, 10, 10),
                Rect::new(20, 0, 10, 10),
            ],
        );
        let marker = rects.head().and_then(|h| arena.next(h)).unwrap();

        merge_after(&mut arena, &mut rects, marker, 0);

        // The tail fuses with the second record, and the grown box then
        // fuses with the first.
        assert_eq!(collect(&arena, &rects), vec![Rect::new(0, 0, 30, 10)]);
    }

    #[test]
    fn combined_insert_merges_fresh_pieces() {
        let mut arena = RectArena::new();
        let mut rects = list_of(
            &mut arena,
            &[Rect::new(0, 0, 10, 10), Rect::new(0, 12, 30, 4)],
        );
        // Overlaps the first member on the right; pieces land below-right.
        let node = arena.alloc(Rect::new(5, 5, 10, 10));
        add_split_fuzzy_and_merge(&mut arena, &mut rects, node, 0, 1_000).unwrap();

        let out = collect(&arena, &rects);
        let covered = |x, y| out.iter().any(|r| r.contains_point(x, y));
        for (x, y) in [(0, 0), (9, 9), (14, 14), (5, 5), (29, 15), (12, 6)] {
            assert!(covered(x, y), "({x}, {y}) lost from {out:?}");
        }
    }

    #[test]
    fn combined_insert_into_empty_skips_merge() {
        let mut arena = RectArena::new();
        let mut rects = RectList::new();
        let node = arena.alloc(Rect::new(0, 0, 3, 3));
        add_split_fuzzy_and_merge(&mut arena, &mut rects, node, 0, 0).unwrap();
        assert_eq!(collect(&arena, &rects), vec![Rect::new(0, 0, 3, 3)]);
    }
}
