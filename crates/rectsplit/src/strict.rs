#![forbid(unsafe_code)]

//! Exact (non-overlapping) insertion and deletion.
//!
//! Both operations share [`split_strict`], which cuts one rectangle out of
//! another and returns the remainder as up to four strips:
//!
//! ```text
//!   .-----------------.  subject
//!   |       top       |
//!   |-----.-----.-----|
//!   |left |cutter|right|
//!   |-----'-----'-----|
//!   |     bottom      |
//!   `-----------------'
//! ```
//!
//! Top and bottom strips span the full subject width. Left and right strips
//! use the height left over after the top and bottom were removed, so the
//! strips tile `subject \ cutter` exactly once.

use smallvec::SmallVec;

use crate::geometry::Rect;
use crate::list::{RectArena, RectId, RectList};

/// Remainder pieces of a split. Never more than four.
pub type Strips = SmallVec<[Rect; 4]>;

/// Cut `cutter` out of `subject`, returning the non-empty remainder strips
/// in top, bottom, left, right order.
///
/// The two rectangles are expected to overlap. If `cutter` covers `subject`
/// the result is empty.
pub fn split_strict(cutter: &Rect, subject: &Rect) -> Strips {
    let mut strips = Strips::new();

    let h_top = cutter.top() - subject.top();
    let h_bottom = subject.bottom() - cutter.bottom();
    let w_left = cutter.left() - subject.left();
    let w_right = subject.right() - cutter.right();

    let mut top = subject.top();
    let mut height = subject.height();

    if h_top > 0 {
        strips.push(Rect::new(subject.left(), subject.top(), subject.width(), h_top));
        height -= h_top;
        top = cutter.top();
    }

    if h_bottom > 0 {
        strips.push(Rect::new(
            subject.left(),
            cutter.bottom(),
            subject.width(),
            h_bottom,
        ));
        height -= h_bottom;
    }

    if w_left > 0 {
        strips.push(Rect::new(subject.left(), top, w_left, height));
    }

    if w_right > 0 {
        strips.push(Rect::new(cutter.right(), top, w_right, height));
    }

    strips
}

/// Remove the area of `del` from a non-overlapping list.
///
/// Members inside `del` are released; members partially covered are replaced
/// by their remainder strips, which are appended after the scan so they are
/// not rescanned. Members that do not touch `del` are left as they are.
pub fn delete_split_strict(arena: &mut RectArena, rects: &mut RectList, del: &Rect) {
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!("delete_split_strict", rect = %del, members = rects.len());
    #[cfg(feature = "tracing")]
    let _guard = _span.enter();

    let mut modified = RectList::new();
    let mut prev: Option<RectId> = None;
    let mut cursor = rects.head();
    #[cfg(feature = "tracing")]
    let (mut dropped, mut split) = (0usize, 0usize);

    while let Some(id) = cursor {
        let current = *arena.rect(id);
        cursor = arena.next(id);

        let intra = del.intersection(&current);
        if intra.area() == 0 {
            prev = Some(id);
            continue;
        }

        arena.delete_next(rects, prev);
        if intra.same_size(&current) {
            #[cfg(feature = "tracing")]
            {
                dropped += 1;
            }
            continue;
        }

        #[cfg(feature = "tracing")]
        {
            split += 1;
        }
        for strip in split_strict(del, &current) {
            arena.append(&mut modified, strip);
        }
    }

    #[cfg(feature = "tracing")]
    tracing::trace!(dropped, split, strips = modified.len(), "delete scan finished");

    arena.concat(rects, &mut modified);
}

/// Insert the record `node` into a non-overlapping list.
///
/// Only the incoming rectangle is decomposed: each fragment is checked against
/// every member in turn, dropped when a member covers it, split when a member
/// overlaps it, and carried forward otherwise. Fragments that survive every
/// member are appended. Existing members are never modified.
pub fn add_split_strict(arena: &mut RectArena, rects: &mut RectList, node: RectId) {
    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!(
        "add_split_strict",
        rect = %arena.rect(node),
        members = rects.len()
    );
    #[cfg(feature = "tracing")]
    let _guard = _span.enter();

    if rects.is_empty() {
        arena.append_node(rects, node);
        return;
    }

    let mut dirty = RectList::new();
    let mut next_round = RectList::new();
    arena.append_node(&mut dirty, node);

    let mut cursor = rects.head();
    while !dirty.is_empty() {
        let Some(member) = cursor else {
            #[cfg(feature = "tracing")]
            tracing::trace!(fragments = dirty.len(), "appending disjoint fragments");
            arena.concat(rects, &mut dirty);
            break;
        };
        let current = *arena.rect(member);

        while let Some(head) = dirty.head() {
            let r = *arena.rect(head);
            let intra = r.intersection(&current);

            if intra.same_size(&r) {
                // Already covered by this member.
                arena.delete_next(&mut dirty, None);
            } else if intra.area() == 0 {
                if let Some(id) = arena.unlink_next(&mut dirty, None) {
                    arena.append_node(&mut next_round, id);
                }
            } else {
                arena.delete_next(&mut dirty, None);
                for strip in split_strict(&current, &r) {
                    arena.append(&mut next_round, strip);
                }
            }
        }

        dirty = next_round.take();
        cursor = arena.next(member);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(arena: &RectArena, list: &RectList) -> Vec<Rect> {
        arena.iter(list).map(|(_, r)| *r).collect()
    }

    fn total_area(rects: &[Rect]) -> i64 {
        rects.iter().map(Rect::area).sum()
    }

    fn assert_disjoint(rects: &[Rect]) {
        for (i, a) in rects.iter().enumerate() {
            for b in &rects[i + 1..] {
                assert_eq!(a.intersection(b).area(), 0, "{a} overlaps {b}");
            }
        }
    }

    #[test]
    fn split_centre_hole_gives_four_strips() {
        let strips = split_strict(&Rect::new(2, 2, 4, 4), &Rect::new(0, 0, 10, 10));
        assert_eq!(
            strips.as_slice(),
            &[
                Rect::new(0, 0, 10, 2),
                Rect::new(0, 6, 10, 4),
                Rect::new(0, 2, 2, 4),
                Rect::new(6, 2, 4, 4),
            ]
        );
        assert_eq!(total_area(&strips), 84);
        assert_disjoint(&strips);
    }

    #[test]
    fn split_corner_overlap_gives_two_strips() {
        // Cutter covers the bottom-right corner of the subject.
        let strips = split_strict(&Rect::new(5, 5, 10, 10), &Rect::new(0, 0, 10, 10));
        assert_eq!(
            strips.as_slice(),
            &[Rect::new(0, 0, 10, 5), Rect::new(0, 5, 5, 5)]
        );
    }

    #[test]
    fn split_by_covering_cutter_is_empty() {
        let strips = split_strict(&Rect::new(-1, -1, 20, 20), &Rect::new(0, 0, 10, 10));
        assert!(strips.is_empty());
    }

    #[test]
    fn split_vertical_band_gives_left_and_right() {
        let strips = split_strict(&Rect::new(4, -5, 2, 30), &Rect::new(0, 0, 10, 10));
        assert_eq!(
            strips.as_slice(),
            &[Rect::new(0, 0, 4, 10), Rect::new(6, 0, 4, 10)]
        );
    }

    #[test]
    fn delete_centre_leaves_frame() {
        let mut arena = RectArena::new();
        let mut rects = RectList::new();
        arena.append(&mut rects, Rect::new(0, 0, 10, 10));

        let hole = Rect::new(2, 2, 4, 4);
        delete_split_strict(&mut arena, &mut rects, &hole);

        let out = collect(&arena, &rects);
        assert_eq!(out.len(), 4);
        assert_eq!(total_area(&out), 100 - 16);
        assert_disjoint(&out);
        for r in &out {
            assert_eq!(r.intersection(&hole).area(), 0, "{r} overlaps the hole");
        }
        assert_eq!(arena.live_count(), 4);
    }

    #[test]
    fn delete_drops_contained_and_skips_disjoint() {
        let mut arena = RectArena::new();
        let mut rects = RectList::new();
        arena.append(&mut rects, Rect::new(0, 0, 2, 2));
        arena.append(&mut rects, Rect::new(50, 50, 2, 2));
        arena.append(&mut rects, Rect::new(3, 3, 1, 1));

        delete_split_strict(&mut arena, &mut rects, &Rect::new(0, 0, 10, 10));

        assert_eq!(collect(&arena, &rects), vec![Rect::new(50, 50, 2, 2)]);
        assert_eq!(arena.live_count(), 1);
    }

    #[test]
    fn delete_disjoint_keeps_order() {
        let mut arena = RectArena::new();
        let mut rects = RectList::new();
        let input = [Rect::new(0, 0, 1, 1), Rect::new(5, 0, 1, 1)];
        for r in input {
            arena.append(&mut rects, r);
        }
        delete_split_strict(&mut arena, &mut rects, &Rect::new(2, 0, 2, 2));
        assert_eq!(collect(&arena, &rects), input.to_vec());
    }

    #[test]
    fn delete_degenerate_is_noop() {
        let mut arena = RectArena::new();
        let mut rects = RectList::new();
        arena.append(&mut rects, Rect::new(0, 0, 10, 10));
        delete_split_strict(&mut arena, &mut rects, &Rect::new(5, 5, 0, 0));
        assert_eq!(collect(&arena, &rects), vec![Rect::new(0, 0, 10, 10)]);
    }

    #[test]
    fn add_into_empty_appends_node() {
        let mut arena = RectArena::new();
        let mut rects = RectList::new();
        let node = arena.alloc(Rect::new(1, 1, 3, 3));
        add_split_strict(&mut arena, &mut rects, node);
        assert_eq!(rects.head(), Some(node));
        assert_eq!(rects.len(), 1);
    }

    #[test]
    fn add_contained_changes_nothing() {
        let mut arena = RectArena::new();
        let mut rects = RectList::new();
        arena.append(&mut rects, Rect::new(0, 0, 10, 10));
        let node = arena.alloc(Rect::new(2, 2, 3, 3));
        add_split_strict(&mut arena, &mut rects, node);
        assert_eq!(collect(&arena, &rects), vec![Rect::new(0, 0, 10, 10)]);
        assert_eq!(arena.live_count(), 1, "contained fragment is released");
    }

    #[test]
    fn add_overlapping_splits_incoming_only() {
        let mut arena = RectArena::new();
        let mut rects = RectList::new();
        arena.append(&mut rects, Rect::new(0, 0, 10, 10));
        let node = arena.alloc(Rect::new(5, 5, 10, 10));
        add_split_strict(&mut arena, &mut rects, node);

        let out = collect(&arena, &rects);
        assert_eq!(out[0], Rect::new(0, 0, 10, 10), "members are never mutated");
        assert_eq!(total_area(&out), 100 + 100 - 25);
        assert_disjoint(&out);
    }

    #[test]
    fn add_fragments_checked_against_later_members() {
        let mut arena = RectArena::new();
        let mut rects = RectList::new();
        arena.append(&mut rects, Rect::new(0, 0, 4, 4));
        arena.append(&mut rects, Rect::new(6, 0, 4, 4));
        arena.append(&mut rects, Rect::new(0, 20, 4, 4));

        // Bridges the first two members.
        let node = arena.alloc(Rect::new(2, 1, 6, 2));
        add_split_strict(&mut arena, &mut rects, node);

        let out = collect(&arena, &rects);
        assert_disjoint(&out);
        assert_eq!(total_area(&out), 16 * 3 + 4);
        assert!(out.contains(&Rect::new(4, 1, 2, 2)));
    }

    #[test]
    fn add_disjoint_is_appended_last() {
        let mut arena = RectArena::new();
        let mut rects = RectList::new();
        arena.append(&mut rects, Rect::new(0, 0, 1, 1));
        let node = arena.alloc(Rect::new(9, 9, 1, 1));
        add_split_strict(&mut arena, &mut rects, node);
        assert_eq!(rects.tail(), Some(node));
    }
}
