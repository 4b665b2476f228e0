#![forbid(unsafe_code)]

//! Arena-backed singly linked rectangle lists.
//!
//! # Design
//!
//! Records live in a [`RectArena`] and are addressed by a [`RectId`] handle.
//! A [`RectList`] is only a `{ head, tail, len }` triple over that arena, so
//! any number of lists (the main set, a dirty queue, a candidate list) can
//! share one arena and hand records to each other by relinking, without
//! copying or reallocating.
//!
//! Freed slots go to a free list and are reused by the next allocation, so a
//! long-lived set settles at a stable footprint.
//!
//! ### Complexity
//!
//! | Operation       | Time |
//! |-----------------|------|
//! | `append`        | O(1) amort. |
//! | `append_node`   | O(1) |
//! | `concat`        | O(1) |
//! | `unlink_next`   | O(1) |
//! | `delete_next`   | O(1) |
//! | `split_after`   | O(k) detached |
//! | `clear`         | O(n) |
//! | iteration       | O(n) |
//!
//! # Ownership
//!
//! Every live record belongs to exactly one list, or to the caller between an
//! [`unlink_next`](RectArena::unlink_next) and the following
//! [`append_node`](RectArena::append_node) or [`release`](RectArena::release).
//! A `RectList` is neither `Clone` nor `Copy`: duplicating the triple would
//! let two lists claim the same records. Dropping a non-empty list without
//! [`clear`](RectArena::clear) leaks its slots inside the arena until the
//! arena itself is dropped.

use std::fmt;
use std::iter::FusedIterator;

use crate::geometry::Rect;

// ============================================================================
// RectId
// ============================================================================

/// Stable handle to a record inside a [`RectArena`].
///
/// A handle stays valid while its record is live. After the record is
/// released the slot may be handed out again under the same handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RectId(u32);

impl RectId {
    /// Sentinel meaning "no record".
    const NONE: u32 = u32::MAX;

    /// Get the raw slot index.
    #[must_use]
    pub fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    fn from_link(link: u32) -> Option<Self> {
        (link != Self::NONE).then_some(Self(link))
    }
}

impl fmt::Display for RectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}", self.0)
    }
}

// ============================================================================
// RectList
// ============================================================================

/// A singly linked list of records stored in a [`RectArena`].
#[derive(Debug)]
pub struct RectList {
    head: u32,
    tail: u32,
    len: usize,
}

impl RectList {
    /// Create an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            head: RectId::NONE,
            tail: RectId::NONE,
            len: 0,
        }
    }

    /// Number of records in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head == RectId::NONE
    }

    /// First record, if any.
    #[must_use]
    pub fn head(&self) -> Option<RectId> {
        RectId::from_link(self.head)
    }

    /// Last record, if any.
    #[must_use]
    pub fn tail(&self) -> Option<RectId> {
        RectId::from_link(self.tail)
    }

    /// Take the contents, leaving `self` empty.
    pub fn take(&mut self) -> RectList {
        std::mem::take(self)
    }
}

impl Default for RectList {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// RectArena
// ============================================================================

#[derive(Debug, Clone)]
struct Slot {
    rect: Rect,
    next: u32,
    live: bool,
}

/// Slot storage for rectangle records with free-list reuse.
#[derive(Debug, Default)]
pub struct RectArena {
    slots: Vec<Slot>,
    /// Free list for recycled slots.
    free_list: Vec<u32>,
}

impl RectArena {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
        }
    }

    /// Create an arena with room for `capacity` records.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_list: Vec::new(),
        }
    }

    /// Allocate an unlinked record owned by the caller.
    pub fn alloc(&mut self, rect: Rect) -> RectId {
        let slot = Slot {
            rect,
            next: RectId::NONE,
            live: true,
        };
        if let Some(index) = self.free_list.pop() {
            self.slots[index as usize] = slot;
            RectId(index)
        } else {
            let index = self.slots.len() as u32;
            debug_assert!(index != RectId::NONE, "rect arena exhausted");
            self.slots.push(slot);
            RectId(index)
        }
    }

    /// Free an unlinked record, recycling its slot.
    pub fn release(&mut self, id: RectId) {
        let slot = &mut self.slots[id.0 as usize];
        debug_assert!(slot.live, "double release of {id}");
        slot.live = false;
        slot.next = RectId::NONE;
        self.free_list.push(id.0);
    }

    /// Rectangle held by a live record.
    ///
    /// # Panics
    ///
    /// Panics if `id` was never allocated by this arena.
    #[must_use]
    pub fn rect(&self, id: RectId) -> &Rect {
        let slot = &self.slots[id.0 as usize];
        debug_assert!(slot.live, "read of released record {id}");
        &slot.rect
    }

    /// Rectangle held by `id`, or `None` if the slot is unknown or released.
    #[must_use]
    pub fn get(&self, id: RectId) -> Option<&Rect> {
        self.slots
            .get(id.0 as usize)
            .filter(|slot| slot.live)
            .map(|slot| &slot.rect)
    }

    /// Overwrite the payload of a record in place, returning the old value.
    ///
    /// The record keeps its handle and its position in whatever list holds it.
    pub fn replace(&mut self, id: RectId, rect: Rect) -> Rect {
        std::mem::replace(&mut self.slots[id.0 as usize].rect, rect)
    }

    /// Record following `id` in its list.
    #[must_use]
    pub fn next(&self, id: RectId) -> Option<RectId> {
        RectId::from_link(self.slots[id.0 as usize].next)
    }

    /// Number of live records across all lists.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.slots.len() - self.free_list.len()
    }

    /// Number of released slots awaiting reuse.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Total slots ever allocated (live + free).
    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Allocate a record for `rect` and link it at the end of `list`.
    pub fn append(&mut self, list: &mut RectList, rect: Rect) -> RectId {
        let id = self.alloc(rect);
        self.append_node(list, id);
        id
    }

    /// Link an already-owned, unlinked record at the end of `list`.
    pub fn append_node(&mut self, list: &mut RectList, id: RectId) {
        debug_assert!(
            self.slots[id.0 as usize].next == RectId::NONE,
            "{id} is still linked"
        );
        if list.tail == RectId::NONE {
            list.head = id.0;
        } else {
            self.slots[list.tail as usize].next = id.0;
        }
        list.tail = id.0;
        list.len += 1;
    }

    /// Move every record of `other` to the end of `list`, leaving `other` empty.
    pub fn concat(&mut self, list: &mut RectList, other: &mut RectList) {
        if other.head == RectId::NONE {
            return;
        }
        if list.tail == RectId::NONE {
            list.head = other.head;
        } else {
            self.slots[list.tail as usize].next = other.head;
        }
        list.tail = other.tail;
        list.len += other.len;
        *other = RectList::new();
    }

    /// Detach the record after `predecessor` (or the head when `None`).
    ///
    /// Ownership passes to the caller; the record is not freed. Returns `None`
    /// when there is nothing to detach.
    pub fn unlink_next(
        &mut self,
        list: &mut RectList,
        predecessor: Option<RectId>,
    ) -> Option<RectId> {
        let node = match predecessor {
            Some(prev) => {
                let node = self.slots[prev.0 as usize].next;
                if node == RectId::NONE {
                    return None;
                }
                self.slots[prev.0 as usize].next = self.slots[node as usize].next;
                node
            }
            None => {
                let node = list.head;
                if node == RectId::NONE {
                    return None;
                }
                list.head = self.slots[node as usize].next;
                node
            }
        };

        if list.tail == node {
            list.tail = predecessor.map_or(RectId::NONE, RectId::raw);
        }
        self.slots[node as usize].next = RectId::NONE;
        list.len -= 1;
        Some(RectId(node))
    }

    /// Detach and free the record after `predecessor` (or the head).
    pub fn delete_next(&mut self, list: &mut RectList, predecessor: Option<RectId>) {
        if let Some(id) = self.unlink_next(list, predecessor) {
            self.release(id);
        }
    }

    /// Free every record of `list`.
    pub fn clear(&mut self, list: &mut RectList) {
        let mut cursor = list.head;
        while cursor != RectId::NONE {
            let next = self.slots[cursor as usize].next;
            self.release(RectId(cursor));
            cursor = next;
        }
        *list = RectList::new();
    }

    /// Detach every record after `id` into a new list.
    ///
    /// `id` becomes the tail of `list`. The length of the detached part is
    /// counted, so this is O(k) in the number of detached records; the
    /// relinking itself is O(1).
    pub fn split_after(&mut self, list: &mut RectList, id: RectId) -> RectList {
        let first = self.slots[id.0 as usize].next;
        if first == RectId::NONE {
            return RectList::new();
        }
        let mut detached_len = 0;
        let mut cursor = first;
        while cursor != RectId::NONE {
            detached_len += 1;
            cursor = self.slots[cursor as usize].next;
        }

        let detached = RectList {
            head: first,
            tail: list.tail,
            len: detached_len,
        };
        self.slots[id.0 as usize].next = RectId::NONE;
        list.tail = id.0;
        list.len -= detached_len;
        detached
    }

    /// Iterate the records of `list` in order.
    pub fn iter<'a>(&'a self, list: &RectList) -> Iter<'a> {
        Iter {
            arena: self,
            cursor: list.head,
            remaining: list.len,
        }
    }
}

/// Iterator over `(RectId, &Rect)` pairs of a list.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    arena: &'a RectArena,
    cursor: u32,
    remaining: usize,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (RectId, &'a Rect);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == RectId::NONE {
            return None;
        }
        let id = RectId(self.cursor);
        let slot = &self.arena.slots[self.cursor as usize];
        self.cursor = slot.next;
        self.remaining = self.remaining.saturating_sub(1);
        Some((id, &slot.rect))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn r(x: i32) -> Rect {
        Rect::new(x, 0, 1, 1)
    }

    fn lefts(arena: &RectArena, list: &RectList) -> Vec<i32> {
        arena.iter(list).map(|(_, rect)| rect.left()).collect()
    }

    #[test]
    fn append_keeps_order() {
        let mut arena = RectArena::new();
        let mut list = RectList::new();
        for x in 0..4 {
            arena.append(&mut list, r(x));
        }
        assert_eq!(lefts(&arena, &list), vec![0, 1, 2, 3]);
        assert_eq!(list.len(), 4);
        assert_eq!(arena.iter(&list).len(), 4);
    }

    #[test]
    fn alloc_returns_sequential_ids() {
        let mut arena = RectArena::new();
        let a = arena.alloc(r(0));
        let b = arena.alloc(r(1));
        assert_eq!(a.raw(), 0);
        assert_eq!(b.raw(), 1);
        assert_eq!(arena.live_count(), 2);
    }

    #[test]
    fn release_recycles_slot() {
        let mut arena = RectArena::new();
        let a = arena.alloc(r(0));
        let _b = arena.alloc(r(1));
        arena.release(a);
        assert_eq!(arena.live_count(), 1);
        assert_eq!(arena.free_count(), 1);
        assert!(arena.get(a).is_none());
        let c = arena.alloc(r(7));
        assert_eq!(c.raw(), 0); // Recycled slot.
        assert_eq!(arena.rect(c).left(), 7);
        assert_eq!(arena.slot_count(), 2);
    }

    #[test]
    fn unlink_head_and_middle_and_tail() {
        let mut arena = RectArena::new();
        let mut list = RectList::new();
        let ids: Vec<_> = (0..4).map(|x| arena.append(&mut list, r(x))).collect();

        let head = arena.unlink_next(&mut list, None).unwrap();
        assert_eq!(head, ids[0]);
        assert_eq!(lefts(&arena, &list), vec![1, 2, 3]);

        let middle = arena.unlink_next(&mut list, Some(ids[1])).unwrap();
        assert_eq!(middle, ids[2]);
        assert_eq!(lefts(&arena, &list), vec![1, 3]);

        let tail = arena.unlink_next(&mut list, Some(ids[1])).unwrap();
        assert_eq!(tail, ids[3]);
        assert_eq!(list.tail(), Some(ids[1]));

        // Appending after a tail unlink must link from the new tail.
        arena.append_node(&mut list, tail);
        assert_eq!(lefts(&arena, &list), vec![1, 3]);
        assert_eq!(arena.live_count(), 4, "unlink does not free");
    }

    #[test]
    fn unlink_last_remaining_empties_list() {
        let mut arena = RectArena::new();
        let mut list = RectList::new();
        arena.append(&mut list, r(0));
        let id = arena.unlink_next(&mut list, None).unwrap();
        assert!(list.is_empty());
        assert_eq!(list.tail(), None);
        assert_eq!(list.len(), 0);
        arena.release(id);
    }

    #[test]
    fn unlink_past_end_is_none() {
        let mut arena = RectArena::new();
        let mut list = RectList::new();
        assert!(arena.unlink_next(&mut list, None).is_none());
        let only = arena.append(&mut list, r(0));
        assert!(arena.unlink_next(&mut list, Some(only)).is_none());
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn delete_next_frees() {
        let mut arena = RectArena::new();
        let mut list = RectList::new();
        let a = arena.append(&mut list, r(0));
        arena.append(&mut list, r(1));
        arena.delete_next(&mut list, Some(a));
        assert_eq!(lefts(&arena, &list), vec![0]);
        assert_eq!(arena.live_count(), 1);
        assert_eq!(list.tail(), Some(a));
    }

    #[test]
    fn concat_moves_everything() {
        let mut arena = RectArena::new();
        let mut a = RectList::new();
        let mut b = RectList::new();
        arena.append(&mut a, r(0));
        arena.append(&mut b, r(1));
        arena.append(&mut b, r(2));

        arena.concat(&mut a, &mut b);
        assert_eq!(lefts(&arena, &a), vec![0, 1, 2]);
        assert!(b.is_empty());
        assert_eq!(a.len(), 3);

        let mut empty = RectList::new();
        arena.concat(&mut empty, &mut a);
        assert_eq!(lefts(&arena, &empty), vec![0, 1, 2]);
        assert!(a.is_empty());

        let mut nothing = RectList::new();
        arena.concat(&mut empty, &mut nothing);
        assert_eq!(empty.len(), 3);
    }

    #[test]
    fn clear_releases_all() {
        let mut arena = RectArena::new();
        let mut list = RectList::new();
        for x in 0..5 {
            arena.append(&mut list, r(x));
        }
        arena.clear(&mut list);
        assert!(list.is_empty());
        assert_eq!(arena.live_count(), 0);
        assert_eq!(arena.free_count(), 5);
    }

    #[test]
    fn split_after_detaches_tail() {
        let mut arena = RectArena::new();
        let mut list = RectList::new();
        let ids: Vec<_> = (0..5).map(|x| arena.append(&mut list, r(x))).collect();

        let tail = arena.split_after(&mut list, ids[1]);
        assert_eq!(lefts(&arena, &list), vec![0, 1]);
        assert_eq!(lefts(&arena, &tail), vec![2, 3, 4]);
        assert_eq!(list.len(), 2);
        assert_eq!(tail.len(), 3);
        assert_eq!(list.tail(), Some(ids[1]));

        let nothing = arena.split_after(&mut list, ids[1]);
        assert!(nothing.is_empty());
    }

    #[test]
    fn replace_keeps_position() {
        let mut arena = RectArena::new();
        let mut list = RectList::new();
        arena.append(&mut list, r(0));
        let mid = arena.append(&mut list, r(1));
        arena.append(&mut list, r(2));
        let old = arena.replace(mid, r(9));
        assert_eq!(old, r(1));
        assert_eq!(lefts(&arena, &list), vec![0, 9, 2]);
    }

    #[test]
    fn take_leaves_empty_list() {
        let mut arena = RectArena::new();
        let mut list = RectList::new();
        arena.append(&mut list, r(0));
        let taken = list.take();
        assert!(list.is_empty());
        assert_eq!(lefts(&arena, &taken), vec![0]);
    }

    #[test]
    fn display_id() {
        let mut arena = RectArena::new();
        let id = arena.alloc(r(0));
        assert_eq!(id.to_string(), "R0");
    }
}
