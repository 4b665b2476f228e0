#![forbid(unsafe_code)]

//! Owned rectangle set.
//!
//! [`RectSet`] bundles a [`RectArena`] with the list of members and exposes
//! the strict and fuzzy operations with input validation. Use one policy per
//! set: strict operations assume the members do not overlap, which a fuzzy
//! insert does not guarantee.

use std::fmt;

use crate::error::RegionError;
use crate::fuzzy::add_split_fuzzy;
use crate::geometry::Rect;
use crate::list::{RectArena, RectId, RectList};
use crate::merge::{add_split_fuzzy_and_merge, merge_after, merge_rects};
use crate::policy::{FuzzyPolicy, check_budget};
use crate::strict::{add_split_strict, delete_split_strict};

/// Snapshot of a set's size and storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SetStats {
    /// Number of member rectangles.
    pub members: usize,
    /// Sum of member areas (counts overlaps twice in fuzzy sets).
    pub total_area: i64,
    /// Slots allocated in the arena, live or free.
    pub slots: usize,
    /// Released slots awaiting reuse.
    pub free_slots: usize,
}

/// A collection of rectangles describing a region of the plane.
///
/// # Example
///
/// ```
/// use rectsplit::{Rect, RectSet};
///
/// let mut set = RectSet::new();
/// set.insert_strict(Rect::new(0, 0, 10, 10)).unwrap();
/// set.delete(Rect::new(2, 2, 4, 4));
/// assert_eq!(set.len(), 4);
/// assert_eq!(set.total_area(), 84);
/// ```
#[derive(Debug, Default)]
pub struct RectSet {
    arena: RectArena,
    rects: RectList,
    /// Marker handed out by the latest `insert_fuzzy`, cleared by any other
    /// mutation.
    pending_marker: Option<RectId>,
}

impl RectSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty set with room for `capacity` records.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: RectArena::with_capacity(capacity),
            rects: RectList::new(),
            pending_marker: None,
        }
    }

    /// Build a strict set from a sequence of rectangles.
    ///
    /// # Errors
    ///
    /// [`RegionError::Degenerate`] or [`RegionError::OutOfRange`] on the
    /// first rejected input.
    pub fn from_rects<I>(rects: I) -> Result<Self, RegionError>
    where
        I: IntoIterator<Item = Rect>,
    {
        let mut set = Self::new();
        for rect in rects {
            set.insert_strict(rect)?;
        }
        Ok(set)
    }

    /// Number of member rectangles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Iterate member rectangles in list order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &Rect> + '_ {
        self.arena.iter(&self.rects).map(|(_, rect)| rect)
    }

    /// Iterate members together with their handles.
    pub fn iter_ids(&self) -> crate::list::Iter<'_> {
        self.arena.iter(&self.rects)
    }

    /// Copy the members into a vector.
    #[must_use]
    pub fn rects(&self) -> Vec<Rect> {
        self.iter().copied().collect()
    }

    /// Rectangle held by a member handle, if it is still live.
    #[must_use]
    pub fn get(&self, id: RectId) -> Option<&Rect> {
        self.arena.get(id)
    }

    /// Sum of member areas, saturating for heavily overlapping fuzzy sets.
    #[must_use]
    pub fn total_area(&self) -> i64 {
        self.iter().fold(0i64, |acc, rect| acc.saturating_add(rect.area()))
    }

    /// Sum of pairwise intersection areas. Always 0 for a strict set.
    #[must_use]
    pub fn overlap_area(&self) -> i64 {
        let rects = self.rects();
        let mut overlap = 0;
        for (i, a) in rects.iter().enumerate() {
            for b in &rects[i + 1..] {
                overlap = i64::saturating_add(overlap, a.intersection(b).area());
            }
        }
        overlap
    }

    /// Smallest rectangle containing every member.
    #[must_use]
    pub fn bounding_box(&self) -> Option<Rect> {
        self.iter().copied().reduce(|acc, rect| acc.bounds(&rect))
    }

    /// Check whether any member covers the point.
    #[must_use]
    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        self.iter().any(|rect| rect.contains_point(x, y))
    }

    #[must_use]
    pub fn stats(&self) -> SetStats {
        SetStats {
            members: self.len(),
            total_area: self.total_area(),
            slots: self.arena.slot_count(),
            free_slots: self.arena.free_count(),
        }
    }

    /// Remove the area of `rect` from the set, splitting partially covered
    /// members. Degenerate rectangles cover nothing and leave the set as is;
    /// parts outside the coordinate range hold no members and are ignored.
    pub fn delete(&mut self, rect: Rect) {
        self.pending_marker = None;
        delete_split_strict(&mut self.arena, &mut self.rects, &rect.clamped());
    }

    /// Add the area of `rect` without creating overlaps.
    ///
    /// # Errors
    ///
    /// [`RegionError::Degenerate`] if `rect` has no area,
    /// [`RegionError::OutOfRange`] if it leaves the coordinate range.
    pub fn insert_strict(&mut self, rect: Rect) -> Result<(), RegionError> {
        self.pending_marker = None;
        check_insertable(rect)?;
        self.push_strict(rect);
        Ok(())
    }

    fn push_strict(&mut self, rect: Rect) {
        let node = self.arena.alloc(rect);
        add_split_strict(&mut self.arena, &mut self.rects, node);
    }

    /// Add `rect`, merging or absorbing overlaps within `accepted_error`.
    ///
    /// Returns a marker for [`merge_after`](Self::merge_after): the last
    /// member that predates this call. It is only honoured until the next
    /// mutation of the set.
    ///
    /// # Errors
    ///
    /// [`RegionError::Degenerate`], [`RegionError::OutOfRange`],
    /// [`RegionError::InvalidPolicy`] for a negative budget, or
    /// [`RegionError::UnreachableSplit`].
    pub fn insert_fuzzy(
        &mut self,
        rect: Rect,
        accepted_error: i64,
    ) -> Result<Option<RectId>, RegionError> {
        self.pending_marker = None;
        check_insertable(rect)?;
        check_budget("accepted_error", accepted_error)?;
        let node = self.arena.alloc(rect);
        let marker = add_split_fuzzy(&mut self.arena, &mut self.rects, node, accepted_error)?;
        self.pending_marker = marker;
        Ok(marker)
    }

    /// Merge the members added after `marker` into the members up to it.
    ///
    /// Only the marker returned by the immediately preceding
    /// [`insert_fuzzy`](Self::insert_fuzzy) is acted on, once. `None`, a
    /// marker from an older call, or one outlived by another mutation is a
    /// no-op: its record may since have been released and recycled.
    ///
    /// # Errors
    ///
    /// [`RegionError::InvalidPolicy`] for a negative budget.
    pub fn merge_after(
        &mut self,
        marker: Option<RectId>,
        accepted_error: i64,
    ) -> Result<(), RegionError> {
        check_budget("accepted_error", accepted_error)?;
        if let Some(marker) = marker.filter(|_| marker == self.pending_marker) {
            self.pending_marker = None;
            merge_after(&mut self.arena, &mut self.rects, marker, accepted_error);
        }
        Ok(())
    }

    /// Fold `candidates` into the set with the greedy merge pass.
    ///
    /// # Errors
    ///
    /// [`RegionError::Degenerate`], [`RegionError::OutOfRange`] or
    /// [`RegionError::InvalidPolicy`]; the set is unchanged in that case.
    pub fn merge_rects<I>(&mut self, candidates: I, accepted_error: i64) -> Result<(), RegionError>
    where
        I: IntoIterator<Item = Rect>,
    {
        self.pending_marker = None;
        check_budget("accepted_error", accepted_error)?;
        let mut to_merge = RectList::new();
        for rect in candidates {
            if let Err(err) = check_insertable(rect) {
                self.arena.clear(&mut to_merge);
                return Err(err);
            }
            self.arena.append(&mut to_merge, rect);
        }
        merge_rects(&mut self.arena, &mut self.rects, &mut to_merge, accepted_error);
        Ok(())
    }

    /// Fold a candidate list built in this set's arena (see
    /// [`arena_mut`](Self::arena_mut)) into the set.
    ///
    /// # Errors
    ///
    /// [`RegionError::InvalidPolicy`], or the first candidate rejected as by
    /// [`merge_rects`](Self::merge_rects); the candidates are released and
    /// the set is unchanged in that case.
    pub fn merge_list(&mut self, mut candidates: RectList, accepted_error: i64) -> Result<(), RegionError> {
        self.pending_marker = None;
        let checked = check_budget("accepted_error", accepted_error).and_then(|()| {
            self.arena
                .iter(&candidates)
                .try_for_each(|(_, rect)| check_insertable(*rect))
        });
        if let Err(err) = checked {
            self.arena.clear(&mut candidates);
            return Err(err);
        }
        merge_rects(&mut self.arena, &mut self.rects, &mut candidates, accepted_error);
        Ok(())
    }

    /// Fuzzy insert followed by a merge pass over the pieces it produced.
    ///
    /// # Errors
    ///
    /// As [`insert_fuzzy`](Self::insert_fuzzy).
    pub fn insert_fuzzy_and_merge(
        &mut self,
        rect: Rect,
        split_error: i64,
        merge_error: i64,
    ) -> Result<(), RegionError> {
        self.pending_marker = None;
        check_insertable(rect)?;
        check_budget("split_error", split_error)?;
        check_budget("merge_error", merge_error)?;
        let node = self.arena.alloc(rect);
        add_split_fuzzy_and_merge(
            &mut self.arena,
            &mut self.rects,
            node,
            split_error,
            merge_error,
        )
    }

    /// [`insert_fuzzy_and_merge`](Self::insert_fuzzy_and_merge) with the
    /// budgets of `policy`.
    ///
    /// # Errors
    ///
    /// As [`insert_fuzzy`](Self::insert_fuzzy).
    pub fn insert_with_policy(&mut self, rect: Rect, policy: &FuzzyPolicy) -> Result<(), RegionError> {
        self.insert_fuzzy_and_merge(rect, policy.split_error, policy.merge_error)
    }

    /// Release every member.
    pub fn clear(&mut self) {
        self.pending_marker = None;
        self.arena.clear(&mut self.rects);
    }

    #[must_use]
    pub fn arena(&self) -> &RectArena {
        &self.arena
    }

    /// The member list, for use with [`arena`](Self::arena).
    #[must_use]
    pub fn list(&self) -> &RectList {
        &self.rects
    }

    /// Start an empty candidate list for [`merge_list`](Self::merge_list).
    #[must_use]
    pub const fn new_list() -> RectList {
        RectList::new()
    }

    /// Arena access for building candidate lists for
    /// [`merge_list`](Self::merge_list).
    pub fn arena_mut(&mut self) -> &mut RectArena {
        self.pending_marker = None;
        &mut self.arena
    }
}

/// Shape problem that keeps `rect` out of a set, if any.
fn shape_rejection(rect: Rect) -> Option<RegionError> {
    let rejection = if rect.is_degenerate() {
        RegionError::Degenerate { rect }
    } else if !rect.in_range() {
        RegionError::OutOfRange { rect }
    } else {
        return None;
    };
    #[cfg(feature = "tracing")]
    tracing::debug!(rect = %rect, reason = %rejection, "rejecting rectangle");
    Some(rejection)
}

fn check_insertable(rect: Rect) -> Result<(), RegionError> {
    shape_rejection(rect).map_or(Ok(()), Err)
}

impl Clone for RectSet {
    /// Copies the members into a fresh, compact arena.
    fn clone(&self) -> Self {
        let mut out = Self::with_capacity(self.len());
        for rect in self.iter() {
            out.arena.append(&mut out.rects, *rect);
        }
        out
    }
}

impl Extend<Rect> for RectSet {
    /// Strict-inserts each rectangle, skipping degenerate and out-of-range
    /// ones.
    fn extend<I: IntoIterator<Item = Rect>>(&mut self, iter: I) {
        self.pending_marker = None;
        for rect in iter {
            // Validated strict insertion cannot fail; only the shape check
            // decides whether `rect` is skipped.
            if shape_rejection(rect).is_none() {
                self.push_strict(rect);
            }
        }
    }
}

impl FromIterator<Rect> for RectSet {
    fn from_iter<I: IntoIterator<Item = Rect>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl fmt::Display for RectSet {
    /// `[<rect(..)>, <rect(..)>]`, one member per line from four members on.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = if self.len() < 4 { ", " } else { ",\n " };
        f.write_str("[")?;
        for (i, rect) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(separator)?;
            }
            write!(f, "{rect}")?;
        }
        f.write_str("]")
    }
}
