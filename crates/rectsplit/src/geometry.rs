#![forbid(unsafe_code)]

//! Integer rectangle algebra.
//!
//! [`Rect`] caches its right/bottom edges and its area so the split and merge
//! routines can compare extents without recomputing them. All arithmetic is
//! exact; tolerance only appears at the policy level as an `accepted_error`.
//!
//! # Coordinate range
//!
//! Set members must lie inside [`Rect::MIN_COORD`, `Rect::MAX_COORD`] on both
//! axes, edges included. Within that range every edge difference fits in an
//! `i32` and every area, and every sum or difference of two areas, fits in an
//! `i64`. Outside it the constructors and edge arithmetic saturate rather than
//! overflow; such rectangles are rejected by [`RectSet`](crate::RectSet).

use std::fmt;

/// An axis-aligned rectangle on the integer plane.
///
/// Coordinates grow right and down. `right` and `bottom` are exclusive and
/// always equal `left + width` / `top + height`.
///
/// A rectangle produced by [`Rect::intersection`] may carry a zero or negative
/// width/height when its inputs do not overlap; its [`area`](Self::area) is
/// then 0. Such a rectangle is [degenerate](Self::is_degenerate) and must not
/// be stored in a set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
    width: i32,
    height: i32,
    area: i64,
}

impl Rect {
    /// Smallest coordinate a set member may use.
    pub const MIN_COORD: i32 = -(1 << 30);
    /// Largest coordinate a set member may use, as an exclusive edge.
    pub const MAX_COORD: i32 = (1 << 30) - 1;

    /// Create a rectangle from its origin and size.
    ///
    /// An edge that would leave the `i32` range saturates, and the size is
    /// shrunk to match.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        let right = x.saturating_add(width);
        let bottom = y.saturating_add(height);
        Self {
            left: x,
            top: y,
            right,
            bottom,
            width: right - x,
            height: bottom - y,
            area: (right - x) as i64 * (bottom - y) as i64,
        }
    }

    /// Create a rectangle from its four edges.
    ///
    /// The edges are kept as given; a width or height beyond the `i32` range
    /// saturates.
    #[inline]
    pub const fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        let width = right.saturating_sub(left);
        let height = bottom.saturating_sub(top);
        Self {
            left,
            top,
            right,
            bottom,
            width,
            height,
            area: width as i64 * height as i64,
        }
    }

    /// Left edge (inclusive).
    #[inline]
    pub const fn left(&self) -> i32 {
        self.left
    }

    /// Top edge (inclusive).
    #[inline]
    pub const fn top(&self) -> i32 {
        self.top
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> i32 {
        self.right
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.bottom
    }

    #[inline]
    pub const fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// Cached area. Zero for intersections that do not overlap.
    #[inline]
    pub const fn area(&self) -> i64 {
        self.area
    }

    /// True when either dimension is zero or negative.
    #[inline]
    pub const fn is_degenerate(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// True when every edge lies inside [`MIN_COORD`](Self::MIN_COORD),
    /// [`MAX_COORD`](Self::MAX_COORD)].
    #[inline]
    pub const fn in_range(&self) -> bool {
        self.left >= Self::MIN_COORD
            && self.top >= Self::MIN_COORD
            && self.right <= Self::MAX_COORD
            && self.bottom <= Self::MAX_COORD
            && self.left <= Self::MAX_COORD
            && self.top <= Self::MAX_COORD
            && self.right >= Self::MIN_COORD
            && self.bottom >= Self::MIN_COORD
    }

    /// Clip the edges to the supported coordinate range.
    #[inline]
    pub fn clamped(&self) -> Rect {
        let clamp = |v: i32| v.clamp(Self::MIN_COORD, Self::MAX_COORD);
        Rect::from_edges(
            clamp(self.left),
            clamp(self.top),
            clamp(self.right),
            clamp(self.bottom),
        )
    }

    /// True when `self` and `other` have identical width and height.
    ///
    /// Applied to an intersection this is the containment test: if the
    /// intersection of `a` and `b` has the size of `b`, then `b` lies inside `a`.
    #[inline]
    pub const fn same_size(&self, other: &Rect) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub const fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    /// Check if `other` lies entirely inside `self`.
    #[inline]
    pub const fn contains_rect(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right <= self.right
            && other.bottom <= self.bottom
    }

    /// Check if the two rectangles share a non-empty area.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.intersection(other).area > 0
    }

    /// Move the rectangle by the given offset, saturating at the `i32` range.
    #[inline]
    pub const fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(
            self.left.saturating_add(dx),
            self.top.saturating_add(dy),
            self.width,
            self.height,
        )
    }

    /// Compute the intersection ("intra" rectangle) with another rectangle.
    ///
    /// Width and height are the raw edge differences and may be zero or
    /// negative. The area is 0 unless both are positive.
    #[inline]
    pub fn intersection(&self, other: &Rect) -> Rect {
        Rect::clipped(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        )
    }

    /// Compute the smallest rectangle containing both ("outer" rectangle).
    #[inline]
    pub fn bounds(&self, other: &Rect) -> Rect {
        Rect::from_edges(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// Compute intersection and bounds in a single pass over the edges.
    ///
    /// The result is identical to `(self.intersection(other), self.bounds(other))`.
    pub fn intersection_and_bounds(&self, other: &Rect) -> (Rect, Rect) {
        let (min_left, max_left) = ordered(self.left, other.left);
        let (min_right, max_right) = ordered(self.right, other.right);
        let (min_top, max_top) = ordered(self.top, other.top);
        let (min_bottom, max_bottom) = ordered(self.bottom, other.bottom);

        let intra = Rect::clipped(max_left, max_top, min_right, min_bottom);
        let outer = Rect::from_edges(min_left, min_top, max_right, max_bottom);
        (intra, outer)
    }

    fn clipped(left: i32, top: i32, right: i32, bottom: i32) -> Rect {
        // Far-apart inputs give a large negative difference; saturating keeps
        // it negative.
        let width = right.saturating_sub(left);
        let height = bottom.saturating_sub(top);
        let area = if width > 0 && height > 0 {
            width as i64 * height as i64
        } else {
            0
        };
        Rect {
            left,
            top,
            right,
            bottom,
            width,
            height,
            area,
        }
    }
}

#[inline]
fn ordered(a: i32, b: i32) -> (i32, i32) {
    if a < b { (a, b) } else { (b, a) }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<rect({}, {}, {}, {})>",
            self.left, self.top, self.width, self.height
        )
    }
}

impl From<(i32, i32, i32, i32)> for Rect {
    fn from((x, y, width, height): (i32, i32, i32, i32)) -> Self {
        Self::new(x, y, width, height)
    }
}
