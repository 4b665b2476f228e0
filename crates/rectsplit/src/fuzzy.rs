#![forbid(unsafe_code)]

//! Error-bounded insertion.
//!
//! A fuzzy insert trades exact tiling for fewer, larger rectangles. For each
//! pending fragment `r` and member `m` it evaluates, in order:
//!
//! | Case | Condition | Effect |
//! |------|-----------|--------|
//! | covered  | `r` inside `m` | drop `r` |
//! | swallow  | `m` inside `r` | drop `m`, keep scanning with `r` |
//! | merge    | `wasted <= e` | replace `m` by the bounding box, requeue it, drop `r` |
//! | absorb   | `intra.area <= e` | ignore the overlap, keep scanning |
//! | split    | otherwise | queue the parts of `r` outside `m`, drop `r` |
//!
//! where `wasted = outer.area - (m.area + r.area - intra.area)` is the area a
//! bounding box would add beyond the true union and `e` is the accepted error.
//!
//! A split first trims `r` to `m`'s rows. If what is left still sticks out
//! sideways and has exactly `m`'s height, the two are fused horizontally
//! instead of cutting `r` further; this keeps long runs of same-height
//! rectangles from fragmenting.

use crate::error::RegionError;
use crate::geometry::Rect;
use crate::list::{RectArena, RectId, RectList};
use crate::strict::Strips;

/// What a fuzzy split decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitAction {
    /// Nothing stuck out of the member. Only reachable when the fragment is
    /// contained, which callers rule out beforehand.
    None,
    /// The fragment was cut into the returned strips.
    Split,
    /// The vertically trimmed fragment and the member share their rows and can
    /// be fused into one wider rectangle. The returned strips hold only the
    /// parts above and below the member.
    Merge,
}

/// Result of [`split_fuzzy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzySplit {
    pub action: SplitAction,
    pub strips: Strips,
}

/// Cut `fragment` against `member` using the top/bottom/left/right order of
/// [`split_strict`](crate::strict::split_strict), with the horizontal merge
/// shortcut described in the module docs.
pub fn split_fuzzy(member: &Rect, fragment: &Rect) -> FuzzySplit {
    let mut strips = Strips::new();
    let mut action = SplitAction::None;

    let h_top = member.top() - fragment.top();
    let h_bottom = fragment.bottom() - member.bottom();
    let w_left = member.left() - fragment.left();
    let w_right = fragment.right() - member.right();

    let mut top = fragment.top();
    let mut height = fragment.height();

    if h_top > 0 {
        strips.push(Rect::new(fragment.left(), fragment.top(), fragment.width(), h_top));
        height -= h_top;
        top = member.top();
        action = SplitAction::Split;
    }

    if h_bottom > 0 {
        strips.push(Rect::new(
            fragment.left(),
            member.bottom(),
            fragment.width(),
            h_bottom,
        ));
        height -= h_bottom;
        action = SplitAction::Split;
    }

    if (w_left > 0 || w_right > 0) && member.height() == height {
        return FuzzySplit {
            action: SplitAction::Merge,
            strips,
        };
    }

    if w_left > 0 {
        strips.push(Rect::new(fragment.left(), top, w_left, height));
        action = SplitAction::Split;
    }

    if w_right > 0 {
        strips.push(Rect::new(member.right(), top, w_right, height));
        action = SplitAction::Split;
    }

    FuzzySplit { action, strips }
}

/// Insert the record `node` into a fuzzy list.
///
/// Returns the record that preceded the records added by this call: the last
/// record that was already in `rects` before the call and is still there.
/// Everything after it was produced by this insertion. `None` means the list
/// was empty before the call or every earlier record was merged away.
///
/// # Errors
///
/// [`RegionError::UnreachableSplit`] if a split produced neither pieces nor a
/// merge. Pending fragments are released and `rects` stays a valid list.
pub fn add_split_fuzzy(
    arena: &mut RectArena,
    rects: &mut RectList,
    node: RectId,
    accepted_error: i64,
) -> Result<Option<RectId>, RegionError> {
    debug_assert!(accepted_error >= 0, "negative accepted_error");

    #[cfg(feature = "tracing")]
    let _span = tracing::debug_span!(
        "add_split_fuzzy",
        rect = %arena.rect(node),
        members = rects.len(),
        accepted_error
    );
    #[cfg(feature = "tracing")]
    let _guard = _span.enter();

    let mut old_last = rects.tail();

    if rects.is_empty() {
        arena.append_node(rects, node);
        return Ok(old_last);
    }

    let mut dirty = RectList::new();
    arena.append_node(&mut dirty, node);

    while let Some(d_node) = arena.unlink_next(&mut dirty, None) {
        let r = *arena.rect(d_node);

        let mut prev: Option<RectId> = None;
        let mut cursor = rects.head();
        let mut keep_dirty = true;

        while let Some(member) = cursor {
            let current = *arena.rect(member);
            let (intra, outer) = r.intersection_and_bounds(&current);
            // Subtract one area at a time: outer contains current, so no step
            // leaves the i64 range.
            let wasted = outer.area() - current.area() - r.area() + intra.area();

            if intra.same_size(&r) {
                #[cfg(feature = "tracing")]
                tracing::trace!(fragment = %r, member = %current, "fragment covered");
                keep_dirty = false;
                break;
            }

            if intra.same_size(&current) {
                #[cfg(feature = "tracing")]
                tracing::trace!(fragment = %r, member = %current, "member swallowed");
                if old_last == Some(member) {
                    old_last = prev;
                }
                cursor = arena.next(member);
                arena.delete_next(rects, prev);
                continue;
            }

            if wasted <= accepted_error {
                #[cfg(feature = "tracing")]
                tracing::trace!(fragment = %r, member = %current, merged = %outer, wasted, "merge");
                if old_last == Some(member) {
                    old_last = prev;
                }
                if let Some(id) = arena.unlink_next(rects, prev) {
                    arena.replace(id, outer);
                    arena.append_node(&mut dirty, id);
                }
                keep_dirty = false;
                break;
            }

            if intra.area() <= accepted_error {
                #[cfg(feature = "tracing")]
                tracing::trace!(fragment = %r, member = %current, overlap = intra.area(), "absorb");
                prev = Some(member);
                cursor = arena.next(member);
                continue;
            }

            let split = split_fuzzy(&current, &r);
            for strip in &split.strips {
                arena.append(&mut dirty, *strip);
            }

            match split.action {
                SplitAction::Merge => {
                    let widened =
                        Rect::from_edges(outer.left(), current.top(), outer.right(), current.bottom());
                    #[cfg(feature = "tracing")]
                    tracing::trace!(fragment = %r, member = %current, merged = %widened, "horizontal merge");
                    if old_last == Some(member) {
                        old_last = prev;
                    }
                    if let Some(id) = arena.unlink_next(rects, prev) {
                        arena.replace(id, widened);
                        arena.append_node(&mut dirty, id);
                    }
                }
                SplitAction::Split => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(fragment = %r, member = %current, pieces = split.strips.len(), "split");
                }
                SplitAction::None => {
                    #[cfg(feature = "tracing")]
                    tracing::error!(fragment = %r, member = %current, "fuzzy split produced no pieces");
                    arena.release(d_node);
                    arena.clear(&mut dirty);
                    return Err(RegionError::UnreachableSplit {
                        member: current,
                        fragment: r,
                    });
                }
            }

            keep_dirty = false;
            break;
        }

        if keep_dirty {
            arena.append_node(rects, d_node);
        } else {
            arena.release(d_node);
        }
    }

    Ok(old_last)
}
