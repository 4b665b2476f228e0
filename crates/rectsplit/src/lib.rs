#![forbid(unsafe_code)]

//! Rectangle-set algebra for dirty-region tracking.
//!
//! # Role
//! `rectsplit` keeps a region of the integer plane as a list of axis-aligned
//! rectangles and lets callers add or remove area from it. A renderer can
//! accumulate damage this way and then repaint a short list of rectangles
//! instead of the whole surface.
//!
//! # Primary responsibilities
//! - **Strict sets**: [`RectSet::insert_strict`] and [`RectSet::delete`] keep
//!   members pairwise non-overlapping and the covered area exact.
//! - **Fuzzy sets**: [`RectSet::insert_fuzzy`] accepts a bounded amount of
//!   overlap or over-coverage in exchange for fewer, larger members.
//! - **Merging**: [`RectSet::merge_rects`] and
//!   [`RectSet::insert_fuzzy_and_merge`] fold candidates into the set with a
//!   greedy bounding-box pass.
//!
//! # Layout
//! Records live in a [`RectArena`]; a [`RectList`] is a singly linked view
//! over it. The free functions in [`strict`], [`fuzzy`] and [`merge`] operate
//! on an arena and a list directly, and [`RectSet`] bundles the two with
//! input validation.
//!
//! # Example
//!
//! ```
//! use rectsplit::{FuzzyPolicy, Rect, RectSet};
//!
//! let mut damage = RectSet::new();
//! let policy = FuzzyPolicy::new(0, 64);
//! damage.insert_with_policy(Rect::new(0, 0, 80, 1), &policy)?;
//! damage.insert_with_policy(Rect::new(0, 1, 80, 1), &policy)?;
//! assert_eq!(damage.rects(), vec![Rect::new(0, 0, 80, 2)]);
//! # Ok::<(), rectsplit::RegionError>(())
//! ```
//!
//! # Features
//! - `tracing`: spans and events for every list operation.
//! - `policy-config`: load [`FuzzyPolicy`] from TOML or JSON.

pub mod error;
pub mod fuzzy;
pub mod geometry;
pub mod list;
pub mod merge;
pub mod policy;
pub mod set;
pub mod strict;

#[cfg(feature = "policy-config")]
pub use error::PolicyConfigError;
pub use error::RegionError;
pub use fuzzy::{FuzzySplit, SplitAction};
pub use geometry::Rect;
pub use list::{RectArena, RectId, RectList};
pub use policy::FuzzyPolicy;
pub use set::{RectSet, SetStats};
pub use strict::Strips;
