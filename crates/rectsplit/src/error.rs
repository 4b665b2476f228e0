#![forbid(unsafe_code)]

//! Error types for region operations.

use thiserror::Error;

use crate::geometry::Rect;

/// Errors returned by [`RectSet`](crate::RectSet) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegionError {
    /// A rectangle with zero or negative width/height was offered for insertion.
    #[error("refusing to insert degenerate rectangle {rect}")]
    Degenerate { rect: Rect },

    /// A rectangle reached outside [`Rect::MIN_COORD`], [`Rect::MAX_COORD`].
    #[error("rectangle {rect} lies outside the supported coordinate range")]
    OutOfRange { rect: Rect },

    /// A fuzzy split was attempted on a fragment that does not stick out of
    /// the member on any side.
    ///
    /// This means containment was not detected before the split, which is a
    /// defect in the decision logic. The set is left consistent (the member
    /// stays, pending fragments are released) but the insertion is abandoned.
    #[error("fuzzy split of {fragment} against {member} produced no pieces")]
    UnreachableSplit { member: Rect, fragment: Rect },

    /// An error budget was negative.
    #[error("invalid {field}: {value} (must be >= 0)")]
    InvalidPolicy { field: &'static str, value: i64 },
}

/// Errors that can occur when loading a [`FuzzyPolicy`](crate::FuzzyPolicy).
#[cfg(feature = "policy-config")]
#[derive(Debug, Error)]
pub enum PolicyConfigError {
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("validation error: {0}")]
    Validation(#[from] RegionError),
}
