#![forbid(unsafe_code)]

//! Error budgets for fuzzy insertion and merging.
//!
//! # Loading
//!
//! With the `policy-config` feature a [`FuzzyPolicy`] can be read from TOML or
//! JSON; missing fields fall back to the defaults.
//!
//! ```toml
//! split_error = 64
//! merge_error = 256
//! ```
//!
//! ```rust,ignore
//! let policy = FuzzyPolicy::from_toml_str(text)?;
//! set.insert_with_policy(rect, &policy)?;
//! ```
//!
//! # Defaults
//!
//! Both budgets default to 0, which makes fuzzy insertion merge only
//! rectangles whose bounding box adds no area and never tolerate overlap.

#[cfg(feature = "policy-config")]
use serde::{Deserialize, Serialize};

use crate::error::RegionError;
#[cfg(feature = "policy-config")]
use crate::error::PolicyConfigError;

/// Accepted-error budgets for the fuzzy operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "policy-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct FuzzyPolicy {
    /// Wasted or overlapping area tolerated by a fuzzy insert.
    pub split_error: i64,
    /// Wasted area tolerated by the merge pass after an insert.
    pub merge_error: i64,
}

impl FuzzyPolicy {
    /// Create a policy with the given budgets.
    #[must_use]
    pub const fn new(split_error: i64, merge_error: i64) -> Self {
        Self {
            split_error,
            merge_error,
        }
    }

    #[must_use]
    pub const fn with_split_error(mut self, split_error: i64) -> Self {
        self.split_error = split_error;
        self
    }

    #[must_use]
    pub const fn with_merge_error(mut self, merge_error: i64) -> Self {
        self.merge_error = merge_error;
        self
    }

    /// Check that both budgets are non-negative.
    ///
    /// # Errors
    ///
    /// [`RegionError::InvalidPolicy`] naming the first offending field.
    pub fn validate(&self) -> Result<(), RegionError> {
        check_budget("split_error", self.split_error)?;
        check_budget("merge_error", self.merge_error)
    }

    /// Load and validate from a TOML string.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, PolicyConfigError> {
        let policy: Self = toml::from_str(s)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Load and validate from a JSON string.
    #[cfg(feature = "policy-config")]
    pub fn from_json_str(s: &str) -> Result<Self, PolicyConfigError> {
        let policy: Self = serde_json::from_str(s)?;
        policy.validate()?;
        Ok(policy)
    }
}

pub(crate) fn check_budget(field: &'static str, value: i64) -> Result<(), RegionError> {
    if value < 0 {
        return Err(RegionError::InvalidPolicy { field, value });
    }
    Ok(())
}
