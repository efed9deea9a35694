//! Resource limits applied while parsing filters.

use serde::{Deserialize, Serialize};

/// Maximum number of nested `$and`/`$or` levels.
pub const MAX_NESTING_DEPTH: usize = 7;

/// Maximum number of nodes (field comparisons plus combinations) in a filter tree.
pub const MAX_OPERATION_COUNT: usize = 100;

/// Limits protecting translation cost against adversarial filters.
///
/// Deserializes from a `[limits]` table, missing keys fall back to
/// [`MAX_NESTING_DEPTH`] and [`MAX_OPERATION_COUNT`]:
///
/// ```
/// use filterql::filter::FilterLimits;
///
/// let limits: FilterLimits = serde_json::from_str(r#"{"max_nesting_depth": 3}"#).unwrap();
/// assert_eq!(limits.max_nesting_depth, 3);
/// assert_eq!(limits.max_operation_count, 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterLimits {
    pub max_nesting_depth: usize,
    pub max_operation_count: usize,
}

impl FilterLimits {
    pub fn new(max_nesting_depth: usize, max_operation_count: usize) -> Self {
        Self {
            max_nesting_depth,
            max_operation_count,
        }
    }
}

impl Default for FilterLimits {
    fn default() -> Self {
        Self::new(MAX_NESTING_DEPTH, MAX_OPERATION_COUNT)
    }
}
