//! Filter expressions: the tree, its values, and the parser that builds it.
//!
//! # Module Structure
//!
//! - `op`: The filter tree (`FilterOp`, `CompareOp`)
//! - `value`: Scalar values compared against fields
//! - `limits`: Nesting depth and operation count limits
//! - `parser`: JSON to `FilterOp` parsing and validation

pub mod limits;
pub mod op;
pub mod parser;
pub mod value;

// Re-exports
pub use limits::{FilterLimits, MAX_NESTING_DEPTH, MAX_OPERATION_COUNT};
pub use op::{AND_OPERATOR, CompareOp, FilterOp, IN_OPERATOR, OR_OPERATOR};
pub use parser::{FilterParser, parse_filters};
pub use value::Scalar;
