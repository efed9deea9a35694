//! The filter abstract syntax tree.
//!
//! A [`FilterOp`] is either a field comparison or a boolean combination of
//! child nodes. The tree is schema-agnostic: field names are only checked
//! against a [`SearchSchema`](crate::schema::SearchSchema) by the parser.
//!
//! ```
//! use filterql::filter::{FilterOp, Scalar};
//!
//! let filter = FilterOp::and(vec![
//!     FilterOp::eq("tags", "animal"),
//!     FilterOp::in_values("version", vec![Scalar::from("2"), Scalar::from("3")]),
//! ]);
//! assert_eq!(filter.op_count(), 3);
//! assert_eq!(filter.depth(), 1);
//! ```

use serde_json::{Value, json};

use crate::filter::value::Scalar;

/// Operator name of a conjunction.
pub const AND_OPERATOR: &str = "$and";
/// Operator name of a disjunction.
pub const OR_OPERATOR: &str = "$or";
/// Operator name of a set membership comparison.
pub const IN_OPERATOR: &str = "in";

/// Comparison operators taking a single scalar value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    /// An operator registered by an extension. Backends that do not know it
    /// translate it as equality.
    Custom(String),
}

impl CompareOp {
    /// Resolves one of the core operator names (`eq`, `gt`, `gte`, `lt`, `lte`).
    pub fn from_core_name(name: &str) -> Option<Self> {
        match name {
            "eq" => Some(CompareOp::Eq),
            "gt" => Some(CompareOp::Gt),
            "gte" => Some(CompareOp::Gte),
            "lt" => Some(CompareOp::Lt),
            "lte" => Some(CompareOp::Lte),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Gt => "gt",
            CompareOp::Gte => "gte",
            CompareOp::Lt => "lt",
            CompareOp::Lte => "lte",
            CompareOp::Custom(name) => name,
        }
    }

    /// Returns true for the range operators.
    pub fn is_range(&self) -> bool {
        matches!(
            self,
            CompareOp::Gt | CompareOp::Gte | CompareOp::Lt | CompareOp::Lte
        )
    }
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A node of the filter tree.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    /// `field <op> value`.
    Compare {
        field: String,
        op: CompareOp,
        value: Scalar,
    },
    /// `field` matches any of `values`.
    In { field: String, values: Vec<Scalar> },
    /// All children must match.
    And(Vec<FilterOp>),
    /// At least one child must match.
    Or(Vec<FilterOp>),
}

impl FilterOp {
    pub fn compare(field: impl Into<String>, op: CompareOp, value: impl Into<Scalar>) -> Self {
        FilterOp::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self::compare(field, CompareOp::Eq, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self::compare(field, CompareOp::Gt, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self::compare(field, CompareOp::Gte, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self::compare(field, CompareOp::Lt, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self::compare(field, CompareOp::Lte, value)
    }

    pub fn in_values(field: impl Into<String>, values: Vec<Scalar>) -> Self {
        FilterOp::In {
            field: field.into(),
            values,
        }
    }

    pub fn and(children: Vec<FilterOp>) -> Self {
        FilterOp::And(children)
    }

    pub fn or(children: Vec<FilterOp>) -> Self {
        FilterOp::Or(children)
    }

    /// The field this node compares, or `None` for combinations.
    pub fn field(&self) -> Option<&str> {
        match self {
            FilterOp::Compare { field, .. } | FilterOp::In { field, .. } => Some(field),
            FilterOp::And(_) | FilterOp::Or(_) => None,
        }
    }

    /// The operator name as written in filters (`eq`, `in`, `$and`, ...).
    pub fn operator(&self) -> &str {
        match self {
            FilterOp::Compare { op, .. } => op.as_str(),
            FilterOp::In { .. } => IN_OPERATOR,
            FilterOp::And(_) => AND_OPERATOR,
            FilterOp::Or(_) => OR_OPERATOR,
        }
    }

    pub fn is_combination(&self) -> bool {
        matches!(self, FilterOp::And(_) | FilterOp::Or(_))
    }

    /// Child nodes of a combination; empty for field comparisons.
    pub fn children(&self) -> &[FilterOp] {
        match self {
            FilterOp::And(children) | FilterOp::Or(children) => children,
            FilterOp::Compare { .. } | FilterOp::In { .. } => &[],
        }
    }

    /// Number of nodes in the tree. A combination counts itself plus its children.
    pub fn op_count(&self) -> usize {
        match self {
            FilterOp::Compare { .. } | FilterOp::In { .. } => 1,
            FilterOp::And(children) | FilterOp::Or(children) => {
                1 + children.iter().map(FilterOp::op_count).sum::<usize>()
            }
        }
    }

    /// Number of combination levels from this node down to its deepest leaf.
    pub fn depth(&self) -> usize {
        match self {
            FilterOp::Compare { .. } | FilterOp::In { .. } => 0,
            FilterOp::And(children) | FilterOp::Or(children) => {
                1 + children.iter().map(FilterOp::depth).max().unwrap_or(0)
            }
        }
    }

    /// Visits every field comparison, depth-first and left to right.
    pub fn for_each_field<'a>(&'a self, f: &mut impl FnMut(&'a str)) {
        match self {
            FilterOp::Compare { field, .. } | FilterOp::In { field, .. } => f(field),
            FilterOp::And(children) | FilterOp::Or(children) => {
                for child in children {
                    child.for_each_field(f);
                }
            }
        }
    }

    /// Adds `other` as a required clause.
    ///
    /// An existing `$and` gets `other` appended to its children; any other node
    /// is wrapped together with `other` in a new `$and`.
    pub fn conjoin(self, other: FilterOp) -> FilterOp {
        match self {
            FilterOp::And(mut children) => {
                children.push(other);
                FilterOp::And(children)
            }
            node => FilterOp::And(vec![node, other]),
        }
    }

    /// Like [`FilterOp::conjoin`], returning `other` alone when there is no filter yet.
    pub fn conjoin_optional(filter: Option<FilterOp>, other: FilterOp) -> FilterOp {
        match filter {
            Some(filter) => filter.conjoin(other),
            None => other,
        }
    }

    /// Renders the canonical `{"field", "op", "value"}` form of the node.
    pub fn to_json(&self) -> Value {
        match self {
            FilterOp::Compare { field, op, value } => json!({
                "field": field,
                "op": op.as_str(),
                "value": value.to_json(),
            }),
            FilterOp::In { field, values } => json!({
                "field": field,
                "op": IN_OPERATOR,
                "value": values.iter().map(Scalar::to_json).collect::<Vec<_>>(),
            }),
            FilterOp::And(children) | FilterOp::Or(children) => json!({
                "field": Value::Null,
                "op": self.operator(),
                "value": children.iter().map(FilterOp::to_json).collect::<Vec<_>>(),
            }),
        }
    }
}

impl std::fmt::Display for FilterOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
