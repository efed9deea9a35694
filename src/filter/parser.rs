//! Parser for JSON filter expressions.
//!
//! Converts the loosely typed filters accepted from API callers into a
//! validated [`FilterOp`] tree.
//!
//! # Syntax
//!
//! - `{"tags": "animal"}`: equality shorthand
//! - `{"version": ["2", "3"]}`: `in` shorthand
//! - `{"size": {"gte": 5, "lte": 10}}`: explicit operators, combined with AND
//! - `{"tags": "animal", "version": "2"}`: several keys are combined with AND
//! - `[{"tags": "cats"}, {"tags": "dogs"}]`: a list of objects is combined with OR
//! - `{"$or": [{...}, {...}], "$and": [{...}]}`: explicit combinations
//! - `{"$$price": 5}`: a field whose name starts with `$` (here `$price`)
//!
//! Every problem found in the input is reported, not only the first one.
//!
//! # Example
//!
//! ```
//! use filterql::filter::{FilterOp, FilterParser};
//! use filterql::schema::SearchSchema;
//! use serde_json::json;
//!
//! let schema = SearchSchema::builder()
//!     .add_untyped_field("tags")
//!     .add_untyped_field("version")
//!     .build();
//!
//! let filter = FilterParser::new()
//!     .parse(&json!({"tags": "animal", "version": {"gte": 2}}), &schema)
//!     .unwrap();
//! assert_eq!(
//!     filter,
//!     Some(FilterOp::and(vec![
//!         FilterOp::eq("tags", "animal"),
//!         FilterOp::gte("version", 2),
//!     ]))
//! );
//! ```

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::error::{FilterqlError, Result, ValidationErrors};
use crate::filter::limits::FilterLimits;
use crate::filter::op::{AND_OPERATOR, CompareOp, FilterOp, IN_OPERATOR, OR_OPERATOR};
use crate::filter::value::Scalar;
use crate::schema::SearchSchema;

pub const INVALID_FORMAT_MESSAGE: &str = "Filters must be defined as a dict or a list of dicts";
pub const MAX_DEPTH_MESSAGE: &str = "Maximum nesting depth for filter operations reached";
pub const MAX_OPERATIONS_MESSAGE: &str = "Maximum number of filter operations exceeded";

/// Parser and validator for filter expressions.
///
/// The parser holds configuration only. Each call gets the schema it validates
/// against, so one parser can be shared by concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct FilterParser {
    limits: FilterLimits,
    custom_operators: HashSet<String>,
}

impl FilterParser {
    /// Create a parser with the default limits and no custom operators.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(mut self, limits: FilterLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Accept an extra field operator, e.g. `{"title": {"fuzzy": "kitten"}}`.
    ///
    /// Backends that have no native form for it translate it as equality.
    pub fn with_custom_operator(mut self, name: impl Into<String>) -> Self {
        self.custom_operators.insert(name.into());
        self
    }

    pub fn with_custom_operators<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom_operators
            .extend(names.into_iter().map(Into::into));
        self
    }

    pub fn limits(&self) -> FilterLimits {
        self.limits
    }

    /// Parse a JSON filter value.
    ///
    /// Returns `Ok(None)` for `null`, `""`, `{}` and `[]`, and for inputs whose
    /// combinations are all empty.
    pub fn parse(&self, raw: &Value, schema: &SearchSchema) -> Result<Option<FilterOp>> {
        let mut state = ParseState::new(self, schema);
        let root = state.parse_root(raw);
        state.finish(root.as_ref())?;
        Ok(root)
    }

    /// Parse filters given as JSON text, as they arrive in a query string parameter.
    pub fn parse_str(&self, text: &str, schema: &SearchSchema) -> Result<Option<FilterOp>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        let raw: Value = serde_json::from_str(text).map_err(|e| {
            log::debug!("Filters are not valid JSON: {e}");
            FilterqlError::Validation(ValidationErrors::from(vec![
                INVALID_FORMAT_MESSAGE.to_string(),
            ]))
        })?;

        self.parse(&raw, schema)
    }

    /// Validate a tree that was built directly rather than parsed.
    ///
    /// Applies the same field and limit checks as [`FilterParser::parse`].
    pub fn validate(&self, filter: FilterOp, schema: &SearchSchema) -> Result<FilterOp> {
        let mut state = ParseState::new(self, schema);
        state.check_tree(&filter, 0);
        state.finish(Some(&filter))?;
        Ok(filter)
    }

    fn is_custom_operator(&self, name: &str) -> bool {
        self.custom_operators.contains(name)
    }
}

/// Parse filters with the default limits.
pub fn parse_filters(raw: &Value, schema: &SearchSchema) -> Result<Option<FilterOp>> {
    FilterParser::new().parse(raw, schema)
}

/// State of a single parse: collected messages and the running limit counters.
struct ParseState<'a> {
    parser: &'a FilterParser,
    schema: &'a SearchSchema,
    errors: ValidationErrors,
    comparisons: usize,
    depth_reported: bool,
    count_reported: bool,
}

impl<'a> ParseState<'a> {
    fn new(parser: &'a FilterParser, schema: &'a SearchSchema) -> Self {
        Self {
            parser,
            schema,
            errors: ValidationErrors::new(),
            comparisons: 0,
            depth_reported: false,
            count_reported: false,
        }
    }

    /// Once the operation ceiling is hit nothing else is parsed.
    fn exhausted(&self) -> bool {
        self.count_reported
    }

    fn error(&mut self, message: impl Into<String>) {
        self.errors.push(message);
    }

    fn report_depth(&mut self) {
        if !self.depth_reported {
            self.depth_reported = true;
            self.error(MAX_DEPTH_MESSAGE);
        }
    }

    fn report_count(&mut self) {
        if !self.count_reported {
            self.count_reported = true;
            self.error(MAX_OPERATIONS_MESSAGE);
        }
    }

    /// Registers a new field comparison against the operation ceiling.
    fn comparison(&mut self, node: FilterOp) -> FilterOp {
        self.comparisons += 1;
        if self.comparisons > self.parser.limits.max_operation_count {
            self.report_count();
        }
        node
    }

    fn finish(mut self, root: Option<&FilterOp>) -> Result<()> {
        if let Some(root) = root
            && !self.count_reported
            && root.op_count() > self.parser.limits.max_operation_count
        {
            self.report_count();
        }

        if !self.errors.is_empty() {
            log::debug!(
                "Rejected filters with {} validation error(s)",
                self.errors.len()
            );
            return Err(FilterqlError::Validation(self.errors));
        }

        if let Some(root) = root {
            log::debug!(
                "Parsed filters: {} operation(s), depth {}",
                root.op_count(),
                root.depth()
            );
        }
        Ok(())
    }

    fn parse_root(&mut self, raw: &Value) -> Option<FilterOp> {
        match raw {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::Object(map) => self.parse_object(map, 0),
            Value::Array(items) => {
                if items.is_empty() {
                    return None;
                }
                let Some(objects) = as_objects(items) else {
                    self.error(INVALID_FORMAT_MESSAGE);
                    return None;
                };

                let mut alternatives = Vec::with_capacity(objects.len());
                for object in objects {
                    if self.exhausted() {
                        break;
                    }
                    if let Some(node) = self.parse_object(object, 0) {
                        alternatives.push(node);
                    }
                }
                combine(alternatives, false)
            }
            _ => {
                self.error(INVALID_FORMAT_MESSAGE);
                None
            }
        }
    }

    /// Parses one object. Its keys are combined with AND.
    fn parse_object(&mut self, map: &Map<String, Value>, depth: usize) -> Option<FilterOp> {
        let mut members = Vec::new();
        let mut unknown_operators = Vec::new();

        for (key, value) in map {
            if self.exhausted() {
                break;
            }

            match key.as_str() {
                AND_OPERATOR | OR_OPERATOR => {
                    if let Some(node) = self.parse_operation(key == AND_OPERATOR, value, depth) {
                        members.push(node);
                    }
                }
                // `$$name` is the escaped form of the field `$name`.
                escaped if escaped.starts_with("$$") => {
                    self.parse_field(&escaped[1..], value, &mut members)
                }
                unknown if unknown.starts_with('$') => unknown_operators.push(unknown),
                field => self.parse_field(field, value, &mut members),
            }
        }

        if !unknown_operators.is_empty() {
            self.error(format!(
                "Unknown operators (must be one of {OR_OPERATOR}, {AND_OPERATOR}): {}",
                unknown_operators.join(", ")
            ));
        }

        match members.len() {
            0 => None,
            // An explicit single-child `$and`/`$or` is kept as written.
            1 => members.pop(),
            _ => combine(members, true),
        }
    }

    /// Parses the list of objects under an `$and`/`$or` key.
    fn parse_operation(&mut self, conjunction: bool, value: &Value, depth: usize) -> Option<FilterOp> {
        let depth = depth + 1;
        if depth > self.parser.limits.max_nesting_depth {
            self.report_depth();
            return None;
        }

        let Some(objects) = value.as_array().and_then(|items| as_objects(items)) else {
            self.error(format!(
                "Filter operations must be defined as a list of dicts: {}",
                describe(value)
            ));
            return None;
        };

        let mut children = Vec::with_capacity(objects.len());
        for object in objects {
            if self.exhausted() {
                break;
            }
            if let Some(node) = self.parse_object(object, depth) {
                children.push(node);
            }
        }

        combine(children, conjunction)
    }

    fn parse_field(&mut self, field: &str, value: &Value, members: &mut Vec<FilterOp>) {
        if !self.schema.contains_field(field) {
            self.error(format!("Unknown field: {field}"));
            return;
        }

        match value {
            Value::Object(operators) => {
                let nodes = self.parse_field_operators(field, operators);
                members.extend(nodes);
            }
            Value::Array(items) => {
                if let Some(node) = self.parse_field_list(field, items) {
                    members.push(node);
                }
            }
            scalar => {
                if let Some(value) = Scalar::from_json(scalar) {
                    let node = self.comparison(FilterOp::eq(field, value));
                    members.push(node);
                }
            }
        }
    }

    /// Parses `{"gte": 5, "lte": 10}` into one comparison per operator.
    fn parse_field_operators(&mut self, field: &str, operators: &Map<String, Value>) -> Vec<FilterOp> {
        let mut nodes = Vec::with_capacity(operators.len());

        for (name, value) in operators {
            if self.exhausted() {
                break;
            }

            if name == IN_OPERATOR {
                if let Some(values) = self.in_values(field, value) {
                    nodes.push(self.comparison(FilterOp::in_values(field, values)));
                }
                continue;
            }

            let op = match CompareOp::from_core_name(name) {
                Some(op) => op,
                None if self.parser.is_custom_operator(name) => CompareOp::Custom(name.clone()),
                None => {
                    self.error(format!(
                        "Unknown field operators (must be one of eq, gt, gte, lt, lte, in): {name}"
                    ));
                    continue;
                }
            };

            match Scalar::from_json(value) {
                Some(value) => nodes.push(self.comparison(FilterOp::compare(field, op, value))),
                None => self.invalid_value(field, value),
            }
        }

        nodes
    }

    /// Parses `[10, 20, {"gte": 50, "lte": 60}]`.
    ///
    /// Scalars become one `in` node; each operator object becomes an
    /// alternative of its own. Alternatives come first, the `in` node last.
    fn parse_field_list(&mut self, field: &str, items: &[Value]) -> Option<FilterOp> {
        let mut scalars = Vec::new();
        let mut alternatives = Vec::new();

        for item in items {
            if self.exhausted() {
                break;
            }

            if let Some(value) = Scalar::from_json(item) {
                scalars.push(value);
            } else if let Value::Object(operators) = item {
                let mut nodes = self.parse_field_operators(field, operators);
                let node = if nodes.len() == 1 {
                    nodes.pop()
                } else {
                    combine(nodes, true)
                };
                alternatives.extend(node);
            } else {
                self.invalid_value(field, item);
            }
        }

        if alternatives.is_empty() {
            return Some(self.comparison(FilterOp::in_values(field, scalars)));
        }
        if !scalars.is_empty() {
            alternatives.push(self.comparison(FilterOp::in_values(field, scalars)));
        }

        if alternatives.len() == 1 {
            alternatives.pop()
        } else {
            Some(FilterOp::Or(alternatives))
        }
    }

    fn in_values(&mut self, field: &str, value: &Value) -> Option<Vec<Scalar>> {
        match value {
            Value::Array(items) => {
                let values: Option<Vec<Scalar>> = items.iter().map(Scalar::from_json).collect();
                if values.is_none() {
                    self.invalid_value(field, value);
                }
                values
            }
            Value::Object(_) => {
                self.invalid_value(field, value);
                None
            }
            scalar => Scalar::from_json(scalar).map(|value| vec![value]),
        }
    }

    fn invalid_value(&mut self, field: &str, value: &Value) {
        self.error(format!(
            "Invalid filter value for field {field}: {}",
            describe(value)
        ));
    }

    /// Walks a prebuilt tree applying the schema and limit checks.
    fn check_tree(&mut self, node: &FilterOp, depth: usize) {
        if self.exhausted() {
            return;
        }

        match node {
            FilterOp::Compare { field, .. } | FilterOp::In { field, .. } => {
                if !self.schema.contains_field(field) {
                    self.error(format!("Unknown field: {field}"));
                }
                self.comparisons += 1;
                if self.comparisons > self.parser.limits.max_operation_count {
                    self.report_count();
                }
            }
            FilterOp::And(children) | FilterOp::Or(children) => {
                let depth = depth + 1;
                if depth > self.parser.limits.max_nesting_depth {
                    self.report_depth();
                    return;
                }
                for child in children {
                    self.check_tree(child, depth);
                }
            }
        }
    }
}

/// Combines nodes with AND (`conjunction`) or OR.
///
/// Children of the same kind are spliced into the new node instead of being
/// nested. Returns `None` when there is nothing to combine.
fn combine(children: Vec<FilterOp>, conjunction: bool) -> Option<FilterOp> {
    if children.is_empty() {
        return None;
    }

    let mut flattened = Vec::with_capacity(children.len());
    for child in children {
        match child {
            FilterOp::And(inner) if conjunction => flattened.extend(inner),
            FilterOp::Or(inner) if !conjunction => flattened.extend(inner),
            other => flattened.push(other),
        }
    }

    Some(if conjunction {
        FilterOp::And(flattened)
    } else {
        FilterOp::Or(flattened)
    })
}

/// Returns the items as objects, or `None` if any item is not an object.
fn as_objects(items: &[Value]) -> Option<Vec<&Map<String, Value>>> {
    items.iter().map(Value::as_object).collect()
}

/// Strings are shown raw, anything else as compact JSON.
fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> SearchSchema {
        let mut builder = SearchSchema::builder();
        for i in 1..=7 {
            builder = builder.add_untyped_field(format!("field{i}"));
        }
        builder.build()
    }

    fn parse(raw: Value) -> Result<Option<FilterOp>> {
        parse_filters(&raw, &schema())
    }

    fn messages(raw: Value) -> Vec<String> {
        match parse(raw) {
            Err(FilterqlError::Validation(errors)) => errors.messages().to_vec(),
            other => panic!("Expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_no_value() {
        for raw in [json!(null), json!(""), json!({}), json!([])] {
            assert_eq!(parse(raw).unwrap(), None);
        }
    }

    #[test]
    fn test_invalid_format() {
        for raw in [
            json!(1),
            json!("a"),
            json!("a,b"),
            json!("{\"a\": \"b\"}"),
            json!(["a"]),
            json!(["a", "b"]),
            json!([{"a": "b"}, "c"]),
        ] {
            assert_eq!(messages(raw), vec![INVALID_FORMAT_MESSAGE]);
        }
    }

    #[test]
    fn test_unknown_top_operator() {
        assert_eq!(
            messages(json!({"$maybe": [{"field1": "value1"}]})),
            vec!["Unknown operators (must be one of $or, $and): $maybe"]
        );
        assert_eq!(
            messages(json!({"$not": [], "field1": 1, "$xor": []})),
            vec!["Unknown operators (must be one of $or, $and): $not, $xor"]
        );
    }

    #[test]
    fn test_escaped_dollar_field() {
        let schema = SearchSchema::builder()
            .add_untyped_field("$some_field")
            .add_untyped_field("field1")
            .build();

        let result = parse_filters(&json!({"$$some_field": "some_value"}), &schema).unwrap();
        assert_eq!(result, Some(FilterOp::eq("$some_field", "some_value")));

        let result = parse_filters(
            &json!({"$or": [{"$$some_field": {"gt": 100}}, {"field1": "value1"}]}),
            &schema,
        )
        .unwrap();
        assert_eq!(
            result,
            Some(FilterOp::or(vec![
                FilterOp::gt("$some_field", 100),
                FilterOp::eq("field1", "value1"),
            ]))
        );
    }

    #[test]
    fn test_operation_value_must_be_list_of_dicts() {
        let cases = [
            (json!(1), "1"),
            (json!("a"), "a"),
            (json!(["a"]), "[\"a\"]"),
            (json!([{"a": "b"}, "c"]), "[{\"a\":\"b\"},\"c\"]"),
        ];
        for (value, shown) in cases {
            assert_eq!(
                messages(json!({"field1": "value1", "$or": value})),
                vec![format!(
                    "Filter operations must be defined as a list of dicts: {shown}"
                )]
            );
        }
    }

    #[test]
    fn test_single_field_operator() {
        assert_eq!(
            parse(json!({"field1": {"gte": 100}})).unwrap(),
            Some(FilterOp::gte("field1", 100))
        );
    }

    #[test]
    fn test_in_operator_with_scalar() {
        assert_eq!(
            parse(json!({"field1": {"in": "a"}})).unwrap(),
            Some(FilterOp::in_values("field1", vec![Scalar::from("a")]))
        );
    }

    #[test]
    fn test_unknown_field_operator() {
        assert_eq!(
            messages(json!({"field1": {"near": 3}})),
            vec!["Unknown field operators (must be one of eq, gt, gte, lt, lte, in): near"]
        );
    }

    #[test]
    fn test_custom_field_operator() {
        let parser = FilterParser::new().with_custom_operator("fuzzy");
        let result = parser
            .parse(&json!({"field1": {"fuzzy": "kitten"}}), &schema())
            .unwrap();

        assert_eq!(
            result,
            Some(FilterOp::compare(
                "field1",
                CompareOp::Custom("fuzzy".to_string()),
                "kitten"
            ))
        );
    }

    #[test]
    fn test_invalid_values() {
        assert_eq!(
            messages(json!({"field1": {"eq": [1, 2]}})),
            vec!["Invalid filter value for field field1: [1,2]"]
        );
        assert_eq!(
            messages(json!({"field1": {"in": [1, [2]]}})),
            vec!["Invalid filter value for field field1: [1,[2]]"]
        );
        assert_eq!(
            messages(json!({"field1": [1, [2]]})),
            vec!["Invalid filter value for field field1: [2]"]
        );
    }

    #[test]
    fn test_empty_in_shorthand() {
        assert_eq!(
            parse(json!({"field1": []})).unwrap(),
            Some(FilterOp::in_values("field1", vec![]))
        );
    }

    #[test]
    fn test_field_list_with_single_operator_object() {
        assert_eq!(
            parse(json!({"field1": [{"gte": 5}]})).unwrap(),
            Some(FilterOp::gte("field1", 5))
        );
        assert_eq!(
            parse(json!({"field1": [10, {"gte": 5}]})).unwrap(),
            Some(FilterOp::or(vec![
                FilterOp::gte("field1", 5),
                FilterOp::in_values("field1", vec![Scalar::from(10)]),
            ]))
        );
    }

    #[test]
    fn test_explicit_single_child_is_kept() {
        assert_eq!(
            parse(json!({"$or": [{"field1": "value1"}]})).unwrap(),
            Some(FilterOp::or(vec![FilterOp::eq("field1", "value1")]))
        );
        assert_eq!(
            parse(json!({"$and": [{"field1": "value1"}]})).unwrap(),
            Some(FilterOp::and(vec![FilterOp::eq("field1", "value1")]))
        );
    }

    #[test]
    fn test_empty_operations_resolve_to_nothing() {
        assert_eq!(parse(json!({"$and": []})).unwrap(), None);
        assert_eq!(
            parse(json!({"$or": [{"$and": []}], "field1": 1})).unwrap(),
            Some(FilterOp::eq("field1", 1))
        );
    }

    #[test]
    fn test_parse_str() {
        let parser = FilterParser::new();
        assert_eq!(parser.parse_str("  ", &schema()).unwrap(), None);
        assert_eq!(
            parser
                .parse_str(r#"[{"field1": "a"}, {"field2": "b"}]"#, &schema())
                .unwrap(),
            Some(FilterOp::or(vec![
                FilterOp::eq("field1", "a"),
                FilterOp::eq("field2", "b"),
            ]))
        );

        let err = parser.parse_str("field1=a", &schema()).unwrap_err();
        assert_eq!(
            err.validation_errors().unwrap().messages(),
            &[INVALID_FORMAT_MESSAGE.to_string()]
        );
    }

    #[test]
    fn test_custom_limits() {
        let parser = FilterParser::new().with_limits(FilterLimits::new(1, 3));

        assert!(parser
            .parse(&json!({"$or": [{"field1": 1}, {"field2": 2}]}), &schema())
            .is_ok());

        let err = parser
            .parse(&json!({"$or": [{"$and": [{"field1": 1}]}]}), &schema())
            .unwrap_err();
        assert_eq!(
            err.validation_errors().unwrap().messages(),
            &[MAX_DEPTH_MESSAGE.to_string()]
        );

        let err = parser
            .parse(&json!({"field1": 1, "field2": 2, "field3": 3}), &schema())
            .unwrap_err();
        assert_eq!(
            err.validation_errors().unwrap().messages(),
            &[MAX_OPERATIONS_MESSAGE.to_string()]
        );
    }

    #[test]
    fn test_validate_prebuilt_tree() {
        let parser = FilterParser::new();
        let filter = FilterOp::and(vec![FilterOp::eq("field1", 1), FilterOp::eq("field2", 2)]);
        assert_eq!(parser.validate(filter.clone(), &schema()).unwrap(), filter);

        let filter = FilterOp::or(vec![FilterOp::eq("nope", 1), FilterOp::eq("field1", 2)]);
        let err = parser.validate(filter, &schema()).unwrap_err();
        assert_eq!(
            err.validation_errors().unwrap().messages(),
            &["Unknown field: nope".to_string()]
        );
    }

    #[test]
    fn test_validate_prebuilt_tree_limits() {
        let parser = FilterParser::new().with_limits(FilterLimits::new(2, 100));
        let filter = FilterOp::and(vec![FilterOp::or(vec![FilterOp::and(vec![
            FilterOp::eq("field1", 1),
        ])])]);

        let err = parser.validate(filter, &schema()).unwrap_err();
        assert_eq!(
            err.validation_errors().unwrap().messages(),
            &[MAX_DEPTH_MESSAGE.to_string()]
        );
    }
}
