//! Condition expressions compiled into SQL predicate fragments.
//!
//! [`Condition`] is a closed sum over raw fragments, AND/OR groups and the
//! list-comparison operators. Compilation is a structural recursion; a
//! malformed or unrecognized node compiles to the empty string so the
//! surrounding clause is simply omitted, it is never an error.

use crate::dialect::Quoter;
use crate::value::Value;

/// A condition that compiles to a SQL predicate fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Opaque SQL fragment used verbatim; the caller is responsible for
    /// escaping.
    Raw(String),
    /// All sub-conditions must hold. Empty sub-conditions are discarded.
    And(Vec<Condition>),
    /// At least one sub-condition must hold.
    Or(Vec<Condition>),
    /// Column value is one of the listed values.
    In(String, Vec<Value>),
    /// Column value is none of the listed values.
    NotIn(String, Vec<Value>),
    /// Column matches every listed pattern.
    Like(String, Vec<Value>),
    /// Column matches none of the listed patterns.
    NotLike(String, Vec<Value>),
    /// Column matches at least one listed pattern.
    OrLike(String, Vec<Value>),
    /// Column fails to match at least one listed pattern.
    OrNotLike(String, Vec<Value>),
    /// Anything that did not resolve to a known operator. Compiles to the
    /// empty string.
    Unrecognized,
}

impl Condition {
    pub fn raw(sql: impl Into<String>) -> Self {
        Condition::Raw(sql.into())
    }

    pub fn all(conditions: Vec<Condition>) -> Self {
        Condition::And(conditions)
    }

    pub fn any(conditions: Vec<Condition>) -> Self {
        Condition::Or(conditions)
    }

    pub fn in_list<V: Into<Value>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Condition::In(column.into(), collect(values))
    }

    pub fn not_in<V: Into<Value>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Condition::NotIn(column.into(), collect(values))
    }

    pub fn like<V: Into<Value>>(
        column: impl Into<String>,
        patterns: impl IntoIterator<Item = V>,
    ) -> Self {
        Condition::Like(column.into(), collect(patterns))
    }

    pub fn not_like<V: Into<Value>>(
        column: impl Into<String>,
        patterns: impl IntoIterator<Item = V>,
    ) -> Self {
        Condition::NotLike(column.into(), collect(patterns))
    }

    pub fn or_like<V: Into<Value>>(
        column: impl Into<String>,
        patterns: impl IntoIterator<Item = V>,
    ) -> Self {
        Condition::OrLike(column.into(), collect(patterns))
    }

    pub fn or_not_like<V: Into<Value>>(
        column: impl Into<String>,
        patterns: impl IntoIterator<Item = V>,
    ) -> Self {
        Condition::OrNotLike(column.into(), collect(patterns))
    }

    /// Resolve a runtime operator tag into a condition node.
    ///
    /// The operator is compared case-insensitively; an unknown tag yields
    /// [`Condition::Unrecognized`].
    pub fn node<V: Into<Value>>(
        operator: &str,
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let column = column.into();
        let values = collect(values);
        match operator.to_ascii_uppercase().as_str() {
            "IN" => Condition::In(column, values),
            "NOT IN" => Condition::NotIn(column, values),
            "LIKE" => Condition::Like(column, values),
            "NOT LIKE" => Condition::NotLike(column, values),
            "OR LIKE" => Condition::OrLike(column, values),
            "OR NOT LIKE" => Condition::OrNotLike(column, values),
            _ => Condition::Unrecognized,
        }
    }

    /// Compile into a SQL predicate fragment.
    ///
    /// An empty result means the condition carries no constraint and the
    /// surrounding clause should be omitted.
    pub fn compile(&self, quoter: &dyn Quoter) -> String {
        match self {
            Condition::Raw(sql) => sql.clone(),
            Condition::And(parts) => join_group(parts, " AND ", quoter),
            Condition::Or(parts) => join_group(parts, " OR ", quoter),
            Condition::In(column, values) => in_predicate("IN", column, values, quoter),
            Condition::NotIn(column, values) => in_predicate("NOT IN", column, values, quoter),
            Condition::Like(column, patterns) => {
                like_predicate("LIKE", " AND ", column, patterns, quoter)
            }
            Condition::NotLike(column, patterns) => {
                like_predicate("NOT LIKE", " AND ", column, patterns, quoter)
            }
            Condition::OrLike(column, patterns) => {
                like_predicate("LIKE", " OR ", column, patterns, quoter)
            }
            Condition::OrNotLike(column, patterns) => {
                like_predicate("NOT LIKE", " OR ", column, patterns, quoter)
            }
            Condition::Unrecognized => String::new(),
        }
    }
}

impl From<&str> for Condition {
    fn from(sql: &str) -> Self {
        Condition::Raw(sql.to_string())
    }
}

impl From<String> for Condition {
    fn from(sql: String) -> Self {
        Condition::Raw(sql)
    }
}

fn collect<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Vec<Value> {
    values.into_iter().map(Into::into).collect()
}

fn join_group(parts: &[Condition], glue: &str, quoter: &dyn Quoter) -> String {
    let compiled: Vec<String> = parts
        .iter()
        .map(|part| part.compile(quoter))
        .filter(|sql| !sql.is_empty())
        .map(|sql| format!("({sql})"))
        .collect();
    compiled.join(glue)
}

/// A column reference is quoted unless it contains a parenthesis, which
/// marks it as a raw expression.
fn quote_column(column: &str, quoter: &dyn Quoter) -> String {
    if column.contains('(') {
        column.to_string()
    } else {
        quoter.quote_column_name(column)
    }
}

fn in_predicate(operator: &str, column: &str, values: &[Value], quoter: &dyn Quoter) -> String {
    if values.is_empty() {
        // `IN ()` must never match; `NOT IN ()` must never exclude.
        return if operator == "IN" {
            "0=1".to_string()
        } else {
            String::new()
        };
    }
    let quoted: Vec<String> = values.iter().map(|v| quoter.quote_value(v)).collect();
    format!(
        "{} {} ({})",
        quote_column(column, quoter),
        operator,
        quoted.join(", ")
    )
}

fn like_predicate(
    operator: &str,
    glue: &str,
    column: &str,
    patterns: &[Value],
    quoter: &dyn Quoter,
) -> String {
    if patterns.is_empty() {
        // Mirrors the IN asymmetry: a positive match against nothing is
        // always false, a negative one carries no constraint.
        return if operator == "LIKE" {
            "0=1".to_string()
        } else {
            String::new()
        };
    }
    let column = quote_column(column, quoter);
    let predicates: Vec<String> = patterns
        .iter()
        .map(|pattern| format!("{column} {operator} {}", quoter.quote_value(pattern)))
        .collect();
    predicates.join(glue)
}
