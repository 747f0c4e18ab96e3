//! Query specification and SQL rendering.
//!
//! [`QueryBuilder`] assembles a SELECT statement from structured parts and
//! renders it on demand. Every setter consumes the builder and returns it,
//! so a specification has exactly one owner and rendering is a pure function
//! of the parts it holds.

use crate::condition::Condition;
use crate::dialect::Quoter;
use crate::value::{ParamMap, Value};
use regex::Regex;
use std::sync::{Arc, LazyLock};

static LIST_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s*,\s*").unwrap());
static ALIAS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.*?)(?:\s+as\s+|\s+)(.*)$").unwrap());
static ORDER_DIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(.*?)\s+(asc|desc)$").unwrap());

/// A column or table list: one comma-separated string, or explicit
/// fragments.
#[derive(Debug, Clone)]
pub enum FieldList {
    Text(String),
    Items(Vec<String>),
}

pub trait IntoFieldList {
    fn into_field_list(self) -> FieldList;
}

impl IntoFieldList for &str {
    fn into_field_list(self) -> FieldList {
        FieldList::Text(self.to_string())
    }
}

impl IntoFieldList for String {
    fn into_field_list(self) -> FieldList {
        FieldList::Text(self)
    }
}

impl IntoFieldList for Vec<String> {
    fn into_field_list(self) -> FieldList {
        FieldList::Items(self)
    }
}

impl IntoFieldList for Vec<&str> {
    fn into_field_list(self) -> FieldList {
        FieldList::Items(self.into_iter().map(str::to_string).collect())
    }
}

impl IntoFieldList for &[&str] {
    fn into_field_list(self) -> FieldList {
        FieldList::Items(self.iter().map(|s| s.to_string()).collect())
    }
}

/// The structured parts of a SELECT statement.
///
/// Every part holds already-quoted SQL text; absence of a part omits the
/// corresponding clause. `limit` is rendered when it is zero or positive,
/// `offset` only when strictly positive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParts {
    pub select: Option<String>,
    pub distinct: bool,
    pub from: Option<String>,
    pub where_sql: Option<String>,
    pub group: Option<String>,
    pub having: Option<String>,
    pub order: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub union: Vec<String>,
}

impl QueryParts {
    /// Render the parts into a complete statement.
    ///
    /// The clause order is fixed: SELECT, FROM, WHERE, GROUP BY, HAVING,
    /// UNION, ORDER BY, LIMIT, OFFSET. Rendering the same parts twice yields
    /// byte-identical text.
    pub fn render(&self) -> String {
        let mut sql = String::from(if self.distinct {
            "SELECT DISTINCT"
        } else {
            "SELECT"
        });
        sql.push(' ');
        sql.push_str(non_empty(&self.select).unwrap_or("*"));

        if let Some(from) = non_empty(&self.from) {
            sql.push_str("\nFROM ");
            sql.push_str(from);
        }
        if let Some(where_sql) = non_empty(&self.where_sql) {
            sql.push_str("\nWHERE ");
            sql.push_str(where_sql);
        }
        if let Some(group) = non_empty(&self.group) {
            sql.push_str("\nGROUP BY ");
            sql.push_str(group);
        }
        if let Some(having) = non_empty(&self.having) {
            sql.push_str("\nHAVING ");
            sql.push_str(having);
        }
        if !self.union.is_empty() {
            sql.push_str("\nUNION (\n");
            sql.push_str(&self.union.join("\n) UNION (\n"));
            sql.push(')');
        }
        if let Some(order) = non_empty(&self.order) {
            sql.push_str("\nORDER BY ");
            sql.push_str(order);
        }
        if let Some(limit) = self.limit {
            if limit >= 0 {
                sql.push_str(&format!(" LIMIT {limit}"));
            }
        }
        if let Some(offset) = self.offset {
            if offset > 0 {
                sql.push_str(&format!(" OFFSET {offset}"));
            }
        }
        sql
    }
}

fn non_empty(part: &Option<String>) -> Option<&str> {
    part.as_deref().filter(|s| !s.is_empty())
}

/// Fluent builder for SELECT statements.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    quoter: Arc<dyn Quoter>,
    parts: QueryParts,
    params: ParamMap,
}

impl QueryBuilder {
    pub fn new(quoter: Arc<dyn Quoter>) -> Self {
        Self {
            quoter,
            parts: QueryParts::default(),
            params: ParamMap::new(),
        }
    }

    // ==================== Projection and source ====================

    /// Set the SELECT list. Fragments are auto-quoted unless they contain a
    /// parenthesis; `expr alias` and `expr AS alias` quote both sides.
    pub fn select(mut self, columns: impl IntoFieldList) -> Self {
        self.parts.select = Some(quote_field_list(
            columns.into_field_list(),
            &*self.quoter,
            FieldKind::Select,
        ));
        self
    }

    /// Like [`QueryBuilder::select`], with an option keyword (e.g.
    /// `SQL_CALC_FOUND_ROWS`) prefixed to the list.
    pub fn select_with_option(mut self, columns: impl IntoFieldList, option: &str) -> Self {
        let list = quote_field_list(columns.into_field_list(), &*self.quoter, FieldKind::Select);
        self.parts.select = Some(if option.is_empty() {
            list
        } else {
            format!("{option} {list}")
        });
        self
    }

    /// [`QueryBuilder::select`] with the DISTINCT flag turned on.
    pub fn select_distinct(self, columns: impl IntoFieldList) -> Self {
        let mut builder = self.select(columns);
        builder.parts.distinct = true;
        builder
    }

    /// Set the FROM list. Table names may carry a schema prefix and an
    /// alias; both are quoted independently.
    pub fn from(mut self, tables: impl IntoFieldList) -> Self {
        self.parts.from = Some(quote_field_list(
            tables.into_field_list(),
            &*self.quoter,
            FieldKind::Table,
        ));
        self
    }

    // ==================== Predicates ====================

    /// Set the WHERE predicate outright, replacing any existing one.
    pub fn where_(mut self, condition: impl Into<Condition>) -> Self {
        self.parts.where_sql = Some(condition.into().compile(&*self.quoter));
        self
    }

    /// Combine a new condition with the existing WHERE predicate using AND.
    pub fn and_where(self, condition: impl Into<Condition>) -> Self {
        self.merge_where(condition.into(), true)
    }

    /// Combine a new condition with the existing WHERE predicate using OR.
    pub fn or_where(self, condition: impl Into<Condition>) -> Self {
        self.merge_where(condition.into(), false)
    }

    fn merge_where(mut self, condition: Condition, conjunction: bool) -> Self {
        let compiled = match self.parts.where_sql.take() {
            Some(existing) => {
                let parts = vec![Condition::Raw(existing), condition];
                let node = if conjunction {
                    Condition::And(parts)
                } else {
                    Condition::Or(parts)
                };
                node.compile(&*self.quoter)
            }
            None => condition.compile(&*self.quoter),
        };
        self.parts.where_sql = Some(compiled);
        self
    }

    /// Set the HAVING predicate.
    pub fn having(mut self, condition: impl Into<Condition>) -> Self {
        self.parts.having = Some(condition.into().compile(&*self.quoter));
        self
    }

    // ==================== Grouping and ordering ====================

    pub fn group(mut self, columns: impl IntoFieldList) -> Self {
        self.parts.group = Some(quote_field_list(
            columns.into_field_list(),
            &*self.quoter,
            FieldKind::Group,
        ));
        self
    }

    /// Set the ORDER BY list. A trailing `asc`/`desc` is recognized
    /// case-insensitively and upper-cased.
    pub fn order(mut self, columns: impl IntoFieldList) -> Self {
        self.parts.order = Some(quote_field_list(
            columns.into_field_list(),
            &*self.quoter,
            FieldKind::Order,
        ));
        self
    }

    // ==================== Limiting and set operations ====================

    /// Set the LIMIT. Zero is a valid, meaningful limit; a negative value
    /// removes the clause.
    pub fn limit(mut self, limit: i64) -> Self {
        self.parts.limit = Some(limit);
        self
    }

    /// Set the OFFSET. Emitted only when strictly positive.
    pub fn offset(mut self, offset: i64) -> Self {
        self.parts.offset = Some(offset);
        self
    }

    /// Append a statement joined with UNION; each fragment is wrapped in its
    /// own parentheses.
    pub fn union(mut self, sql: impl Into<String>) -> Self {
        self.parts.union.push(sql.into());
        self
    }

    // ==================== Pending parameters ====================

    /// Register a pending bound parameter, carried to the statement this
    /// builder ends up on. A later value under the same name replaces the
    /// earlier one.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Register several pending bound parameters.
    pub fn params<K, V, I>(mut self, params: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (name, value) in params {
            self.params.insert(name.into(), value.into());
        }
        self
    }

    // ==================== Getters ====================

    pub fn select_part(&self) -> &str {
        self.parts.select.as_deref().unwrap_or("")
    }

    pub fn distinct(&self) -> bool {
        self.parts.distinct
    }

    pub fn from_part(&self) -> &str {
        self.parts.from.as_deref().unwrap_or("")
    }

    pub fn where_part(&self) -> &str {
        self.parts.where_sql.as_deref().unwrap_or("")
    }

    pub fn group_part(&self) -> &str {
        self.parts.group.as_deref().unwrap_or("")
    }

    pub fn having_part(&self) -> &str {
        self.parts.having.as_deref().unwrap_or("")
    }

    pub fn order_part(&self) -> &str {
        self.parts.order.as_deref().unwrap_or("")
    }

    pub fn limit_part(&self) -> i64 {
        self.parts.limit.unwrap_or(-1)
    }

    pub fn offset_part(&self) -> i64 {
        self.parts.offset.unwrap_or(-1)
    }

    pub fn union_parts(&self) -> &[String] {
        &self.parts.union
    }

    pub fn pending_params(&self) -> &ParamMap {
        &self.params
    }

    pub fn parts(&self) -> &QueryParts {
        &self.parts
    }

    // ==================== Rendering ====================

    /// Render the current specification to SQL text.
    pub fn build(&self) -> String {
        self.parts.render()
    }
}

#[derive(Clone, Copy)]
enum FieldKind {
    Select,
    Table,
    Group,
    Order,
}

fn quote_field_list(list: FieldList, quoter: &dyn Quoter, kind: FieldKind) -> String {
    let items = match list {
        // A parenthesis in the joined string marks a raw expression; the
        // whole list is used verbatim.
        FieldList::Text(text) if text.contains('(') => return text,
        FieldList::Text(text) => LIST_SPLIT
            .split(text.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        FieldList::Items(items) => items,
    };

    let quoted: Vec<String> = items
        .into_iter()
        .map(|item| quote_field(&item, quoter, kind))
        .collect();
    quoted.join(", ")
}

fn quote_field(item: &str, quoter: &dyn Quoter, kind: FieldKind) -> String {
    if item.contains('(') {
        return item.to_string();
    }
    match kind {
        FieldKind::Select => match ALIAS.captures(item) {
            Some(caps) => format!(
                "{} AS {}",
                quoter.quote_column_name(&caps[1]),
                quoter.quote_column_name(&caps[2])
            ),
            None => quoter.quote_column_name(item),
        },
        FieldKind::Table => match ALIAS.captures(item) {
            Some(caps) => format!(
                "{} {}",
                quoter.quote_table_name(&caps[1]),
                quoter.quote_table_name(&caps[2])
            ),
            None => quoter.quote_table_name(item),
        },
        FieldKind::Group => quoter.quote_column_name(item),
        FieldKind::Order => match ORDER_DIR.captures(item) {
            Some(caps) => format!(
                "{} {}",
                quoter.quote_column_name(&caps[1]),
                caps[2].to_ascii_uppercase()
            ),
            None => quoter.quote_column_name(item),
        },
    }
}
