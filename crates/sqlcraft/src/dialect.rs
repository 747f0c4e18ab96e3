//! Dialect quoting strategies.
//!
//! A [`Quoter`] maps identifiers to their dialect-quoted form. The recursive
//! prefix-splitting is shared; each dialect only supplies its simple-name
//! quoting. Strategies are stateless and freely shared between connections.

use crate::value::{Value, quote_literal};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Identifier quoting rules for one SQL dialect.
pub trait Quoter: fmt::Debug + Send + Sync {
    /// Quote a table name with no schema prefix.
    fn quote_simple_table_name(&self, name: &str) -> String;

    /// Quote a column name with no table prefix.
    fn quote_simple_column_name(&self, name: &str) -> String;

    /// Quote a possibly schema-qualified table name, quoting each dotted
    /// part independently.
    fn quote_table_name(&self, name: &str) -> String {
        if !name.contains('.') {
            return self.quote_simple_table_name(name);
        }
        name.split('.')
            .map(|part| self.quote_simple_table_name(part))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Quote a possibly table-qualified column name. The prefix before the
    /// last `.` is quoted as a table name; a bare `*` stays unquoted.
    fn quote_column_name(&self, name: &str) -> String {
        let (prefix, leaf) = match name.rfind('.') {
            Some(pos) => (Some(&name[..pos]), &name[pos + 1..]),
            None => (None, name),
        };
        let mut out = String::with_capacity(name.len() + 4);
        if let Some(prefix) = prefix {
            out.push_str(&self.quote_table_name(prefix));
            out.push('.');
        }
        if leaf == "*" {
            out.push('*');
        } else {
            out.push_str(&self.quote_simple_column_name(leaf));
        }
        out
    }

    /// Quote a literal value. Dialects may override; the default is the
    /// manual escape with numeric passthrough.
    fn quote_value(&self, value: &Value) -> String {
        quote_literal(value)
    }
}

fn wrap(name: &str, quote: char) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push(quote);
    for ch in name.chars() {
        out.push(ch);
        // Escape the quoting character by doubling it.
        if ch == quote {
            out.push(quote);
        }
    }
    out.push(quote);
    out
}

/// Backtick quoting, the default (MySQL-style) strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktickQuoter;

impl Quoter for BacktickQuoter {
    fn quote_simple_table_name(&self, name: &str) -> String {
        wrap(name, '`')
    }

    fn quote_simple_column_name(&self, name: &str) -> String {
        wrap(name, '`')
    }
}

/// Double-quote (ANSI) quoting, used by Postgres- and SQLite-flavoured
/// backends.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnsiQuoter;

impl Quoter for AnsiQuoter {
    fn quote_simple_table_name(&self, name: &str) -> String {
        wrap(name, '"')
    }

    fn quote_simple_column_name(&self, name: &str) -> String {
        wrap(name, '"')
    }
}

/// Mapping from dialect identifier to quoting strategy.
///
/// Constructed explicitly and handed to [`Connection::new`]; registering a
/// new dialect never requires touching the connection type.
///
/// [`Connection::new`]: crate::Connection::new
#[derive(Debug, Clone)]
pub struct QuoterRegistry {
    strategies: HashMap<String, Arc<dyn Quoter>>,
}

impl QuoterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            strategies: HashMap::new(),
        }
    }

    /// A registry pre-seeded with the bundled strategies.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("mysql", Arc::new(BacktickQuoter));
        registry.register("ansi", Arc::new(AnsiQuoter));
        registry.register("postgres", Arc::new(AnsiQuoter));
        registry.register("sqlite", Arc::new(AnsiQuoter));
        registry
    }

    pub fn register(&mut self, dialect: impl Into<String>, quoter: Arc<dyn Quoter>) {
        self.strategies.insert(dialect.into(), quoter);
    }

    pub fn get(&self, dialect: &str) -> Option<Arc<dyn Quoter>> {
        self.strategies.get(dialect).cloned()
    }

    /// Strategy for a dialect, falling back to backtick quoting when the
    /// dialect is unknown.
    pub fn resolve(&self, dialect: &str) -> Arc<dyn Quoter> {
        self.get(dialect)
            .unwrap_or_else(|| Arc::new(BacktickQuoter))
    }
}

impl Default for QuoterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_names() {
        assert_eq!(BacktickQuoter.quote_table_name("users"), "`users`");
        assert_eq!(AnsiQuoter.quote_column_name("name"), "\"name\"");
    }

    #[test]
    fn table_prefix_quoted_per_part() {
        assert_eq!(
            BacktickQuoter.quote_table_name("shop.orders"),
            "`shop`.`orders`"
        );
        assert_eq!(
            AnsiQuoter.quote_table_name("a.b.c"),
            "\"a\".\"b\".\"c\""
        );
    }

    #[test]
    fn column_prefix_split_on_last_dot() {
        assert_eq!(
            BacktickQuoter.quote_column_name("shop.orders.id"),
            "`shop`.`orders`.`id`"
        );
    }

    #[test]
    fn star_never_quoted() {
        assert_eq!(BacktickQuoter.quote_column_name("*"), "*");
        assert_eq!(BacktickQuoter.quote_column_name("orders.*"), "`orders`.*");
    }

    #[test]
    fn embedded_quote_doubled() {
        assert_eq!(AnsiQuoter.quote_simple_column_name("we\"ird"), "\"we\"\"ird\"");
        assert_eq!(BacktickQuoter.quote_simple_table_name("t`x"), "`t``x`");
    }

    #[test]
    fn registry_lookup_and_fallback() {
        let registry = QuoterRegistry::with_defaults();
        assert_eq!(
            registry.resolve("postgres").quote_column_name("id"),
            "\"id\""
        );
        // Unknown dialects fall back to backticks.
        assert_eq!(registry.resolve("exotic").quote_column_name("id"), "`id`");
    }

    #[test]
    fn registry_open_for_extension() {
        #[derive(Debug)]
        struct BracketQuoter;
        impl Quoter for BracketQuoter {
            fn quote_simple_table_name(&self, name: &str) -> String {
                format!("[{name}]")
            }
            fn quote_simple_column_name(&self, name: &str) -> String {
                format!("[{name}]")
            }
        }

        let mut registry = QuoterRegistry::with_defaults();
        registry.register("mssql", Arc::new(BracketQuoter));
        assert_eq!(registry.resolve("mssql").quote_table_name("t"), "[t]");
    }
}
