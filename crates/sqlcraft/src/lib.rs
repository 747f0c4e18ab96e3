//! # sqlcraft
//!
//! Driver-agnostic SQL building and prepared-statement lifecycle management.
//!
//! ## Features
//!
//! - **Structured statements**: assemble SELECT statements from parts
//!   (projection, source, predicates, grouping, ordering, set operations,
//!   limiting) instead of hand-writing strings
//! - **Condition compiler**: nested AND/OR/IN/LIKE expressions compiled into
//!   parenthesized, quoted predicate fragments
//! - **Dialect quoting**: pluggable per-dialect identifier quoting via a
//!   registered-strategy lookup
//! - **Statement lifecycle**: idempotent preparation, reference- and
//!   value-bound parameters, typed errors wrapping the driver's originals
//! - **Lazy results**: forward-only cursor with selectable row shape
//!
//! ## Usage
//!
//! ```ignore
//! use sqlcraft::{Condition, ConnectConfig, Connection, QuoterRegistry};
//! use std::sync::Arc;
//!
//! let registry = QuoterRegistry::with_defaults();
//! let conn = Connection::new(Arc::new(MyDriver), ConnectConfig::default(), &registry);
//!
//! let builder = conn
//!     .builder()
//!     .select("id, name")
//!     .from("users")
//!     .and_where(Condition::in_list("status", ["active", "invited"]))
//!     .order("created_at desc")
//!     .limit(20);
//!
//! let mut cmd = conn.command_from(builder)?;
//! let mut reader = cmd.query()?;
//! while let Some(row) = reader.read() {
//!     // ...
//! }
//! ```

pub mod command;
pub mod condition;
pub mod config;
pub mod connection;
pub mod dialect;
pub mod driver;
pub mod error;
pub mod query;
pub mod reader;
pub mod value;

pub use command::Command;
pub use condition::Condition;
pub use config::ConnectConfig;
pub use connection::Connection;
pub use dialect::{AnsiQuoter, BacktickQuoter, Quoter, QuoterRegistry};
pub use driver::{
    Attr, Driver, DriverConnection, DriverError, DriverStatement, FetchMode, Row,
};
pub use error::{DbError, DbResult};
pub use query::{FieldList, IntoFieldList, QueryBuilder, QueryParts};
pub use reader::DataReader;
pub use value::{ParamId, ParamMap, ParamType, Value, ValueRef, quote_literal};
