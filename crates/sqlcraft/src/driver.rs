//! The backend capability consumed by the core.
//!
//! A [`Driver`] produces connected handles, a [`DriverConnection`] prepares
//! statements, and a [`DriverStatement`] binds, executes and fetches. The
//! core never talks to a concrete backend directly; everything it needs is
//! behind these traits.

use crate::config::ConnectConfig;
use crate::value::{ParamId, ParamMap, ParamType, Value, ValueRef};
use std::fmt;
use std::sync::Arc;

/// Failure reported by a driver.
///
/// Keeps the driver's original message, its SQLSTATE-style code when one is
/// reported, and the originating location when known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverError {
    pub message: String,
    pub code: Option<String>,
    pub location: Option<String>,
}

impl DriverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            location: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(location) = &self.location {
            write!(f, "{location}: {}", self.message)
        } else {
            f.write_str(&self.message)
        }
    }
}

impl std::error::Error for DriverError {}

/// Driver-level attributes reachable through the connection pass-through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attr {
    ErrorMode,
    Timeout,
    ClientVersion,
    ServerVersion,
    ServerInfo,
    ConnectionStatus,
    Prefetch,
}

/// Shape requested when fetching a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Name-indexed access only.
    Assoc,
    /// Position-indexed access only.
    Num,
    /// Both name- and position-indexed access.
    Both,
}

/// One result row, in the shape the fetch requested.
///
/// Column names are attached for [`FetchMode::Assoc`] and [`FetchMode::Both`]
/// and absent for [`FetchMode::Num`].
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Option<Arc<Vec<String>>>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: Option<Arc<Vec<String>>>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Value at a zero-based position.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Value under a result-set column name, when names were fetched.
    pub fn get_named(&self, name: &str) -> Option<&Value> {
        let columns = self.columns.as_ref()?;
        let pos = columns.iter().position(|c| c == name)?;
        self.values.get(pos)
    }

    pub fn columns(&self) -> Option<&[String]> {
        self.columns.as_deref().map(|c| c.as_slice())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

/// Factory for backend handles; also names the dialect whose quoting rules
/// apply to identifiers.
pub trait Driver: fmt::Debug + Send + Sync {
    fn dialect(&self) -> &str;

    fn connect(&self, config: &ConnectConfig) -> Result<Box<dyn DriverConnection>, DriverError>;
}

/// A connected backend handle.
pub trait DriverConnection {
    fn prepare(&mut self, sql: &str) -> Result<Box<dyn DriverStatement>, DriverError>;

    /// Native literal quoting; `None` when the driver has no quote facility.
    fn quote(&self, literal: &str) -> Option<String>;

    fn get_attribute(&self, attr: Attr) -> Result<Value, DriverError>;

    fn set_attribute(&mut self, attr: Attr, value: Value) -> Result<(), DriverError>;

    /// Row id generated by the last insert, or the named sequence's current
    /// value.
    fn last_insert_id(&self, sequence: Option<&str>) -> Result<i64, DriverError>;
}

/// A prepared statement together with the result of its most recent
/// execution.
pub trait DriverStatement {
    /// Register a reference-bound parameter; the cell is read at execution
    /// time.
    fn bind_param(&mut self, id: &ParamId, value: ValueRef, ty: ParamType)
    -> Result<(), DriverError>;

    /// Register a value-bound parameter, captured now.
    fn bind_value(&mut self, id: &ParamId, value: Value, ty: ParamType)
    -> Result<(), DriverError>;

    /// Execute with the bulk parameter map, or with whatever was bound when
    /// `params` is `None`.
    fn execute(&mut self, params: Option<&ParamMap>) -> Result<(), DriverError>;

    /// Rows affected by the most recent execution.
    fn row_count(&self) -> u64;

    /// Columns in the current result set, 0 when there is none.
    fn column_count(&self) -> usize;

    /// Advance the result cursor. `None` means exhausted, never an error.
    fn fetch(&mut self, mode: FetchMode) -> Option<Row>;
}
