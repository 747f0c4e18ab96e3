//! Forward-only result cursor.
//!
//! A [`DataReader`] is positioned over the result of the most recent
//! execution of a retrieval statement. It mutably borrows its source
//! statement, so re-preparing or re-executing the statement ends the
//! cursor's borrow. Advancing past the last row yields `None`, never an
//! error; the cursor cannot rewind.

use crate::driver::{DriverStatement, FetchMode, Row};
use crate::value::Value;

pub struct DataReader<'s> {
    statement: &'s mut dyn DriverStatement,
    current: Option<Row>,
}

impl<'s> DataReader<'s> {
    pub(crate) fn new(statement: &'s mut dyn DriverStatement) -> Self {
        Self {
            statement,
            current: None,
        }
    }

    /// Next row with both name- and position-indexed access.
    pub fn read(&mut self) -> Option<&Row> {
        self.advance(FetchMode::Both)
    }

    /// Next row, name-indexed.
    pub fn read_assoc(&mut self) -> Option<&Row> {
        self.advance(FetchMode::Assoc)
    }

    /// Next row, position-indexed only.
    pub fn read_num(&mut self) -> Option<&Row> {
        self.advance(FetchMode::Num)
    }

    fn advance(&mut self, mode: FetchMode) -> Option<&Row> {
        self.current = self.statement.fetch(mode);
        self.current.as_ref()
    }

    /// One column of the next row, without materializing the rest. Does not
    /// change what [`DataReader::current`] returns.
    pub fn read_column(&mut self, index: usize) -> Option<Value> {
        let row = self.statement.fetch(FetchMode::Num)?;
        row.into_values().into_iter().nth(index)
    }

    /// The last row read, without advancing.
    pub fn current(&self) -> Option<&Row> {
        self.current.as_ref()
    }

    /// Rows affected by the statement. Many backends do not report a
    /// meaningful count for retrieval statements; rely on it chiefly for
    /// mutations.
    pub fn row_count(&self) -> u64 {
        self.statement.row_count()
    }

    /// Columns in the result set, 0 when there is none.
    pub fn column_count(&self) -> usize {
        self.statement.column_count()
    }
}

impl Iterator for DataReader<'_> {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.current = self.statement.fetch(FetchMode::Both);
        self.current.clone()
    }
}
