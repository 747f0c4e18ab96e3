//! Statement lifecycle: prepare, bind, execute, query.
//!
//! A [`Command`] represents exactly one SQL text at a time. It moves between
//! two states: unprepared (no handle) and prepared (handle bound to the
//! current text). Replacing the text drops the handle; preparing while
//! prepared is a no-op. Binding and executing prepare implicitly.

use crate::connection::Connection;
use crate::driver::DriverStatement;
use crate::error::{DbError, DbResult};
use crate::query::QueryBuilder;
use crate::reader::DataReader;
use crate::value::{ParamId, ParamMap, ParamType, Value, ValueRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BindMode {
    None,
    ByRef,
    ByValue,
}

pub struct Command<'c> {
    connection: &'c Connection,
    text: Option<String>,
    builder: Option<QueryBuilder>,
    statement: Option<Box<dyn DriverStatement>>,
    params: ParamMap,
    bind_mode: BindMode,
}

impl<'c> Command<'c> {
    pub(crate) fn with_text(connection: &'c Connection, sql: String) -> Self {
        Self {
            connection,
            text: Some(sql),
            builder: None,
            statement: None,
            params: ParamMap::new(),
            bind_mode: BindMode::None,
        }
    }

    pub(crate) fn with_builder(connection: &'c Connection, builder: QueryBuilder) -> Self {
        let params = builder.pending_params().clone();
        Self {
            connection,
            text: None,
            builder: Some(builder),
            statement: None,
            params,
            bind_mode: BindMode::None,
        }
    }

    pub fn connection(&self) -> &Connection {
        self.connection
    }

    /// The SQL text to execute. When no explicit text was set, the builder's
    /// specification is rendered once and the result cached.
    pub fn text(&mut self) -> &str {
        if self.text.is_none() {
            if let Some(builder) = &self.builder {
                self.text = Some(builder.build());
            }
        }
        self.text.as_deref().unwrap_or("")
    }

    /// Replace the SQL text. Any prepared handle is dropped, forcing
    /// re-preparation on next use.
    pub fn set_text(&mut self, sql: impl Into<String>) -> &mut Self {
        self.text = Some(sql.into());
        self.cancel();
        self
    }

    /// Drop the prepared handle without touching the text. Parameters bound
    /// on the old handle do not survive.
    pub fn cancel(&mut self) {
        self.statement = None;
        self.bind_mode = BindMode::None;
    }

    /// Restore the command to an empty state for reuse.
    pub fn reset(&mut self) -> &mut Self {
        self.text = None;
        self.builder = None;
        self.statement = None;
        self.params.clear();
        self.bind_mode = BindMode::None;
        self
    }

    pub fn is_prepared(&self) -> bool {
        self.statement.is_some()
    }

    /// Pending parameters carried over from the builder, merged into the
    /// next `query` execution.
    pub fn pending_params(&self) -> &ParamMap {
        &self.params
    }

    /// Prepare the current text. Requesting preparation while already
    /// prepared is a no-op.
    pub fn prepare(&mut self) -> DbResult<()> {
        if self.statement.is_some() {
            return Ok(());
        }
        let sql = self.text().to_string();
        tracing::debug!(sql = %sql, "preparing statement");
        match self.connection.with_handle(|h| h.prepare(&sql))? {
            Ok(statement) => {
                self.statement = Some(statement);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(sql = %sql, error = %e, "prepare failed");
                Err(DbError::Prepare(e))
            }
        }
    }

    // ==================== Parameter binding ====================

    /// Register a reference-bound parameter; the cell is read when the
    /// statement executes. The storage type defaults to inference from the
    /// cell's current value.
    pub fn bind_param(
        &mut self,
        id: impl Into<ParamId>,
        value: &ValueRef,
        ty: Option<ParamType>,
    ) -> DbResult<&mut Self> {
        if self.bind_mode == BindMode::ByValue {
            return Err(DbError::binding(
                "bind_param cannot be combined with bind_value on one statement",
            ));
        }
        self.prepare()?;
        let id = id.into();
        let ty = ty.unwrap_or_else(|| value.get().param_type());
        self.statement_mut()
            .bind_param(&id, value.clone(), ty)
            .map_err(DbError::Execution)?;
        self.bind_mode = BindMode::ByRef;
        Ok(self)
    }

    /// Register a value-bound parameter, captured now.
    pub fn bind_value(
        &mut self,
        id: impl Into<ParamId>,
        value: impl Into<Value>,
        ty: Option<ParamType>,
    ) -> DbResult<&mut Self> {
        if self.bind_mode == BindMode::ByRef {
            return Err(DbError::binding(
                "bind_value cannot be combined with bind_param on one statement",
            ));
        }
        self.prepare()?;
        let id = id.into();
        let value = value.into();
        let ty = ty.unwrap_or_else(|| value.param_type());
        self.statement_mut()
            .bind_value(&id, value, ty)
            .map_err(DbError::Execution)?;
        self.bind_mode = BindMode::ByValue;
        Ok(self)
    }

    /// Value-bind every entry of a name-to-value mapping.
    pub fn bind_values<K, V, I>(&mut self, values: I) -> DbResult<&mut Self>
    where
        K: Into<ParamId>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (id, value) in values {
            self.bind_value(id, value, None)?;
        }
        Ok(self)
    }

    // ==================== Execution ====================

    /// Execute a mutation statement with whatever was bound. Returns the
    /// count of affected rows.
    pub fn execute(&mut self) -> DbResult<u64> {
        self.execute_internal(None)
    }

    /// Execute a mutation statement with an explicit parameter mapping used
    /// for this single execution. Cannot be combined with earlier bind
    /// calls.
    pub fn execute_with(&mut self, params: &ParamMap) -> DbResult<u64> {
        self.execute_internal(Some(params))
    }

    fn execute_internal(&mut self, params: Option<&ParamMap>) -> DbResult<u64> {
        if params.is_some() && self.bind_mode != BindMode::None {
            return Err(DbError::binding(
                "bulk parameters cannot be combined with bind_param/bind_value",
            ));
        }
        self.prepare()?;
        tracing::debug!("executing statement");
        let statement = self.statement_mut();
        statement.execute(params).map_err(|e| {
            tracing::warn!(error = %e, "execution failed");
            DbError::Execution(e)
        })?;
        Ok(statement.row_count())
    }

    /// Run a retrieval statement and return a cursor over its rows. Pending
    /// parameters from the builder are sent along.
    ///
    /// Running again against the same handle before draining a prior cursor
    /// is legal, but the prior cursor's position is undefined afterwards.
    pub fn query(&mut self) -> DbResult<DataReader<'_>> {
        self.query_internal(None)
    }

    /// Like [`Command::query`], merging the call-level parameters over the
    /// pending ones; call-level values win on name collisions.
    pub fn query_with(&mut self, params: &ParamMap) -> DbResult<DataReader<'_>> {
        self.query_internal(Some(params))
    }

    fn query_internal(&mut self, params: Option<&ParamMap>) -> DbResult<DataReader<'_>> {
        let effective: Option<ParamMap> = if self.params.is_empty() {
            params.cloned()
        } else {
            // Call-level parameters win over pending ones on name collision.
            let mut map = self.params.clone();
            if let Some(call) = params {
                map.extend(call.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            Some(map)
        };
        if effective.is_some() && self.bind_mode != BindMode::None {
            return Err(DbError::binding(
                "bulk parameters cannot be combined with bind_param/bind_value",
            ));
        }
        self.prepare()?;
        tracing::debug!("executing query");
        let statement = self.statement_mut();
        statement.execute(effective.as_ref()).map_err(|e| {
            tracing::warn!(error = %e, "query failed");
            DbError::Execution(e)
        })?;
        Ok(DataReader::new(statement.as_mut()))
    }

    fn statement_mut(&mut self) -> &mut Box<dyn DriverStatement> {
        self.statement.as_mut().expect("statement prepared")
    }
}
