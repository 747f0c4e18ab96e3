//! Connection: lazy handle ownership and dialect access.
//!
//! A [`Connection`] owns the lifetime of the underlying driver handle. The
//! handle is created on first need and dropped entirely on deactivation; a
//! later activation creates a brand-new one. Commands borrow the connection
//! and never own the handle.
//!
//! Everything here assumes the synchronous single-threaded model: one
//! in-flight operation per handle, no internal locking. Independent
//! connections can be used concurrently; the quoting strategy is stateless
//! and freely shared.

use crate::command::Command;
use crate::config::ConnectConfig;
use crate::dialect::{Quoter, QuoterRegistry};
use crate::driver::{Attr, Driver, DriverConnection};
use crate::error::{DbError, DbResult};
use crate::query::QueryBuilder;
use crate::value::{Value, quote_literal};
use std::cell::{RefCell, RefMut};
use std::sync::Arc;

pub struct Connection {
    driver: Arc<dyn Driver>,
    config: ConnectConfig,
    quoter: Arc<dyn Quoter>,
    handle: RefCell<Option<Box<dyn DriverConnection>>>,
}

impl Connection {
    /// Create a connection for the given driver and settings. The quoting
    /// strategy is resolved from the registry by the driver's dialect id.
    /// No handle is opened yet.
    pub fn new(driver: Arc<dyn Driver>, config: ConnectConfig, registry: &QuoterRegistry) -> Self {
        let quoter = registry.resolve(driver.dialect());
        Self {
            driver,
            config,
            quoter,
            handle: RefCell::new(None),
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.borrow().is_some()
    }

    /// Open or close the underlying handle. Toggling to the current state is
    /// a no-op. Closing drops the handle entirely; statements prepared on it
    /// are left to the driver's own semantics.
    pub fn set_active(&self, active: bool) -> DbResult<()> {
        if active == self.is_active() {
            return Ok(());
        }
        if active { self.open() } else { self.close() }
    }

    fn open(&self) -> DbResult<()> {
        let handle = self
            .driver
            .connect(&self.config)
            .map_err(|e| DbError::Connection(e.to_string()))?;
        *self.handle.borrow_mut() = Some(handle);
        tracing::debug!(
            dialect = self.driver.dialect(),
            host = %self.config.host,
            database = %self.config.database,
            "connection opened"
        );
        Ok(())
    }

    fn close(&self) -> DbResult<()> {
        *self.handle.borrow_mut() = None;
        tracing::debug!("connection closed");
        Ok(())
    }

    pub(crate) fn with_handle<R>(
        &self,
        f: impl FnOnce(&mut dyn DriverConnection) -> R,
    ) -> DbResult<R> {
        self.set_active(true)?;
        let mut guard = self.handle.borrow_mut();
        let handle = guard.as_mut().expect("handle present after activation");
        Ok(f(handle.as_mut()))
    }

    /// Direct access to the active driver handle, activating the connection
    /// if needed. The borrow must end before any command on this connection
    /// prepares or executes.
    pub fn handle(&self) -> DbResult<RefMut<'_, dyn DriverConnection>> {
        self.set_active(true)?;
        let guard = self.handle.borrow_mut();
        Ok(RefMut::map(guard, |h| {
            h.as_mut().expect("handle present after activation").as_mut()
        }))
    }

    // ==================== Statements and builders ====================

    /// Create a command for the given SQL text, activating the connection.
    pub fn command(&self, sql: impl Into<String>) -> DbResult<Command<'_>> {
        self.set_active(true)?;
        Ok(Command::with_text(self, sql.into()))
    }

    /// Create a command from a query builder, activating the connection. The
    /// builder's specification is rendered on first text retrieval and its
    /// pending parameters carry over.
    pub fn command_from(&self, builder: QueryBuilder) -> DbResult<Command<'_>> {
        self.set_active(true)?;
        Ok(Command::with_builder(self, builder))
    }

    /// A query builder using this connection's quoting strategy.
    pub fn builder(&self) -> QueryBuilder {
        QueryBuilder::new(self.quoter.clone())
    }

    // ==================== Quoting ====================

    pub fn quoter(&self) -> Arc<dyn Quoter> {
        self.quoter.clone()
    }

    pub fn quote_table_name(&self, name: &str) -> String {
        self.quoter.quote_table_name(name)
    }

    pub fn quote_column_name(&self, name: &str) -> String {
        self.quoter.quote_column_name(name)
    }

    /// Quote a literal for inclusion in a statement. Numeric literals pass
    /// through unquoted; strings prefer the driver's native quoting and fall
    /// back to the manual escape when the driver has none.
    pub fn quote_value(&self, value: &Value) -> DbResult<String> {
        match value {
            Value::Int(_) | Value::Float(_) => Ok(quote_literal(value)),
            Value::Text(s) => {
                let quoter = self.quoter.clone();
                self.with_handle(|h| {
                    h.quote(s)
                        .unwrap_or_else(|| quoter.quote_value(&Value::Text(s.clone())))
                })
            }
            other => Ok(self.quoter.quote_value(other)),
        }
    }

    // ==================== Driver attribute pass-through ====================

    pub fn get_attribute(&self, attr: Attr) -> DbResult<Value> {
        self.with_handle(|h| h.get_attribute(attr))?
            .map_err(DbError::Execution)
    }

    pub fn set_attribute(&self, attr: Attr, value: Value) -> DbResult<()> {
        self.with_handle(|h| h.set_attribute(attr, value))?
            .map_err(DbError::Execution)
    }

    pub fn server_version(&self) -> DbResult<Value> {
        self.get_attribute(Attr::ServerVersion)
    }

    pub fn client_version(&self) -> DbResult<Value> {
        self.get_attribute(Attr::ClientVersion)
    }

    pub fn server_info(&self) -> DbResult<Value> {
        self.get_attribute(Attr::ServerInfo)
    }

    pub fn connection_status(&self) -> DbResult<Value> {
        self.get_attribute(Attr::ConnectionStatus)
    }

    pub fn timeout(&self) -> DbResult<Value> {
        self.get_attribute(Attr::Timeout)
    }

    pub fn prefetch(&self) -> DbResult<Value> {
        self.get_attribute(Attr::Prefetch)
    }

    /// Row id generated by the last insert, or the named sequence's current
    /// value.
    pub fn last_insert_id(&self, sequence: Option<&str>) -> DbResult<i64> {
        self.with_handle(|h| h.last_insert_id(sequence))?
            .map_err(DbError::Execution)
    }

    pub fn config(&self) -> &ConnectConfig {
        &self.config
    }

    pub fn dialect(&self) -> &str {
        self.driver.dialect()
    }
}
