//! Error types for sqlcraft.

use crate::driver::DriverError;
use thiserror::Error;

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Failures surfaced by the core.
///
/// Driver-level failures propagate immediately, wrapped with the driver's
/// original message and location; nothing is retried internally.
#[derive(Debug, Error)]
pub enum DbError {
    /// Activation or handle-creation failure.
    #[error("connection error: {0}")]
    Connection(String),

    /// The backend rejected the SQL text during preparation.
    #[error("prepare error: {0}")]
    Prepare(#[source] DriverError),

    /// Runtime failure while binding or executing a statement.
    #[error("execution error: {0}")]
    Execution(#[source] DriverError),

    /// Incompatible parameter binding modes requested on one statement.
    #[error("binding error: {0}")]
    Binding(String),
}

impl DbError {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    pub fn binding(message: impl Into<String>) -> Self {
        Self::Binding(message.into())
    }

    /// The wrapped driver failure, for prepare and execution errors.
    pub fn driver_error(&self) -> Option<&DriverError> {
        match self {
            Self::Prepare(e) | Self::Execution(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_prepare(&self) -> bool {
        matches!(self, Self::Prepare(_))
    }

    pub fn is_execution(&self) -> bool {
        matches!(self, Self::Execution(_))
    }
}
