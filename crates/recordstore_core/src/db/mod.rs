//! Database access contracts and the SQLite backend.
//!
//! # Responsibility
//! - Define the connection factory and connection handle seams that
//!   `RecordStore` drives.
//! - Open and configure SQLite connections with the `records` schema.
//!
//! # Invariants
//! - A connection handle is released exactly once, when it is dropped.
//! - Driver failures are surfaced as `DbError` without local recovery.

use rusqlite::types::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

mod open;
pub mod procedure;
pub mod sqlite;

pub use open::{open_db, open_db_in_memory};
pub use procedure::{ParamDirection, ProcParam, ProcRow, ProcedureNames, ProcedureParams};
pub use sqlite::{ReturnSlot, SqliteConnection, SqliteConnectionFactory, SqliteProcedureCatalog};

pub type DbResult<T> = Result<T, DbError>;

/// Connectivity and procedure-execution failures.
#[derive(Debug)]
pub enum DbError {
    /// Driver-level failure: open, connection loss, rejected statement.
    Sqlite(rusqlite::Error),
    /// The backend has no procedure registered under this name.
    UnknownProcedure(String),
    UnexpectedRowCount {
        procedure: String,
        expected: usize,
        actual: usize,
    },
    /// The procedure answered with a value or row of the wrong shape.
    UnexpectedShape {
        procedure: String,
        detail: String,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnknownProcedure(name) => write!(f, "unknown stored procedure `{name}`"),
            Self::UnexpectedRowCount {
                procedure,
                expected,
                actual,
            } => write!(
                f,
                "stored procedure `{procedure}` returned {actual} row(s), expected {expected}"
            ),
            Self::UnexpectedShape { procedure, detail } => {
                write!(f, "stored procedure `{procedure}` returned unexpected data: {detail}")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnknownProcedure(_)
            | Self::UnexpectedRowCount { .. }
            | Self::UnexpectedShape { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Live connection able to run named stored procedures.
///
/// Dropping the handle releases the underlying connection.
pub trait ProcedureConnection {
    /// Runs `procedure` and returns the value of its return slot.
    fn execute(&mut self, procedure: &str, params: &[ProcParam]) -> DbResult<i64>;

    /// Runs `procedure` and returns the first column of the first row, if any.
    fn execute_scalar(&mut self, procedure: &str, params: &[ProcParam])
        -> DbResult<Option<Value>>;

    /// Runs `procedure` and materializes every returned row.
    fn query(&mut self, procedure: &str, params: &[ProcParam]) -> DbResult<Vec<ProcRow>>;

    /// Runs `procedure` and requires exactly one returned row.
    ///
    /// # Errors
    /// - `DbError::UnexpectedRowCount` when zero or several rows come back.
    fn query_single(&mut self, procedure: &str, params: &[ProcParam]) -> DbResult<ProcRow> {
        let mut rows = self.query(procedure, params)?;
        if rows.len() != 1 {
            return Err(DbError::UnexpectedRowCount {
                procedure: procedure.to_string(),
                expected: 1,
                actual: rows.len(),
            });
        }
        Ok(rows.remove(0))
    }
}

/// Produces ready-to-use connections, one per call.
pub trait ConnectionFactory {
    type Connection: ProcedureConnection;

    fn create_connection(&self) -> DbResult<Self::Connection>;

    /// Procedure names this factory's connections answer to, when fixed.
    ///
    /// `RecordStore::new` adopts these so the names are configured once.
    fn procedure_names(&self) -> Option<&ProcedureNames> {
        None
    }
}

impl<F: ConnectionFactory + ?Sized> ConnectionFactory for Arc<F> {
    type Connection = F::Connection;

    fn create_connection(&self) -> DbResult<Self::Connection> {
        (**self).create_connection()
    }

    fn procedure_names(&self) -> Option<&ProcedureNames> {
        (**self).procedure_names()
    }
}

impl<F: ConnectionFactory + ?Sized> ConnectionFactory for &F {
    type Connection = F::Connection;

    fn create_connection(&self) -> DbResult<Self::Connection> {
        (**self).create_connection()
    }

    fn procedure_names(&self) -> Option<&ProcedureNames> {
        (**self).procedure_names()
    }
}
