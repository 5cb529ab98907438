//! SQLite-backed connection factory with an emulated procedure catalog.
//!
//! # Responsibility
//! - Map stored-procedure names to SQL statements with named parameters.
//! - Open one bootstrapped connection per `create_connection` call.
//!
//! # Invariants
//! - Only input parameters the statement declares (as `:Name`) are bound.
//! - Unknown procedure names fail before touching the database.

use super::procedure::{ProcParam, ProcRow, ProcedureNames};
use super::{open_db, ConnectionFactory, DbError, DbResult, ProcedureConnection};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{Connection, Statement};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// How a catalog procedure fills its return-value slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnSlot {
    /// First column of the first row, `0` when no row comes back.
    FirstColumn,
    /// `-1` when at least one row changed, `0` otherwise.
    StatusCode,
    /// Number of rows the statement changed.
    RowsChanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SqliteProcedure {
    sql: String,
    return_slot: ReturnSlot,
}

/// Name -> statement registry standing in for server-side procedures.
#[derive(Debug, Clone, Default)]
pub struct SqliteProcedureCatalog {
    procedures: HashMap<String, SqliteProcedure>,
}

impl SqliteProcedureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog implementing the five record procedures over `records`.
    pub fn standard(names: &ProcedureNames) -> Self {
        let mut catalog = Self::new();
        catalog
            .register(
                &names.create,
                "INSERT INTO records (message) VALUES (:Message) RETURNING id;",
                ReturnSlot::FirstColumn,
            )
            .register(
                &names.get_one,
                "SELECT message FROM records WHERE id = :Id;",
                ReturnSlot::FirstColumn,
            )
            .register(
                &names.get_all,
                "SELECT id, message FROM records;",
                ReturnSlot::FirstColumn,
            )
            .register(
                &names.update,
                "UPDATE records
                 SET
                    message = :Message,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = :Id;",
                ReturnSlot::StatusCode,
            )
            .register(
                &names.delete,
                "DELETE FROM records WHERE id = :Id;",
                ReturnSlot::RowsChanged,
            );
        catalog
    }

    /// Registers (or replaces) one procedure.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        sql: impl Into<String>,
        return_slot: ReturnSlot,
    ) -> &mut Self {
        self.procedures.insert(
            name.into(),
            SqliteProcedure {
                sql: sql.into(),
                return_slot,
            },
        );
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.procedures.contains_key(name)
    }

    fn get(&self, name: &str) -> DbResult<&SqliteProcedure> {
        self.procedures
            .get(name)
            .ok_or_else(|| DbError::UnknownProcedure(name.to_string()))
    }
}

/// Opens a fresh connection to one SQLite file per request.
#[derive(Debug, Clone)]
pub struct SqliteConnectionFactory {
    path: PathBuf,
    catalog: Arc<SqliteProcedureCatalog>,
    names: Option<ProcedureNames>,
}

impl SqliteConnectionFactory {
    /// Factory using the standard catalog registered under `names`.
    pub fn new(path: impl Into<PathBuf>, names: &ProcedureNames) -> Self {
        Self {
            path: path.into(),
            catalog: Arc::new(SqliteProcedureCatalog::standard(names)),
            names: Some(names.clone()),
        }
    }

    /// Factory over a hand-built catalog; callers pick the procedure names
    /// on the store.
    pub fn with_catalog(path: impl Into<PathBuf>, catalog: SqliteProcedureCatalog) -> Self {
        Self {
            path: path.into(),
            catalog: Arc::new(catalog),
            names: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConnectionFactory for SqliteConnectionFactory {
    type Connection = SqliteConnection;

    fn create_connection(&self) -> DbResult<SqliteConnection> {
        let conn = open_db(&self.path)?;
        Ok(SqliteConnection {
            conn,
            catalog: Arc::clone(&self.catalog),
        })
    }

    fn procedure_names(&self) -> Option<&ProcedureNames> {
        self.names.as_ref()
    }
}

/// Connection handle; the SQLite connection closes when this is dropped.
pub struct SqliteConnection {
    conn: Connection,
    catalog: Arc<SqliteProcedureCatalog>,
}

impl SqliteConnection {
    fn prepare_bound(
        &self,
        procedure: &str,
        params: &[ProcParam],
    ) -> DbResult<(Statement<'_>, ReturnSlot)> {
        let definition = self.catalog.get(procedure)?;
        let mut stmt = self.conn.prepare(&definition.sql)?;

        for param in params.iter().filter(|param| param.is_input()) {
            let placeholder = format!(":{}", param.name);
            if let Some(index) = stmt.parameter_index(&placeholder)? {
                stmt.raw_bind_parameter(index, &param.value)?;
            }
        }

        Ok((stmt, definition.return_slot))
    }
}

impl ProcedureConnection for SqliteConnection {
    fn execute(&mut self, procedure: &str, params: &[ProcParam]) -> DbResult<i64> {
        let (mut stmt, return_slot) = self.prepare_bound(procedure, params)?;

        match return_slot {
            ReturnSlot::FirstColumn => {
                let mut rows = stmt.raw_query();
                let value = match rows.next()? {
                    Some(row) => row.get::<_, Value>(0)?,
                    None => Value::Null,
                };
                match value {
                    Value::Integer(value) => Ok(value),
                    Value::Null => Ok(0),
                    other => Err(DbError::UnexpectedShape {
                        procedure: procedure.to_string(),
                        detail: format!("return slot holds non-integer value {other:?}"),
                    }),
                }
            }
            ReturnSlot::StatusCode => {
                let changed = stmt.raw_execute()?;
                Ok(if changed > 0 { -1 } else { 0 })
            }
            ReturnSlot::RowsChanged => {
                let changed = stmt.raw_execute()?;
                i64::try_from(changed).map_err(|_| DbError::UnexpectedShape {
                    procedure: procedure.to_string(),
                    detail: format!("changed row count {changed} overflows i64"),
                })
            }
        }
    }

    fn execute_scalar(
        &mut self,
        procedure: &str,
        params: &[ProcParam],
    ) -> DbResult<Option<Value>> {
        let (mut stmt, _) = self.prepare_bound(procedure, params)?;
        let mut rows = stmt.raw_query();
        let value = match rows.next()? {
            Some(row) => Some(row.get::<_, Value>(0)?),
            None => None,
        };
        Ok(value)
    }

    fn query(&mut self, procedure: &str, params: &[ProcParam]) -> DbResult<Vec<ProcRow>> {
        let (mut stmt, _) = self.prepare_bound(procedure, params)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut rows = stmt.raw_query();
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns.len());
            for (index, column) in columns.iter().enumerate() {
                values.push((column.clone(), row.get::<_, Value>(index)?));
            }
            result.push(ProcRow::new(values));
        }

        Ok(result)
    }
}

impl Drop for SqliteConnection {
    fn drop(&mut self) {
        debug!("event=db_close module=db status=ok");
    }
}
