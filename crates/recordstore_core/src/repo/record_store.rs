//! Record CRUD over stored procedures.
//!
//! # Responsibility
//! - Expose create/get-one/get-all/update/delete as one procedure call each.
//! - Log every attempt before the call and its outcome after.
//!
//! # Invariants
//! - One connection per call, dropped before the call returns.
//! - No state is shared between calls besides the factory, procedure names
//!   and log sink.

use crate::db::procedure::{ProcRow, ProcedureNames, ProcedureParams};
use crate::db::{ConnectionFactory, DbError, ProcedureConnection};
use crate::model::record::{Record, RecordId, RecordValidationError};
use crate::operation_log::{GlobalLog, OperationLog};
use crate::repo::params::{CreateRecordParams, RecordIdParams, UpdateRecordParams};
use rusqlite::types::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

/// Return code the update procedure reports on success.
///
/// This is the wrapped procedure's contract; any other code means failure.
pub const UPDATE_SUCCESS_CODE: i64 = -1;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    Validation(RecordValidationError),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<RecordValidationError> for StoreError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Stored-procedure backed record access.
///
/// Safe to share across threads when the factory is: each call opens its
/// own connection.
pub struct RecordStore<F> {
    factory: F,
    procedures: ProcedureNames,
    log: Arc<dyn OperationLog>,
}

impl<F: ConnectionFactory> RecordStore<F> {
    /// Creates a store logging through `GlobalLog`.
    ///
    /// Procedure names come from the factory when it reports them, and
    /// fall back to `ProcedureNames::default()` otherwise.
    pub fn new(factory: F) -> Self {
        let procedures = factory.procedure_names().cloned().unwrap_or_default();
        Self {
            factory,
            procedures,
            log: Arc::new(GlobalLog),
        }
    }

    pub fn with_procedures(mut self, procedures: ProcedureNames) -> Self {
        self.procedures = procedures;
        self
    }

    pub fn with_log(mut self, log: Arc<dyn OperationLog>) -> Self {
        self.log = log;
        self
    }

    pub fn procedures(&self) -> &ProcedureNames {
        &self.procedures
    }

    /// Stores `record` and returns the id the database assigned.
    pub fn create_record(&self, record: &Record) -> StoreResult<RecordId> {
        let procedure = self.procedures.create.as_str();
        self.log.info(&format!(
            "event=record_create module=store status=start procedure={procedure} record={}",
            to_json(record)
        ));

        let id = self.call("record_create", procedure, |conn| {
            let params = CreateRecordParams::from(record).bind();
            let value = conn.execute_scalar(procedure, &params)?;
            identifier_from_scalar(procedure, value)
        })?;

        self.log.info(&format!(
            "event=record_create module=store status=ok procedure={procedure} id={id}"
        ));
        Ok(id)
    }

    /// Returns the message stored under `id`.
    ///
    /// # Errors
    /// - `DbError::UnexpectedRowCount` unless exactly one row matches.
    pub fn get_record(&self, id: RecordId) -> StoreResult<String> {
        let procedure = self.procedures.get_one.as_str();
        self.log.info(&format!(
            "event=record_get module=store status=start procedure={procedure} id={id}"
        ));

        let message = self.call("record_get", procedure, |conn| {
            let row = conn.query_single(procedure, &RecordIdParams { id }.bind())?;
            message_from_row(procedure, &row)
        })?;

        self.log.info(&format!(
            "event=record_get module=store status=ok procedure={procedure} id={id} message={message:?}"
        ));
        Ok(message)
    }

    /// Returns a snapshot of every record, in the order the database
    /// produced them.
    pub fn get_records(&self) -> StoreResult<Vec<Record>> {
        let procedure = self.procedures.get_all.as_str();
        self.log.info(&format!(
            "event=record_list module=store status=start procedure={procedure}"
        ));

        let records = self.call("record_list", procedure, |conn| {
            conn.query(procedure, &().bind())?
                .iter()
                .map(|row| parse_record_row(procedure, row))
                .collect::<Result<Vec<_>, _>>()
        })?;

        self.log.info(&format!(
            "event=record_list module=store status=ok procedure={procedure} count={} records={}",
            records.len(),
            to_json(&records)
        ));
        Ok(records)
    }

    /// Replaces the message of an existing record.
    ///
    /// Returns `true` only when the procedure reports `UPDATE_SUCCESS_CODE`.
    ///
    /// # Errors
    /// - `StoreError::Validation` when `record.id` is `None`; no connection
    ///   is opened in that case.
    /// - `StoreError::Db` for connectivity or procedure failures.
    pub fn update_record(&self, record: &Record) -> StoreResult<bool> {
        let procedure = self.procedures.update.as_str();
        self.log.info(&format!(
            "event=record_update module=store status=start procedure={procedure} record={}",
            to_json(record)
        ));

        let id = match record.validate_for_update() {
            Ok(id) => id,
            Err(err) => {
                self.log.error(&format!(
                    "event=record_update module=store status=error procedure={procedure} error_code=validation_failed error={err}"
                ));
                return Err(err.into());
            }
        };

        let code = self.call("record_update", procedure, |conn| {
            let params = UpdateRecordParams {
                message: record.message.as_str(),
                id,
            };
            conn.execute(procedure, &params.bind())
        })?;
        let outcome = code == UPDATE_SUCCESS_CODE;

        self.log.info(&format!(
            "event=record_update module=store status=ok procedure={procedure} id={id} return_code={code} outcome={outcome}"
        ));
        Ok(outcome)
    }

    /// Deletes the record under `id`.
    ///
    /// Does not report whether a row was actually removed.
    pub fn delete_record(&self, id: RecordId) -> StoreResult<()> {
        let procedure = self.procedures.delete.as_str();
        self.log.info(&format!(
            "event=record_delete module=store status=start procedure={procedure} id={id}"
        ));

        self.call("record_delete", procedure, |conn| {
            conn.execute_scalar(procedure, &RecordIdParams { id }.bind())
                .map(|_| ())
        })?;

        self.log.info(&format!(
            "event=record_delete module=store status=ok procedure={procedure} id={id}"
        ));
        Ok(())
    }

    /// Runs `body` on a freshly acquired connection.
    ///
    /// The connection is dropped when this returns, on success and on
    /// error alike. Failures are logged and returned unchanged.
    fn call<T>(
        &self,
        event: &str,
        procedure: &str,
        body: impl FnOnce(&mut F::Connection) -> Result<T, DbError>,
    ) -> StoreResult<T> {
        let started_at = Instant::now();
        let result = self
            .factory
            .create_connection()
            .and_then(|mut conn| body(&mut conn));

        if let Err(err) = &result {
            self.log.error(&format!(
                "event={event} module=store status=error procedure={procedure} duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            ));
        }
        result.map_err(StoreError::from)
    }
}

fn identifier_from_scalar(procedure: &str, value: Option<Value>) -> Result<RecordId, DbError> {
    match value {
        Some(Value::Integer(id)) => Ok(id),
        other => Err(DbError::UnexpectedShape {
            procedure: procedure.to_string(),
            detail: format!("expected integer identifier, got {other:?}"),
        }),
    }
}

fn message_from_row(procedure: &str, row: &ProcRow) -> Result<String, DbError> {
    match row.first() {
        Some(Value::Text(message)) => Ok(message.clone()),
        other => Err(DbError::UnexpectedShape {
            procedure: procedure.to_string(),
            detail: format!("expected one text column, got {other:?}"),
        }),
    }
}

fn parse_record_row(procedure: &str, row: &ProcRow) -> Result<Record, DbError> {
    let id = match row.get("Id") {
        Some(Value::Integer(id)) => *id,
        other => {
            return Err(DbError::UnexpectedShape {
                procedure: procedure.to_string(),
                detail: format!("invalid `Id` column value {other:?}"),
            });
        }
    };
    let message = match row.get("Message") {
        Some(Value::Text(message)) => message.clone(),
        other => {
            return Err(DbError::UnexpectedShape {
                procedure: procedure.to_string(),
                detail: format!("invalid `Message` column value {other:?}"),
            });
        }
    };
    Ok(Record::with_id(id, message))
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|err| format!("<unserializable: {err}>"))
}

#[cfg(test)]
mod tests {
    use super::{identifier_from_scalar, message_from_row, parse_record_row};
    use crate::db::procedure::ProcRow;
    use crate::db::DbError;
    use rusqlite::types::Value;

    #[test]
    fn identifier_must_be_an_integer() {
        assert_eq!(
            identifier_from_scalar("p", Some(Value::Integer(42))).unwrap(),
            42
        );
        assert!(matches!(
            identifier_from_scalar("p", None),
            Err(DbError::UnexpectedShape { .. })
        ));
        assert!(matches!(
            identifier_from_scalar("p", Some(Value::Text("42".to_string()))),
            Err(DbError::UnexpectedShape { .. })
        ));
    }

    #[test]
    fn message_row_needs_a_text_column() {
        let row = ProcRow::new(vec![("message".to_string(), Value::Text("hi".to_string()))]);
        assert_eq!(message_from_row("p", &row).unwrap(), "hi");

        let empty = ProcRow::default();
        assert!(message_from_row("p", &empty).is_err());
    }

    #[test]
    fn record_row_rejects_missing_message() {
        let row = ProcRow::new(vec![("Id".to_string(), Value::Integer(1))]);
        let err = parse_record_row("usp_list", &row).unwrap_err();
        assert!(err.to_string().contains("Message"));
    }
}
