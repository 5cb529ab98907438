//! Record storage over stored procedures.
//!
//! `RecordStore` turns create/read/update/delete requests into one
//! stored-procedure call each, on a connection it acquires per call.

pub mod db;
pub mod logging;
pub mod model;
pub mod operation_log;
pub mod repo;

pub use db::{
    ConnectionFactory, DbError, DbResult, ProcParam, ProcRow, ProcedureConnection,
    ProcedureNames, SqliteConnectionFactory,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::record::{Record, RecordId, RecordValidationError};
pub use operation_log::{CapturedLevel, CapturedLog, GlobalLog, OperationLog};
pub use repo::record_store::{RecordStore, StoreError, StoreResult, UPDATE_SUCCESS_CODE};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
