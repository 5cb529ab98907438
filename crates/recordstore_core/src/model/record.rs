//! Record domain model.
//!
//! # Invariants
//! - `id` is assigned by the database on create and never changes after.
//! - `message` is the only mutable business field.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Database-assigned record identifier.
pub type RecordId = i64;

/// One stored message, as exchanged with the record procedures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Record {
    /// `None` until the database assigns an identifier.
    pub id: Option<RecordId>,
    pub message: String,
}

/// Validation errors raised before a record reaches the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    /// Update addresses rows by id, so the id must be present.
    MissingId,
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingId => write!(f, "record id is required for update"),
        }
    }
}

impl Error for RecordValidationError {}

impl Record {
    /// Creates a record that has not been stored yet.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            id: None,
            message: message.into(),
        }
    }

    /// Creates a record for an identifier the database already assigned.
    pub fn with_id(id: RecordId, message: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            message: message.into(),
        }
    }

    /// Returns the id an update would target.
    pub fn validate_for_update(&self) -> Result<RecordId, RecordValidationError> {
        self.id.ok_or(RecordValidationError::MissingId)
    }
}

#[cfg(test)]
mod tests {
    use super::{Record, RecordValidationError};

    #[test]
    fn serializes_with_procedure_field_names() {
        let json = serde_json::to_string(&Record::with_id(4, "hello")).unwrap();
        assert_eq!(json, r#"{"Id":4,"Message":"hello"}"#);

        let unsaved = serde_json::to_string(&Record::new("draft")).unwrap();
        assert_eq!(unsaved, r#"{"Id":null,"Message":"draft"}"#);
    }

    #[test]
    fn update_requires_id() {
        assert_eq!(
            Record::new("draft").validate_for_update(),
            Err(RecordValidationError::MissingId)
        );
        assert_eq!(Record::with_id(9, "saved").validate_for_update(), Ok(9));
    }
}
