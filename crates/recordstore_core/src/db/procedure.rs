//! Typed stored-procedure parameters, rows and procedure naming.
//!
//! # Responsibility
//! - Describe one procedure call as an explicit parameter list.
//! - Carry returned rows with their column names.
//!
//! # Invariants
//! - Return-value parameters carry no input value and are never bound.
//! - Column lookup by name is ASCII case-insensitive.

use rusqlite::types::Value;
use serde::{Deserialize, Serialize};

/// Direction of a procedure parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDirection {
    Input,
    /// Slot through which the procedure reports its status/result code.
    ReturnValue,
}

/// One named parameter of a stored-procedure call.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcParam {
    pub name: &'static str,
    pub value: Value,
    pub direction: ParamDirection,
}

impl ProcParam {
    pub fn input(name: &'static str, value: impl Into<Value>) -> Self {
        Self {
            name,
            value: value.into(),
            direction: ParamDirection::Input,
        }
    }

    pub fn return_value(name: &'static str) -> Self {
        Self {
            name,
            value: Value::Null,
            direction: ParamDirection::ReturnValue,
        }
    }

    pub fn is_input(&self) -> bool {
        self.direction == ParamDirection::Input
    }
}

/// Typed argument set for one stored procedure.
pub trait ProcedureParams {
    fn bind(&self) -> Vec<ProcParam>;
}

/// Procedures that take no arguments.
impl ProcedureParams for () {
    fn bind(&self) -> Vec<ProcParam> {
        Vec::new()
    }
}

/// One materialized result row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProcRow {
    columns: Vec<(String, Value)>,
}

impl ProcRow {
    pub fn new(columns: Vec<(String, Value)>) -> Self {
        Self { columns }
    }

    /// Looks up a column by name, ignoring ASCII case.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(column, _)| column.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }

    pub fn first(&self) -> Option<&Value> {
        self.columns.first().map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Names of the five procedures behind the record operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcedureNames {
    pub create: String,
    pub get_one: String,
    pub get_all: String,
    pub update: String,
    pub delete: String,
}

impl Default for ProcedureNames {
    fn default() -> Self {
        Self {
            create: "record_create".to_string(),
            get_one: "record_get".to_string(),
            get_all: "record_list".to_string(),
            update: "record_update".to_string(),
            delete: "record_delete".to_string(),
        }
    }
}
