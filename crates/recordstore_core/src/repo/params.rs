//! Parameter sets for the record procedures.

use crate::db::procedure::{ProcParam, ProcedureParams};
use crate::model::record::{Record, RecordId};

const MESSAGE_PARAM: &str = "Message";
const ID_PARAM: &str = "Id";

/// Arguments of the create procedure; the generated id comes back through
/// the `Id` return slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRecordParams<'a> {
    pub message: &'a str,
    pub id: Option<RecordId>,
}

impl<'a> From<&'a Record> for CreateRecordParams<'a> {
    fn from(record: &'a Record) -> Self {
        Self {
            message: record.message.as_str(),
            id: record.id,
        }
    }
}

impl ProcedureParams for CreateRecordParams<'_> {
    fn bind(&self) -> Vec<ProcParam> {
        vec![
            ProcParam::input(MESSAGE_PARAM, self.message.to_string()),
            ProcParam::input(ID_PARAM, self.id),
            ProcParam::return_value(ID_PARAM),
        ]
    }
}

/// Arguments of the update procedure; the status code comes back through
/// the `Id` return slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRecordParams<'a> {
    pub message: &'a str,
    pub id: RecordId,
}

impl ProcedureParams for UpdateRecordParams<'_> {
    fn bind(&self) -> Vec<ProcParam> {
        vec![
            ProcParam::input(MESSAGE_PARAM, self.message.to_string()),
            ProcParam::input(ID_PARAM, self.id),
            ProcParam::return_value(ID_PARAM),
        ]
    }
}

/// Single-id argument used by get-one and delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordIdParams {
    pub id: RecordId,
}

impl ProcedureParams for RecordIdParams {
    fn bind(&self) -> Vec<ProcParam> {
        vec![ProcParam::input(ID_PARAM, self.id)]
    }
}

#[cfg(test)]
mod tests {
    use super::{CreateRecordParams, RecordIdParams, UpdateRecordParams};
    use crate::db::procedure::{ParamDirection, ProcParam, ProcedureParams};
    use crate::model::record::Record;
    use rusqlite::types::Value;

    #[test]
    fn create_binds_message_id_and_return_slot() {
        let record = Record::new("hello");
        let params = CreateRecordParams::from(&record).bind();

        assert_eq!(
            params,
            vec![
                ProcParam::input("Message", "hello".to_string()),
                ProcParam::input("Id", Value::Null),
                ProcParam::return_value("Id"),
            ]
        );
    }

    #[test]
    fn update_ends_with_return_slot() {
        let params = UpdateRecordParams {
            message: "edited",
            id: 3,
        }
        .bind();

        assert_eq!(params.len(), 3);
        assert_eq!(params[1].value, Value::Integer(3));
        assert_eq!(params[2].direction, ParamDirection::ReturnValue);
    }

    #[test]
    fn id_params_bind_only_the_id() {
        assert_eq!(
            RecordIdParams { id: 11 }.bind(),
            vec![ProcParam::input("Id", 11_i64)]
        );
    }
}
