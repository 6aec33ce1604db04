use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::log::NewLogRecord;

pub const REQUIRED_FIELDS: [&str; 4] = ["timestamp", "service", "severity", "message"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordRejection {
    #[error("log entry is not a JSON object")]
    NotAnObject,

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{0}` must be a scalar value")]
    UnsupportedValue(&'static str),
}

pub fn validate_record(candidate: &Value) -> Result<NewLogRecord, RecordRejection> {
    let Value::Object(fields) = candidate else {
        return Err(RecordRejection::NotAnObject);
    };

    Ok(NewLogRecord {
        timestamp: required_text(fields, "timestamp")?,
        service: required_text(fields, "service")?,
        severity: required_text(fields, "severity")?,
        message: required_text(fields, "message")?,
    })
}

fn required_text(fields: &Map<String, Value>, key: &'static str) -> Result<String, RecordRejection> {
    match fields.get(key) {
        None | Some(Value::Null) => Err(RecordRejection::MissingField(key)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => Ok(v.to_string()),
        Some(Value::Array(_) | Value::Object(_)) => Err(RecordRejection::UnsupportedValue(key)),
    }
}
