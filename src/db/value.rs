//! Converts result-set values to JSON using the column type the server reports.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use sqlx::mysql::MySqlRow;
use sqlx::mysql::types::MySqlTime;
use sqlx::types::Json;
use sqlx::{Column, Row, TypeInfo, ValueRef};

/// How a column's values are rendered in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Null,
    Bool,
    Signed,
    Unsigned,
    Float,
    Double,
    Date,
    Time,
    DateTime,
    Json,
    /// `BIT`, binary strings, BLOBs and spatial values: rendered as base64.
    Binary,
    /// Character data, `DECIMAL`, and anything without a closer match.
    Text,
}

impl ValueKind {
    /// Map a MySQL type name (as reported by the driver) to its JSON rendering.
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "NULL" => Self::Null,
            "BOOLEAN" => Self::Bool,
            "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" | "YEAR" => Self::Signed,
            n if n.ends_with(" UNSIGNED") => Self::Unsigned,
            "FLOAT" => Self::Float,
            "DOUBLE" => Self::Double,
            "DATE" => Self::Date,
            "TIME" => Self::Time,
            "DATETIME" | "TIMESTAMP" => Self::DateTime,
            "JSON" => Self::Json,
            "BIT" | "BINARY" | "VARBINARY" | "TINYBLOB" | "BLOB" | "MEDIUMBLOB" | "LONGBLOB"
            | "GEOMETRY" => Self::Binary,
            _ => Self::Text,
        }
    }
}

/// Materialize a row as a column-ordered JSON object.
pub fn row_to_json(row: &MySqlRow) -> Result<Map<String, Value>, sqlx::Error> {
    let mut object = Map::with_capacity(row.len());
    for column in row.columns() {
        let value = column_to_json(row, column.ordinal())?;
        object.insert(column.name().to_owned(), value);
    }
    Ok(object)
}

fn column_to_json(row: &MySqlRow, index: usize) -> Result<Value, sqlx::Error> {
    let kind = {
        let raw = row.try_get_raw(index)?;
        if raw.is_null() {
            return Ok(Value::Null);
        }
        ValueKind::from_type_name(raw.type_info().name())
    };

    // Types were already checked above; unchecked decoding lets one Rust type
    // cover every integer width.
    let value = match kind {
        ValueKind::Null => Value::Null,
        ValueKind::Bool => Value::Bool(row.try_get_unchecked::<bool, _>(index)?),
        ValueKind::Signed => Value::from(row.try_get_unchecked::<i64, _>(index)?),
        ValueKind::Unsigned => Value::from(row.try_get_unchecked::<u64, _>(index)?),
        ValueKind::Float => Value::from(f64::from(row.try_get_unchecked::<f32, _>(index)?)),
        ValueKind::Double => Value::from(row.try_get_unchecked::<f64, _>(index)?),
        // Zero dates and other values chrono rejects keep the server's text.
        ValueKind::Date => match row.try_get_unchecked::<NaiveDate, _>(index) {
            Ok(date) => Value::String(date.to_string()),
            Err(_) => text_or_base64(row, index)?,
        },
        ValueKind::DateTime => match row.try_get_unchecked::<NaiveDateTime, _>(index) {
            Ok(datetime) => Value::String(datetime.to_string()),
            Err(_) => text_or_base64(row, index)?,
        },
        // TIME is a signed duration and may exceed 24 hours.
        ValueKind::Time => match row.try_get_unchecked::<MySqlTime, _>(index) {
            Ok(time) => Value::String(time.to_string()),
            Err(_) => text_or_base64(row, index)?,
        },
        ValueKind::Json => row.try_get_unchecked::<Json<Value>, _>(index)?.0,
        ValueKind::Binary => {
            Value::String(STANDARD.encode(row.try_get_unchecked::<Vec<u8>, _>(index)?))
        }
        ValueKind::Text => text_or_base64(row, index)?,
    };
    Ok(value)
}

fn text_or_base64(row: &MySqlRow, index: usize) -> Result<Value, sqlx::Error> {
    match row.try_get_unchecked::<String, _>(index) {
        Ok(text) => Ok(Value::String(text)),
        Err(_) => {
            let bytes = row.try_get_unchecked::<Vec<u8>, _>(index)?;
            Ok(Value::String(STANDARD.encode(bytes)))
        }
    }
}
