//! Driver row to JSON conversion.
//!
//! Every tool returns its row set as JSON objects keyed by column name, so
//! all driver-specific value handling is concentrated here.
//!
//! Rendering policy:
//! - DECIMAL/NUMERIC values render as strings to preserve the exact
//!   database representation
//! - binary values render as UTF-8 text when valid, base64 otherwise
//! - date/time values render as ISO 8601 strings

use crate::error::DbResult;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::{Map, Value as JsonValue};
use tiberius::numeric::Numeric;
use tiberius::{ColumnData, FromSql, Row};

/// Convert a batch of rows into JSON objects.
pub fn rows_to_json(rows: &[Row]) -> DbResult<Vec<Map<String, JsonValue>>> {
    rows.iter().map(row_to_json).collect()
}

/// Convert one row into a JSON object keyed by column name.
pub fn row_to_json(row: &Row) -> DbResult<Map<String, JsonValue>> {
    let mut map = Map::new();
    for (column, data) in row.cells() {
        map.insert(column.name().to_string(), cell_to_json(data)?);
    }
    Ok(map)
}

/// Convert a single cell value to JSON.
fn cell_to_json(data: &ColumnData<'static>) -> DbResult<JsonValue> {
    let value = match data {
        ColumnData::U8(v) => (*v).map(|n| JsonValue::from(n as u64)),
        ColumnData::I16(v) => (*v).map(JsonValue::from),
        ColumnData::I32(v) => (*v).map(JsonValue::from),
        ColumnData::I64(v) => (*v).map(JsonValue::from),
        ColumnData::F32(v) => (*v).and_then(|n| float_to_json(n as f64)),
        ColumnData::F64(v) => (*v).and_then(float_to_json),
        ColumnData::Bit(v) => (*v).map(JsonValue::Bool),
        ColumnData::String(v) => v.as_ref().map(|s| JsonValue::String(s.to_string())),
        ColumnData::Guid(v) => (*v).map(|g| JsonValue::String(g.to_string())),
        ColumnData::Binary(v) => v.as_ref().map(|bytes| decode_binary_value(bytes)),
        ColumnData::Numeric(v) => (*v).map(|n| JsonValue::String(numeric_to_string(&n))),
        ColumnData::Xml(v) => v.as_ref().map(|xml| JsonValue::String(xml.to_string())),
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            NaiveDateTime::from_sql(data)?
                .map(|dt| JsonValue::String(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
        }
        ColumnData::Date(_) => {
            NaiveDate::from_sql(data)?.map(|d| JsonValue::String(d.format("%Y-%m-%d").to_string()))
        }
        ColumnData::Time(_) => {
            NaiveTime::from_sql(data)?.map(|t| JsonValue::String(t.format("%H:%M:%S%.f").to_string()))
        }
        ColumnData::DateTimeOffset(_) => {
            DateTime::<Utc>::from_sql(data)?.map(|dt| JsonValue::String(dt.to_rfc3339()))
        }
    };

    Ok(value.unwrap_or(JsonValue::Null))
}

/// NaN and infinity have no JSON representation; they render as null.
fn float_to_json(value: f64) -> Option<JsonValue> {
    serde_json::Number::from_f64(value).map(JsonValue::Number)
}

/// Decode binary data to JSON: UTF-8 text when valid, base64 otherwise.
fn decode_binary_value(bytes: &[u8]) -> JsonValue {
    use base64::{Engine as _, engine::general_purpose::STANDARD};

    match std::str::from_utf8(bytes) {
        Ok(s) => JsonValue::String(s.to_string()),
        Err(_) => JsonValue::String(STANDARD.encode(bytes)),
    }
}

/// Render a DECIMAL/NUMERIC value without going through floating point.
fn numeric_to_string(n: &Numeric) -> String {
    let scale = n.scale() as u32;
    let value = n.value();

    if scale == 0 {
        return value.to_string();
    }

    let sign = if value < 0 { "-" } else { "" };
    let abs = value.unsigned_abs();
    let divisor = 10u128.pow(scale);
    format!(
        "{}{}.{:0width$}",
        sign,
        abs / divisor,
        abs % divisor,
        width = scale as usize
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_cells() {
        assert_eq!(
            cell_to_json(&ColumnData::I32(Some(42))).unwrap(),
            JsonValue::from(42)
        );
        assert_eq!(
            cell_to_json(&ColumnData::I64(Some(-7))).unwrap(),
            JsonValue::from(-7)
        );
        assert_eq!(cell_to_json(&ColumnData::I32(None)).unwrap(), JsonValue::Null);
    }

    #[test]
    fn test_bit_and_string_cells() {
        assert_eq!(
            cell_to_json(&ColumnData::Bit(Some(true))).unwrap(),
            JsonValue::Bool(true)
        );
        assert_eq!(
            cell_to_json(&ColumnData::String(Some("hello".into()))).unwrap(),
            JsonValue::String("hello".to_string())
        );
    }

    #[test]
    fn test_float_cells() {
        assert_eq!(
            cell_to_json(&ColumnData::F64(Some(1.5))).unwrap(),
            JsonValue::from(1.5)
        );
        // NaN has no JSON representation
        assert_eq!(
            cell_to_json(&ColumnData::F64(Some(f64::NAN))).unwrap(),
            JsonValue::Null
        );
    }

    #[test]
    fn test_binary_cells() {
        assert_eq!(
            cell_to_json(&ColumnData::Binary(Some(b"text".to_vec().into()))).unwrap(),
            JsonValue::String("text".to_string())
        );
        // Invalid UTF-8 falls back to base64
        let value = cell_to_json(&ColumnData::Binary(Some(vec![0xff, 0xfe].into()))).unwrap();
        assert_eq!(value, JsonValue::String("//4=".to_string()));
    }

    #[test]
    fn test_numeric_to_string() {
        assert_eq!(numeric_to_string(&Numeric::new_with_scale(12345, 2)), "123.45");
        assert_eq!(numeric_to_string(&Numeric::new_with_scale(-5, 1)), "-0.5");
        assert_eq!(numeric_to_string(&Numeric::new_with_scale(7, 0)), "7");
        assert_eq!(numeric_to_string(&Numeric::new_with_scale(1, 3)), "0.001");
    }

    #[test]
    fn test_numeric_cell_renders_as_string() {
        let value = cell_to_json(&ColumnData::Numeric(Some(Numeric::new_with_scale(99, 1)))).unwrap();
        assert_eq!(value, JsonValue::String("9.9".to_string()));
    }
}
