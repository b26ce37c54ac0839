//! Catalog row shapes.
//!
//! Both types deserialize directly from INFORMATION_SCHEMA rows and
//! serialize back out under the same uppercase column names, so callers see
//! exactly what the catalog reports.

use serde::{Deserialize, Serialize};

/// One entry from INFORMATION_SCHEMA.TABLES.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableEntry {
    #[serde(rename = "TABLE_SCHEMA")]
    pub schema: String,
    #[serde(rename = "TABLE_NAME")]
    pub name: String,
    #[serde(rename = "TABLE_TYPE")]
    pub table_type: String,
}

/// One entry from INFORMATION_SCHEMA.COLUMNS.
///
/// The sizing fields are nullable in the catalog: length applies only to
/// character types, precision and scale only to numeric types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ColumnDescriptor {
    #[serde(rename = "COLUMN_NAME")]
    pub name: String,
    #[serde(rename = "DATA_TYPE")]
    pub data_type: String,
    #[serde(rename = "IS_NULLABLE")]
    pub is_nullable: String,
    #[serde(rename = "COLUMN_DEFAULT")]
    pub default: Option<String>,
    #[serde(rename = "CHARACTER_MAXIMUM_LENGTH")]
    pub character_maximum_length: Option<i64>,
    #[serde(rename = "NUMERIC_PRECISION")]
    pub numeric_precision: Option<i64>,
    #[serde(rename = "NUMERIC_SCALE")]
    pub numeric_scale: Option<i64>,
    #[serde(rename = "ORDINAL_POSITION")]
    pub ordinal_position: i64,
}
