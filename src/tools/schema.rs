//! Catalog tools: table listing, column description, sampling, name search.
//!
//! Every scalar argument is bound as a query parameter. Schema and table
//! names destined for statement text go through `quote_identifier` first,
//! since T-SQL cannot parameter-bind identifiers.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tiberius::Row;
use tracing::{debug, info};

use crate::db::{ConnectionManager, row_to_json, rows_to_json};
use crate::error::{DbError, DbResult};
use crate::models::{ColumnDescriptor, TableEntry};
use crate::tools::guard::quote_identifier;

/// Schema used when the caller does not name one.
pub const DEFAULT_SCHEMA: &str = "dbo";

/// Default and maximum row counts for `get_sample_data`.
pub const DEFAULT_SAMPLE_LIMIT: i32 = 10;
pub const MAX_SAMPLE_LIMIT: i32 = 1000;

const LIST_TABLES_SQL: &str = "SELECT TABLE_SCHEMA, TABLE_NAME, TABLE_TYPE \
     FROM INFORMATION_SCHEMA.TABLES \
     WHERE TABLE_TYPE = 'BASE TABLE' \
     ORDER BY TABLE_SCHEMA, TABLE_NAME";

const DESCRIBE_TABLE_SQL: &str = "SELECT COLUMN_NAME, DATA_TYPE, IS_NULLABLE, COLUMN_DEFAULT, \
            CHARACTER_MAXIMUM_LENGTH, NUMERIC_PRECISION, NUMERIC_SCALE, ORDINAL_POSITION \
     FROM INFORMATION_SCHEMA.COLUMNS \
     WHERE TABLE_NAME = @P1 AND TABLE_SCHEMA = @P2 \
     ORDER BY ORDINAL_POSITION";

const SEARCH_TABLES_SQL: &str = "SELECT TABLE_SCHEMA, TABLE_NAME, TABLE_TYPE \
     FROM INFORMATION_SCHEMA.TABLES \
     WHERE TABLE_TYPE = 'BASE TABLE' AND TABLE_NAME LIKE @P1 \
     ORDER BY TABLE_SCHEMA, TABLE_NAME";

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DescribeTableInput {
    /// Name of the table to describe.
    pub table_name: String,
    /// Schema the table belongs to. Defaults to dbo.
    #[serde(default)]
    pub schema_name: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SampleDataInput {
    /// Name of the table to sample.
    pub table_name: String,
    /// Schema the table belongs to. Defaults to dbo.
    #[serde(default)]
    pub schema_name: Option<String>,
    /// Maximum number of rows to return (1-1000). Defaults to 10.
    #[serde(default)]
    pub limit: Option<i32>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchTablesInput {
    /// Substring to match against table names.
    pub search_term: String,
}

#[derive(Debug, Serialize)]
pub struct DescribeTableOutput {
    pub schema: String,
    pub table: String,
    pub columns: Vec<ColumnDescriptor>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleDataOutput {
    pub schema: String,
    pub table: String,
    pub sample_size: usize,
    pub data: Vec<Map<String, JsonValue>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchTablesOutput {
    pub search_term: String,
    pub matches: Vec<TableEntry>,
    pub total_matches: usize,
}

/// Serves the four catalog-backed tools.
#[derive(Clone)]
pub struct SchemaToolHandler {
    connection_manager: Arc<ConnectionManager>,
}

impl SchemaToolHandler {
    pub fn new(connection_manager: Arc<ConnectionManager>) -> Self {
        Self { connection_manager }
    }

    /// List every base table in the database, ordered by schema then name.
    pub async fn list_tables(&self) -> DbResult<Vec<TableEntry>> {
        let pool = self.connection_manager.ensure_connected().await?;
        let mut conn = pool.get().await?;

        let rows = conn
            .simple_query(LIST_TABLES_SQL)
            .await?
            .into_first_result()
            .await?;

        let tables: Vec<TableEntry> = rows
            .iter()
            .map(typed_row::<TableEntry>)
            .collect::<DbResult<_>>()?;

        info!(total = tables.len(), "Listed tables");
        Ok(tables)
    }

    /// Describe the columns of one table. Zero matching columns means the
    /// table does not exist and is reported as a caller error.
    pub async fn describe_table(&self, input: DescribeTableInput) -> DbResult<DescribeTableOutput> {
        let table = required_name(&input.table_name, "table_name")?;
        let schema = input
            .schema_name
            .as_deref()
            .map(|s| required_name(s, "schema_name"))
            .transpose()?
            .unwrap_or_else(|| DEFAULT_SCHEMA.to_string());

        let pool = self.connection_manager.ensure_connected().await?;
        let mut conn = pool.get().await?;

        let rows = conn
            .query(DESCRIBE_TABLE_SQL, &[&table, &schema])
            .await?
            .into_first_result()
            .await?;

        if rows.is_empty() {
            return Err(DbError::invalid_input(format!(
                "Table [{schema}].[{table}] not found"
            )));
        }

        let columns: Vec<ColumnDescriptor> = rows
            .iter()
            .map(typed_row::<ColumnDescriptor>)
            .collect::<DbResult<_>>()?;

        debug!(schema = %schema, table = %table, columns = columns.len(), "Described table");
        Ok(DescribeTableOutput {
            schema,
            table,
            columns,
        })
    }

    /// Fetch up to `limit` rows from a table.
    ///
    /// There is no existence pre-check here; a missing table surfaces as the
    /// database's own error.
    pub async fn get_sample_data(&self, input: SampleDataInput) -> DbResult<SampleDataOutput> {
        let table = required_name(&input.table_name, "table_name")?;
        let schema = input
            .schema_name
            .as_deref()
            .map(|s| required_name(s, "schema_name"))
            .transpose()?
            .unwrap_or_else(|| DEFAULT_SCHEMA.to_string());
        let limit = input
            .limit
            .unwrap_or(DEFAULT_SAMPLE_LIMIT)
            .clamp(1, MAX_SAMPLE_LIMIT);

        let quoted_schema = quote_identifier(&schema)?;
        let quoted_table = quote_identifier(&table)?;
        let sql = format!("SELECT TOP (@P1) * FROM {quoted_schema}.{quoted_table}");

        let pool = self.connection_manager.ensure_connected().await?;
        let mut conn = pool.get().await?;

        let rows = conn.query(sql, &[&limit]).await?.into_first_result().await?;
        let data = rows_to_json(&rows)?;
        let sample_size = data.len();

        info!(schema = %schema, table = %table, sample_size, "Sampled table");
        Ok(SampleDataOutput {
            schema,
            table,
            sample_size,
            data,
        })
    }

    /// Search base-table names for a substring.
    pub async fn search_tables(&self, input: SearchTablesInput) -> DbResult<SearchTablesOutput> {
        let term = input.search_term.trim();
        if term.is_empty() {
            return Err(DbError::invalid_input("search_term must not be empty"));
        }

        let pattern = format!("%{term}%");

        let pool = self.connection_manager.ensure_connected().await?;
        let mut conn = pool.get().await?;

        let rows = conn
            .query(SEARCH_TABLES_SQL, &[&pattern])
            .await?
            .into_first_result()
            .await?;

        let matches: Vec<TableEntry> = rows
            .iter()
            .map(typed_row::<TableEntry>)
            .collect::<DbResult<_>>()?;
        let total_matches = matches.len();

        info!(term = %term, total_matches, "Searched tables");
        Ok(SearchTablesOutput {
            search_term: term.to_string(),
            matches,
            total_matches,
        })
    }
}

/// Validate a required name argument, returning its trimmed form.
fn required_name(raw: &str, field: &str) -> DbResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DbError::invalid_input(format!(
            "{field} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Deserialize a catalog row into its typed shape.
fn typed_row<T: serde::de::DeserializeOwned>(row: &Row) -> DbResult<T> {
    let object = row_to_json(row)?;
    serde_json::from_value(JsonValue::Object(object))
        .map_err(|e| DbError::internal(format!("Unexpected catalog row shape: {e}")))
}
