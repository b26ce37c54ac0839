//! Free-form query execution (SELECT only).

use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, info};

use crate::db::{ConnectionManager, rows_to_json};
use crate::error::DbResult;
use crate::tools::guard::validate_readonly;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExecuteQueryInput {
    /// SQL query to execute. Only SELECT statements are allowed.
    pub query: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteQueryOutput {
    /// Row count per result set returned by the statement.
    pub rows_affected: Vec<u64>,
    /// Rows of the first result set as JSON objects keyed by column name.
    pub recordset: Vec<Map<String, JsonValue>>,
    /// Number of rows in the recordset.
    pub total_rows: usize,
}

/// Executes caller-supplied SELECT statements against the pool.
#[derive(Clone)]
pub struct QueryToolHandler {
    connection_manager: Arc<ConnectionManager>,
}

impl QueryToolHandler {
    pub fn new(connection_manager: Arc<ConnectionManager>) -> Self {
        Self { connection_manager }
    }

    /// Run a read-only query and return its first result set.
    pub async fn execute_query(&self, input: ExecuteQueryInput) -> DbResult<ExecuteQueryOutput> {
        validate_readonly(&input.query)?;

        debug!(query_len = input.query.len(), "Executing query");

        let pool = self.connection_manager.ensure_connected().await?;
        let mut conn = pool.get().await?;

        let result_sets = conn
            .simple_query(&input.query)
            .await?
            .into_results()
            .await?;

        let rows_affected: Vec<u64> = result_sets.iter().map(|set| set.len() as u64).collect();
        let recordset = match result_sets.first() {
            Some(rows) => rows_to_json(rows)?,
            None => Vec::new(),
        };
        let total_rows = recordset.len();

        info!(total_rows, result_sets = rows_affected.len(), "Query executed");

        Ok(ExecuteQueryOutput {
            rows_affected,
            recordset,
            total_rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_output_field_names_are_camel_case() {
        let output = ExecuteQueryOutput {
            rows_affected: vec![2],
            recordset: vec![Map::new(), Map::new()],
            total_rows: 2,
        };
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["rowsAffected"], json!([2]));
        assert_eq!(value["totalRows"], json!(2));
        assert!(value["recordset"].is_array());
    }

    #[test]
    fn test_input_deserializes_from_tool_arguments() {
        let input: ExecuteQueryInput =
            serde_json::from_value(json!({"query": "SELECT 1"})).unwrap();
        assert_eq!(input.query, "SELECT 1");
    }
}
