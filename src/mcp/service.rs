//! MCP service implementation using rmcp.
//!
//! This module defines the MssqlService struct with all five database tools
//! exposed via the MCP protocol using the rmcp framework's macros. Every
//! successful call returns one text content item holding the tool's output
//! document pretty-printed as JSON.

use crate::db::ConnectionManager;
use crate::error::DbError;
use crate::tools::query::{ExecuteQueryInput, QueryToolHandler};
use crate::tools::schema::{
    DescribeTableInput, SampleDataInput, SchemaToolHandler, SearchTablesInput,
};
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::tool::{ToolCallContext, ToolRouter},
    handler::server::wrapper::Parameters,
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, tool_router,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub struct MssqlService {
    /// Shared connection manager for all database operations
    connection_manager: Arc<ConnectionManager>,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl MssqlService {
    pub fn new(connection_manager: Arc<ConnectionManager>) -> Self {
        Self {
            connection_manager,
            tool_router: Self::tool_router(),
        }
    }

    /// Wrap a tool output document into the uniform response envelope.
    fn envelope<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
        let text = serde_json::to_string_pretty(output).map_err(|e| {
            McpError::from(DbError::internal(format!(
                "Failed to serialize response: {e}"
            )))
        })?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

#[tool_router]
impl MssqlService {
    #[tool(
        description = "Execute a SQL query against the database.\nOnly SELECT statements are allowed. Returns rowsAffected, recordset, and totalRows."
    )]
    async fn execute_query(
        &self,
        Parameters(input): Parameters<ExecuteQueryInput>,
    ) -> Result<CallToolResult, McpError> {
        let handler = QueryToolHandler::new(self.connection_manager.clone());
        let output = handler.execute_query(input).await?;
        Self::envelope(&output)
    }

    #[tool(
        description = "List all base tables in the database.\nViews are excluded. Results are ordered by schema then table name."
    )]
    async fn list_tables(&self) -> Result<CallToolResult, McpError> {
        let handler = SchemaToolHandler::new(self.connection_manager.clone());
        let output = handler.list_tables().await?;
        Self::envelope(&output)
    }

    #[tool(
        description = "Get the column definitions of a table.\nReturns name, data type, nullability, default, and sizing for each column, in ordinal order.\nSchema defaults to dbo."
    )]
    async fn describe_table(
        &self,
        Parameters(input): Parameters<DescribeTableInput>,
    ) -> Result<CallToolResult, McpError> {
        let handler = SchemaToolHandler::new(self.connection_manager.clone());
        let output = handler.describe_table(input).await?;
        Self::envelope(&output)
    }

    #[tool(
        description = "Fetch sample rows from a table.\nReturns up to `limit` rows (default 10, maximum 1000). Schema defaults to dbo."
    )]
    async fn get_sample_data(
        &self,
        Parameters(input): Parameters<SampleDataInput>,
    ) -> Result<CallToolResult, McpError> {
        let handler = SchemaToolHandler::new(self.connection_manager.clone());
        let output = handler.get_sample_data(input).await?;
        Self::envelope(&output)
    }

    #[tool(
        description = "Search table names by substring.\nMatches base tables whose name contains the search term."
    )]
    async fn search_tables(
        &self,
        Parameters(input): Parameters<SearchTablesInput>,
    ) -> Result<CallToolResult, McpError> {
        let handler = SchemaToolHandler::new(self.connection_manager.clone());
        let output = handler.search_tables(input).await?;
        Self::envelope(&output)
    }
}

impl ServerHandler for MssqlService {
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        if !self.tool_router.has_route(request.name.as_ref()) {
            warn!(tool = %request.name, "Unknown tool requested");
            return Err(DbError::unknown_tool(request.name.as_ref()).into());
        }
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult {
            next_cursor: None,
            tools: self.tool_router.list_all(),
            meta: None,
        })
    }

    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "mssql-mcp-server".to_owned(),
                title: Some("MSSQL MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Read-only tools for exploring a Microsoft SQL Server database.\n\
                \n\
                ## Workflow\n\
                1. Call `list_tables` to see what tables exist\n\
                2. Call `describe_table` to inspect a table's columns\n\
                3. Call `get_sample_data` to preview rows, or `execute_query` for a custom SELECT\n\
                4. Use `search_tables` to find tables by name substring\n\
                \n\
                ## Notes\n\
                - Only SELECT statements are accepted by `execute_query`\n\
                - `schema_name` defaults to `dbo` where applicable\n\
                - The database connection is established lazily on first use"
                    .to_string(),
            ),
        }
    }
}
