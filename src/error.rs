//! Error types for the MSSQL MCP Server.
//!
//! This module defines all error types using `thiserror` for ergonomic error handling.
//! Each error variant provides actionable messages to help AI assistants understand
//! and recover from error conditions.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Query execution failed: {message}")]
    Execution {
        message: String,
        /// SQL Server error number (e.g., 208 for invalid object name)
        code: Option<u32>,
    },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create an execution error with an optional server error number.
    pub fn execution(message: impl Into<String>, code: Option<u32>) -> Self {
        Self::Execution {
            message: message.into(),
            code,
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create an unknown tool error.
    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool { name: name.into() }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            _ => None,
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection { .. })
    }
}

/// Convert tiberius driver errors to DbError.
///
/// Server errors (the database accepted the request but execution failed) become
/// `Execution` with the server error number; transport-level failures become
/// `Connection` so the caller knows the handle, not the query, is at fault.
impl From<tiberius::error::Error> for DbError {
    fn from(err: tiberius::error::Error) -> Self {
        use tiberius::error::Error;
        match err {
            Error::Server(token) => {
                DbError::execution(token.message().to_string(), Some(token.code()))
            }
            Error::Io { .. } => DbError::connection(
                err.to_string(),
                "Check network connectivity and database server status",
            ),
            Error::Tls(_) => DbError::connection(
                err.to_string(),
                "Verify TLS configuration or set --trust-server-certificate",
            ),
            other => DbError::execution(other.to_string(), None),
        }
    }
}

/// Convert pool checkout errors to DbError.
impl From<bb8::RunError<bb8_tiberius::Error>> for DbError {
    fn from(err: bb8::RunError<bb8_tiberius::Error>) -> Self {
        match err {
            bb8::RunError::User(e) => DbError::connection(
                e.to_string(),
                "Check the server address, credentials, and database name",
            ),
            bb8::RunError::TimedOut => DbError::connection(
                "Timed out waiting for a pooled connection",
                "Check that the SQL Server instance is reachable",
            ),
        }
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Build suggestion data as JSON value.
fn suggestion_data(suggestion: Option<&str>) -> Option<serde_json::Value> {
    suggestion.map(|s| serde_json::json!({ "suggestion": s }))
}

/// Convert DbError to MCP ErrorData for semantic error categorization.
/// Includes the suggestion field in the `data` object when available.
impl From<DbError> for rmcp::ErrorData {
    fn from(err: DbError) -> Self {
        match &err {
            // Caller errors -> invalid_params
            DbError::InvalidInput { .. } => {
                rmcp::ErrorData::invalid_params(err.to_string(), suggestion_data(err.suggestion()))
            }

            // Execution errors -> invalid_params with server error number in message
            DbError::Execution { message, code } => {
                let msg = match code {
                    Some(number) => format!("{} (error {})", message, number),
                    None => message.clone(),
                };
                rmcp::ErrorData::invalid_params(
                    msg,
                    suggestion_data(Some("Check the SQL syntax and referenced objects")),
                )
            }

            // Unknown tool -> method_not_found
            DbError::UnknownTool { .. } => rmcp::ErrorData::new(
                rmcp::model::ErrorCode::METHOD_NOT_FOUND,
                err.to_string(),
                None,
            ),

            // Connection errors -> internal_error (retryable by the caller)
            DbError::Connection { suggestion, .. } => {
                rmcp::ErrorData::internal_error(err.to_string(), suggestion_data(Some(suggestion)))
            }

            // Internal -> internal_error
            DbError::Internal { .. } => {
                rmcp::ErrorData::internal_error(err.to_string(), suggestion_data(err.suggestion()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DbError::connection("Failed to connect", "Check credentials");
        assert!(err.to_string().contains("Connection failed"));
    }

    #[test]
    fn test_error_suggestion() {
        let err = DbError::connection("Failed to connect", "Check credentials");
        assert_eq!(err.suggestion(), Some("Check credentials"));
        assert_eq!(DbError::invalid_input("bad").suggestion(), None);
    }

    #[test]
    fn test_error_retryable() {
        assert!(DbError::connection("err", "sugg").is_retryable());
        assert!(!DbError::invalid_input("bad query").is_retryable());
        assert!(!DbError::execution("syntax error", None).is_retryable());
    }

    // Tests for From<DbError> for rmcp::ErrorData

    #[test]
    fn test_invalid_input_maps_to_invalid_params() {
        let err = DbError::invalid_input("bad input");
        let mcp_err: rmcp::ErrorData = err.into();
        // invalid_params uses -32602
        assert_eq!(mcp_err.code.0, -32602);
    }

    #[test]
    fn test_execution_maps_to_invalid_params() {
        let err = DbError::execution("Invalid object name 'Foo'", Some(208));
        let mcp_err: rmcp::ErrorData = err.into();
        assert_eq!(mcp_err.code.0, -32602);
        assert!(mcp_err.message.contains("208"));
    }

    #[test]
    fn test_unknown_tool_maps_to_method_not_found() {
        let err = DbError::unknown_tool("drop_everything");
        let mcp_err: rmcp::ErrorData = err.into();
        // method_not_found uses -32601
        assert_eq!(mcp_err.code.0, -32601);
        assert!(mcp_err.message.contains("drop_everything"));
    }

    #[test]
    fn test_connection_maps_to_internal_error() {
        let err = DbError::connection("failed", "try again");
        let mcp_err: rmcp::ErrorData = err.into();
        // internal_error uses -32603
        assert_eq!(mcp_err.code.0, -32603);
    }

    #[test]
    fn test_internal_maps_to_internal_error() {
        let err = DbError::internal("unknown error");
        let mcp_err: rmcp::ErrorData = err.into();
        assert_eq!(mcp_err.code.0, -32603);
    }

    #[test]
    fn test_connection_error_includes_suggestion_in_data() {
        let err = DbError::connection("failed", "try reconnecting");
        let mcp_err: rmcp::ErrorData = err.into();
        let data = mcp_err.data.expect("suggestion data");
        assert_eq!(data["suggestion"], "try reconnecting");
    }

    #[test]
    fn test_pool_timeout_maps_to_connection() {
        let err: DbError = bb8::RunError::<bb8_tiberius::Error>::TimedOut.into();
        assert!(matches!(err, DbError::Connection { .. }));
    }
}
