//! Tool implementations exposed through the MCP service.

pub mod guard;
pub mod query;
pub mod schema;

pub use query::QueryToolHandler;
pub use schema::SchemaToolHandler;
