//! Data structures shared between the catalog tools and their JSON output.

pub mod schema;

pub use schema::{ColumnDescriptor, TableEntry};
