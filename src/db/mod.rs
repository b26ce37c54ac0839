//! Database access layer.
//!
//! This module provides database access functionality:
//! - Lifecycle of the single shared connection pool
//! - Conversion of driver rows into JSON documents

pub mod pool;
pub mod rows;

pub use pool::{ConnectionManager, MssqlPool};
pub use rows::{row_to_json, rows_to_json};
