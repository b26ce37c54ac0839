//! Integration tests for the connection manager lifecycle.
//!
//! No live SQL Server is required: these tests exercise the lazy
//! initialization and shutdown paths against an unreachable endpoint.

use mssql_mcp_server::config::{ConnectionSettings, PoolOptions};
use mssql_mcp_server::db::ConnectionManager;
use mssql_mcp_server::error::DbError;
use std::sync::Arc;

fn unreachable_settings() -> ConnectionSettings {
    ConnectionSettings {
        // Port 1 on localhost refuses connections immediately
        server: "127.0.0.1".to_string(),
        port: 1,
        database: "master".to_string(),
        user: "sa".to_string(),
        password: "irrelevant".to_string(),
        encrypt: false,
        trust_server_certificate: true,
        pool: PoolOptions {
            max_size: 2,
            idle_timeout_secs: 30,
            connect_timeout_secs: 1,
        },
    }
}

#[tokio::test]
async fn test_not_connected_before_first_use() {
    let manager = ConnectionManager::new(unreachable_settings());
    assert!(!manager.is_connected().await);
}

#[tokio::test]
async fn test_connect_failure_is_connection_error() {
    let manager = ConnectionManager::new(unreachable_settings());
    let err = manager.ensure_connected().await.unwrap_err();
    assert!(
        matches!(err, DbError::Connection { .. }),
        "expected Connection error, got: {:?}",
        err
    );
}

#[tokio::test]
async fn test_failed_connect_leaves_manager_unconnected() {
    let manager = ConnectionManager::new(unreachable_settings());
    let _ = manager.ensure_connected().await;
    // The failed attempt must not cache a broken handle
    assert!(!manager.is_connected().await);
}

#[tokio::test]
async fn test_failed_connect_can_be_retried() {
    let manager = ConnectionManager::new(unreachable_settings());
    assert!(manager.ensure_connected().await.is_err());
    // A second call attempts a fresh connection instead of returning a
    // poisoned state
    assert!(manager.ensure_connected().await.is_err());
}

#[tokio::test]
async fn test_shutdown_is_idempotent() {
    let manager = ConnectionManager::new(unreachable_settings());
    manager.shutdown().await;
    manager.shutdown().await;
    assert!(!manager.is_connected().await);
}

#[tokio::test]
async fn test_connection_error_carries_suggestion() {
    let manager = ConnectionManager::new(unreachable_settings());
    let err = manager.ensure_connected().await.unwrap_err();
    assert!(err.suggestion().is_some());
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_manager_is_shareable_across_tasks() {
    let manager = Arc::new(ConnectionManager::new(unreachable_settings()));
    let mut handles = Vec::new();
    for _ in 0..4 {
        let manager = manager.clone();
        handles.push(tokio::spawn(
            async move { manager.ensure_connected().await },
        ));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_err());
    }
    assert!(!manager.is_connected().await);
}
