//! Connection pool management.
//!
//! This module owns the lifecycle of the single shared SQL Server connection
//! pool. The pool is created lazily on the first tool invocation and reused
//! by every subsequent call in the process.

use crate::config::ConnectionSettings;
use crate::error::{DbError, DbResult};
use bb8::Pool;
use tiberius::{AuthMethod, Config as TdsConfig, EncryptionLevel};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// The shared connection pool type.
pub type MssqlPool = Pool<bb8_tiberius::ConnectionManager>;

/// Manages the single lazily-initialized connection pool.
///
/// `ensure_connected` is idempotent and safe to call before every tool
/// dispatch: the first caller opens the pool, concurrent callers wait on the
/// init lock and observe the cached handle, and a failed attempt leaves the
/// slot empty so the next call retries from scratch.
pub struct ConnectionManager {
    settings: ConnectionSettings,
    pool: Mutex<Option<MssqlPool>>,
}

impl ConnectionManager {
    /// Create a new connection manager. No connection is opened yet.
    pub fn new(settings: ConnectionSettings) -> Self {
        Self {
            settings,
            pool: Mutex::new(None),
        }
    }

    /// Get the shared pool, opening it on first use.
    pub async fn ensure_connected(&self) -> DbResult<MssqlPool> {
        let mut slot = self.pool.lock().await;
        if let Some(pool) = slot.as_ref() {
            return Ok(pool.clone());
        }

        info!(
            server = %self.settings.server,
            port = self.settings.port,
            database = %self.settings.database,
            "Connecting to SQL Server"
        );

        let pool = self.open_pool().await?;
        let server_version = Self::probe(&pool).await?;

        info!(server_version = ?server_version, "Connected successfully");

        *slot = Some(pool.clone());
        Ok(pool)
    }

    /// Whether a pool is currently cached.
    pub async fn is_connected(&self) -> bool {
        self.pool.lock().await.is_some()
    }

    /// Close the shared pool, releasing all pooled connections.
    ///
    /// Idempotent; safe to call even if never connected.
    pub async fn shutdown(&self) {
        let mut slot = self.pool.lock().await;
        if slot.take().is_some() {
            info!("Closed SQL Server connection pool");
        }
    }

    /// Build the pool from the configured settings.
    async fn open_pool(&self) -> DbResult<MssqlPool> {
        let mut config = TdsConfig::new();
        config.host(&self.settings.server);
        config.port(self.settings.port);
        config.database(&self.settings.database);
        config.authentication(AuthMethod::sql_server(
            &self.settings.user,
            &self.settings.password,
        ));
        config.encryption(if self.settings.encrypt {
            EncryptionLevel::Required
        } else {
            EncryptionLevel::NotSupported
        });
        if self.settings.trust_server_certificate {
            config.trust_cert();
        }

        let manager = bb8_tiberius::ConnectionManager::build(config).map_err(|e| {
            DbError::connection(
                format!("Invalid connection configuration: {}", e),
                "Check the server host, port, user, and database settings",
            )
        })?;

        Pool::builder()
            .max_size(self.settings.pool.max_size)
            .min_idle(Some(0))
            .idle_timeout(Some(self.settings.pool.idle_timeout()))
            .connection_timeout(self.settings.pool.connect_timeout())
            .build(manager)
            .await
            .map_err(|e| {
                DbError::connection(
                    format!("Failed to build connection pool: {}", e),
                    connection_suggestion(&e.to_string()),
                )
            })
    }

    /// Check out one connection and read the server version, so that bad
    /// credentials or an unreachable host surface here instead of at the
    /// first query.
    async fn probe(pool: &MssqlPool) -> DbResult<Option<String>> {
        let mut conn = pool.get().await.map_err(|e| match DbError::from(e) {
            DbError::Connection {
                message,
                suggestion: _,
            } => DbError::connection(message.clone(), connection_suggestion(&message)),
            other => other,
        })?;

        let version = match conn.simple_query("SELECT @@VERSION").await {
            Ok(stream) => match stream.into_first_result().await {
                Ok(rows) => rows
                    .first()
                    .and_then(|row| row.try_get::<&str, _>(0).ok().flatten())
                    .map(str::to_string),
                Err(e) => {
                    warn!(error = %e, "Failed to read server version");
                    None
                }
            },
            Err(e) => {
                return Err(DbError::connection(
                    format!("Connection probe failed: {}", e),
                    "Verify the credentials and database name",
                ));
            }
        };

        Ok(version)
    }
}

/// Generate a helpful suggestion for connection errors.
fn connection_suggestion(error: &str) -> String {
    let lower = error.to_lowercase();

    if lower.contains("connection refused") || lower.contains("timed out") {
        return "Check that the SQL Server instance is running and accessible".to_string();
    }
    if lower.contains("login failed") || lower.contains("authentication") {
        return "Verify the user name and password".to_string();
    }
    if lower.contains("cannot open database") {
        return "Check that the database name exists and the login has access".to_string();
    }
    if lower.contains("tls") || lower.contains("ssl") || lower.contains("certificate") {
        return "Check TLS settings; --trust-server-certificate may be needed for self-signed certificates".to_string();
    }

    "Verify the server host, port, credentials, and database name".to_string()
}
