//! Configuration handling for the MSSQL MCP Server.
//!
//! This module provides configuration management via CLI arguments and environment variables.

use clap::{Parser, ValueEnum};
use std::time::Duration;

pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_MCP_ENDPOINT: &str = "/";
pub const DEFAULT_SQL_PORT: u16 = 1433;

// Pool configuration defaults
pub const DEFAULT_POOL_MAX_SIZE: u32 = 10;
pub const DEFAULT_POOL_IDLE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Transport mode for the MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransportMode {
    /// Standard input/output (for CLI integration)
    #[default]
    Stdio,
    /// HTTP with Server-Sent Events (for web clients)
    Http,
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Connection pool policy for the shared SQL Server handle.
///
/// The pool is bounded, keeps no idle minimum, and evicts idle connections
/// after a fixed timeout.
#[derive(Debug, Clone)]
pub struct PoolOptions {
    /// Maximum connections in the pool
    pub max_size: u32,
    /// Idle eviction timeout in seconds
    pub idle_timeout_secs: u64,
    /// Connection acquire/establish timeout in seconds
    pub connect_timeout_secs: u64,
}

impl PoolOptions {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Validate pool options and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_size == 0 {
            return Err("pool max size must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_POOL_MAX_SIZE,
            idle_timeout_secs: DEFAULT_POOL_IDLE_TIMEOUT_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

/// Everything needed to open the shared connection pool.
///
/// The password is deliberately excluded from Debug output and never logged.
#[derive(Clone)]
pub struct ConnectionSettings {
    pub server: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub encrypt: bool,
    pub trust_server_certificate: bool,
    pub pool: PoolOptions,
}

impl std::fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"***")
            .field("encrypt", &self.encrypt)
            .field("trust_server_certificate", &self.trust_server_certificate)
            .field("pool", &self.pool)
            .finish()
    }
}

/// Configuration for the MSSQL MCP Server.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "mssql-mcp-server",
    about = "MCP server for Microsoft SQL Server - enables AI assistants to explore and query a database read-only",
    version,
    author
)]
pub struct Config {
    /// SQL Server host name or IP address
    #[arg(long, value_name = "HOST", env = "MSSQL_SERVER")]
    pub server: String,

    /// SQL Server TCP port
    #[arg(long, default_value_t = DEFAULT_SQL_PORT, env = "MSSQL_PORT")]
    pub port: u16,

    /// Database to connect to
    #[arg(long, value_name = "NAME", env = "MSSQL_DATABASE")]
    pub database: String,

    /// SQL login user name
    #[arg(long, value_name = "USER", env = "MSSQL_USER")]
    pub user: String,

    /// SQL login password
    #[arg(long, value_name = "PASSWORD", env = "MSSQL_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Require an encrypted connection to the server
    #[arg(long, env = "MSSQL_ENCRYPT")]
    pub encrypt: bool,

    /// Accept the server TLS certificate without validation
    #[arg(long, env = "MSSQL_TRUST_SERVER_CERT")]
    pub trust_server_certificate: bool,

    /// Maximum connections in the pool
    #[arg(
        long,
        default_value_t = DEFAULT_POOL_MAX_SIZE,
        env = "MSSQL_POOL_MAX"
    )]
    pub pool_max_size: u32,

    /// Idle connection eviction timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_POOL_IDLE_TIMEOUT_SECS,
        env = "MSSQL_POOL_IDLE_TIMEOUT"
    )]
    pub pool_idle_timeout: u64,

    /// Connection timeout in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS,
        env = "MSSQL_CONNECT_TIMEOUT"
    )]
    pub connect_timeout: u64,

    /// Transport mode (stdio or http)
    #[arg(
        short,
        long,
        value_enum,
        default_value = "stdio",
        env = "MCP_TRANSPORT"
    )]
    pub transport: TransportMode,

    /// HTTP host to bind to (only used with http transport)
    #[arg(long, default_value = DEFAULT_HTTP_HOST, env = "MCP_HTTP_HOST")]
    pub http_host: String,

    /// HTTP port to bind to (only used with http transport)
    #[arg(long, default_value_t = DEFAULT_HTTP_PORT, env = "MCP_HTTP_PORT")]
    pub http_port: u16,

    /// MCP endpoint path (only used with http transport)
    #[arg(long, default_value = DEFAULT_MCP_ENDPOINT, env = "MCP_ENDPOINT")]
    pub mcp_endpoint: String,

    /// Authentication tokens for HTTP transport.
    /// Can be specified multiple times or as comma-separated values.
    /// When set, all HTTP requests must include a valid Bearer token.
    #[arg(
        long = "auth-token",
        value_name = "TOKEN",
        env = "MCP_AUTH_TOKENS",
        value_delimiter = ','
    )]
    pub auth_tokens: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "MCP_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "MCP_JSON_LOGS")]
    pub json_logs: bool,
}

impl Config {
    /// Build the connection settings for the shared pool.
    pub fn connection_settings(&self) -> Result<ConnectionSettings, String> {
        if self.server.trim().is_empty() {
            return Err("SQL Server host must not be empty".to_string());
        }
        if self.database.trim().is_empty() {
            return Err("Database name must not be empty".to_string());
        }

        let pool = PoolOptions {
            max_size: self.pool_max_size,
            idle_timeout_secs: self.pool_idle_timeout,
            connect_timeout_secs: self.connect_timeout,
        };
        pool.validate()?;

        Ok(ConnectionSettings {
            server: self.server.trim().to_string(),
            port: self.port,
            database: self.database.trim().to_string(),
            user: self.user.clone(),
            password: self.password.clone(),
            encrypt: self.encrypt,
            trust_server_certificate: self.trust_server_certificate,
            pool,
        })
    }

    /// Get the HTTP bind address.
    pub fn http_bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }

    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            server: "localhost".to_string(),
            port: DEFAULT_SQL_PORT,
            database: "master".to_string(),
            user: "sa".to_string(),
            password: String::new(),
            encrypt: false,
            trust_server_certificate: false,
            pool_max_size: DEFAULT_POOL_MAX_SIZE,
            pool_idle_timeout: DEFAULT_POOL_IDLE_TIMEOUT_SECS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT_SECS,
            transport: TransportMode::Stdio,
            http_host: DEFAULT_HTTP_HOST.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            mcp_endpoint: DEFAULT_MCP_ENDPOINT.to_string(),
            auth_tokens: Vec::new(),
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
