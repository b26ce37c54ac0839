//! Integration tests for configuration parsing.

use clap::Parser;
use mssql_mcp_server::config::{Config, TransportMode};

fn parse(args: &[&str]) -> Config {
    let mut full = vec!["mssql-mcp-server"];
    full.extend_from_slice(args);
    Config::try_parse_from(full).expect("config should parse")
}

fn base_args() -> Vec<&'static str> {
    vec![
        "--server",
        "db.example.com",
        "--database",
        "Northwind",
        "--user",
        "reader",
        "--password",
        "hunter2",
    ]
}

#[test]
fn test_minimal_config_uses_defaults() {
    let config = parse(&base_args());
    assert_eq!(config.server, "db.example.com");
    assert_eq!(config.port, 1433);
    assert_eq!(config.transport, TransportMode::Stdio);
    assert_eq!(config.pool_max_size, 10);
    assert!(!config.encrypt);
    assert!(config.auth_tokens.is_empty());
}

#[test]
fn test_connection_settings_carry_pool_options() {
    let mut args = base_args();
    args.extend_from_slice(&["--pool-max-size", "5", "--connect-timeout", "10"]);
    let config = parse(&args);

    let settings = config.connection_settings().unwrap();
    assert_eq!(settings.pool.max_size, 5);
    assert_eq!(settings.pool.connect_timeout_secs, 10);
    assert_eq!(settings.database, "Northwind");
}

#[test]
fn test_http_transport_options() {
    let mut args = base_args();
    args.extend_from_slice(&[
        "--transport",
        "http",
        "--http-host",
        "0.0.0.0",
        "--http-port",
        "9000",
        "--mcp-endpoint",
        "/api/mcp",
    ]);
    let config = parse(&args);

    assert_eq!(config.transport, TransportMode::Http);
    assert_eq!(config.http_bind_addr(), "0.0.0.0:9000");
    assert_eq!(config.mcp_endpoint, "/api/mcp");
}

#[test]
fn test_auth_tokens_split_on_comma() {
    let mut args = base_args();
    args.extend_from_slice(&["--auth-token", "alpha,beta"]);
    let config = parse(&args);
    assert_eq!(config.auth_tokens, vec!["alpha", "beta"]);
}

#[test]
fn test_encrypt_and_trust_flags() {
    let mut args = base_args();
    args.extend_from_slice(&["--encrypt", "--trust-server-certificate"]);
    let config = parse(&args);

    let settings = config.connection_settings().unwrap();
    assert!(settings.encrypt);
    assert!(settings.trust_server_certificate);
}

#[test]
fn test_missing_required_args_fail() {
    let result = Config::try_parse_from(["mssql-mcp-server", "--server", "host-only"]);
    assert!(result.is_err());
}
