use crate::config::env::{HOST_ENV, PORT_ENV, SECRET_ENV};
use crate::config::{ConnectionConfig, ListenerConfig, ReconnectConfig};
use crate::error::config::ConfigError;

use common::RedactedSecret;

use std::collections::HashMap;
use std::fs;

use tempfile::TempDir;

/// **VALUE**: Verifies the endpoint format, including IPv6 literals.
///
/// **BUG THIS CATCHES**: Would catch a missing `/ws` path or unbracketed IPv6 hosts
/// that fail to parse.
#[test]
fn given_host_and_port_when_url_built_then_ws_endpoint() {
    let url = |host: &str| {
        ConnectionConfig::new(host, 12001, RedactedSecret::default())
            .url()
            .expect("valid config")
            .to_string()
    };

    assert_eq!(url("192.168.1.20"), "ws://192.168.1.20:12001/ws");
    assert_eq!(url("studio-pc.local"), "ws://studio-pc.local:12001/ws");
    assert_eq!(url("::1"), "ws://[::1]:12001/ws");
}

/// **VALUE**: Verifies that unusable hosts and port 0 are rejected before connecting.
#[test]
fn given_invalid_connection_config_when_validated_then_validation_error() {
    let invalid = [
        ConnectionConfig::new("", 12001, RedactedSecret::default()),
        ConnectionConfig::new("   ", 12001, RedactedSecret::default()),
        ConnectionConfig::new("host/path", 12001, RedactedSecret::default()),
        ConnectionConfig::new("10.0.0.5", 0, RedactedSecret::default()),
    ];

    for config in invalid {
        assert!(
            matches!(config.validate(), Err(ConfigError::ValidationError { .. })),
            "{config:?} should be rejected"
        );
    }
}

/// **VALUE**: Verifies that a missing config file falls back to defaults.
///
/// **WHY THIS MATTERS**: First run has no file; the binary should still start
/// against the default local listener.
#[test]
fn given_missing_file_when_loaded_then_defaults() {
    // GIVEN: A path that does not exist
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("listener.toml");

    // WHEN: Loading
    let config = ListenerConfig::load(&path).expect("defaults");

    // THEN: Defaults
    assert_eq!(config, ListenerConfig::default());
    assert_eq!(config.connection.host, "127.0.0.1");
    assert_eq!(config.connection.port, 12001);
    assert_eq!(config.reconnect, ReconnectConfig::default());
}

/// **VALUE**: Verifies that a partial TOML file fills the rest with defaults.
#[test]
fn given_partial_toml_when_loaded_then_merged_with_defaults() {
    // GIVEN: A file that sets the host, secret, and one reconnect value
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("listener.toml");
    fs::write(
        &path,
        r#"
[connection]
host = "10.1.1.9"
secret = "pw"

[reconnect]
increment_ms = 250
"#,
    )
    .unwrap();

    // WHEN: Loading
    let config = ListenerConfig::load(&path).expect("valid file");

    // THEN: Given values kept, the rest defaulted
    assert_eq!(config.connection.host, "10.1.1.9");
    assert_eq!(config.connection.port, 12001);
    assert_eq!(config.connection.secret.expose(), "pw");
    assert_eq!(config.reconnect.increment_ms, 250);
    assert_eq!(config.reconnect.per_run_ceiling_ms, 10_000);
}

/// **VALUE**: Verifies that a corrupt or invalid file is an error, not silently defaulted.
///
/// **BUG THIS CATCHES**: Would catch a typo in the file quietly connecting somewhere else.
#[test]
fn given_corrupt_or_invalid_toml_when_loaded_then_error() {
    let dir = TempDir::new().unwrap();

    let corrupt = dir.path().join("corrupt.toml");
    fs::write(&corrupt, "[connection\nhost = ").unwrap();
    assert!(matches!(
        ListenerConfig::load(&corrupt),
        Err(ConfigError::ParseError { .. })
    ));

    let invalid = dir.path().join("invalid.toml");
    fs::write(&invalid, "[reconnect]\nincrement_ms = 0\n").unwrap();
    assert!(matches!(
        ListenerConfig::load(&invalid),
        Err(ConfigError::ValidationError { .. })
    ));
}

/// **VALUE**: Verifies environment overrides, and that a bad port is ignored.
#[test]
fn given_env_overrides_when_applied_then_replace_file_values() {
    // GIVEN: Overrides, one of them unparsable
    let vars: HashMap<&str, &str> = HashMap::from([
        (HOST_ENV, "10.2.2.2"),
        (PORT_ENV, "not-a-port"),
        (SECRET_ENV, "from-env"),
    ]);
    let mut config = ListenerConfig::default();

    // WHEN: Applying
    config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

    // THEN: Host and secret replaced, port untouched
    assert_eq!(config.connection.host, "10.2.2.2");
    assert_eq!(config.connection.port, 12001);
    assert_eq!(config.connection.secret.expose(), "from-env");

    // WHEN: A valid port override
    config.apply_overrides(|key| (key == PORT_ENV).then(|| "13000".to_string()));

    // THEN: Port replaced, the rest kept
    assert_eq!(config.connection.port, 13000);
    assert_eq!(config.connection.host, "10.2.2.2");
}
