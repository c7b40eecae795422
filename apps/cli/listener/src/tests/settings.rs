// Unit tests for config loading in the binary

use crate::settings::load_with;

use std::fs;

use tempfile::TempDir;

/// **VALUE**: Verifies that overrides are applied on top of the file.
#[test]
fn given_file_and_overrides_when_loaded_then_overrides_win() {
    // GIVEN: A config file
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("listener.toml");
    fs::write(&path, "[connection]\nhost = \"10.0.0.1\"\nport = 13000\n").unwrap();

    // WHEN: Loaded with a host override
    let config = load_with(&path, |config| {
        config.connection.host = "10.0.0.2".to_string();
    })
    .unwrap();

    // THEN: Override wins, the file's port stays
    assert_eq!(config.connection.host, "10.0.0.2");
    assert_eq!(config.connection.port, 13000);
}

/// **VALUE**: Verifies that an override cannot smuggle in an invalid config.
///
/// **BUG THIS CATCHES**: Would catch validation running only on the file contents.
#[test]
fn given_override_breaks_config_when_loaded_then_core_error() {
    // GIVEN: No file (defaults)
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.toml");

    // WHEN: An override empties the host
    let result = load_with(&path, |config| config.connection.host.clear());

    // THEN: Rejected
    let err = result.expect_err("empty host should be rejected");
    assert!(err.to_string().starts_with("Core Error:"), "{err}");
}

#[test]
fn given_corrupt_file_when_loaded_then_core_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("listener.toml");
    fs::write(&path, "port = = 1").unwrap();

    let err = load_with(&path, |_| {}).expect_err("corrupt file");
    assert!(err.to_string().contains("Failed to load config"), "{err}");
}
