//! Bootstrap config loading for entlink-ai

use entlink_ai::config::{load_config, ProviderId};
use entlink_ai::extraction::OffsetUnit;
use entlink_common::config::CONFIG_ENV_VAR;
use serial_test::serial;
use std::io::Write;
use std::time::Duration;

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", content).unwrap();
    file
}

#[test]
#[serial]
fn test_cli_path_is_loaded() {
    let file = write_config(
        r#"
[server]
port = 6000

[tagger]
offsets = "bytes"

[providers.nominatim]
min_interval_ms = 1500
"#,
    );

    let config = load_config(Some(file.path())).unwrap();
    assert_eq!(config.server.port, 6000);
    assert_eq!(config.tagger.offsets, OffsetUnit::Bytes);
    assert_eq!(
        config.providers.settings(ProviderId::Nominatim).min_interval,
        Duration::from_millis(1500)
    );
    assert_eq!(config.cache.capacity, 32);
}

#[test]
#[serial]
fn test_env_var_path_is_loaded() {
    let file = write_config("[linking]\nlanguage = \"fr\"\n");
    std::env::set_var(CONFIG_ENV_VAR, file.path());

    let config = load_config(None).unwrap();
    assert_eq!(config.linking.language, "fr");
    assert!(config.linking.enable_mirror);

    std::env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_missing_file_falls_back_to_defaults() {
    let config = load_config(Some(std::path::Path::new("/nonexistent/entlink.toml"))).unwrap();
    assert_eq!(config.server.port, 5730);
    assert_eq!(config.tagger.endpoint, "http://127.0.0.1:5731/tag");
}

#[test]
#[serial]
fn test_malformed_file_is_an_error() {
    let file = write_config("[server\nport = ");
    assert!(load_config(Some(file.path())).is_err());
}
