//! TOML configuration tests

use itemqueue::app::cli::{AppConfig, ConfigError, NumberFilter};
use itemqueue::queue::api::ThreadPriority;
use std::fs;

#[test]
fn test_config_file_round_trip_through_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("itemqueue.toml");
    fs::write(
        &path,
        r#"
filter = "even"

[logging]
level = "trace"
file = "-"

[queue]
name = "from-file"
priority = "normal"
"#,
    )
    .unwrap();

    let config = AppConfig::load(Some(&path)).unwrap();
    assert_eq!(config.filter, Some(NumberFilter::Even));
    assert_eq!(config.logging.level.as_deref(), Some("trace"));
    assert_eq!(config.logging.log_file(), None);
    assert_eq!(config.queue.name.as_deref(), Some("from-file"));
    assert_eq!(config.queue.priority, ThreadPriority::Normal);
}

#[test]
fn test_unknown_keys_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("itemqueue.toml");
    fs::write(&path, "workers = 4\n").unwrap();

    let error = AppConfig::load(Some(&path)).unwrap_err();
    assert!(matches!(error, ConfigError::Parse { .. }));
    assert!(error.to_string().contains("itemqueue.toml"));
}

#[test]
fn test_invalid_priority_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("itemqueue.toml");
    fs::write(&path, "[queue]\npriority = \"urgent\"\n").unwrap();

    assert!(matches!(
        AppConfig::load(Some(&path)),
        Err(ConfigError::Parse { .. })
    ));
}
