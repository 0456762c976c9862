use msgboard_core::errors::ExErrorKind;
use msgboard_core::{BoardConfig, LoadFailurePolicy, Store};
use std::io::Write;

#[test]
fn test_config_from_file_drives_store() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "default_moderator_cap = 3").unwrap();
    writeln!(file, "password_min_length = 6").unwrap();
    writeln!(file, "load_failure_policy = \"clear_all\"").unwrap();

    let config = BoardConfig::from_file(file.path()).unwrap();
    assert_eq!(config.load_failure_policy, LoadFailurePolicy::ClearAll);

    let store = Store::with_config(config).unwrap();
    assert_eq!(store.config().default_moderator_cap, 3);
    assert_eq!(store.config().password_min_length, 6);
}

#[test]
fn test_missing_config_file_is_io_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let err = BoardConfig::from_file(&dir.path().join("absent.toml")).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Io);
}
