use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use keyspring_core::config::{self, Config};

fn unique_path(tag: &str) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("keyspring-config-{tag}-{unique}.toml"))
}

#[test]
fn defaults_are_valid_and_live_under_app_data() {
    let cfg = Config::default();

    assert_eq!(cfg.hotkey, "Ctrl+Alt+O");
    assert!(cfg
        .registry_path
        .to_string_lossy()
        .to_ascii_lowercase()
        .contains("keyspring"));
    assert!(cfg
        .config_path
        .to_string_lossy()
        .to_ascii_lowercase()
        .contains("keyspring"));
    assert!(config::validate(&cfg).is_ok());
}

#[test]
fn rejects_unparseable_hotkey() {
    let cfg = Config {
        hotkey: "O".to_string(),
        ..Default::default()
    };
    assert!(config::validate(&cfg).is_err());
}

#[test]
fn rejects_empty_backend_program() {
    let cfg = Config {
        backend_program: "  ".to_string(),
        ..Default::default()
    };
    assert!(config::validate(&cfg).is_err());
}

#[test]
fn save_then_load_round_trips() {
    let cfg = Config {
        hotkey: "Ctrl+Shift+P".to_string(),
        backend_program: "other-ranker".to_string(),
        channel_name: "other-channel".to_string(),
        registry_path: PathBuf::from("/tmp/keyspring-other-commands.toml"),
        config_path: unique_path("roundtrip"),
        launch_at_startup: true,
    };

    config::save(&cfg).unwrap();
    let loaded = config::load(Some(cfg.config_path.clone())).unwrap();

    assert_eq!(loaded, cfg);

    std::fs::remove_file(cfg.config_path).unwrap();
}

#[test]
fn sparse_document_keeps_defaults_for_missing_fields() {
    let path = unique_path("sparse");
    std::fs::write(&path, "hotkey = \"Ctrl+Shift+P\"\n").unwrap();

    let loaded = config::load(Some(path.clone())).unwrap();

    assert_eq!(loaded.hotkey, "Ctrl+Shift+P");
    assert_eq!(loaded.backend_program, config::DEFAULT_BACKEND_PROGRAM);
    assert_eq!(loaded.channel_name, config::DEFAULT_CHANNEL_NAME);

    std::fs::remove_file(path).unwrap();
}

#[test]
fn unknown_keys_are_ignored() {
    let path = unique_path("unknown");
    std::fs::write(&path, "whatever = 3\nhotkey = \"Alt+Space\"\n").unwrap();

    let loaded = config::load(Some(path.clone())).unwrap();
    assert_eq!(loaded.hotkey, "Alt+Space");

    std::fs::remove_file(path).unwrap();
}

#[test]
fn malformed_document_is_a_parse_error() {
    let path = unique_path("malformed");
    std::fs::write(&path, "hotkey = [broken").unwrap();

    assert!(config::load(Some(path.clone())).is_err());

    std::fs::remove_file(path).unwrap();
}

#[test]
fn missing_document_loads_defaults() {
    let path = unique_path("missing");
    let loaded = config::load(Some(path.clone())).unwrap();

    assert_eq!(loaded.hotkey, config::DEFAULT_HOTKEY);
    assert_eq!(loaded.config_path, path);
}
