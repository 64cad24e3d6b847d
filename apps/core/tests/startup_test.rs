use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use keyspring_core::startup::{startup_command_for_executable, StartupError};

#[test]
fn startup_command_quotes_the_executable_and_appends_background_flag() {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let path = std::env::temp_dir().join(format!("keyspring-startup-{unique}.exe"));
    std::fs::write(&path, b"bin").unwrap();

    let command = startup_command_for_executable(&path).unwrap();

    assert_eq!(
        command,
        format!("\"{}\" --background", path.to_string_lossy())
    );

    std::fs::remove_file(path).unwrap();
}

#[test]
fn startup_command_rejects_missing_or_empty_paths() {
    match startup_command_for_executable(Path::new("")) {
        Err(StartupError::Command(_)) => {}
        other => panic!("expected command error, got {other:?}"),
    }

    let missing = std::env::temp_dir().join("keyspring-startup-absent.exe");
    assert!(startup_command_for_executable(&missing).is_err());
}

#[cfg(not(target_os = "windows"))]
#[test]
fn startup_toggle_is_unsupported_off_windows() {
    match keyspring_core::startup::is_enabled() {
        Err(StartupError::UnsupportedPlatform) => {}
        other => panic!("expected unsupported platform, got {other:?}"),
    }
}
