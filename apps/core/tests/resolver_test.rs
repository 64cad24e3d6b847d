use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use keyspring_core::resolver::PathResolver;

fn unique_dir(tag: &str) -> PathBuf {
    let unique = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("keyspring-resolver-{tag}-{unique}"));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn place_executable(dir: &PathBuf, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"#!/bin/sh\n").unwrap();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }
    path
}

#[test]
fn rooted_path_depends_only_on_the_literal_file() {
    let real_dir = unique_dir("rooted-real");
    let decoy_dir = unique_dir("rooted-decoy");
    let real = place_executable(&real_dir, "tool");
    place_executable(&decoy_dir, "tool");

    let resolver = PathResolver::new(vec![decoy_dir.clone()], vec![String::new()]);

    assert_eq!(resolver.resolve(real.to_str().unwrap()), Some(real.clone()));

    // A rooted miss stays a miss even though the search dirs carry the name.
    let missing = real_dir.join("absent");
    assert_eq!(resolver.resolve(missing.to_str().unwrap()), None);

    std::fs::remove_dir_all(real_dir).unwrap();
    std::fs::remove_dir_all(decoy_dir).unwrap();
}

#[test]
fn directory_order_wins_before_extension_order() {
    let dir_a = unique_dir("order-a");
    let dir_b = unique_dir("order-b");
    let in_a = place_executable(&dir_a, "foo.cmd");
    place_executable(&dir_b, "foo.cmd");

    let resolver = PathResolver::new(
        vec![dir_a.clone(), dir_b.clone()],
        vec![".exe".to_string(), ".cmd".to_string()],
    );

    assert_eq!(resolver.resolve("foo"), Some(in_a));

    std::fs::remove_dir_all(dir_a).unwrap();
    std::fs::remove_dir_all(dir_b).unwrap();
}

#[test]
fn extension_order_wins_within_one_directory() {
    let dir = unique_dir("ext-order");
    let exe = place_executable(&dir, "foo.exe");
    place_executable(&dir, "foo.cmd");

    let resolver = PathResolver::new(
        vec![dir.clone()],
        vec![".exe".to_string(), ".cmd".to_string()],
    );

    assert_eq!(resolver.resolve("foo"), Some(exe));

    std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn later_directory_is_reached_when_earlier_ones_miss() {
    let dir_a = unique_dir("later-a");
    let dir_b = unique_dir("later-b");
    let target = place_executable(&dir_b, "foo.cmd");

    let resolver = PathResolver::new(
        vec![dir_a.clone(), dir_b.clone()],
        vec![".exe".to_string(), ".cmd".to_string()],
    );

    assert_eq!(resolver.resolve("foo"), Some(target));

    std::fs::remove_dir_all(dir_a).unwrap();
    std::fs::remove_dir_all(dir_b).unwrap();
}

#[test]
fn carried_extension_is_not_appended_twice() {
    let dir = unique_dir("carried-ext");
    let target = place_executable(&dir, "foo.CMD");

    let resolver = PathResolver::new(vec![dir.clone()], vec![".cmd".to_string()]);

    // Doubling the suffix would look for foo.CMD.cmd and miss.
    assert_eq!(resolver.resolve("foo.CMD"), Some(target));

    std::fs::remove_dir_all(dir).unwrap();
}

#[test]
fn unresolvable_references_return_none() {
    let dir = unique_dir("miss");
    let resolver = PathResolver::new(vec![dir.clone()], vec![String::new()]);

    assert_eq!(resolver.resolve("nothing-here"), None);
    assert_eq!(resolver.resolve(""), None);
    assert_eq!(resolver.resolve("   "), None);

    std::fs::remove_dir_all(dir).unwrap();
}

#[cfg(unix)]
#[test]
fn files_without_execute_permission_are_skipped() {
    let dir_a = unique_dir("perm-a");
    let dir_b = unique_dir("perm-b");

    let plain = dir_a.join("tool");
    std::fs::write(&plain, b"data").unwrap();
    let runnable = place_executable(&dir_b, "tool");

    let resolver = PathResolver::new(vec![dir_a.clone(), dir_b.clone()], vec![String::new()]);

    assert_eq!(resolver.resolve("tool"), Some(runnable));

    std::fs::remove_dir_all(dir_a).unwrap();
    std::fs::remove_dir_all(dir_b).unwrap();
}
