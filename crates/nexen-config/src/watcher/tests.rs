//! Tests for the config file watcher.

use super::*;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

#[test]
fn watch_nonexistent_file_in_existing_dir_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let handle = watch_file(&dir.path().join("later.json"), |_| {});
    assert!(handle.is_ok());
}

#[test]
fn watch_in_missing_directory_fails() {
    let path = PathBuf::from("/tmp/nexen_missing_watch_dir/config.json");
    let err = watch_file(&path, |_| {}).unwrap_err();
    assert!(matches!(err, crate::ConfigError::Watch { .. }));
    assert_eq!(err.path(), path.as_path());
}

#[test]
fn write_triggers_handler() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{}").unwrap();

    let (tx, rx) = mpsc::channel();
    let _handle = watch_file(&path, move |_| {
        let _ = tx.send(());
    })
    .unwrap();

    std::fs::write(&path, r#"{"a": 1}"#).unwrap();
    assert!(rx.recv_timeout(Duration::from_secs(5)).is_ok());
}

#[test]
fn sibling_files_are_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{}").unwrap();

    let (tx, rx) = mpsc::channel();
    let _handle = watch_file(&path, move |_| {
        let _ = tx.send(());
    })
    .unwrap();

    std::fs::write(dir.path().join("other.json"), "{}").unwrap();
    assert!(rx.recv_timeout(Duration::from_millis(500)).is_err());
}

#[test]
fn stopped_handle_no_longer_fires() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "a: 1\n").unwrap();

    let (tx, rx) = mpsc::channel();
    let handle = watch_file(&path, move |_| {
        let _ = tx.send(());
    })
    .unwrap();
    assert!(handle.is_active());
    assert_eq!(handle.path(), path.as_path());
    handle.stop();

    std::fs::write(&path, "a: 2\n").unwrap();
    assert!(rx.recv_timeout(Duration::from_millis(500)).is_err());
}

#[test]
fn settle_waits_out_a_split_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "").unwrap();

    let writer_path = path.clone();
    let writer = std::thread::spawn(move || {
        std::thread::sleep(SETTLE_DELAY / 2);
        std::fs::write(&writer_path, "key = \"done\"\n").unwrap();
    });

    file_watcher::wait_until_settled(&path);
    writer.join().unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "key = \"done\"\n");
}

#[test]
fn settle_returns_quickly_for_a_still_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{}").unwrap();

    let started = Instant::now();
    file_watcher::wait_until_settled(&path);
    assert!(started.elapsed() < SETTLE_DELAY * 5);
}
