use std::fs;

use tempfile::tempdir;

use super::*;

#[test]
fn removes_artifact_and_truncates_log() {
    let dir = tempdir().unwrap();
    let artifact = dir.path().join("shot.png");
    let log = dir.path().join("watch.log");
    fs::write(&artifact, b"png bytes").unwrap();
    fs::write(&log, "LEAGUE update\n").unwrap();

    reset_state(&artifact, &log).unwrap();

    assert!(!artifact.exists());
    assert_eq!(fs::read_to_string(&log).unwrap(), "");
}

#[test]
fn missing_artifact_is_not_an_error() {
    let dir = tempdir().unwrap();
    let artifact = dir.path().join("never-written.png");
    let log = dir.path().join("watch.log");
    fs::write(&log, "LEAGUE update\n").unwrap();

    reset_state(&artifact, &log).unwrap();

    assert_eq!(fs::read_to_string(&log).unwrap(), "");
}

#[test]
fn truncation_creates_empty_log_if_absent() {
    let dir = tempdir().unwrap();
    let log = dir.path().join("watch.log");

    reset_state(&dir.path().join("x.png"), &log).unwrap();

    assert_eq!(fs::read_to_string(&log).unwrap(), "");
}

#[test]
fn reset_is_repeatable() {
    let dir = tempdir().unwrap();
    let artifact = dir.path().join("shot.png");
    let log = dir.path().join("watch.log");
    fs::write(&artifact, b"png").unwrap();
    fs::write(&log, "LEAGUE\n").unwrap();

    reset_state(&artifact, &log).unwrap();
    reset_state(&artifact, &log).unwrap();

    assert!(!artifact.exists());
    assert_eq!(fs::read_to_string(&log).unwrap(), "");
}
