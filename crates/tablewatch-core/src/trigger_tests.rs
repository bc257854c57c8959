use std::io::Write;

use tempfile::NamedTempFile;

use super::*;

fn log_with(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn marker_on_a_line_arms_the_gate() {
    let log = log_with("2024-05-01 some noise\n2024-05-01 LEAGUE update detected\n");
    assert!(marker_present(log.path(), "LEAGUE").unwrap());
}

#[test]
fn marker_anywhere_in_line_counts() {
    let log = log_with("prefix LEAGUE suffix\n");
    assert!(marker_present(log.path(), "LEAGUE").unwrap());
}

#[test]
fn no_marker_means_idle() {
    let log = log_with("2024-05-01 match postponed\n2024-05-02 training only\n");
    assert!(!marker_present(log.path(), "LEAGUE").unwrap());
}

#[test]
fn empty_log_means_idle() {
    let log = log_with("");
    assert!(!marker_present(log.path(), "LEAGUE").unwrap());
}

#[test]
fn marker_split_across_lines_does_not_count() {
    let log = log_with("LEA\nGUE\n");
    assert!(!marker_present(log.path(), "LEAGUE").unwrap());
}

#[test]
fn missing_log_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = marker_present(&dir.path().join("absent.log"), "LEAGUE").unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
}
