use crate::config::storage::{quarantine, write_atomically};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_write_creates_parent_directories() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("a").join("b").join("file.json");

    write_atomically(&path, b"[]", None).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
}

#[test]
fn test_write_replaces_whole_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("file.json");
    fs::write(&path, "a much longer original content").unwrap();

    write_atomically(&path, b"short", None).unwrap();
    assert_eq!(fs::read_to_string(&path).unwrap(), "short");

    // No temp files left behind
    let count = fs::read_dir(temp_dir.path()).unwrap().count();
    assert_eq!(count, 1);
}

#[test]
fn test_quarantine_renames_with_timestamp() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("history.json");
    fs::write(&path, "garbage").unwrap();

    let backup = quarantine(&path).unwrap();

    assert!(!path.exists());
    assert_eq!(fs::read_to_string(&backup).unwrap(), "garbage");

    let name = backup.file_name().unwrap().to_str().unwrap();
    let timestamp = name.strip_prefix("history.json.corrupt-").unwrap();
    assert!(
        chrono::NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d_%H%M%S").is_ok(),
        "Timestamp should be valid chrono format: {}",
        timestamp
    );
}

#[test]
fn test_quarantine_missing_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    assert!(quarantine(&temp_dir.path().join("absent.json")).is_err());
}

#[cfg(unix)]
#[test]
fn test_mode_applies_to_new_and_replaced_files() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let fresh = temp_dir.path().join("fresh.json");
    write_atomically(&fresh, b"{}", Some(0o600)).unwrap();
    let mode = fs::metadata(&fresh).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);

    let existing = temp_dir.path().join("existing.json");
    fs::write(&existing, "{}").unwrap();
    fs::set_permissions(&existing, fs::Permissions::from_mode(0o644)).unwrap();

    write_atomically(&existing, b"{\"a\": 1}", Some(0o600)).unwrap();
    let mode = fs::metadata(&existing).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
    assert_eq!(fs::read_to_string(&existing).unwrap(), "{\"a\": 1}");
}
