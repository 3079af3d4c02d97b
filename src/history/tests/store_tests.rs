use super::super::*;
use std::collections::HashSet;
use std::fs;
use tempfile::TempDir;

fn plan(commands: &[&str]) -> CommandPlan {
    CommandPlan::new(commands.iter().map(|c| c.to_string()).collect())
}

#[test]
fn test_record_starts_unexecuted() {
    let mut store = HistoryStore::in_memory();

    let id = store.record("list files", &plan(&["ls -la"]));
    let entry = store.get(&id).unwrap();

    assert!(!entry.executed);
    assert_eq!(entry.success, None);
    assert_eq!(entry.prompt, "list files");
    assert_eq!(entry.plan(), plan(&["ls -la"]));
    assert!(chrono::DateTime::parse_from_rfc3339(&entry.timestamp).is_ok());
}

#[test]
fn test_ids_are_unique_and_increasing() {
    let mut store = HistoryStore::in_memory();

    let ids: Vec<String> = (0..50).map(|i| store.record(&i.to_string(), &plan(&["true"]))).collect();

    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len());

    let numeric: Vec<u64> = ids.iter().map(|id| id.parse().unwrap()).collect();
    assert!(numeric.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_mark_executed_touches_only_its_entry() {
    let mut store = HistoryStore::in_memory();
    let first = store.record("a", &plan(&["echo a"]));
    let second = store.record("b", &plan(&["echo b"]));
    let before = store.get(&first).unwrap().clone();

    store.mark_executed(&second, false).unwrap();

    assert_eq!(store.get(&first).unwrap(), &before);
    let updated = store.get(&second).unwrap();
    assert!(updated.executed);
    assert_eq!(updated.success, Some(false));
}

#[test]
fn test_entry_cannot_be_updated_twice() {
    let mut store = HistoryStore::in_memory();
    let id = store.record("a", &plan(&["echo a"]));

    store.mark_executed(&id, true).unwrap();
    assert!(matches!(
        store.mark_executed(&id, false),
        Err(HistoryError::AlreadyRecorded(_))
    ));
    assert_eq!(store.get(&id).unwrap().success, Some(true));
}

#[test]
fn test_unknown_id() {
    let mut store = HistoryStore::in_memory();
    assert!(matches!(
        store.mark_executed("nope", true),
        Err(HistoryError::NotFound(_))
    ));
}

#[test]
fn test_save_and_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("data").join(HISTORY_FILE);

    let mut store = HistoryStore::open(path.clone());
    assert!(store.is_empty());

    let id = store.record("disk usage", &plan(&["df -h", "du -sh ."]));
    store.mark_executed(&id, true).unwrap();
    store.save().unwrap();

    let reopened = HistoryStore::open(path);
    assert_eq!(reopened.len(), 1);
    assert_eq!(reopened.last().unwrap().command.commands(), vec!["df -h", "du -sh ."]);
    assert_eq!(reopened.last().unwrap().success, Some(true));
}

#[test]
fn test_new_ids_follow_loaded_ones() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(HISTORY_FILE);
    // An id from the far future forces the bump path
    fs::write(
        &path,
        r#"[{"id":"99990101000000000","timestamp":"9999-01-01T00:00:00+00:00","prompt":"p","command":"ls","executed":false,"success":null}]"#,
    )
    .unwrap();

    let mut store = HistoryStore::open(path);
    let id = store.record("next", &plan(&["pwd"]));
    assert_eq!(id, "99990101000000001");
}

#[test]
fn test_legacy_single_command_entries() {
    let json = r#"{"id":"1","timestamp":"t","prompt":"p","command":"ls -la","executed":true,"success":true}"#;
    let entry: HistoryEntry = serde_json::from_str(json).unwrap();

    assert_eq!(entry.command, CommandRecord::Single("ls -la".to_string()));
    assert_eq!(entry.plan().commands, vec!["ls -la".to_string()]);
}

#[test]
fn test_success_serializes_as_null_until_known() {
    let mut store = HistoryStore::in_memory();
    store.record("p", &plan(&["echo hi"]));

    let json = serde_json::to_value(store.entries()).unwrap();
    assert_eq!(json[0]["executed"], serde_json::Value::Bool(false));
    assert!(json[0]["success"].is_null());
    assert_eq!(json[0]["command"], serde_json::json!(["echo hi"]));
}

#[test]
fn test_corrupt_file_is_backed_up() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join(HISTORY_FILE);
    fs::write(&path, "[{broken").unwrap();

    let store = HistoryStore::open(path.clone());
    assert!(store.is_empty());
    assert!(!path.exists());

    let backups = fs::read_dir(temp_dir.path()).unwrap().count();
    assert_eq!(backups, 1);
}

#[test]
fn test_recent_is_newest_first() {
    let mut store = HistoryStore::in_memory();
    for prompt in ["one", "two", "three"] {
        store.record(prompt, &plan(&["true"]));
    }

    let prompts: Vec<&str> = store.recent(2).map(|e| e.prompt.as_str()).collect();
    assert_eq!(prompts, vec!["three", "two"]);
    assert_eq!(store.last().unwrap().prompt, "three");
}

#[test]
fn test_in_memory_save_is_noop() {
    let mut store = HistoryStore::in_memory();
    store.record("p", &plan(&["true"]));
    assert!(store.save().is_ok());
    assert!(store.path().is_none());
}
