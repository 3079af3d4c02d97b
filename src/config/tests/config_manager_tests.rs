use super::super::*;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn config_path(temp_dir: &TempDir) -> PathBuf {
    temp_dir.path().join("smart-shell").join("config.json")
}

#[test]
fn test_missing_config_gives_defaults() {
    let temp_dir = TempDir::new().unwrap();

    let manager = ConfigManager::load(config_path(&temp_dir));
    assert_eq!(manager.config(), &AppConfig::default());
    assert_eq!(manager.config().default_model, "gemini-2.5-flash");
}

#[test]
fn test_save_then_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = config_path(&temp_dir);

    let mut manager = ConfigManager::load(path.clone());
    manager.config_mut().api_key = Some("abc123".to_string());
    manager.config_mut().default_model = "gemini-2.5-pro".to_string();
    manager.save().unwrap();

    let reloaded = ConfigManager::load(path);
    assert_eq!(reloaded.config().api_key.as_deref(), Some("abc123"));
    assert_eq!(reloaded.config().default_model, "gemini-2.5-pro");
}

#[cfg(unix)]
#[test]
fn test_saved_config_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let path = config_path(&temp_dir);

    ConfigManager::load(path.clone()).save().unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn test_corrupt_config_is_moved_aside() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, "{ not json").unwrap();

    let manager = ConfigManager::load(path.clone());
    assert_eq!(manager.config(), &AppConfig::default());
    assert!(!path.exists(), "Corrupt file should be moved away");

    let backups: Vec<_> = fs::read_dir(temp_dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("config.json.corrupt-"))
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(fs::read_to_string(backups[0].path()).unwrap(), "{ not json");
}

#[test]
fn test_partial_config_fills_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, r#"{"api_key": "k"}"#).unwrap();

    let manager = ConfigManager::load(path);
    assert_eq!(manager.config().api_key.as_deref(), Some("k"));
    assert_eq!(manager.config().default_model, "gemini-2.5-flash");
}

#[test]
fn test_sudo_password_encoding() {
    let mut config = AppConfig::default();
    assert_eq!(config.sudo_password().unwrap(), None);

    config.set_sudo_password(Some("hunter2"));
    assert_eq!(config.sudo_password_b64.as_deref(), Some("aHVudGVyMg=="));
    assert_eq!(config.sudo_password().unwrap().as_deref(), Some("hunter2"));

    config.set_sudo_password(None);
    assert!(config.sudo_password_b64.is_none());

    config.sudo_password_b64 = Some("***".to_string());
    assert!(matches!(config.sudo_password(), Err(ConfigError::InvalidSecret)));
}

#[test]
fn test_api_key_override() {
    let config = AppConfig {
        api_key: Some("stored".to_string()),
        ..AppConfig::default()
    };

    assert_eq!(
        config.api_key_with_override(Some("from-env".to_string())).as_deref(),
        Some("from-env")
    );
    assert_eq!(config.api_key_with_override(Some("  ".to_string())).as_deref(), Some("stored"));
    assert_eq!(config.api_key_with_override(None).as_deref(), Some("stored"));
    assert_eq!(AppConfig::default().api_key_with_override(None), None);
}

#[test]
fn test_absent_fields_are_not_serialized() {
    let json = serde_json::to_string(&AppConfig::default()).unwrap();
    assert_eq!(json, r#"{"default_model":"gemini-2.5-flash"}"#);
}

#[test]
fn test_expand_path_tilde() {
    let home = expand_path("~");
    assert!(home.is_absolute() || home == PathBuf::from("~"));
    assert_eq!(expand_path("~/x/config.json"), home.join("x/config.json"));
    assert_eq!(expand_path("/etc/smart-shell"), PathBuf::from("/etc/smart-shell"));
    assert_eq!(expand_path("relative/dir"), PathBuf::from("relative/dir"));
}
