use chatdeck_core::paste::PasteClassifier;
use chatdeck_infrastructure::config::PromptConfig;
use chatdeck_infrastructure::{ChatDeckConfig, ConfigService};
use tempfile::TempDir;

#[test]
fn test_missing_config_file_yields_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let service = ConfigService::with_path(temp_dir.path().join("config.toml"));

    let config = service.get_config().expect("Should load defaults");
    assert_eq!(config.paste, PasteClassifier::default());
    assert!(config.prompts.is_empty());
}

#[test]
fn test_save_and_reload_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("nested").join("config.toml");
    let service = ConfigService::with_path(&config_path);

    let mut config = ChatDeckConfig::default();
    config.api.timeout_secs = 30;
    config.paste = PasteClassifier::new(200, 12);
    config.prompts.push(PromptConfig {
        id: "review".to_string(),
        name: "review".to_string(),
        text: "Review this {{language}} code".to_string(),
        description: Some("Code review".to_string()),
    });

    service.save(&config).expect("Should save config");
    assert!(config_path.exists(), "Config file should be created");

    // A fresh service reads what the first one wrote
    let loaded = ConfigService::load_from_path(&config_path).expect("Should reload config");
    assert_eq!(loaded.api.timeout_secs, 30);
    assert_eq!(loaded.paste, PasteClassifier::new(200, 12));
    assert_eq!(loaded.prompts, config.prompts);
    assert_eq!(loaded.prompt_groups()[0].variables(), vec!["language".to_string()]);
}

#[test]
fn test_cache_until_invalidated() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "[paste]\nchar_threshold = 300\n").unwrap();
    let service = ConfigService::with_path(&config_path);

    assert_eq!(service.get_config().unwrap().paste.char_threshold, 300);

    std::fs::write(&config_path, "[paste]\nchar_threshold = 700\n").unwrap();
    assert_eq!(
        service.get_config().unwrap().paste.char_threshold,
        300,
        "Cached config should be served until invalidated"
    );

    service.invalidate_cache();
    assert_eq!(service.get_config().unwrap().paste.char_threshold, 700);
}

#[test]
fn test_invalid_config_file_is_reported() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "[paste]\nline_threshold = 0\n").unwrap();

    let err = ConfigService::with_path(&config_path).get_config().unwrap_err();
    assert!(err.is_config());
}
