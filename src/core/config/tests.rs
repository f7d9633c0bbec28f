use super::data::Config;
use super::io::ConfigError;
use crate::core::constants::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TITLE};
use crate::core::credential::Credential;
use crate::ui::appearance::AppearancePreference;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_nonexistent_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nonexistent_config.toml");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(config, Config::default());
    let settings = config.completion_settings();
    assert_eq!(settings.base_url, DEFAULT_BASE_URL);
    assert_eq!(settings.model, DEFAULT_MODEL);
    assert_eq!(settings.title, DEFAULT_TITLE);
    assert_eq!(config.appearance_preference(), AppearancePreference::Light);
    assert!(config.markdown_enabled());
    assert!(config.speech_command().is_none());
}

#[test]
fn overrides_replace_defaults() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
base_url = "http://127.0.0.1:9000/v1"
model = "openai/gpt-4o-mini"
temperature = 0.2
max_tokens = 256
appearance = "dark"
markdown = false

[speech]
command = ["oye-listen", "--lang", "en-US"]
"#,
    )
    .expect("write config");

    let config = Config::load_from_path(&config_path).expect("load config");
    let settings = config.completion_settings();

    assert_eq!(settings.base_url, "http://127.0.0.1:9000/v1");
    assert_eq!(settings.model, "openai/gpt-4o-mini");
    assert!((settings.temperature - 0.2).abs() < f32::EPSILON);
    assert_eq!(settings.max_tokens, 256);
    assert_eq!(settings.title, DEFAULT_TITLE);
    assert_eq!(config.appearance_preference(), AppearancePreference::Dark);
    assert!(!config.markdown_enabled());
    assert_eq!(
        config.speech_command(),
        Some(
            &[
                "oye-listen".to_string(),
                "--lang".to_string(),
                "en-US".to_string()
            ][..]
        )
    );
}

#[test]
fn empty_speech_command_counts_as_unset() {
    let config: Config = toml::from_str("[speech]\ncommand = []\n").expect("parse");
    assert!(config.speech_command().is_none());
}

#[test]
fn invalid_toml_is_a_parse_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "model = [unterminated").expect("write config");

    let err = Config::load_from_path(&config_path).expect_err("should fail");

    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().starts_with("Failed to parse config at"));
}

#[test]
fn wrong_value_type_is_a_parse_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "appearance = \"sepia\"\n").expect("write config");

    let err = Config::load_from_path(&config_path).expect_err("should fail");
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn out_of_range_values_are_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");

    for contents in [
        "temperature = 3.5\n",
        "max_tokens = 0\n",
        "base_url = \"openrouter.ai\"\n",
        "model = \"  \"\n",
    ] {
        fs::write(&config_path, contents).expect("write config");
        let err = Config::load_from_path(&config_path).expect_err(contents);
        assert!(
            matches!(err, ConfigError::Invalid { .. }),
            "unexpected error for {contents:?}: {err}"
        );
    }
}

#[test]
fn unreadable_path_is_a_read_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    // A directory exists but cannot be read as a file.
    let err = Config::load_from_path(temp_dir.path()).expect_err("should fail");
    assert!(matches!(err, ConfigError::Read { .. }));
}

#[test]
fn explicit_path_is_used_by_load() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("custom.toml");
    fs::write(&config_path, "title = \"Custom\"\n").expect("write config");

    let (config, path) = Config::load(Some(&config_path)).expect("load");

    assert_eq!(path, config_path);
    assert_eq!(config.completion_settings().title, "Custom");
}

#[test]
fn summary_masks_the_credential() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config = Config::default();
    let credential = Credential::new(Some("sk-or-v1-abcdefghijklmnop".to_string()));

    let lines = config.summary_lines(&temp_dir.path().join("config.toml"), &credential);

    let key_line = lines
        .iter()
        .find(|line| line.trim_start().starts_with("api-key:"))
        .expect("api-key line");
    assert!(!key_line.contains("abcdefghijklmnop"));
    assert!(key_line.contains("sk-o"));
    assert!(lines.iter().any(|line| line == "  markdown: on"));
    assert!(lines.iter().any(|line| line == "  speech-command: (unset)"));
}
