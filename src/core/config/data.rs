use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::completion::CompletionSettings;
use crate::ui::appearance::AppearancePreference;

/// `[speech]` table.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct SpeechConfig {
    /// Recognizer program followed by its arguments.
    pub command: Option<Vec<String>>,
}

/// Contents of `config.toml`. Every key is optional; unset keys fall back to
/// the built-in defaults.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub referer: Option<String>,
    pub title: Option<String>,
    pub system_prompt: Option<String>,
    pub appearance: Option<AppearancePreference>,
    pub markdown: Option<bool>,
    #[serde(default)]
    pub speech: SpeechConfig,
}

pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}

impl Config {
    /// Request parameters with config overrides applied over the defaults.
    pub fn completion_settings(&self) -> CompletionSettings {
        let defaults = CompletionSettings::default();
        CompletionSettings {
            base_url: self.base_url.clone().unwrap_or(defaults.base_url),
            model: self.model.clone().unwrap_or(defaults.model),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            system_prompt: self.system_prompt.clone().unwrap_or(defaults.system_prompt),
            referer: self.referer.clone().unwrap_or(defaults.referer),
            title: self.title.clone().unwrap_or(defaults.title),
        }
    }

    pub fn appearance_preference(&self) -> AppearancePreference {
        self.appearance.unwrap_or_default()
    }

    pub fn markdown_enabled(&self) -> bool {
        self.markdown.unwrap_or(true)
    }

    pub fn speech_command(&self) -> Option<&[String]> {
        self.speech
            .command
            .as_deref()
            .filter(|command| !command.is_empty())
    }

    /// Reject values the endpoint could never accept.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(format!(
                    "temperature must be between 0 and 2 (got {temperature})"
                ));
            }
        }
        if self.max_tokens == Some(0) {
            return Err("max_tokens must be greater than 0".to_string());
        }
        if let Some(base_url) = &self.base_url {
            if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
                return Err(format!("base_url must be an http(s) URL (got {base_url:?})"));
            }
        }
        if let Some(model) = &self.model {
            if model.trim().is_empty() {
                return Err("model must not be empty".to_string());
            }
        }
        Ok(())
    }
}
