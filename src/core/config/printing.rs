use std::path::Path;

use crate::core::config::data::{path_display, Config};
use crate::core::credential::Credential;

impl Config {
    /// Effective configuration, one `key: value` line each.
    pub fn summary_lines(&self, path: &Path, credential: &Credential) -> Vec<String> {
        let settings = self.completion_settings();
        let mut lines = vec![
            format!("  config-file: {}", path_display(path)),
            format!("  base-url: {}", settings.base_url),
            format!("  model: {}", settings.model),
            format!("  temperature: {}", settings.temperature),
            format!("  max-tokens: {}", settings.max_tokens),
            format!("  referer: {}", settings.referer),
            format!("  title: {}", settings.title),
            format!("  appearance: {}", self.appearance_preference().as_str()),
            format!(
                "  markdown: {}",
                if self.markdown_enabled() { "on" } else { "off" }
            ),
        ];
        match self.speech_command() {
            Some(command) => lines.push(format!("  speech-command: {}", command.join(" "))),
            None => lines.push("  speech-command: (unset)".to_string()),
        }
        lines.push(format!("  api-key: {}", credential.masked()));
        lines
    }

    pub fn print_all(&self, path: &Path, credential: &Credential) {
        println!("Current configuration:");
        for line in self.summary_lines(path, credential) {
            println!("{line}");
        }
    }
}
