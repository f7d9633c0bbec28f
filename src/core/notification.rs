//! User-visible notifications.
//!
//! Every outcome the user should hear about (cleared chat, missing credential,
//! failed request, voice problems) is routed through a single [`Notifier`].

use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Normal,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notification {
    pub fn normal(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Normal,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Destructive,
        }
    }

    pub fn is_destructive(&self) -> bool {
        self.severity == Severity::Destructive
    }

    pub fn chat_cleared() -> Self {
        Self::normal("Chat cleared", "All messages have been removed")
    }

    pub fn api_key_missing() -> Self {
        Self::destructive("API Key Missing", "Please configure your API key in settings")
    }

    pub fn api_key_saved() -> Self {
        Self::normal("API Key Saved", "Your API key has been updated")
    }

    pub fn request_failed(description: impl Into<String>) -> Self {
        Self::destructive("Error", description)
    }

    pub fn request_pending() -> Self {
        Self::normal(
            "Please wait",
            "A response is still on its way; send again once it arrives",
        )
    }

    pub fn voice_unsupported() -> Self {
        Self::destructive(
            "Voice Input Not Supported",
            "No speech recognizer is available on this system",
        )
    }

    pub fn voice_error(error: &str) -> Self {
        Self::destructive("Voice Input Error", format!("Error: {error}"))
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Forwards notifications to whoever drains the channel (the UI event loop).
impl Notifier for mpsc::UnboundedSender<Notification> {
    fn notify(&self, notification: Notification) {
        let _ = self.send(notification);
    }
}

/// Writes notifications to the terminal; used by the TUI-less `say` command.
#[derive(Debug, Default)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notification: Notification) {
        let prefix = match notification.severity {
            Severity::Normal => "ℹ️ ",
            Severity::Destructive => "❌",
        };
        eprintln!(
            "{prefix} {}: {}",
            notification.title, notification.description
        );
    }
}
