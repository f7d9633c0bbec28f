//! Slash commands typed into the input box.

use crate::core::app::ChatController;
use crate::core::notification::Notification;

pub const HELP_TEXT: &str = "Enter send · Alt+Enter newline · Tab suggestion · Ctrl+L clear · F2 theme · F3 voice · Ctrl+C quit · /clear /theme /voice /key <value> /about";

pub const ABOUT_TEXT: &str = "Oye AI is a friendly assistant created by Puneet Sharma.";

#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    Continue,
    ProcessAsMessage(String),
}

pub fn process_input(controller: &mut ChatController, input: &str) -> CommandResult {
    let trimmed = input.trim();

    // A doubled slash sends the rest as an ordinary message.
    if let Some(rest) = trimmed.strip_prefix("//") {
        return CommandResult::ProcessAsMessage(format!("/{rest}"));
    }
    let Some(command_line) = trimmed.strip_prefix('/') else {
        return CommandResult::ProcessAsMessage(input.to_string());
    };

    let (name, argument) = match command_line.split_once(char::is_whitespace) {
        Some((name, argument)) => (name, argument.trim()),
        None => (command_line, ""),
    };

    match name {
        "clear" => controller.clear_chat(),
        "theme" => {
            controller.toggle_dark_mode();
        }
        "voice" => controller.toggle_voice_input(),
        "key" => {
            if argument.is_empty() {
                controller.notify(Notification::normal(
                    "Usage",
                    "/key <value> sets the API key for this session",
                ));
            } else {
                controller.set_api_key(argument);
                controller.notify(Notification::api_key_saved());
            }
        }
        "about" => controller.notify(Notification::normal("About Oye AI", ABOUT_TEXT)),
        "help" => controller.notify(Notification::normal("Help", HELP_TEXT)),
        _ => controller.notify(Notification::destructive(
            "Unknown command",
            format!("/{name} is not a command. Type /help for the list."),
        )),
    }
    CommandResult::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::{create_test_controller, ScriptedBackend};

    #[test]
    fn plain_text_is_sent_as_is() {
        let (mut controller, notifier) = create_test_controller(ScriptedBackend::replying("x"));

        assert_eq!(
            process_input(&mut controller, "Tell me a fun fact"),
            CommandResult::ProcessAsMessage("Tell me a fun fact".to_string())
        );
        assert!(notifier.notifications().is_empty());
    }

    #[test]
    fn double_slash_escapes_a_command() {
        let (mut controller, _notifier) = create_test_controller(ScriptedBackend::replying("x"));

        assert_eq!(
            process_input(&mut controller, "//etc/hosts explained"),
            CommandResult::ProcessAsMessage("/etc/hosts explained".to_string())
        );
    }

    #[test]
    fn key_command_stores_key_and_confirms() {
        let (mut controller, notifier) = create_test_controller(ScriptedBackend::replying("x"));

        assert_eq!(
            process_input(&mut controller, "/key  sk-or-new "),
            CommandResult::Continue
        );

        assert_eq!(controller.api_key(), "sk-or-new");
        assert_eq!(notifier.notifications(), vec![Notification::api_key_saved()]);
    }

    #[test]
    fn key_without_value_only_shows_usage() {
        let (mut controller, notifier) = create_test_controller(ScriptedBackend::replying("x"));

        process_input(&mut controller, "/key");

        assert_eq!(controller.api_key(), "sk-test");
        assert_eq!(notifier.titles(), vec!["Usage".to_string()]);
    }

    #[test]
    fn clear_and_theme_commands_reach_the_controller() {
        let (mut controller, notifier) = create_test_controller(ScriptedBackend::replying("x"));

        process_input(&mut controller, "/theme");
        assert!(controller.is_dark_mode());

        process_input(&mut controller, "/clear");
        assert_eq!(notifier.notifications(), vec![Notification::chat_cleared()]);
    }

    #[test]
    fn voice_command_without_recognizer_reports_unsupported() {
        let (mut controller, notifier) = create_test_controller(ScriptedBackend::replying("x"));

        process_input(&mut controller, "/voice");

        assert_eq!(notifier.notifications(), vec![Notification::voice_unsupported()]);
    }

    #[test]
    fn unknown_commands_are_reported() {
        let (mut controller, notifier) = create_test_controller(ScriptedBackend::replying("x"));

        assert_eq!(process_input(&mut controller, "/frobnicate now"), CommandResult::Continue);

        let notifications = notifier.notifications();
        assert_eq!(notifications.len(), 1);
        assert!(notifications[0].is_destructive());
        assert!(notifications[0].description.contains("/frobnicate"));
    }
}
