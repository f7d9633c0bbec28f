//! Maps raw key presses to chat actions. Anything unmapped goes to the input
//! box.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Send,
    Newline,
    ClearChat,
    ToggleTheme,
    ToggleVoice,
    CycleSuggestion,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    ScrollToBottom,
    Input(KeyEvent),
}

pub fn map_key(key: KeyEvent) -> KeyAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);
    let shift = key.modifiers.contains(KeyModifiers::SHIFT);

    match key.code {
        KeyCode::Char('c') if ctrl => KeyAction::Quit,
        KeyCode::Char('l') if ctrl => KeyAction::ClearChat,
        // Some terminals report Ctrl+J for a modified Enter.
        KeyCode::Enter if alt || shift => KeyAction::Newline,
        KeyCode::Char('j') if ctrl => KeyAction::Newline,
        KeyCode::Enter => KeyAction::Send,
        KeyCode::F(2) => KeyAction::ToggleTheme,
        KeyCode::F(3) => KeyAction::ToggleVoice,
        KeyCode::Tab => KeyAction::CycleSuggestion,
        KeyCode::Up => KeyAction::ScrollUp,
        KeyCode::Down => KeyAction::ScrollDown,
        KeyCode::PageUp => KeyAction::PageUp,
        KeyCode::PageDown => KeyAction::PageDown,
        KeyCode::End if ctrl => KeyAction::ScrollToBottom,
        _ => KeyAction::Input(key),
    }
}
