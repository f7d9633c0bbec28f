//! Presentation state that the controller does not own: the input box,
//! scrolling, the selected suggestion and the toast stack.

use std::time::Instant;

use ratatui::text::{Line, Span};
use tui_textarea::{CursorMove, TextArea};

use crate::core::constants::SUGGESTIONS;
use crate::core::message::Message;
use crate::core::notification::Notification;
use crate::ui::appearance::Appearance;
use crate::ui::markdown::{render_markdown, render_plain};
use crate::ui::theme::Theme;
use crate::ui::toast::ToastCenter;

pub const USER_PREFIX: &str = "You: ";
pub const ASSISTANT_LABEL: &str = "Oye AI";
const TYPING_FRAMES: [&str; 4] = ["●○○", "○●○", "○○●", "○●○"];

pub struct ChatView {
    pub textarea: TextArea<'static>,
    pub theme: Theme,
    pub appearance: Appearance,
    pub markdown: bool,
    pub toasts: ToastCenter,
    pub exit_requested: bool,
    suggestion: Option<usize>,
    scroll_offset: u16,
    auto_scroll: bool,
    max_scroll: u16,
    viewport_height: u16,
    typing_frame: usize,
}

impl ChatView {
    pub fn new(appearance: Appearance, markdown: bool) -> Self {
        Self {
            textarea: TextArea::default(),
            theme: Theme::for_appearance(appearance),
            appearance,
            markdown,
            toasts: ToastCenter::default(),
            exit_requested: false,
            suggestion: None,
            scroll_offset: 0,
            auto_scroll: true,
            max_scroll: 0,
            viewport_height: 0,
            typing_frame: 0,
        }
    }

    pub fn set_appearance(&mut self, appearance: Appearance) {
        if self.appearance != appearance {
            self.appearance = appearance;
            self.theme = Theme::for_appearance(appearance);
        }
    }

    pub fn input_text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn input_line_count(&self) -> usize {
        self.textarea.lines().len()
    }

    /// Replace the input contents and put the cursor at the end.
    pub fn set_input(&mut self, text: &str) {
        self.textarea = TextArea::from(text.split('\n').map(str::to_string));
        self.textarea.move_cursor(CursorMove::Bottom);
        self.textarea.move_cursor(CursorMove::End);
    }

    pub fn clear_input(&mut self) {
        self.textarea = TextArea::default();
        self.suggestion = None;
    }

    /// Put the next quick prompt into the input.
    pub fn cycle_suggestion(&mut self) {
        let next = match self.suggestion {
            Some(index) => (index + 1) % SUGGESTIONS.len(),
            None => 0,
        };
        self.suggestion = Some(next);
        self.set_input(SUGGESTIONS[next]);
    }

    pub fn selected_suggestion(&self) -> Option<usize> {
        self.suggestion
    }

    pub fn push_notification(&mut self, notification: Notification) {
        self.toasts.push(notification, Instant::now());
    }

    pub fn advance_typing_indicator(&mut self) {
        self.typing_frame = (self.typing_frame + 1) % TYPING_FRAMES.len();
    }

    pub fn typing_indicator(&self) -> &'static str {
        TYPING_FRAMES[self.typing_frame]
    }

    /// Record the size of the message area and return the row to show first.
    pub fn sync_scroll(&mut self, total_rows: usize, viewport_height: u16) -> u16 {
        let total = u16::try_from(total_rows).unwrap_or(u16::MAX);
        self.viewport_height = viewport_height;
        self.max_scroll = total.saturating_sub(viewport_height);
        if self.auto_scroll || self.scroll_offset >= self.max_scroll {
            self.scroll_offset = self.max_scroll;
        }
        self.scroll_offset
    }

    pub fn scroll_up(&mut self, rows: u16) {
        self.auto_scroll = false;
        self.scroll_offset = self.scroll_offset.min(self.max_scroll).saturating_sub(rows);
    }

    /// Reaching the bottom turns auto-scroll back on.
    pub fn scroll_down(&mut self, rows: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(rows).min(self.max_scroll);
        if self.scroll_offset >= self.max_scroll {
            self.auto_scroll = true;
        }
    }

    pub fn page_up(&mut self) {
        self.scroll_up(self.page_size());
    }

    pub fn page_down(&mut self) {
        self.scroll_down(self.page_size());
    }

    pub fn scroll_to_bottom(&mut self) {
        self.auto_scroll = true;
        self.scroll_offset = self.max_scroll;
    }

    pub fn is_auto_scrolling(&self) -> bool {
        self.auto_scroll
    }

    fn page_size(&self) -> u16 {
        self.viewport_height.saturating_sub(1).max(1)
    }

    /// Unwrapped display lines for the transcript, one blank line between
    /// messages.
    pub fn message_lines(&self, messages: &[Message]) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        for (index, message) in messages.iter().enumerate() {
            if index > 0 {
                lines.push(Line::default());
            }
            if message.is_user() {
                self.push_user_lines(&mut lines, message.text());
            } else {
                self.push_assistant_lines(&mut lines, message.text());
            }
        }
        lines
    }

    fn push_user_lines(&self, lines: &mut Vec<Line<'static>>, text: &str) {
        let indent = " ".repeat(USER_PREFIX.len());
        for (index, line) in render_plain(text, self.theme.user_text_style)
            .into_iter()
            .enumerate()
        {
            let prefix = if index == 0 {
                Span::styled(USER_PREFIX, self.theme.user_prefix_style)
            } else {
                Span::raw(indent.clone())
            };
            let mut spans = vec![prefix];
            spans.extend(line.spans);
            lines.push(Line::from(spans));
        }
    }

    fn push_assistant_lines(&self, lines: &mut Vec<Line<'static>>, text: &str) {
        lines.push(Line::from(Span::styled(
            ASSISTANT_LABEL,
            self.theme.assistant_prefix_style,
        )));
        let body = if self.markdown {
            render_markdown(text, &self.theme)
        } else {
            render_plain(text, self.theme.assistant_text_style)
        };
        lines.extend(body);
    }
}
