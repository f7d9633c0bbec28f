use crate::core::app::ChatController;
use crate::core::constants::SUGGESTIONS;
use crate::ui::appearance::Appearance;
use crate::ui::view::{ChatView, ASSISTANT_LABEL};
use crate::ui::wrap::{wrap_line, wrap_lines};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Paragraph},
    Frame,
};

const MAX_INPUT_ROWS: u16 = 6;
const TOAST_WIDTH: u16 = 44;

pub fn ui(f: &mut Frame, view: &mut ChatView, controller: &ChatController) {
    let area = f.area();
    f.render_widget(
        Block::default().style(Style::default().bg(view.theme.background_color)),
        area,
    );

    let input_rows = (view.input_line_count() as u16).clamp(1, MAX_INPUT_ROWS);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(input_rows + 2),
        ])
        .split(area);

    render_header(f, view, controller, chunks[0]);
    if controller.messages().is_empty() && !controller.is_loading() {
        render_welcome(f, view, chunks[1]);
    } else {
        render_messages(f, view, controller, chunks[1]);
    }
    render_input(f, view, controller, chunks[2]);
    render_toasts(f, view, area);
}

fn render_header(f: &mut Frame, view: &ChatView, controller: &ChatController, area: Rect) {
    let theme = &view.theme;
    let title = Line::from(vec![
        Span::styled(" Oye AI", theme.title_style),
        Span::styled(
            format!(" v{}", env!("CARGO_PKG_VERSION")),
            theme.system_text_style,
        ),
    ]);

    let mut indicators = Vec::new();
    if controller.is_listening() {
        indicators.push(Span::styled("● Listening ", theme.listening_style));
    }
    let mode = match view.appearance {
        Appearance::Light => "☀ Light ",
        Appearance::Dark => "☾ Dark ",
    };
    indicators.push(Span::styled(mode, theme.system_text_style));
    let indicators = Line::from(indicators);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(indicators.width() as u16),
        ])
        .split(area);
    f.render_widget(Paragraph::new(title), columns[0]);
    f.render_widget(Paragraph::new(indicators), columns[1]);
}

fn render_welcome(f: &mut Frame, view: &ChatView, area: Rect) {
    let theme = &view.theme;
    let mut lines = vec![
        Line::default(),
        Line::from(Span::styled("Welcome to Oye AI", theme.title_style)),
        Line::from(Span::styled(
            "Ask anything, or press F3 to talk instead of typing.",
            theme.system_text_style,
        )),
        Line::default(),
        Line::from(Span::styled(
            "Try one of these (Tab):",
            theme.system_text_style,
        )),
    ];
    for (index, suggestion) in SUGGESTIONS.iter().enumerate() {
        let style = if view.selected_suggestion() == Some(index) {
            theme.suggestion_style.add_modifier(Modifier::REVERSED)
        } else {
            theme.suggestion_style
        };
        lines.push(Line::from(Span::styled(format!(" {suggestion} "), style)));
    }

    let lines: Vec<Line<'static>> = lines
        .into_iter()
        .map(|line| line.alignment(Alignment::Center))
        .collect();
    f.render_widget(Paragraph::new(lines), area);
}

fn render_messages(f: &mut Frame, view: &mut ChatView, controller: &ChatController, area: Rect) {
    let mut lines = view.message_lines(controller.messages());
    if controller.is_loading() {
        if !lines.is_empty() {
            lines.push(Line::default());
        }
        lines.push(Line::from(vec![
            Span::styled(ASSISTANT_LABEL, view.theme.assistant_prefix_style),
            Span::raw(" "),
            Span::styled(view.typing_indicator(), view.theme.typing_indicator_style),
        ]));
    }

    let width = area.width.saturating_sub(1) as usize;
    let rows = wrap_lines(&lines, width);
    let offset = view.sync_scroll(rows.len(), area.height);
    let paragraph = Paragraph::new(rows)
        .block(Block::default().padding(Padding::left(1)))
        .scroll((offset, 0));
    f.render_widget(paragraph, area);
}

fn render_input(f: &mut Frame, view: &mut ChatView, controller: &ChatController, area: Rect) {
    let theme = view.theme.clone();
    let title = if controller.is_listening() {
        " Listening… speak now (F3 to stop) "
    } else if controller.is_loading() {
        " Waiting for a reply… "
    } else {
        " Message (Enter send · Alt+Enter newline · /help) "
    };
    let title_style = if controller.is_listening() {
        theme.listening_style
    } else {
        theme.input_title_style
    };

    view.textarea.set_block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.input_border_style)
            .title(Span::styled(title, title_style)),
    );
    view.textarea.set_style(theme.input_text_style);
    view.textarea.set_cursor_style(theme.input_cursor_style);
    view.textarea.set_cursor_line_style(theme.input_cursor_line_style);
    view.textarea
        .set_placeholder_text("Type your message here...");
    view.textarea.set_placeholder_style(theme.system_text_style);
    f.render_widget(&view.textarea, area);
}

/// Stack visible toasts under each other in the top-right corner.
fn render_toasts(f: &mut Frame, view: &ChatView, area: Rect) {
    let width = TOAST_WIDTH.min(area.width);
    if width < 4 {
        return;
    }
    let inner_width = width.saturating_sub(2) as usize;
    let mut y = area.y + 1;

    for toast in view.toasts.visible() {
        let notification = &toast.notification;
        let body = wrap_line(&Line::from(notification.description.clone()), inner_width);
        let height = body.len() as u16 + 2;
        if y + height > area.y + area.height {
            break;
        }
        let rect = Rect::new(area.x + area.width - width, y, width, height);
        let border_style = if notification.is_destructive() {
            view.theme.toast_error_style
        } else {
            view.theme.toast_style
        };

        f.render_widget(Clear, rect);
        f.render_widget(
            Paragraph::new(body).style(view.theme.toast_style).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(Span::styled(
                        format!(" {} ", notification.title),
                        view.theme.toast_title_style.patch(border_style),
                    )),
            ),
            rect,
        );
        y += height;
    }
}
