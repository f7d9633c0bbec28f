use crate::ui::appearance::Appearance;
use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    // Overall background color to paint the full frame
    pub background_color: Color,
    // Chat message styles
    pub user_prefix_style: Style,
    pub user_text_style: Style,
    pub assistant_prefix_style: Style,
    pub assistant_text_style: Style,
    pub system_text_style: Style,

    // Markdown
    pub heading_style: Style,
    pub link_style: Style,
    pub inline_code_style: Style,
    pub code_block_style: Style,
    pub blockquote_style: Style,
    pub list_marker_style: Style,

    // Chrome
    pub title_style: Style,
    pub typing_indicator_style: Style,
    pub listening_style: Style,
    pub suggestion_style: Style,
    pub input_border_style: Style,
    pub input_title_style: Style,

    // Input area
    pub input_text_style: Style,
    pub input_cursor_style: Style,
    pub input_cursor_line_style: Style,

    // Notifications
    pub toast_style: Style,
    pub toast_title_style: Style,
    pub toast_error_style: Style,
}

impl Theme {
    pub fn for_appearance(appearance: Appearance) -> Self {
        match appearance {
            Appearance::Light => Self::light(),
            Appearance::Dark => Self::dark(),
        }
    }

    pub fn dark() -> Self {
        let accent = Color::Rgb(0xa7, 0x8b, 0xfa);
        Theme {
            background_color: Color::Rgb(0x11, 0x18, 0x27),
            user_prefix_style: Style::default()
                .fg(Color::Rgb(0x60, 0xa5, 0xfa))
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Rgb(0xbf, 0xdb, 0xfe)),
            assistant_prefix_style: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            assistant_text_style: Style::default().fg(Color::Rgb(0xe5, 0xe7, 0xeb)),
            system_text_style: Style::default().fg(Color::Rgb(0x9c, 0xa3, 0xaf)),

            heading_style: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            link_style: Style::default()
                .fg(Color::Rgb(0x93, 0xc5, 0xfd))
                .add_modifier(Modifier::UNDERLINED),
            inline_code_style: Style::default()
                .fg(Color::Rgb(0xfb, 0xbf, 0x24))
                .bg(Color::Rgb(0x1f, 0x29, 0x37)),
            code_block_style: Style::default()
                .fg(Color::Rgb(0xd1, 0xd5, 0xdb))
                .bg(Color::Rgb(0x1f, 0x29, 0x37)),
            blockquote_style: Style::default()
                .fg(Color::Rgb(0x9c, 0xa3, 0xaf))
                .add_modifier(Modifier::ITALIC),
            list_marker_style: Style::default().fg(accent),

            title_style: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            typing_indicator_style: Style::default().fg(accent),
            listening_style: Style::default()
                .fg(Color::Rgb(0xf8, 0x71, 0x71))
                .add_modifier(Modifier::BOLD),
            suggestion_style: Style::default().fg(Color::Rgb(0xc4, 0xb5, 0xfd)),
            input_border_style: Style::default().fg(Color::Rgb(0x4b, 0x55, 0x63)),
            input_title_style: Style::default().fg(Color::Rgb(0x9c, 0xa3, 0xaf)),

            input_text_style: Style::default().fg(Color::White),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),
            input_cursor_line_style: Style::default(),

            toast_style: Style::default()
                .fg(Color::Rgb(0xe5, 0xe7, 0xeb))
                .bg(Color::Rgb(0x1f, 0x29, 0x37)),
            toast_title_style: Style::default().add_modifier(Modifier::BOLD),
            toast_error_style: Style::default()
                .fg(Color::White)
                .bg(Color::Rgb(0x99, 0x1b, 0x1b)),
        }
    }

    pub fn light() -> Self {
        let accent = Color::Rgb(0x7c, 0x3a, 0xed);
        Theme {
            background_color: Color::Rgb(0xf9, 0xfa, 0xfb),
            user_prefix_style: Style::default()
                .fg(Color::Rgb(0x1d, 0x4e, 0xd8))
                .add_modifier(Modifier::BOLD),
            user_text_style: Style::default().fg(Color::Rgb(0x1e, 0x3a, 0x8a)),
            assistant_prefix_style: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            assistant_text_style: Style::default().fg(Color::Rgb(0x11, 0x18, 0x27)),
            system_text_style: Style::default().fg(Color::Rgb(0x6b, 0x72, 0x80)),

            heading_style: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            link_style: Style::default()
                .fg(Color::Rgb(0x25, 0x63, 0xeb))
                .add_modifier(Modifier::UNDERLINED),
            inline_code_style: Style::default()
                .fg(Color::Rgb(0xb4, 0x53, 0x09))
                .bg(Color::Rgb(0xf3, 0xf4, 0xf6)),
            code_block_style: Style::default()
                .fg(Color::Rgb(0x37, 0x41, 0x51))
                .bg(Color::Rgb(0xf3, 0xf4, 0xf6)),
            blockquote_style: Style::default()
                .fg(Color::Rgb(0x6b, 0x72, 0x80))
                .add_modifier(Modifier::ITALIC),
            list_marker_style: Style::default().fg(accent),

            title_style: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            typing_indicator_style: Style::default().fg(accent),
            listening_style: Style::default()
                .fg(Color::Rgb(0xdc, 0x26, 0x26))
                .add_modifier(Modifier::BOLD),
            suggestion_style: Style::default().fg(Color::Rgb(0x6d, 0x28, 0xd9)),
            input_border_style: Style::default().fg(Color::Rgb(0xd1, 0xd5, 0xdb)),
            input_title_style: Style::default().fg(Color::Rgb(0x6b, 0x72, 0x80)),

            input_text_style: Style::default().fg(Color::Black),
            input_cursor_style: Style::default().add_modifier(Modifier::REVERSED),
            input_cursor_line_style: Style::default(),

            toast_style: Style::default()
                .fg(Color::Rgb(0x11, 0x18, 0x27))
                .bg(Color::Rgb(0xe5, 0xe7, 0xeb)),
            toast_title_style: Style::default().add_modifier(Modifier::BOLD),
            toast_error_style: Style::default()
                .fg(Color::White)
                .bg(Color::Rgb(0xdc, 0x26, 0x26)),
        }
    }
}
