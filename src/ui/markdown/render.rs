use super::sanitize::sanitize_text;
use crate::ui::theme::Theme;
use pulldown_cmark::{Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthStr;

const RULE_WIDTH: usize = 24;
const CODE_INDENT: &str = "  ";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ListKind {
    Unordered,
    Ordered(u64),
}

struct ListLevel {
    kind: ListKind,
    marker_width: usize,
}

struct LinkState {
    dest: String,
    text: String,
}

/// Render assistant markdown to display lines.
pub fn render_markdown(content: &str, theme: &Theme) -> Vec<Line<'static>> {
    let content = sanitize_text(content);
    MarkdownRenderer::new(&content, theme).render()
}

/// Render text verbatim (after sanitizing), one display line per source line.
pub fn render_plain(content: &str, style: Style) -> Vec<Line<'static>> {
    sanitize_text(content)
        .split('\n')
        .map(|line| Line::from(Span::styled(line.to_string(), style)))
        .collect()
}

struct MarkdownRenderer<'a> {
    content: &'a str,
    theme: &'a Theme,
    lines: Vec<Line<'static>>,
    current_spans: Vec<Span<'static>>,
    style_stack: Vec<Style>,
    list_stack: Vec<ListLevel>,
    pending_marker: Option<String>,
    quote_depth: usize,
    in_code_block: bool,
    code_block_text: String,
    links: Vec<LinkState>,
    table_row: Option<Vec<String>>,
    table_cell: Option<String>,
    in_table_head: bool,
}

impl<'a> MarkdownRenderer<'a> {
    fn new(content: &'a str, theme: &'a Theme) -> Self {
        Self {
            content,
            theme,
            lines: Vec::new(),
            current_spans: Vec::new(),
            style_stack: vec![theme.assistant_text_style],
            list_stack: Vec::new(),
            pending_marker: None,
            quote_depth: 0,
            in_code_block: false,
            code_block_text: String::new(),
            links: Vec::new(),
            table_row: None,
            table_cell: None,
            in_table_head: false,
        }
    }

    fn render(mut self) -> Vec<Line<'static>> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_TASKLISTS);

        for event in Parser::new_ext(self.content, options) {
            match event {
                Event::Start(tag) => self.start_tag(tag),
                Event::End(tag_end) => self.end_tag(tag_end),
                Event::Text(text) => {
                    if self.in_code_block {
                        self.code_block_text.push_str(&text);
                    } else {
                        self.push_text(&text, self.current_style());
                    }
                }
                Event::Code(code) => self.push_text(&code, self.theme.inline_code_style),
                Event::InlineMath(math) | Event::DisplayMath(math) => {
                    self.push_text(&math, self.theme.inline_code_style)
                }
                Event::SoftBreak | Event::HardBreak => {
                    if let Some(cell) = self.table_cell.as_mut() {
                        cell.push(' ');
                    } else {
                        self.flush_line();
                    }
                }
                Event::Rule => {
                    self.flush_line();
                    self.lines.push(Line::from(Span::styled(
                        "─".repeat(RULE_WIDTH),
                        self.theme.system_text_style,
                    )));
                    self.push_blank_line();
                }
                Event::TaskListMarker(checked) => {
                    let marker = if checked { "[x] " } else { "[ ] " };
                    self.current_spans
                        .push(Span::styled(marker, self.theme.list_marker_style));
                }
                Event::FootnoteReference(name) => {
                    self.push_text(&format!("[^{name}]"), self.theme.system_text_style)
                }
                // Raw HTML never reaches the terminal.
                Event::Html(_) | Event::InlineHtml(_) => {}
            }
        }

        self.flush_line();
        while self.lines.last().is_some_and(is_blank) {
            self.lines.pop();
        }
        self.lines
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush_line();
                let mut style = self.theme.heading_style;
                if level == HeadingLevel::H1 {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                self.style_stack.push(style);
            }
            Tag::BlockQuote(_) => {
                self.flush_line();
                self.quote_depth += 1;
                self.style_stack.push(self.theme.blockquote_style);
            }
            Tag::CodeBlock(_) => {
                self.flush_line();
                self.in_code_block = true;
                self.code_block_text.clear();
            }
            Tag::List(start) => {
                self.flush_line();
                let kind = match start {
                    Some(n) => ListKind::Ordered(n),
                    None => ListKind::Unordered,
                };
                self.list_stack.push(ListLevel {
                    kind,
                    marker_width: 2,
                });
            }
            Tag::Item => {
                self.flush_line();
                if self.pending_marker.is_some() {
                    // The enclosing item had no text of its own.
                    self.current_spans.push(Span::raw(""));
                    self.flush_line();
                }
                let marker = match self.list_stack.last_mut() {
                    Some(level) => {
                        let marker = match &mut level.kind {
                            ListKind::Unordered => "• ".to_string(),
                            ListKind::Ordered(n) => {
                                let current = *n;
                                *n += 1;
                                format!("{current}. ")
                            }
                        };
                        level.marker_width = marker.width();
                        marker
                    }
                    None => "• ".to_string(),
                };
                self.pending_marker = Some(marker);
            }
            Tag::Emphasis => self.push_modifier(Modifier::ITALIC),
            Tag::Strong => self.push_modifier(Modifier::BOLD),
            Tag::Strikethrough => self.push_modifier(Modifier::CROSSED_OUT),
            Tag::Link { dest_url, .. } | Tag::Image { dest_url, .. } => {
                self.style_stack.push(self.theme.link_style);
                self.links.push(LinkState {
                    dest: sanitize_text(&dest_url),
                    text: String::new(),
                });
            }
            Tag::TableHead => {
                self.in_table_head = true;
                self.table_row = Some(Vec::new());
            }
            Tag::TableRow => self.table_row = Some(Vec::new()),
            Tag::TableCell => self.table_cell = Some(String::new()),
            _ => {}
        }
    }

    fn end_tag(&mut self, tag_end: TagEnd) {
        match tag_end {
            TagEnd::Paragraph => {
                self.flush_line();
                if self.list_stack.is_empty() {
                    self.push_blank_line();
                }
            }
            TagEnd::Heading(_) => {
                self.flush_line();
                self.style_stack.pop();
                self.push_blank_line();
            }
            TagEnd::BlockQuote(_) => {
                self.flush_line();
                self.style_stack.pop();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                if self.quote_depth == 0 {
                    self.push_blank_line();
                }
            }
            TagEnd::CodeBlock => self.finish_code_block(),
            TagEnd::List(_) => {
                self.flush_line();
                self.list_stack.pop();
                if self.list_stack.is_empty() {
                    self.push_blank_line();
                }
            }
            TagEnd::Item => {
                if self.pending_marker.is_some() {
                    self.current_spans.push(Span::raw(""));
                }
                self.flush_line();
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => {
                self.style_stack.pop();
            }
            TagEnd::Link | TagEnd::Image => {
                self.style_stack.pop();
                if let Some(link) = self.links.pop() {
                    if !link.dest.is_empty() && link.dest != link.text {
                        self.push_text(&format!(" ({})", link.dest), self.theme.system_text_style);
                    }
                }
            }
            TagEnd::TableCell => {
                if let (Some(cell), Some(row)) = (self.table_cell.take(), self.table_row.as_mut())
                {
                    row.push(cell.trim().to_string());
                }
            }
            TagEnd::TableHead | TagEnd::TableRow => self.finish_table_row(),
            TagEnd::Table => self.push_blank_line(),
            _ => {}
        }
    }

    fn current_style(&self) -> Style {
        self.style_stack
            .last()
            .copied()
            .unwrap_or(self.theme.assistant_text_style)
    }

    fn push_modifier(&mut self, modifier: Modifier) {
        let style = self.current_style().add_modifier(modifier);
        self.style_stack.push(style);
    }

    fn push_text(&mut self, text: &str, style: Style) {
        // Entities can decode to control characters after parsing.
        let clean = sanitize_text(text);
        if let Some(link) = self.links.last_mut() {
            link.text.push_str(&clean);
        }
        if let Some(cell) = self.table_cell.as_mut() {
            cell.push_str(&clean.replace('\n', " "));
            return;
        }

        let mut pieces = clean.split('\n').peekable();
        while let Some(piece) = pieces.next() {
            if !piece.is_empty() {
                self.current_spans
                    .push(Span::styled(piece.to_string(), style));
            }
            if pieces.peek().is_some() {
                self.flush_line();
            }
        }
    }

    fn finish_code_block(&mut self) {
        self.in_code_block = false;
        let code = sanitize_text(&self.code_block_text);
        let code = code.strip_suffix('\n').unwrap_or(&code).to_string();
        for line in code.split('\n') {
            let mut spans = self.line_prefix();
            spans.push(Span::styled(
                format!("{CODE_INDENT}{line}"),
                self.theme.code_block_style,
            ));
            self.lines.push(Line::from(spans));
        }
        self.code_block_text.clear();
        self.push_blank_line();
    }

    fn finish_table_row(&mut self) {
        let Some(cells) = self.table_row.take() else {
            return;
        };
        let style = if self.in_table_head {
            self.current_style().add_modifier(Modifier::BOLD)
        } else {
            self.current_style()
        };
        let separator = Span::styled(" │ ", self.theme.system_text_style);

        let mut spans = self.line_prefix();
        for (index, cell) in cells.into_iter().enumerate() {
            if index > 0 {
                spans.push(separator.clone());
            }
            spans.push(Span::styled(cell, style));
        }
        self.lines.push(Line::from(spans));
        self.in_table_head = false;
    }

    fn flush_line(&mut self) {
        if self.current_spans.is_empty() {
            return;
        }
        let mut spans = self.line_prefix();
        spans.append(&mut self.current_spans);
        self.lines.push(Line::from(spans));
    }

    /// Quote bars and list indentation for the line being started.
    fn line_prefix(&mut self) -> Vec<Span<'static>> {
        let mut prefix = Vec::new();
        if self.quote_depth > 0 {
            prefix.push(Span::styled(
                "│ ".repeat(self.quote_depth),
                self.theme.blockquote_style,
            ));
        }
        if self.list_stack.is_empty() {
            return prefix;
        }

        let outer_indent: usize = self
            .list_stack
            .iter()
            .take(self.list_stack.len() - 1)
            .map(|level| level.marker_width)
            .sum();
        match self.pending_marker.take() {
            Some(marker) => {
                if outer_indent > 0 {
                    prefix.push(Span::raw(" ".repeat(outer_indent)));
                }
                prefix.push(Span::styled(marker, self.theme.list_marker_style));
            }
            None => {
                let marker_width = self.list_stack.last().map_or(0, |level| level.marker_width);
                prefix.push(Span::raw(" ".repeat(outer_indent + marker_width)));
            }
        }
        prefix
    }

    fn push_blank_line(&mut self) {
        if self.lines.last().is_some_and(|line| !is_blank(line)) {
            self.lines.push(Line::default());
        }
    }
}

fn is_blank(line: &Line<'_>) -> bool {
    line.spans.iter().all(|span| span.content.trim().is_empty())
}
