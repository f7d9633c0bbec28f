use ratatui::text::{Line, Span};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Wrap styled lines to `width` columns, breaking at whitespace where
/// possible and hard-splitting words longer than a whole row.
pub fn wrap_lines(lines: &[Line<'static>], width: usize) -> Vec<Line<'static>> {
    lines
        .iter()
        .flat_map(|line| wrap_line(line, width))
        .collect()
}

pub fn wrap_line(line: &Line<'static>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return vec![line.clone()];
    }

    let mut rows: Vec<Line<'static>> = Vec::new();
    let mut current: Vec<Span<'static>> = Vec::new();
    let mut current_width = 0usize;
    let mut after_break = false;

    for span in &line.spans {
        for token in split_words(&span.content) {
            let token_width = token.width();
            let is_space = token.chars().all(char::is_whitespace);

            if is_space && after_break && current_width == 0 {
                continue;
            }
            if current_width + token_width <= width {
                current.push(Span::styled(token.to_string(), span.style));
                current_width += token_width;
                continue;
            }
            if is_space {
                rows.push(finish_row(&mut current, line, true));
                current_width = 0;
                after_break = true;
                continue;
            }
            if current_width > 0 && token_width <= width {
                rows.push(finish_row(&mut current, line, true));
                current.push(Span::styled(token.to_string(), span.style));
                current_width = token_width;
                after_break = true;
                continue;
            }

            let mut chunk = String::new();
            for ch in token.chars() {
                let char_width = ch.width().unwrap_or(0);
                if current_width + char_width > width && current_width > 0 {
                    if !chunk.is_empty() {
                        current.push(Span::styled(std::mem::take(&mut chunk), span.style));
                    }
                    rows.push(finish_row(&mut current, line, true));
                    current_width = 0;
                    after_break = true;
                }
                chunk.push(ch);
                current_width += char_width;
            }
            if !chunk.is_empty() {
                current.push(Span::styled(chunk, span.style));
            }
        }
    }

    rows.push(finish_row(&mut current, line, false));
    rows
}

/// Rows ended by a wrap drop their trailing whitespace.
fn finish_row(
    current: &mut Vec<Span<'static>>,
    source: &Line<'static>,
    wrapped: bool,
) -> Line<'static> {
    if wrapped {
        while current
            .last()
            .is_some_and(|span| span.content.trim().is_empty())
        {
            current.pop();
        }
    }
    Line::from(std::mem::take(current)).style(source.style)
}

/// Split into alternating runs of whitespace and non-whitespace.
fn split_words(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut in_space: Option<bool> = None;
    for (index, ch) in text.char_indices() {
        let space = ch.is_whitespace();
        if in_space.is_some_and(|previous| previous != space) {
            tokens.push(&text[start..index]);
            start = index;
        }
        in_space = Some(space);
    }
    if start < text.len() {
        tokens.push(&text[start..]);
    }
    tokens
}
