use std::iter::Peekable;
use std::str::Chars;

const TAB_WIDTH: usize = 4;

/// Strip everything a terminal could interpret: escape sequences (CSI, OSC
/// and two-byte forms), C0/C1 control characters and carriage returns.
/// Newlines are kept and tabs become spaces.
pub fn sanitize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\u{1b}' => skip_escape_sequence(&mut chars),
            '\u{9b}' => skip_csi_body(&mut chars),
            '\n' => out.push('\n'),
            '\t' => out.extend(std::iter::repeat(' ').take(TAB_WIDTH)),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

fn skip_escape_sequence(chars: &mut Peekable<Chars<'_>>) {
    match chars.next() {
        Some('[') => skip_csi_body(chars),
        Some(']') | Some('P') | Some('X') | Some('^') | Some('_') => skip_string_body(chars),
        // Two-byte sequences such as ESC c or ESC 7.
        Some(_) | None => {}
    }
}

/// Parameters and intermediates up to and including the final byte.
fn skip_csi_body(chars: &mut Peekable<Chars<'_>>) {
    for ch in chars.by_ref() {
        if ('\u{40}'..='\u{7e}').contains(&ch) {
            break;
        }
    }
}

/// OSC/DCS style payloads end with BEL or ST (`ESC \`).
fn skip_string_body(chars: &mut Peekable<Chars<'_>>) {
    while let Some(ch) = chars.next() {
        match ch {
            '\u{07}' | '\u{9c}' => break,
            '\u{1b}' => {
                if chars.peek() == Some(&'\\') {
                    chars.next();
                }
                break;
            }
            _ => {}
        }
    }
}
