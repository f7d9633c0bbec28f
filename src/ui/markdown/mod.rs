//! Terminal rendering of assistant markdown.
//!
//! Replies are parsed with `pulldown-cmark` and turned into styled ratatui
//! lines. Raw HTML is dropped and every piece of text passes through
//! [`sanitize_text`] first, so nothing in a reply can reach the terminal as a
//! control sequence.

mod render;
mod sanitize;


pub use render::{render_markdown, render_plain};
pub use sanitize::sanitize_text;
