//! TUI-less "say" command

use std::error::Error;
use std::sync::Arc;

use ratatui::crossterm::terminal;
use ratatui::style::Style;

use crate::cli::build_controller;
use crate::core::app::SendOutcome;
use crate::core::config::Config;
use crate::core::notification::StderrNotifier;
use crate::ui::appearance::Appearance;
use crate::ui::markdown::{render_markdown, render_plain};
use crate::ui::theme::Theme;
use crate::ui::wrap::wrap_lines;

pub async fn run_say(config: &Config, prompt: Vec<String>) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        eprintln!("Usage: oye say <prompt>");
        std::process::exit(1);
    }

    let mut controller = build_controller(config, Arc::new(StderrNotifier), false);
    match controller.send_message(&prompt).await {
        SendOutcome::Replied => {
            let reply = controller
                .messages()
                .last()
                .map(|message| message.text().to_string())
                .unwrap_or_default();
            let width = terminal::size().ok().map(|(w, _)| w as usize);
            for line in reply_lines(&reply, config.markdown_enabled(), width) {
                println!("{line}");
            }
            Ok(())
        }
        // The notifier has already explained what went wrong.
        _ => std::process::exit(1),
    }
}

/// Plain-text rows for a reply, wrapped to `width` when it is known.
pub fn reply_lines(reply: &str, markdown: bool, width: Option<usize>) -> Vec<String> {
    let lines = if markdown {
        render_markdown(reply, &Theme::for_appearance(Appearance::Light))
    } else {
        render_plain(reply, Style::default())
    };
    let lines = match width {
        Some(width) => wrap_lines(&lines, width),
        None => lines,
    };
    lines.iter().map(|line| line.to_string()).collect()
}
