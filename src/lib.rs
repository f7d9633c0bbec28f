//! Oye is a terminal chat client for hosted chat-completion endpoints, with
//! optional voice input.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation: the [`core::app::ChatController`], the
//!   completion client, credentials, configuration and the speech adapter.
//! - [`ui`] renders the terminal interface and runs the event loop that feeds
//!   user input and background results into the controller.
//! - [`commands`] implements the slash commands typed into the input box.
//! - [`api`] defines the chat-completion wire payloads.
//!
//! The binary (`src/main.rs`) routes through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
