//! Command-line interface parsing and handling
//!
//! This module parses arguments, loads configuration, builds the
//! [`ChatController`] and dispatches to the chat UI, the one-shot `say`
//! command or the configuration printer.

pub mod say;

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing::info;

use crate::core::app::ChatController;
use crate::core::completion::CompletionClient;
use crate::core::config::{path_display, Config};
use crate::core::credential::Credential;
use crate::core::notification::{Notification, Notifier};
use crate::core::speech::{CommandRecognizer, SpeechRecognizer};
use crate::ui::chat_loop::run_chat;
use crate::utils::logging::init_file_logging;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("VERGEN_GIT_DESCRIBE"),
    ")"
);

#[derive(Parser)]
#[command(name = "oye")]
#[command(version = LONG_VERSION)]
#[command(about = "A terminal chat interface for hosted chat-completion APIs")]
#[command(
    long_about = "Oye is a full-screen terminal chat interface. Each message is sent to a \
chat-completion endpoint (OpenRouter by default) together with a fixed system prompt, and \
the reply is rendered as markdown.\n\n\
Environment Variables:\n\
  OPENROUTER_API_KEY  API key used when none has been set with /key\n\
  OYE_LOG             Log filter for --log-file (default: info)\n\n\
Controls:\n\
  Enter               Send the message\n\
  Alt+Enter           Insert a newline\n\
  Tab                 Cycle quick-prompt suggestions (empty chat only)\n\
  Up/Down/PgUp/PgDn   Scroll through chat history\n\
  Ctrl+L              Clear the chat\n\
  F2                  Toggle dark mode\n\
  F3                  Start or stop voice input\n\
  Ctrl+C              Quit\n\n\
Commands:\n\
  /clear /theme /voice /key <value> /about /help"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Read configuration from this file instead of the default location
    #[arg(short = 'c', long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write diagnostic logs to this file
    #[arg(short = 'l', long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Send a single message and print the reply
    Say {
        /// The message to send
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        prompt: Vec<String>,
    },
    /// Print the resolved configuration
    Config,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if let Some(path) = args.log_file.as_deref() {
        if let Err(e) = init_file_logging(path) {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    }

    let (config, config_path) = match Config::load(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };
    info!(path = %path_display(&config_path), "configuration loaded");

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let (notification_tx, notification_rx) = mpsc::unbounded_channel::<Notification>();
            let controller = build_controller(&config, Arc::new(notification_tx), true);
            run_chat(controller, notification_rx, config.markdown_enabled()).await
        }
        Commands::Say { prompt } => say::run_say(&config, prompt).await,
        Commands::Config => {
            print_config(&config, &config_path);
            Ok(())
        }
    }
}

/// Wire a controller from configuration. Voice input is only probed for
/// interactive sessions.
pub fn build_controller(
    config: &Config,
    notifier: Arc<dyn Notifier>,
    with_voice: bool,
) -> ChatController {
    let backend = Arc::new(CompletionClient::new(config.completion_settings()));
    let appearance = config.appearance_preference().resolve();
    let controller = ChatController::new(backend, notifier, Credential::from_env(), appearance);

    if !with_voice {
        return controller;
    }
    let recognizer = CommandRecognizer::detect(config.speech_command())
        .map(|recognizer| Box::new(recognizer) as Box<dyn SpeechRecognizer>);
    match &recognizer {
        Some(_) => info!("voice input available"),
        None => info!("no speech recognizer found; voice input disabled"),
    }
    controller.with_recognizer(recognizer)
}

fn print_config(config: &Config, path: &Path) {
    config.print_all(path, &Credential::from_env());
}
