//! Voice input.
//!
//! A recognizer runs one session at a time and reports what it hears as
//! [`SpeechEvent`]s on a channel. Every event carries the session id it was
//! produced for, so consumers can drop leftovers from a session they already
//! stopped.

use std::fmt;
use std::path::Path;
use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub type SessionId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    Started {
        session: SessionId,
    },
    Fragment {
        session: SessionId,
        text: String,
        is_final: bool,
    },
    Error {
        session: SessionId,
        error: String,
    },
    Ended {
        session: SessionId,
    },
}

impl SpeechEvent {
    pub fn session(&self) -> SessionId {
        match self {
            SpeechEvent::Started { session }
            | SpeechEvent::Fragment { session, .. }
            | SpeechEvent::Error { session, .. }
            | SpeechEvent::Ended { session } => *session,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechError {
    /// No recognizer command is configured or it is not installed.
    Unavailable,
    /// The recognizer could not be launched.
    Spawn(String),
}

impl fmt::Display for SpeechError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpeechError::Unavailable => write!(f, "speech recognition is not available"),
            SpeechError::Spawn(message) => write!(f, "failed to start recognizer: {message}"),
        }
    }
}

impl std::error::Error for SpeechError {}

/// A platform speech capability.
pub trait SpeechRecognizer: Send {
    /// Begin a session. Events for it are sent on `events` until it ends or
    /// [`stop`](Self::stop) is called.
    fn start(
        &mut self,
        session: SessionId,
        events: mpsc::UnboundedSender<SpeechEvent>,
    ) -> Result<(), SpeechError>;

    /// End the current session, if any. No further events are sent for it.
    fn stop(&mut self);
}

/// Running transcript for one listening session: every final fragment in
/// arrival order, followed by the latest interim one.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TranscriptAccumulator {
    finals: Vec<String>,
    interim: String,
}

impl TranscriptAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, text: &str, is_final: bool) {
        if is_final {
            self.interim.clear();
            if !text.is_empty() {
                self.finals.push(text.to_string());
            }
        } else {
            self.interim = text.to_string();
        }
    }

    /// Recognizer lines carry no trailing whitespace, so fragments are
    /// joined with a single space.
    pub fn transcript(&self) -> String {
        let interim = (!self.interim.is_empty()).then_some(self.interim.as_str());
        self.finals
            .iter()
            .map(String::as_str)
            .chain(interim)
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn clear(&mut self) {
        self.finals.clear();
        self.interim.clear();
    }
}

/// Parse one line of recognizer output.
///
/// `partial:` lines are interim fragments, `final:` lines are final ones and
/// `error:` lines report a recognition failure. Any other non-blank line is
/// taken as a final fragment.
pub fn parse_recognizer_line(session: SessionId, line: &str) -> Option<SpeechEvent> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return None;
    }

    let event = if let Some(text) = line.strip_prefix("partial:") {
        SpeechEvent::Fragment {
            session,
            text: text.trim().to_string(),
            is_final: false,
        }
    } else if let Some(text) = line.strip_prefix("final:") {
        SpeechEvent::Fragment {
            session,
            text: text.trim().to_string(),
            is_final: true,
        }
    } else if let Some(error) = line.strip_prefix("error:") {
        SpeechEvent::Error {
            session,
            error: error.trim().to_string(),
        }
    } else {
        SpeechEvent::Fragment {
            session,
            text: line.trim().to_string(),
            is_final: true,
        }
    };
    Some(event)
}

/// Runs an external recognizer program and reads transcript lines from its
/// standard output.
pub struct CommandRecognizer {
    command: Vec<String>,
    cancel: Option<CancellationToken>,
}

impl CommandRecognizer {
    pub fn new(command: Vec<String>) -> Self {
        Self {
            command,
            cancel: None,
        }
    }

    /// Build a recognizer for `command` if it can actually run here.
    pub fn detect(command: Option<&[String]>) -> Option<Self> {
        let command = command?;
        if Self::probe(command) {
            info!(program = %command[0], "speech recognizer available");
            Some(Self::new(command.to_vec()))
        } else {
            debug!("no usable speech recognizer configured");
            None
        }
    }

    /// True when the command names a program that exists on disk or `PATH`.
    pub fn probe(command: &[String]) -> bool {
        match command.first() {
            Some(program) if !program.trim().is_empty() => program_exists(program),
            _ => false,
        }
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }
}

impl SpeechRecognizer for CommandRecognizer {
    fn start(
        &mut self,
        session: SessionId,
        events: mpsc::UnboundedSender<SpeechEvent>,
    ) -> Result<(), SpeechError> {
        self.stop();

        let (program, args) = self.command.split_first().ok_or(SpeechError::Unavailable)?;
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|err| SpeechError::Spawn(err.to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| SpeechError::Spawn("recognizer output is not readable".to_string()))?;

        let token = CancellationToken::new();
        self.cancel = Some(token.clone());

        info!(session, %program, "speech session started");
        let _ = events.send(SpeechEvent::Started { session });
        tokio::spawn(run_session(session, child, stdout, token, events));
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(token) = self.cancel.take() {
            token.cancel();
        }
    }
}

impl Drop for CommandRecognizer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_session(
    session: SessionId,
    mut child: Child,
    stdout: ChildStdout,
    cancel: CancellationToken,
    events: mpsc::UnboundedSender<SpeechEvent>,
) {
    let mut lines = BufReader::new(stdout).lines();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = child.kill().await;
                debug!(session, "speech session stopped");
                return;
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if let Some(event) = parse_recognizer_line(session, &line) {
                        let failed = matches!(event, SpeechEvent::Error { .. });
                        if events.send(event).is_err() {
                            let _ = child.kill().await;
                            return;
                        }
                        // A reported error ends the session.
                        if failed {
                            let _ = child.kill().await;
                            warn!(session, "recognizer reported an error");
                            let _ = events.send(SpeechEvent::Ended { session });
                            return;
                        }
                    }
                }
                Ok(None) => break,
                Err(err) => {
                    warn!(session, error = %err, "failed to read recognizer output");
                    let _ = events.send(SpeechEvent::Error {
                        session,
                        error: err.to_string(),
                    });
                    break;
                }
            }
        }
    }

    match child.wait().await {
        Ok(status) if !status.success() => {
            warn!(session, %status, "recognizer exited unsuccessfully");
            let _ = events.send(SpeechEvent::Error {
                session,
                error: format!("recognizer exited with {status}"),
            });
        }
        Ok(_) => {}
        Err(err) => {
            let _ = events.send(SpeechEvent::Error {
                session,
                error: err.to_string(),
            });
        }
    }

    info!(session, "speech session ended");
    let _ = events.send(SpeechEvent::Ended { session });
}

fn program_exists(program: &str) -> bool {
    let path = Path::new(program);
    if path.components().count() > 1 {
        return path.is_file();
    }

    let Some(paths) = std::env::var_os("PATH") else {
        return false;
    };
    std::env::split_paths(&paths).any(|dir| {
        let candidate = dir.join(program);
        candidate.is_file() || (cfg!(windows) && candidate.with_extension("exe").is_file())
    })
}
