use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::core::completion::{CompletionBackend, CompletionError};
use crate::core::constants::GENERIC_SEND_FAILURE;
use crate::core::credential::Credential;
use crate::core::message::{Message, MessageFactory};
use crate::core::notification::{Notification, Notifier};
use crate::core::speech::{SessionId, SpeechEvent, SpeechRecognizer, TranscriptAccumulator};
use crate::ui::appearance::Appearance;

const TRANSCRIPT_CHANNEL_CAPACITY: usize = 64;

/// How a send attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input; nothing happened.
    Ignored,
    /// Another request is still pending.
    Busy,
    /// No credential resolved; nothing was sent.
    MissingCredential,
    /// The assistant reply was appended.
    Replied,
    /// The request failed and the user was notified.
    Failed,
}

/// First half of a send. Either the attempt is already over, or a request is
/// ready to be dispatched.
pub enum SendStart {
    Finished(SendOutcome),
    Dispatched(PendingCompletion),
}

/// A completion request that has been recorded by the controller but not yet
/// run. Resolving it yields a [`CompletionResult`] for
/// [`ChatController::finish_send`].
pub struct PendingCompletion {
    ticket: u64,
    user_text: String,
    credential: String,
    backend: Arc<dyn CompletionBackend>,
}

#[derive(Debug)]
pub struct CompletionResult {
    pub ticket: u64,
    pub result: Result<String, CompletionError>,
}

impl PendingCompletion {
    pub fn ticket(&self) -> u64 {
        self.ticket
    }

    pub fn user_text(&self) -> &str {
        &self.user_text
    }

    /// Run the request on its own task. A panic inside the backend still
    /// produces a result.
    pub async fn resolve(self) -> CompletionResult {
        let ticket = self.ticket;
        let task = tokio::spawn(async move {
            self.backend
                .complete(&self.user_text, &self.credential)
                .await
        });
        let result = match task.await {
            Ok(result) => result,
            Err(err) => {
                warn!(ticket, error = %err, "completion task did not finish");
                Err(CompletionError::Aborted(err.to_string()))
            }
        };
        CompletionResult { ticket, result }
    }

    /// Resolve in the background and deliver the result on `results`.
    pub fn spawn(self, results: mpsc::UnboundedSender<CompletionResult>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let result = self.resolve().await;
            let _ = results.send(result);
        })
    }
}

/// Owns the conversation and everything the user can change about it.
///
/// There is exactly one writer: whoever owns the controller. Background work
/// (completions, speech sessions) reports back through channels.
pub struct ChatController {
    messages: Vec<Message>,
    factory: MessageFactory,
    pending: Option<u64>,
    next_ticket: u64,
    credential: Credential,
    backend: Arc<dyn CompletionBackend>,
    notifier: Arc<dyn Notifier>,
    appearance: watch::Sender<Appearance>,
    recognizer: Option<Box<dyn SpeechRecognizer>>,
    speech_tx: mpsc::UnboundedSender<SpeechEvent>,
    speech_rx: Option<mpsc::UnboundedReceiver<SpeechEvent>>,
    listening: bool,
    active_session: Option<SessionId>,
    next_session: SessionId,
    transcript: TranscriptAccumulator,
    transcript_tx: broadcast::Sender<String>,
}

impl ChatController {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        notifier: Arc<dyn Notifier>,
        credential: Credential,
        appearance: Appearance,
    ) -> Self {
        let (appearance_tx, _) = watch::channel(appearance);
        let (speech_tx, speech_rx) = mpsc::unbounded_channel();
        let (transcript_tx, _) = broadcast::channel(TRANSCRIPT_CHANNEL_CAPACITY);
        Self {
            messages: Vec::new(),
            factory: MessageFactory::new(),
            pending: None,
            next_ticket: 0,
            credential,
            backend,
            notifier,
            appearance: appearance_tx,
            recognizer: None,
            speech_tx,
            speech_rx: Some(speech_rx),
            listening: false,
            active_session: None,
            next_session: 1,
            transcript: TranscriptAccumulator::new(),
            transcript_tx,
        }
    }

    pub fn with_recognizer(mut self, recognizer: Option<Box<dyn SpeechRecognizer>>) -> Self {
        self.recognizer = recognizer;
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn appearance(&self) -> Appearance {
        *self.appearance.borrow()
    }

    pub fn is_dark_mode(&self) -> bool {
        self.appearance().is_dark()
    }

    pub fn api_key(&self) -> &str {
        self.credential.stored()
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn voice_supported(&self) -> bool {
        self.recognizer.is_some()
    }

    pub fn current_transcript(&self) -> String {
        self.transcript.transcript()
    }

    pub fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }

    /// Appearance changes, for whoever paints the screen.
    pub fn subscribe_appearance(&self) -> watch::Receiver<Appearance> {
        self.appearance.subscribe()
    }

    /// Running transcript after every recognized fragment.
    pub fn subscribe_transcripts(&self) -> broadcast::Receiver<String> {
        self.transcript_tx.subscribe()
    }

    /// Speech events to feed back into [`handle_speech_event`](Self::handle_speech_event).
    /// Can be taken once.
    pub fn take_speech_events(&mut self) -> Option<mpsc::UnboundedReceiver<SpeechEvent>> {
        self.speech_rx.take()
    }

    /// Send one user turn and wait for the reply.
    pub async fn send_message(&mut self, text: &str) -> SendOutcome {
        match self.begin_send(text) {
            SendStart::Finished(outcome) => outcome,
            SendStart::Dispatched(pending) => {
                let result = pending.resolve().await;
                self.finish_send(result)
            }
        }
    }

    /// Validate the input, append the user message and mark the request as
    /// pending. The caller runs the returned request and hands its result to
    /// [`finish_send`](Self::finish_send).
    pub fn begin_send(&mut self, text: &str) -> SendStart {
        if text.trim().is_empty() {
            return SendStart::Finished(SendOutcome::Ignored);
        }

        if self.pending.is_some() {
            debug!("send rejected while a request is pending");
            self.notifier.notify(Notification::request_pending());
            return SendStart::Finished(SendOutcome::Busy);
        }

        let Some(credential) = self.credential.resolve().map(str::to_owned) else {
            info!("send attempted without a credential");
            self.notifier.notify(Notification::api_key_missing());
            return SendStart::Finished(SendOutcome::MissingCredential);
        };

        self.messages.push(self.factory.user(text));

        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.pending = Some(ticket);
        debug!(ticket, chars = text.chars().count(), "completion pending");

        SendStart::Dispatched(PendingCompletion {
            ticket,
            user_text: text.to_string(),
            credential,
            backend: Arc::clone(&self.backend),
        })
    }

    /// Apply the result of a request started by [`begin_send`](Self::begin_send).
    pub fn finish_send(&mut self, completion: CompletionResult) -> SendOutcome {
        if self.pending == Some(completion.ticket) {
            self.pending = None;
        } else {
            warn!(
                ticket = completion.ticket,
                "completion result does not match the pending request"
            );
        }

        match completion.result {
            Ok(reply) => {
                info!(ticket = completion.ticket, "completion received");
                self.messages.push(self.factory.assistant(reply));
                SendOutcome::Replied
            }
            Err(err) => {
                warn!(ticket = completion.ticket, error = %err, "completion failed");
                let mut description = err.to_string();
                if description.trim().is_empty() {
                    description = GENERIC_SEND_FAILURE.to_string();
                }
                self.notifier.notify(Notification::request_failed(description));
                SendOutcome::Failed
            }
        }
    }

    /// Drop every message. A request that is still pending is left alone and
    /// its reply will be appended when it arrives.
    pub fn clear_chat(&mut self) {
        info!(removed = self.messages.len(), "chat cleared");
        self.messages.clear();
        self.notifier.notify(Notification::chat_cleared());
    }

    pub fn toggle_dark_mode(&mut self) -> Appearance {
        let next = self.appearance().toggled();
        self.appearance.send_replace(next);
        debug!(appearance = next.as_str(), "appearance toggled");
        next
    }

    pub fn set_api_key(&mut self, key: impl Into<String>) {
        self.credential.set(key);
        info!("api key updated");
    }

    /// Returns whether a session was started.
    pub fn start_voice_input(&mut self) -> bool {
        let Some(recognizer) = self.recognizer.as_mut() else {
            self.notifier.notify(Notification::voice_unsupported());
            return false;
        };

        let session = self.next_session;
        self.next_session += 1;
        self.transcript.clear();

        match recognizer.start(session, self.speech_tx.clone()) {
            Ok(()) => {
                self.active_session = Some(session);
                true
            }
            Err(err) => {
                warn!(session, error = %err, "voice input failed to start");
                self.active_session = None;
                self.listening = false;
                self.notifier
                    .notify(Notification::voice_error(&err.to_string()));
                false
            }
        }
    }

    pub fn stop_voice_input(&mut self) {
        if let Some(recognizer) = self.recognizer.as_mut() {
            recognizer.stop();
        }
        if let Some(session) = self.active_session.take() {
            debug!(session, "voice input stopped");
        }
        self.listening = false;
    }

    pub fn toggle_voice_input(&mut self) {
        if self.listening {
            self.stop_voice_input();
        } else {
            self.start_voice_input();
        }
    }

    /// Apply one event from the recognizer. Events from sessions that were
    /// stopped or replaced are ignored.
    pub fn handle_speech_event(&mut self, event: SpeechEvent) {
        if self.active_session != Some(event.session()) {
            debug!(session = event.session(), "ignoring stale speech event");
            return;
        }

        match event {
            SpeechEvent::Started { .. } => {
                self.listening = true;
            }
            SpeechEvent::Fragment { text, is_final, .. } => {
                self.transcript.push(&text, is_final);
                let _ = self.transcript_tx.send(self.transcript.transcript());
            }
            SpeechEvent::Error { error, .. } => {
                // A failed session ends; the recognizer must not keep capturing.
                if let Some(recognizer) = self.recognizer.as_mut() {
                    recognizer.stop();
                }
                self.listening = false;
                self.active_session = None;
                self.notifier.notify(Notification::voice_error(&error));
            }
            SpeechEvent::Ended { .. } => {
                self.listening = false;
                self.active_session = None;
            }
        }
    }
}
