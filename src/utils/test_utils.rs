use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::core::app::ChatController;
use crate::core::completion::{CompletionBackend, CompletionError};
use crate::core::credential::Credential;
use crate::core::notification::{Notification, Notifier};
use crate::core::speech::{SessionId, SpeechError, SpeechEvent, SpeechRecognizer};
use crate::ui::appearance::Appearance;

/// Keeps every notification it receives.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    seen: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<Notification> {
        self.seen.lock().expect("notifier lock").clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.notifications()
            .into_iter()
            .map(|notification| notification.title)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().expect("notifier lock").push(notification);
    }
}

/// Answers from a script, one entry per call, and records what it was asked.
#[derive(Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Result<String, CompletionError>>>,
    requests: Mutex<Vec<(String, String)>>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<Result<String, CompletionError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        })
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn failing(err: CompletionError) -> Arc<Self> {
        Self::new(vec![Err(err)])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(user_text, credential)` for every call, in order.
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().expect("requests lock").clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, user_text: &str, credential: &str) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .expect("requests lock")
            .push((user_text.to_string(), credential.to_string()));
        self.replies
            .lock()
            .expect("replies lock")
            .pop_front()
            .unwrap_or_else(|| Err(CompletionError::Network("script exhausted".to_string())))
    }
}

#[derive(Default)]
struct FakeRecognizerState {
    starts: Vec<SessionId>,
    stops: usize,
    fail_next_start: Option<String>,
    sender: Option<mpsc::UnboundedSender<SpeechEvent>>,
}

/// In-memory recognizer. The paired [`FakeRecognizerHandle`] drives it.
pub struct FakeRecognizer {
    state: Arc<Mutex<FakeRecognizerState>>,
}

#[derive(Clone)]
pub struct FakeRecognizerHandle {
    state: Arc<Mutex<FakeRecognizerState>>,
}

impl FakeRecognizer {
    pub fn new() -> (Self, FakeRecognizerHandle) {
        let state = Arc::new(Mutex::new(FakeRecognizerState::default()));
        (
            Self {
                state: Arc::clone(&state),
            },
            FakeRecognizerHandle { state },
        )
    }
}

impl SpeechRecognizer for FakeRecognizer {
    fn start(
        &mut self,
        session: SessionId,
        events: mpsc::UnboundedSender<SpeechEvent>,
    ) -> Result<(), SpeechError> {
        let mut state = self.state.lock().expect("recognizer lock");
        if let Some(message) = state.fail_next_start.take() {
            return Err(SpeechError::Spawn(message));
        }
        state.starts.push(session);
        state.sender = Some(events);
        Ok(())
    }

    fn stop(&mut self) {
        let mut state = self.state.lock().expect("recognizer lock");
        state.stops += 1;
        state.sender = None;
    }
}

impl FakeRecognizerHandle {
    pub fn starts(&self) -> Vec<SessionId> {
        self.state.lock().expect("recognizer lock").starts.clone()
    }

    pub fn stops(&self) -> usize {
        self.state.lock().expect("recognizer lock").stops
    }

    pub fn last_session(&self) -> SessionId {
        *self.starts().last().expect("recognizer was never started")
    }

    /// Send an event for the running session. Returns false once stopped.
    pub fn emit(&self, event: SpeechEvent) -> bool {
        let state = self.state.lock().expect("recognizer lock");
        match &state.sender {
            Some(sender) => sender.send(event).is_ok(),
            None => false,
        }
    }

    pub fn fail_next_start(&self, message: &str) {
        self.state.lock().expect("recognizer lock").fail_next_start = Some(message.to_string());
    }
}

/// Controller wired to test doubles, with a credential already configured.
pub fn create_test_controller(
    backend: Arc<dyn CompletionBackend>,
) -> (ChatController, RecordingNotifier) {
    let notifier = RecordingNotifier::default();
    let controller = ChatController::new(
        backend,
        Arc::new(notifier.clone()),
        Credential::new(Some("sk-test".to_string())),
        Appearance::Light,
    );
    (controller, notifier)
}

/// A request captured by [`spawn_http_server`].
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: u16,
    pub body: String,
}

impl CannedResponse {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }
}

/// Serve one canned response per incoming connection, in order, then stop.
/// The handle yields every request that was received.
pub async fn spawn_http_server(
    responses: Vec<CannedResponse>,
) -> (String, JoinHandle<Vec<CapturedRequest>>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("listener should bind");
    let addr = listener.local_addr().expect("local addr should resolve");

    let handle = tokio::spawn(async move {
        let mut captured = Vec::new();
        for response in responses {
            let (mut stream, _) = listener.accept().await.expect("accept connection");
            let request = read_http_request(&mut stream)
                .await
                .expect("request should parse");
            captured.push(request);

            let reason = if response.status < 400 { "OK" } else { "Error" };
            let payload = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                response.status,
                reason,
                response.body.len(),
                response.body
            );
            stream
                .write_all(payload.as_bytes())
                .await
                .expect("write response");
            let _ = stream.shutdown().await;
        }
        captured
    });

    (format!("http://{addr}"), handle)
}

pub async fn read_http_request(stream: &mut TcpStream) -> Result<CapturedRequest, String> {
    let mut buffer = Vec::new();
    let header_end = loop {
        let mut chunk = [0_u8; 1024];
        let read = stream.read(&mut chunk).await.map_err(|err| err.to_string())?;
        if read == 0 {
            return Err("Unexpected EOF while reading HTTP headers".to_string());
        }
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(index) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
            break index + 4;
        }
    };

    let header_text =
        std::str::from_utf8(&buffer[..header_end]).map_err(|err| err.to_string())?;
    let mut lines = header_text.split("\r\n").filter(|line| !line.is_empty());
    let request_line = lines
        .next()
        .ok_or_else(|| "Missing HTTP request line".to_string())?
        .to_string();

    let mut headers = Vec::new();
    let mut content_length = 0_usize;
    for line in lines {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim().to_string();
        if name.eq_ignore_ascii_case("content-length") {
            content_length = value.parse::<usize>().map_err(|err| err.to_string())?;
        }
        headers.push((name.to_string(), value));
    }

    let mut body = buffer[header_end..].to_vec();
    while body.len() < content_length {
        let mut chunk = vec![0_u8; content_length - body.len()];
        let read = stream.read(&mut chunk).await.map_err(|err| err.to_string())?;
        if read == 0 {
            return Err("Unexpected EOF while reading HTTP body".to_string());
        }
        body.extend_from_slice(&chunk[..read]);
    }
    body.truncate(content_length);

    Ok(CapturedRequest {
        request_line,
        headers,
        body,
    })
}
