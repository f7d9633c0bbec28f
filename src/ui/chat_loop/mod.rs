//! Main chat event loop.
//!
//! Terminal input, completion results, speech events, notifications and
//! controller broadcasts are all funnelled into one `select!` so the
//! controller only ever has a single writer.

mod keybindings;
mod lifecycle;

use self::keybindings::{map_key, KeyAction};
use self::lifecycle::{restore_terminal, setup_terminal};

use crate::commands::{process_input, CommandResult};
use crate::core::app::{ChatController, CompletionResult, PendingCompletion, SendStart};
use crate::core::notification::Notification;
use crate::core::speech::SpeechEvent;
use crate::ui::renderer::ui;
use crate::ui::view::ChatView;
use ratatui::crossterm::event::{self, Event, KeyEventKind};
use std::{
    error::Error,
    time::{Duration, Instant},
};
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tui_textarea::Input as TAInput;

const TICK: Duration = Duration::from_millis(250);

/// What the loop has to do after a key press besides redrawing.
#[derive(Default)]
struct KeyOutcome {
    dispatch: Option<PendingCompletion>,
}

pub async fn run_chat(
    mut controller: ChatController,
    mut notifications: mpsc::UnboundedReceiver<Notification>,
    markdown: bool,
) -> Result<(), Box<dyn Error>> {
    let mut terminal = setup_terminal()?;
    let mut view = ChatView::new(controller.appearance(), markdown);

    let cancel = CancellationToken::new();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();
    let event_reader_handle = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            while !cancel.is_cancelled() {
                // Short poll so the task notices cancellation.
                if let Ok(true) = event::poll(Duration::from_millis(10)) {
                    match event::read() {
                        Ok(ev) => {
                            if event_tx.send(ev).is_err() {
                                break;
                            }
                        }
                        Err(_) => continue,
                    }
                } else {
                    tokio::task::yield_now().await;
                }
            }
        })
    };

    let (result_tx, mut result_rx) = mpsc::unbounded_channel::<CompletionResult>();
    let mut speech_events = controller.take_speech_events();
    let mut transcripts = controller.subscribe_transcripts();
    let mut appearance = controller.subscribe_appearance();
    let mut tick = tokio::time::interval(TICK);

    info!("chat session started");
    let outcome: Result<(), Box<dyn Error>> = loop {
        if let Err(err) = terminal.draw(|f| ui(f, &mut view, &controller)) {
            break Err(err.into());
        }

        tokio::select! {
            Some(ev) = event_rx.recv() => {
                handle_terminal_event(ev, &mut view, &mut controller, &result_tx);
            }
            Some(result) = result_rx.recv() => {
                controller.finish_send(result);
                view.scroll_to_bottom();
            }
            Some(event) = next_speech_event(&mut speech_events) => {
                controller.handle_speech_event(event);
            }
            Some(notification) = notifications.recv() => {
                view.push_notification(notification);
            }
            update = transcripts.recv() => {
                apply_transcript(update, &mut view, &controller);
            }
            Ok(()) = appearance.changed() => {
                let next = *appearance.borrow_and_update();
                view.set_appearance(next);
            }
            _ = tick.tick() => {
                view.toasts.prune(Instant::now());
                if controller.is_loading() {
                    view.advance_typing_indicator();
                }
            }
        }

        if view.exit_requested {
            break Ok(());
        }
    };

    cancel.cancel();
    let _ = event_reader_handle.await;
    controller.stop_voice_input();
    restore_terminal(&mut terminal)?;
    info!("chat session ended");
    outcome
}

async fn next_speech_event(
    events: &mut Option<mpsc::UnboundedReceiver<SpeechEvent>>,
) -> Option<SpeechEvent> {
    match events {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

/// Transcript updates only land in the input while a session is live.
fn apply_transcript(
    update: Result<String, broadcast::error::RecvError>,
    view: &mut ChatView,
    controller: &ChatController,
) {
    match update {
        Ok(text) if controller.is_listening() => view.set_input(&text),
        Ok(_) => {}
        Err(err) => debug!(error = %err, "transcript update dropped"),
    }
}

fn handle_terminal_event(
    ev: Event,
    view: &mut ChatView,
    controller: &mut ChatController,
    results: &mpsc::UnboundedSender<CompletionResult>,
) {
    match ev {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            let outcome = handle_key(map_key(key), view, controller);
            if let Some(pending) = outcome.dispatch {
                pending.spawn(results.clone());
            }
        }
        Event::Paste(text) => {
            view.textarea.insert_str(text.replace('\r', ""));
        }
        _ => {}
    }
}

fn handle_key(
    action: KeyAction,
    view: &mut ChatView,
    controller: &mut ChatController,
) -> KeyOutcome {
    let mut outcome = KeyOutcome::default();
    match action {
        KeyAction::Quit => view.exit_requested = true,
        KeyAction::Send => outcome.dispatch = submit_input(view, controller),
        KeyAction::Newline => view.textarea.insert_newline(),
        KeyAction::ClearChat => {
            controller.clear_chat();
            view.scroll_to_bottom();
        }
        KeyAction::ToggleTheme => {
            controller.toggle_dark_mode();
        }
        KeyAction::ToggleVoice => controller.toggle_voice_input(),
        KeyAction::CycleSuggestion => {
            if controller.messages().is_empty() {
                view.cycle_suggestion();
            }
        }
        KeyAction::ScrollUp | KeyAction::ScrollDown if view.input_line_count() > 1 => {
            let key = if action == KeyAction::ScrollUp {
                tui_textarea::Key::Up
            } else {
                tui_textarea::Key::Down
            };
            view.textarea.input(TAInput {
                key,
                ctrl: false,
                alt: false,
                shift: false,
            });
        }
        KeyAction::ScrollUp => view.scroll_up(1),
        KeyAction::ScrollDown => view.scroll_down(1),
        KeyAction::PageUp => view.page_up(),
        KeyAction::PageDown => view.page_down(),
        KeyAction::ScrollToBottom => view.scroll_to_bottom(),
        KeyAction::Input(key) => {
            view.textarea.input(TAInput::from(key));
        }
    }
    outcome
}

/// Slash commands run immediately. Anything else is sent unless the input is
/// blank or a reply is still pending.
fn submit_input(
    view: &mut ChatView,
    controller: &mut ChatController,
) -> Option<PendingCompletion> {
    let input = view.input_text();
    let text = match process_input(controller, &input) {
        CommandResult::Continue => {
            view.clear_input();
            return None;
        }
        CommandResult::ProcessAsMessage(text) => text,
    };
    if text.trim().is_empty() || controller.is_loading() {
        return None;
    }

    if controller.is_listening() {
        controller.stop_voice_input();
    }
    match controller.begin_send(&text) {
        SendStart::Dispatched(pending) => {
            view.clear_input();
            view.scroll_to_bottom();
            Some(pending)
        }
        SendStart::Finished(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::credential::Credential;
    use crate::ui::appearance::Appearance;
    use crate::utils::test_utils::{
        create_test_controller, FakeRecognizer, RecordingNotifier, ScriptedBackend,
    };
    use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::sync::Arc;

    fn type_text(view: &mut ChatView, controller: &mut ChatController, text: &str) {
        for ch in text.chars() {
            let key = KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE);
            handle_key(map_key(key), view, controller);
        }
    }

    fn press(view: &mut ChatView, controller: &mut ChatController, code: KeyCode) -> KeyOutcome {
        handle_key(map_key(KeyEvent::new(code, KeyModifiers::NONE)), view, controller)
    }

    #[tokio::test]
    async fn enter_dispatches_and_clears_the_input() {
        let backend = ScriptedBackend::replying("Bananas are berries.");
        let (mut controller, _notifier) = create_test_controller(backend.clone());
        let mut view = ChatView::new(controller.appearance(), true);

        type_text(&mut view, &mut controller, "fun fact");
        let pending = press(&mut view, &mut controller, KeyCode::Enter)
            .dispatch
            .expect("request dispatched");

        assert_eq!(view.input_text(), "");
        assert!(controller.is_loading());
        assert_eq!(controller.messages().len(), 1);

        let result = pending.resolve().await;
        controller.finish_send(result);
        assert_eq!(controller.messages()[1].text(), "Bananas are berries.");
        assert_eq!(
            backend.requests(),
            vec![("fun fact".to_string(), "sk-test".to_string())]
        );
    }

    #[test]
    fn enter_does_nothing_while_blank_or_pending() {
        let (mut controller, notifier) = create_test_controller(ScriptedBackend::replying("x"));
        let mut view = ChatView::new(controller.appearance(), true);

        assert!(press(&mut view, &mut controller, KeyCode::Enter).dispatch.is_none());

        let _first = controller.begin_send("first");
        type_text(&mut view, &mut controller, "second");
        assert!(press(&mut view, &mut controller, KeyCode::Enter).dispatch.is_none());

        assert_eq!(view.input_text(), "second");
        assert_eq!(controller.messages().len(), 1);
        assert!(notifier.notifications().is_empty());
    }

    #[test]
    fn missing_credential_keeps_the_draft() {
        let notifier = RecordingNotifier::default();
        let mut controller = ChatController::new(
            ScriptedBackend::replying("x"),
            Arc::new(notifier.clone()),
            Credential::new(None),
            Appearance::Light,
        );
        let mut view = ChatView::new(controller.appearance(), true);

        type_text(&mut view, &mut controller, "hello");
        let outcome = press(&mut view, &mut controller, KeyCode::Enter);

        assert!(outcome.dispatch.is_none());
        assert_eq!(view.input_text(), "hello");
        assert_eq!(notifier.notifications(), vec![Notification::api_key_missing()]);
    }

    #[test]
    fn slash_commands_run_and_clear_the_input() {
        let (mut controller, _notifier) = create_test_controller(ScriptedBackend::replying("x"));
        let mut view = ChatView::new(controller.appearance(), true);

        type_text(&mut view, &mut controller, "/theme");
        let outcome = press(&mut view, &mut controller, KeyCode::Enter);

        assert!(outcome.dispatch.is_none());
        assert!(controller.is_dark_mode());
        assert_eq!(view.input_text(), "");
    }

    #[test]
    fn alt_enter_inserts_a_newline() {
        let (mut controller, _notifier) = create_test_controller(ScriptedBackend::replying("x"));
        let mut view = ChatView::new(controller.appearance(), true);

        type_text(&mut view, &mut controller, "a");
        handle_key(
            map_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT)),
            &mut view,
            &mut controller,
        );
        type_text(&mut view, &mut controller, "b");

        assert_eq!(view.input_text(), "a\nb");
    }

    #[test]
    fn tab_cycles_suggestions_only_on_an_empty_chat() {
        let (mut controller, _notifier) = create_test_controller(ScriptedBackend::replying("x"));
        let mut view = ChatView::new(controller.appearance(), true);

        press(&mut view, &mut controller, KeyCode::Tab);
        assert_eq!(view.input_text(), "Tell me a fun fact");

        let _pending = controller.begin_send("hi");
        view.clear_input();
        press(&mut view, &mut controller, KeyCode::Tab);
        assert_eq!(view.input_text(), "");
    }

    #[test]
    fn ctrl_c_requests_exit() {
        let (mut controller, _notifier) = create_test_controller(ScriptedBackend::replying("x"));
        let mut view = ChatView::new(controller.appearance(), true);

        handle_key(
            map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            &mut view,
            &mut controller,
        );

        assert!(view.exit_requested);
    }

    #[test]
    fn transcripts_fill_the_input_while_listening() {
        let (recognizer, handle) = FakeRecognizer::new();
        let (controller, _notifier) = create_test_controller(ScriptedBackend::replying("x"));
        let mut controller = controller.with_recognizer(Some(Box::new(recognizer)));
        let mut view = ChatView::new(controller.appearance(), true);
        let mut transcripts = controller.subscribe_transcripts();

        press(&mut view, &mut controller, KeyCode::F(3));
        let session = handle.last_session();
        controller.handle_speech_event(SpeechEvent::Started { session });
        controller.handle_speech_event(SpeechEvent::Fragment {
            session,
            text: "what time".to_string(),
            is_final: false,
        });

        let update = transcripts.try_recv().expect("transcript update");
        apply_transcript(Ok(update), &mut view, &controller);
        assert_eq!(view.input_text(), "what time");

        press(&mut view, &mut controller, KeyCode::F(3));
        assert!(!controller.is_listening());
        apply_transcript(Ok("late words".to_string()), &mut view, &controller);
        assert_eq!(view.input_text(), "what time");
    }
}
