//! Runtime: terminal lifecycle, the event loop, and the session that routes
//! bus events between the input component, the transcript and the flow engine.
//!
//! Event loop strategy
//! - Dedicated input thread blocks on terminal input and forwards events over
//!   a channel, so the async loop never polls the terminal itself.
//! - Smart ticking: fast interval (50 ms) while the input component has a
//!   pending timer; long interval (1 s) when idle.
//! - Every terminal event is translated into raw device events for the input
//!   component, after which the bus is pumped until it is empty.

use std::io::Stdout;
use std::path::PathBuf;
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use chatform_engine::FlowManager;
use chatform_types::FlowEvent;
use chatform_util::{InputConfig, expand_tilde};
use crossterm::{
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event, KeyCode, KeyEvent,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::layout::{Constraint, Layout};
use ratatui::{Frame, Terminal, prelude::CrosstermBackend};
use serde_json::Value;
use tokio::{
    signal,
    sync::mpsc,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::bus::{EventBus, EventPort};
use crate::timer::{Clock, SystemClock};
use crate::ui::components::{Component, TranscriptComponent, UserInputComponent};
use crate::ui::focus::NodeId;
use crate::ui::keys::{InputEvent, KeyStroke, KeyTransition, key_transitions};
use crate::ui::theme::{self, Theme};

/// Whether the event loop keeps running after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// One run through a form: the bus and everything attached to it.
#[derive(Debug)]
pub struct FormSession {
    bus: EventBus,
    input: UserInputComponent,
    transcript: TranscriptComponent,
    manager: FlowManager,
}

impl FormSession {
    pub fn new(manager: FlowManager, config: InputConfig, clock: Rc<dyn Clock>) -> Self {
        let mut bus = EventBus::new();
        let transcript = TranscriptComponent::new(manager.title().unwrap_or("chatform"));
        let mut input = UserInputComponent::new(config, clock);
        input.mount(&mut bus);
        for topic in FlowManager::topics() {
            bus.on(*topic);
        }
        Self {
            bus,
            input,
            transcript,
            manager,
        }
    }

    /// Presents the first question.
    pub fn start(&mut self) {
        for event in self.manager.start() {
            self.bus.emit(event);
        }
        self.pump();
    }

    pub fn is_complete(&self) -> bool {
        self.manager.is_complete()
    }

    /// Accepted answers keyed by question name.
    pub fn answers(&self) -> Value {
        self.manager.answers_json()
    }

    pub fn input(&self) -> &UserInputComponent {
        &self.input
    }

    pub fn transcript(&self) -> &TranscriptComponent {
        &self.transcript
    }

    /// Translates a terminal event into device events for the input component.
    pub fn handle_terminal_event(&mut self, event: Event) -> Control {
        match event {
            Event::Key(key) if is_quit(&key) => return Control::Quit,
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::FocusGained => {
                self.input.handle_input_event(InputEvent::WindowFocus, &mut self.bus);
                self.pump();
            }
            Event::FocusLost => {
                self.input.focus_node(NodeId::Outside);
            }
            _ => {}
        }
        Control::Continue
    }

    /// Replays a key press as down/up transitions. Each transition targets
    /// the node focused at the moment it is delivered.
    pub fn handle_key(&mut self, key: KeyEvent) {
        for transition in key_transitions(key) {
            let target = self.input.focused_node();
            let event = match transition {
                KeyTransition::Down(key) => InputEvent::KeyDown(KeyStroke::new(key, target)),
                KeyTransition::Up(key) => InputEvent::KeyUp(KeyStroke::new(key, target)),
            };
            self.input.handle_input_event(event, &mut self.bus);
            self.pump();
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }
        if let Some(node) = self.input.hit_test(mouse.column, mouse.row) {
            self.input.click(node, &mut self.bus);
            self.pump();
        }
    }

    /// Fires expired timers. Returns `true` when the screen needs a redraw.
    pub fn tick(&mut self) -> bool {
        let changed = self.input.poll_timers();
        self.pump();
        changed
    }

    /// Whether a timer is pending, so ticks should come quickly.
    pub fn needs_fast_ticks(&self) -> bool {
        self.input.next_deadline().is_some()
    }

    /// Delivers pending bus events, in emit order, until the bus is empty.
    fn pump(&mut self) {
        while let Some(event) = self.bus.next_event() {
            self.transcript.handle_flow_event(&event, &mut self.bus);
            self.input.handle_flow_event(&event, &mut self.bus);
            if FlowManager::topics().contains(&event.topic()) {
                for follow_up in self.manager.handle_event(&event) {
                    self.bus.emit(follow_up);
                }
            }
            if let FlowEvent::FileSelectionRequested { element } = event {
                self.select_file(element);
            }
        }
    }

    /// Terminal stand-in for a file picker: the typed text names the file.
    fn select_file(&mut self, element: usize) {
        let path: PathBuf = expand_tilde(self.input.surface().value());
        debug!(element, path = %path.display(), "file selection requested");
        self.input.complete_file_selection(element, &path, &mut self.bus);
    }

    pub fn render(&mut self, frame: &mut Frame, theme: &dyn Theme) {
        let input_height = self.input.preferred_height();
        let [transcript_area, input_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(input_height)]).areas(frame.area());
        self.transcript.render(frame, transcript_area, theme);
        self.input.render(frame, input_area, theme);
    }
}

fn is_quit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Esc || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Spawn a dedicated input thread that blocks on terminal input and forwards
/// `crossterm` events over a Tokio channel.
///
/// The thread stops once the receiving side is dropped.
fn spawn_input_thread() -> mpsc::Receiver<Event> {
    let (sender, receiver) = mpsc::channel(500);
    thread::spawn(move || {
        let poll_interval = Duration::from_millis(50);
        while !sender.is_closed() {
            match event::poll(poll_interval) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(e) => {
                    warn!("Failed to poll terminal events: {}", e);
                    break;
                }
            }
            match event::read() {
                Ok(event) => {
                    if sender.blocking_send(event).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Failed to read event: {}", e);
                    break;
                }
            }
        }
    });
    receiver
}

/// Put the terminal into raw mode and enter the alternate screen.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableFocusChange).context("enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

/// Restore terminal settings and leave the alternate screen.
fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture, DisableFocusChange)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Entry point for the TUI runtime: sets up the terminal, runs the form to
/// completion (or until the user quits), and restores the terminal.
///
/// Returns the accepted answers.
pub async fn run_app(manager: FlowManager, config: InputConfig) -> Result<Value> {
    let theme = theme::load();
    let mut session = FormSession::new(manager, config, Rc::new(SystemClock));
    let mut input_receiver = spawn_input_thread();
    let mut terminal = setup_terminal()?;

    session.start();
    let outcome = event_loop(&mut terminal, &mut session, &mut input_receiver, theme.as_ref()).await;
    cleanup_terminal(&mut terminal)?;
    outcome?;

    if session.is_complete() {
        info!("form completed");
    } else {
        info!("form abandoned before completion");
    }
    Ok(session.answers())
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    session: &mut FormSession,
    input_receiver: &mut mpsc::Receiver<Event>,
    theme: &dyn Theme,
) -> Result<()> {
    let fast_interval = Duration::from_millis(50);
    let idle_interval = Duration::from_millis(1000);
    let mut current_interval = idle_interval;
    let mut ticker = time::interval(current_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    terminal.draw(|frame| session.render(frame, theme))?;

    loop {
        let target_interval = if session.needs_fast_ticks() { fast_interval } else { idle_interval };
        if target_interval != current_interval {
            current_interval = target_interval;
            ticker = time::interval(current_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        }

        let mut needs_render = false;
        tokio::select! {
            maybe_event = input_receiver.recv() => {
                let Some(event) = maybe_event else {
                    // Input channel closed; shut down cleanly.
                    break;
                };
                if session.handle_terminal_event(event) == Control::Quit {
                    break;
                }
                needs_render = true;
            }
            _ = ticker.tick() => {
                needs_render = session.tick();
            }
            _ = signal::ctrl_c() => { break; }
        }

        if needs_render {
            terminal.draw(|frame| session.render(frame, theme))?;
        }
        if session.is_complete() {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ManualClock;
    use chatform_engine::FormDefinition;
    use chatform_types::{Tag, TagKind};
    use serde_json::json;
    use std::io::Write;

    const SETTLE: Duration = Duration::from_millis(1000);

    fn session(tags: Vec<Tag>) -> (ManualClock, FormSession) {
        let definition = FormDefinition {
            title: Some("Signup".into()),
            tags: tags.into_iter().map(Into::into).collect(),
        };
        let manager = FlowManager::new(definition).expect("valid definition");
        let clock = ManualClock::new();
        let session = FormSession::new(manager, InputConfig::default(), Rc::new(clock.clone()));
        (clock, session)
    }

    fn press(session: &mut FormSession, code: KeyCode) {
        session.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(session: &mut FormSession, text: &str) {
        for c in text.chars() {
            press(session, KeyCode::Char(c));
        }
    }

    fn settle(clock: &ManualClock, session: &mut FormSession) {
        clock.advance(SETTLE);
        assert!(session.tick());
    }

    #[test]
    fn keyboard_run_through_records_answers() {
        let (clock, mut session) = session(vec![
            Tag::new("name", TagKind::Text).required(),
            Tag::new("plan", TagKind::Radio).with_options(["Free", "Pro"]),
        ]);
        session.start();
        settle(&clock, &mut session);

        type_text(&mut session, "Ada");
        press(&mut session, KeyCode::Enter);
        assert!(!session.is_complete());
        assert_eq!(session.input().controls().elements().len(), 2);

        settle(&clock, &mut session);
        press(&mut session, KeyCode::Down);
        press(&mut session, KeyCode::Down);
        press(&mut session, KeyCode::Char(' '));

        assert!(session.is_complete());
        assert_eq!(session.answers(), json!({"name": "Ada", "plan": "Pro"}));
        assert_eq!(session.transcript().entries().len(), 4);
    }

    #[test]
    fn rejected_answer_recovers_with_typed_value() {
        let (clock, mut session) = session(vec![Tag::new("name", TagKind::Text).required()]);
        session.start();
        settle(&clock, &mut session);

        type_text(&mut session, "  ");
        press(&mut session, KeyCode::Enter);
        assert!(session.input().is_error_active());
        assert_eq!(session.input().surface().value(), "");

        clock.advance(Duration::from_millis(2000));
        session.tick();
        assert!(!session.input().is_error_active());
        assert_eq!(session.input().surface().value(), "  ");
        assert!(session.transcript().entries()[1].rejected);
    }

    #[test]
    fn typed_path_completes_an_upload_question() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"%PDF").expect("write file");
        let path = file.path().display().to_string();

        let (clock, mut session) = session(vec![Tag::new("resume", TagKind::File).required()]);
        session.start();
        settle(&clock, &mut session);

        type_text(&mut session, &path);
        press(&mut session, KeyCode::Enter);

        assert!(session.is_complete());
        let answers = session.answers();
        assert!(answers["resume"].to_string().contains(&*path));
    }

    #[test]
    fn escape_quits_and_focus_events_route_to_the_input() {
        let (clock, mut session) = session(vec![Tag::new("name", TagKind::Text)]);
        session.start();
        settle(&clock, &mut session);

        assert_eq!(session.handle_terminal_event(Event::FocusLost), Control::Continue);
        assert_eq!(session.input().focused_node(), NodeId::Outside);
        session.handle_terminal_event(Event::FocusGained);
        assert_eq!(session.input().focused_node(), NodeId::InputField);

        let esc = Event::Key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        assert_eq!(session.handle_terminal_event(esc), Control::Quit);
    }
}
