//! Raw input-device events consumed by the input component.
//!
//! Terminals report key presses only, so a press is replayed as a
//! key-down/key-up pair; Shift+Tab arrives as `BackTab` and is expanded into
//! the Shift transitions around a Tab.

use chatform_types::Topic;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::ui::focus::NodeId;

/// Keys the input component distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Enter,
    Space,
    Tab,
    Shift,
    Backspace,
    Delete,
    Escape,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    Char(char),
}

impl Key {
    /// DOM-compatible numeric key code.
    pub fn key_code(&self) -> u32 {
        match self {
            Key::Backspace => 8,
            Key::Tab => 9,
            Key::Enter => 13,
            Key::Shift => 16,
            Key::Escape => 27,
            Key::Space => 32,
            Key::End => 35,
            Key::Home => 36,
            Key::Left => 37,
            Key::Up => 38,
            Key::Right => 39,
            Key::Down => 40,
            Key::Delete => 46,
            Key::Char(c) if c.is_ascii_alphabetic() => c.to_ascii_uppercase() as u32,
            Key::Char(c) => *c as u32,
        }
    }

    /// Character inserted by the key into a text field, if any.
    pub fn printable(&self) -> Option<char> {
        match self {
            Key::Space => Some(' '),
            Key::Char(c) if !c.is_control() => Some(*c),
            _ => None,
        }
    }
}

/// A key transition together with the node it originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStroke {
    pub key: Key,
    pub target: NodeId,
}

impl KeyStroke {
    pub fn new(key: Key, target: NodeId) -> Self {
        Self { key, target }
    }
}

/// Raw events delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    KeyDown(KeyStroke),
    KeyUp(KeyStroke),
    /// The terminal window regained focus.
    WindowFocus,
    /// The submit affordance was clicked.
    SubmitButtonClick,
}

impl InputEvent {
    pub fn topic(&self) -> Topic {
        match self {
            InputEvent::KeyDown(_) => Topic::KeyDown,
            InputEvent::KeyUp(_) => Topic::KeyUp,
            InputEvent::WindowFocus => Topic::WindowFocus,
            InputEvent::SubmitButtonClick => Topic::SubmitButtonClick,
        }
    }
}

/// Direction of a key transition produced by [`key_transitions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTransition {
    Down(Key),
    Up(Key),
}

/// Expands a terminal key event into down/up transitions.
pub fn key_transitions(event: KeyEvent) -> Vec<KeyTransition> {
    if event.kind == KeyEventKind::Release {
        return Vec::new();
    }
    let key = match event.code {
        KeyCode::BackTab => {
            return vec![
                KeyTransition::Down(Key::Shift),
                KeyTransition::Down(Key::Tab),
                KeyTransition::Up(Key::Tab),
                KeyTransition::Up(Key::Shift),
            ];
        }
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Esc => Key::Escape,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::Char(' ') => Key::Space,
        KeyCode::Char(c) => Key::Char(c),
        _ => return Vec::new(),
    };
    vec![KeyTransition::Down(key), KeyTransition::Up(key)]
}
