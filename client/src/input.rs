//! Keyboard intent tracking with overlapping-key resolution and de-duplication

use log::debug;
use macroquad::prelude::{get_keys_pressed, get_keys_released, is_key_down, KeyCode};
use shared::Direction;
use std::collections::HashSet;

/// The four movement bindings: two aliases per direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalKey {
    UpPrimary,
    DownPrimary,
    UpSecondary,
    DownSecondary,
}

impl LogicalKey {
    pub const ALL: [LogicalKey; 4] = [
        LogicalKey::UpPrimary,
        LogicalKey::DownPrimary,
        LogicalKey::UpSecondary,
        LogicalKey::DownSecondary,
    ];

    pub fn direction(self) -> Direction {
        match self {
            LogicalKey::UpPrimary | LogicalKey::UpSecondary => Direction::Up,
            LogicalKey::DownPrimary | LogicalKey::DownSecondary => Direction::Down,
        }
    }

    pub fn from_key_code(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::W => Some(LogicalKey::UpPrimary),
            KeyCode::S => Some(LogicalKey::DownPrimary),
            KeyCode::Up => Some(LogicalKey::UpSecondary),
            KeyCode::Down => Some(LogicalKey::DownSecondary),
            _ => None,
        }
    }

    /// Maps DOM-style key code names (`KeyW`, `ArrowUp`, ...).
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "KeyW" => Some(LogicalKey::UpPrimary),
            "KeyS" => Some(LogicalKey::DownPrimary),
            "ArrowUp" => Some(LogicalKey::UpSecondary),
            "ArrowDown" => Some(LogicalKey::DownSecondary),
            _ => None,
        }
    }

    fn index(self) -> usize {
        match self {
            LogicalKey::UpPrimary => 0,
            LogicalKey::DownPrimary => 1,
            LogicalKey::UpSecondary => 2,
            LogicalKey::DownSecondary => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: LogicalKey,
    /// true = pressed, false = released.
    pub pressed: bool,
}

impl KeyEvent {
    pub fn press(key: LogicalKey) -> Self {
        Self { key, pressed: true }
    }

    pub fn release(key: LogicalKey) -> Self {
        Self {
            key,
            pressed: false,
        }
    }
}

/// Which of the four bindings are currently held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyState {
    held: [bool; 4],
}

impl KeyState {
    pub fn is_held(&self, key: LogicalKey) -> bool {
        self.held[key.index()]
    }

    pub fn any_held(&self, direction: Direction) -> bool {
        LogicalKey::ALL
            .iter()
            .any(|key| key.direction() == direction && self.is_held(*key))
    }

    fn set(&mut self, key: LogicalKey, held: bool) {
        self.held[key.index()] = held;
    }
}

/// Turns key presses and releases into the single intent the server sees.
///
/// A press always points the paddle in the pressed key's direction. A release
/// falls back to the opposite direction when one of its keys is still held,
/// and to STOP otherwise. Only changes of the resolved intent are reported.
///
/// The tracker is inert until [`attach`](Self::attach) is called on the
/// start signal and again after [`detach`](Self::detach).
#[derive(Debug, Default)]
pub struct InputIntentTracker {
    keys: KeyState,
    last_sent: Direction,
    listening: bool,
}

impl InputIntentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self) {
        self.listening = true;
    }

    pub fn detach(&mut self) {
        self.listening = false;
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn keys(&self) -> &KeyState {
        &self.keys
    }

    pub fn last_sent(&self) -> Direction {
        self.last_sent
    }

    /// Applies one key event and returns the intent to transmit, if it changed.
    pub fn handle(&mut self, event: KeyEvent) -> Option<Direction> {
        if !self.listening {
            return None;
        }

        self.keys.set(event.key, event.pressed);
        let resolved = resolve(&self.keys, event);

        if resolved == self.last_sent {
            return None;
        }

        debug!("Intent {:?} -> {:?} on {:?}", self.last_sent, resolved, event);
        self.last_sent = resolved;
        Some(resolved)
    }
}

/// Intent after `event` has been applied to `keys`.
fn resolve(keys: &KeyState, event: KeyEvent) -> Direction {
    let direction = event.key.direction();
    if event.pressed {
        return direction;
    }

    let opposite = direction.opposite();
    if keys.any_held(opposite) {
        opposite
    } else {
        Direction::Stop
    }
}

/// Key transitions seen by the window since the previous frame.
pub fn poll_keyboard() -> Vec<KeyEvent> {
    frame_events(&get_keys_pressed(), &get_keys_released(), is_key_down)
}

/// Orders one frame's pressed and released sets into key events.
///
/// Presses come before releases so a tap inside one frame still registers.
/// A key in both sets was toggled twice; its pair is ordered so the last
/// event matches whether the key is down at the end of the frame.
pub fn frame_events(
    pressed: &HashSet<KeyCode>,
    released: &HashSet<KeyCode>,
    is_down: impl Fn(KeyCode) -> bool,
) -> Vec<KeyEvent> {
    let mut events = Vec::new();

    for code in pressed {
        let Some(key) = LogicalKey::from_key_code(*code) else {
            continue;
        };
        if !released.contains(code) {
            events.push(KeyEvent::press(key));
        } else if is_down(*code) {
            events.push(KeyEvent::release(key));
            events.push(KeyEvent::press(key));
        } else {
            events.push(KeyEvent::press(key));
            events.push(KeyEvent::release(key));
        }
    }

    let releases = released
        .iter()
        .filter(|code| !pressed.contains(*code))
        .filter_map(|code| LogicalKey::from_key_code(*code))
        .map(KeyEvent::release);
    events.extend(releases);

    events
}
