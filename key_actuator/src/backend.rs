//! Keyboard backends.
//!
//! A backend only knows physical keys; which game control a key means is
//! the [`Actuator`](crate::Actuator)'s business.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use log::{info, warn};

use crate::{ActuatorError, Key};

// ════════════════════════════════════════════════════════════════════════════
// KeyboardBackend
// ════════════════════════════════════════════════════════════════════════════

pub trait KeyboardBackend {
    fn name(&self) -> &'static str;
    fn key_down(&mut self, key: Key) -> Result<(), ActuatorError>;
    fn key_up(&mut self, key: Key) -> Result<(), ActuatorError>;
}

// ── null backend ──────────────────────────────────────────────────────────

pub struct NullBackend;

impl KeyboardBackend for NullBackend {
    fn name(&self) -> &'static str { "null" }
    fn key_down(&mut self, _key: Key) -> Result<(), ActuatorError> { Ok(()) }
    fn key_up(&mut self, _key: Key)   -> Result<(), ActuatorError> { Ok(()) }
}

// ── log backend ───────────────────────────────────────────────────────────

/// Logs each event at `info` instead of touching the OS.
pub struct LogBackend;

impl KeyboardBackend for LogBackend {
    fn name(&self) -> &'static str { "log" }

    fn key_down(&mut self, key: Key) -> Result<(), ActuatorError> {
        info!("key down: {}", key);
        Ok(())
    }

    fn key_up(&mut self, key: Key) -> Result<(), ActuatorError> {
        info!("key up:   {}", key);
        Ok(())
    }
}

// ── recording backend ─────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyEvent {
    Down(Key),
    Up(Key),
}

/// Appends every event to a shared list.  Clones share the same list, so a
/// test can keep one clone while the actuator owns another (possibly on a
/// different thread).
#[derive(Clone, Default)]
pub struct RecordingBackend {
    events: Arc<Mutex<Vec<KeyEvent>>>,
}

impl RecordingBackend {
    fn push(&self, event: KeyEvent) {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).push(event);
    }

    /// Everything recorded so far, oldest first.
    pub fn events(&self) -> Vec<KeyEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Keys that are down after replaying the recorded events.
    pub fn held(&self) -> Vec<Key> {
        let mut down = Vec::new();
        for ev in self.events() {
            match ev {
                KeyEvent::Down(k) => if !down.contains(&k) { down.push(k) },
                KeyEvent::Up(k)   => down.retain(|d| *d != k),
            }
        }
        down
    }
}

impl KeyboardBackend for RecordingBackend {
    fn name(&self) -> &'static str { "recording" }

    fn key_down(&mut self, key: Key) -> Result<(), ActuatorError> {
        self.push(KeyEvent::Down(key));
        Ok(())
    }

    fn key_up(&mut self, key: Key) -> Result<(), ActuatorError> {
        self.push(KeyEvent::Up(key));
        Ok(())
    }
}

// ── enigo backend (feature = "enigo") ─────────────────────────────────────

/// Real OS key events via `enigo`.
#[cfg(feature = "enigo")]
pub struct EnigoBackend {
    enigo: enigo::Enigo,
}

#[cfg(feature = "enigo")]
impl EnigoBackend {
    pub fn new() -> Self {
        EnigoBackend { enigo: enigo::Enigo::new() }
    }

    fn map(key: Key) -> enigo::Key {
        match key {
            Key::Char(c) => enigo::Key::Layout(c),
            Key::Space   => enigo::Key::Space,
            Key::Enter   => enigo::Key::Return,
            Key::Shift   => enigo::Key::Shift,
            Key::Left    => enigo::Key::LeftArrow,
            Key::Right   => enigo::Key::RightArrow,
            Key::Up      => enigo::Key::UpArrow,
            Key::Down    => enigo::Key::DownArrow,
        }
    }
}

#[cfg(feature = "enigo")]
impl Default for EnigoBackend {
    fn default() -> Self { Self::new() }
}

#[cfg(feature = "enigo")]
impl KeyboardBackend for EnigoBackend {
    fn name(&self) -> &'static str { "enigo" }

    fn key_down(&mut self, key: Key) -> Result<(), ActuatorError> {
        use enigo::KeyboardControllable;
        self.enigo.key_down(Self::map(key));
        Ok(())
    }

    fn key_up(&mut self, key: Key) -> Result<(), ActuatorError> {
        use enigo::KeyboardControllable;
        self.enigo.key_up(Self::map(key));
        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// open_backend — pick a backend by kind
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BackendKind {
    Null,
    #[default]
    Log,
    Enigo,
}

impl FromStr for BackendKind {
    type Err = ActuatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "null"  => Ok(BackendKind::Null),
            "log"   => Ok(BackendKind::Log),
            "enigo" => Ok(BackendKind::Enigo),
            _ => Err(ActuatorError::UnknownBackend(s.to_string())),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BackendKind::Null  => "null",
            BackendKind::Log   => "log",
            BackendKind::Enigo => "enigo",
        })
    }
}

/// Open the requested backend.
///
/// Falls back to [`LogBackend`] with a warning when the OS backend isn't
/// compiled in.
pub fn open_backend(kind: BackendKind) -> Box<dyn KeyboardBackend> {
    match kind {
        BackendKind::Null => Box::new(NullBackend),
        BackendKind::Log  => Box::new(LogBackend),
        BackendKind::Enigo => open_enigo(),
    }
}

#[cfg(feature = "enigo")]
fn open_enigo() -> Box<dyn KeyboardBackend> {
    info!("sending OS key events through enigo");
    Box::new(EnigoBackend::new())
}

#[cfg(not(feature = "enigo"))]
fn open_enigo() -> Box<dyn KeyboardBackend> {
    warn!("built without the `enigo` feature; key events will only be logged");
    warn!("rebuild with `--features enigo` to drive the game");
    Box::new(LogBackend)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_backend_kind() {
        assert_eq!("LOG".parse::<BackendKind>(), Ok(BackendKind::Log));
        assert_eq!("null".parse::<BackendKind>(), Ok(BackendKind::Null));
        assert_eq!("enigo".parse::<BackendKind>(), Ok(BackendKind::Enigo));
        assert!("uinput".parse::<BackendKind>().is_err());
    }

    #[test]
    fn open_named_backends() {
        assert_eq!(open_backend(BackendKind::Null).name(), "null");
        assert_eq!(open_backend(BackendKind::Log).name(), "log");
    }

    #[cfg(not(feature = "enigo"))]
    #[test]
    fn enigo_falls_back_to_log() {
        assert_eq!(open_backend(BackendKind::Enigo).name(), "log");
    }

    #[test]
    fn recording_clones_share_events() {
        let rec = RecordingBackend::default();
        let mut other = rec.clone();
        other.key_down(Key::Space).unwrap();
        assert_eq!(rec.events(), vec![KeyEvent::Down(Key::Space)]);
        assert_eq!(rec.held(), vec![Key::Space]);
        other.key_up(Key::Space).unwrap();
        assert!(rec.held().is_empty());
    }
}
