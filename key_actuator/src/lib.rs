//! # key_actuator
//!
//! The bridge from classifier [`KeyIntent`]s to keyboard events.
//!
//! [`Actuator`] maps each [`LogicalKey`] to a physical [`Key`] through
//! [`KeyBindings`], remembers which keys it is holding, and forwards the
//! resulting key-down / key-up events to a [`KeyboardBackend`].
//!
//! * Pressing a key that is already held does nothing.
//! * Releasing a key that is not held does nothing — never an error.
//! * Dropping the actuator releases everything still held, so a crashed or
//!   cancelled session never leaves the game running right forever.
//!
//! ## Backends
//!
//! | Backend | Use |
//! |---|---|
//! | [`NullBackend`] | discard everything |
//! | [`LogBackend`] | log each event (default dry run) |
//! | [`RecordingBackend`] | append to a shared list (tests) |
//! | `EnigoBackend` | real OS key events (feature `enigo`) |

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use log::{debug, warn};

pub use gesture_classifier::{KeyIntent, LogicalKey};

pub mod backend;

pub use backend::{
    open_backend, BackendKind, KeyEvent, KeyboardBackend, LogBackend, NullBackend,
    RecordingBackend,
};
#[cfg(feature = "enigo")]
pub use backend::EnigoBackend;

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ActuatorError {
    #[error("unknown key name {0:?}")]
    UnknownKey(String),
    #[error("unknown keyboard backend {0:?} (expected null, log or enigo)")]
    UnknownBackend(String),
    #[error("keyboard backend failed: {0}")]
    Backend(String),
}

// ════════════════════════════════════════════════════════════════════════════
// Key — a physical key
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// A printable key, stored lowercase.
    Char(char),
    Space,
    Enter,
    Shift,
    Left,
    Right,
    Up,
    Down,
}

impl FromStr for Key {
    type Err = ActuatorError;

    /// Accepts a single character (`"a"`) or a key name (`"space"`,
    /// `"left"`, …), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == " " {
            return Ok(Key::Space);
        }
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if !c.is_control() {
                return Ok(Key::Char(c.to_ascii_lowercase()));
            }
        }
        match trimmed.to_ascii_lowercase().as_str() {
            "space"           => Ok(Key::Space),
            "enter" | "return" => Ok(Key::Enter),
            "shift"           => Ok(Key::Shift),
            "left"            => Ok(Key::Left),
            "right"           => Ok(Key::Right),
            "up"              => Ok(Key::Up),
            "down"            => Ok(Key::Down),
            _ => Err(ActuatorError::UnknownKey(s.to_string())),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c),
            Key::Space   => f.write_str("space"),
            Key::Enter   => f.write_str("enter"),
            Key::Shift   => f.write_str("shift"),
            Key::Left    => f.write_str("left"),
            Key::Right   => f.write_str("right"),
            Key::Up      => f.write_str("up"),
            Key::Down    => f.write_str("down"),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// KeyBindings
// ════════════════════════════════════════════════════════════════════════════

/// Which physical key each game control is bound to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyBindings {
    pub left:  Key,
    pub right: Key,
    pub jump:  Key,
    pub stop:  Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        KeyBindings {
            left:  Key::Char('a'),
            right: Key::Char('d'),
            jump:  Key::Space,
            stop:  Key::Char('s'),
        }
    }
}

impl KeyBindings {
    pub fn key_for(&self, logical: LogicalKey) -> Key {
        match logical {
            LogicalKey::Left  => self.left,
            LogicalKey::Right => self.right,
            LogicalKey::Jump  => self.jump,
            LogicalKey::Stop  => self.stop,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Actuator
// ════════════════════════════════════════════════════════════════════════════

pub struct Actuator {
    bindings: KeyBindings,
    backend:  Box<dyn KeyboardBackend>,
    /// Logical keys currently held, with the physical key that was pressed
    /// (so a release always lifts what was actually pushed down).
    held:     HashMap<LogicalKey, Key>,
}

impl Actuator {
    pub fn new(bindings: KeyBindings, backend: Box<dyn KeyboardBackend>) -> Self {
        Actuator { bindings, backend, held: HashMap::new() }
    }

    pub fn backend_name(&self) -> &'static str { self.backend.name() }

    pub fn is_held(&self, logical: LogicalKey) -> bool { self.held.contains_key(&logical) }

    pub fn held_count(&self) -> usize { self.held.len() }

    /// Apply one intent.
    pub fn apply(&mut self, intent: KeyIntent) -> Result<(), ActuatorError> {
        match intent {
            KeyIntent::Press(logical) => {
                if self.held.contains_key(&logical) {
                    return Ok(());
                }
                let key = self.bindings.key_for(logical);
                self.backend.key_down(key)?;
                self.held.insert(logical, key);
                debug!("{} down ({})", key, logical.name());
            }
            KeyIntent::Release(logical) => {
                let Some(&key) = self.held.get(&logical) else { return Ok(()) };
                self.backend.key_up(key)?;
                self.held.remove(&logical);
                debug!("{} up ({})", key, logical.name());
            }
            KeyIntent::Tap(logical) => {
                let key = self.bindings.key_for(logical);
                self.backend.key_down(key)?;
                self.backend.key_up(key)?;
                debug!("{} tap ({})", key, logical.name());
            }
        }
        Ok(())
    }

    /// Release every held key.  Keeps going past failures and reports the
    /// first one.
    pub fn release_all(&mut self) -> Result<(), ActuatorError> {
        let mut first_err = None;
        let held: Vec<LogicalKey> = self.held.keys().copied().collect();
        for logical in held {
            if let Err(e) = self.apply(KeyIntent::Release(logical)) {
                warn!("could not release {}: {}", logical.name(), e);
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None    => Ok(()),
        }
    }
}

impl Drop for Actuator {
    fn drop(&mut self) {
        let _ = self.release_all();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn recording() -> (Actuator, RecordingBackend) {
        let rec = RecordingBackend::default();
        let act = Actuator::new(KeyBindings::default(), Box::new(rec.clone()));
        (act, rec)
    }

    #[test]
    fn parse_keys() {
        assert_eq!("a".parse::<Key>(), Ok(Key::Char('a')));
        assert_eq!("D".parse::<Key>(), Ok(Key::Char('d')));
        assert_eq!("space".parse::<Key>(), Ok(Key::Space));
        assert_eq!(" ".parse::<Key>(), Ok(Key::Space));
        assert_eq!("Left".parse::<Key>(), Ok(Key::Left));
        assert_eq!("return".parse::<Key>(), Ok(Key::Enter));
        assert!(matches!("banana".parse::<Key>(), Err(ActuatorError::UnknownKey(_))));
    }

    #[test]
    fn display_round_trips_names() {
        for k in [Key::Space, Key::Enter, Key::Shift, Key::Left, Key::Right, Key::Up, Key::Down, Key::Char('x')] {
            assert_eq!(k.to_string().parse::<Key>(), Ok(k));
        }
    }

    #[test]
    fn default_bindings_match_the_game() {
        let b = KeyBindings::default();
        assert_eq!(b.key_for(LogicalKey::Left), Key::Char('a'));
        assert_eq!(b.key_for(LogicalKey::Right), Key::Char('d'));
        assert_eq!(b.key_for(LogicalKey::Jump), Key::Space);
    }

    #[test]
    fn press_and_release() {
        let (mut act, rec) = recording();
        act.apply(KeyIntent::Press(LogicalKey::Right)).unwrap();
        assert!(act.is_held(LogicalKey::Right));
        act.apply(KeyIntent::Release(LogicalKey::Right)).unwrap();
        assert!(!act.is_held(LogicalKey::Right));
        assert_eq!(rec.events(), vec![KeyEvent::Down(Key::Char('d')), KeyEvent::Up(Key::Char('d'))]);
    }

    #[test]
    fn releasing_unheld_key_is_a_no_op() {
        let (mut act, rec) = recording();
        assert_eq!(act.apply(KeyIntent::Release(LogicalKey::Jump)), Ok(()));
        assert_eq!(act.apply(KeyIntent::Release(LogicalKey::Jump)), Ok(()));
        assert!(rec.events().is_empty());
    }

    #[test]
    fn double_press_emits_once() {
        let (mut act, rec) = recording();
        act.apply(KeyIntent::Press(LogicalKey::Jump)).unwrap();
        act.apply(KeyIntent::Press(LogicalKey::Jump)).unwrap();
        assert_eq!(rec.events(), vec![KeyEvent::Down(Key::Space)]);
    }

    #[test]
    fn tap_does_not_hold() {
        let (mut act, rec) = recording();
        act.apply(KeyIntent::Tap(LogicalKey::Stop)).unwrap();
        assert_eq!(act.held_count(), 0);
        assert_eq!(rec.events(), vec![KeyEvent::Down(Key::Char('s')), KeyEvent::Up(Key::Char('s'))]);
    }

    #[test]
    fn release_all_lifts_everything() {
        let (mut act, rec) = recording();
        act.apply(KeyIntent::Press(LogicalKey::Left)).unwrap();
        act.apply(KeyIntent::Press(LogicalKey::Jump)).unwrap();
        act.release_all().unwrap();
        assert_eq!(act.held_count(), 0);
        let ups = rec.events().iter().filter(|e| matches!(e, KeyEvent::Up(_))).count();
        assert_eq!(ups, 2);
    }

    #[test]
    fn drop_releases_held_keys() {
        let (mut act, rec) = recording();
        act.apply(KeyIntent::Press(LogicalKey::Right)).unwrap();
        drop(act);
        assert_eq!(rec.events().last(), Some(&KeyEvent::Up(Key::Char('d'))));
        assert!(rec.held().is_empty());
    }

    #[test]
    fn custom_bindings() {
        let rec = RecordingBackend::default();
        let bindings = KeyBindings { left: Key::Left, right: Key::Right, ..KeyBindings::default() };
        let mut act = Actuator::new(bindings, Box::new(rec.clone()));
        act.apply(KeyIntent::Press(LogicalKey::Left)).unwrap();
        assert_eq!(rec.events(), vec![KeyEvent::Down(Key::Left)]);
    }
}
