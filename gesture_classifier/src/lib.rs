//! # gesture_classifier
//!
//! Turns a stream of body-landmark frames into discrete, debounced game
//! controls for a side-scroller.
//!
//! ## Gesture → Intent mapping
//!
//! | Gesture | Detection | Intent |
//! |---|---|---|
//! | Move | Total body movement over the last few frames above a threshold | Hold `Left` or `Right`, by which half of the frame the torso is in |
//! | Stop | Both wrists below the stop line (arms lowered) | Release the held direction |
//! | Jump | Nose above the jump line | Hold `Jump` for at least the jump duration |
//!
//! The stop and jump lines recalibrate themselves from the hips and nose
//! whenever the subject stands still, so distance from the camera and stance
//! don't matter.
//!
//! The classifier does no I/O: each [`GestureClassifier::tick`] returns the
//! [`KeyIntent`]s for the frame and the caller forwards them to whatever
//! drives the keyboard.

use std::fmt;

pub mod classifier;
pub mod config;
pub mod history;

pub use classifier::{GestureClassifier, TickReport};
pub use config::{ClassifierConfig, ConfigError, DirectionMode};
pub use history::MovementHistory;

// ════════════════════════════════════════════════════════════════════════════
// Gesture
// ════════════════════════════════════════════════════════════════════════════

/// The single label surfaced for the current frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Gesture {
    #[default]
    None,
    Stopped,
    Jumping,
    MovingLeft,
    MovingRight,
}

impl Gesture {
    pub fn label(self) -> &'static str {
        match self {
            Gesture::None        => "None",
            Gesture::Stopped     => "Stopped",
            Gesture::Jumping     => "Jumping",
            Gesture::MovingLeft  => "Moving Left",
            Gesture::MovingRight => "Moving Right",
        }
    }

    /// Short ASCII glyph shown next to the label.
    pub fn glyph(self) -> &'static str {
        match self {
            Gesture::None        => "",
            Gesture::Stopped     => "#",
            Gesture::Jumping     => "^",
            Gesture::MovingLeft  => "<-",
            Gesture::MovingRight => "->",
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Direction
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    #[default]
    Right,
}

impl Direction {
    pub fn key(self) -> LogicalKey {
        match self {
            Direction::Left  => LogicalKey::Left,
            Direction::Right => LogicalKey::Right,
        }
    }

    pub fn moving(self) -> Gesture {
        match self {
            Direction::Left  => Gesture::MovingLeft,
            Direction::Right => Gesture::MovingRight,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self { Direction::Left => "left", Direction::Right => "right" })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Keys and intents
// ════════════════════════════════════════════════════════════════════════════

/// Game controls, independent of which physical key each is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogicalKey {
    Left,
    Right,
    Jump,
    Stop,
}

impl LogicalKey {
    pub fn name(self) -> &'static str {
        match self {
            LogicalKey::Left  => "left",
            LogicalKey::Right => "right",
            LogicalKey::Jump  => "jump",
            LogicalKey::Stop  => "stop",
        }
    }
}

/// A request to change keyboard state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyIntent {
    Press(LogicalKey),
    Release(LogicalKey),
    /// Press and immediately release.
    Tap(LogicalKey),
}

impl fmt::Display for KeyIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyIntent::Press(k)   => write!(f, "press {}",   k.name()),
            KeyIntent::Release(k) => write!(f, "release {}", k.name()),
            KeyIntent::Tap(k)     => write!(f, "tap {}",     k.name()),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Advisory
// ════════════════════════════════════════════════════════════════════════════

/// Why a frame was not classified.  Never fatal; the next fully visible
/// frame resumes classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Advisory {
    NoPose,
    PartiallyVisible,
}

impl Advisory {
    pub fn message(self) -> &'static str {
        match self {
            Advisory::NoPose           => "No pose landmarks detected",
            Advisory::PartiallyVisible => "Make sure your upper body is fully visible",
        }
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Thresholds
// ════════════════════════════════════════════════════════════════════════════

/// Stop and jump lines in normalized frame coordinates, always in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thresholds {
    stop: f32,
    jump: f32,
}

impl Thresholds {
    /// Build thresholds, clamping both into [0, 1].  NaN clamps to 0.
    pub fn new(stop: f32, jump: f32) -> Self {
        Thresholds { stop: clamp_unit(stop), jump: clamp_unit(jump) }
    }

    /// Wrists below this line mean "stop".
    pub fn stop(&self) -> f32 { self.stop }

    /// Nose above this line means "jump".
    pub fn jump(&self) -> f32 { self.jump }
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
