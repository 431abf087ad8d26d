//! Classifier tuning knobs.

use std::time::Duration;

use crate::Direction;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("history length must be at least 1")]
    EmptyHistory,
    #[error("{name} must be a finite, non-negative number (got {value})")]
    BadValue { name: &'static str, value: f32 },
    #[error("jump duration must be non-zero")]
    ZeroJumpDuration,
}

/// How the movement direction is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DirectionMode {
    /// From which half of the frame the torso is in.
    #[default]
    Tracked,
    /// Always the given direction.
    Fixed(Direction),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassifierConfig {
    /// Nose and wrists must all be strictly above this visibility.
    pub visibility_threshold:   f32,
    /// Number of frames in the movement history.
    pub history_length:         usize,
    /// Average per-frame movement (pixels) needed to count as moving.
    pub movement_per_frame:     f32,
    /// History sum (pixels) below which the subject counts as still and the
    /// thresholds recalibrate.
    pub calibration_movement:   f32,
    /// Distance (normalized) the stop/jump lines sit above hips/nose.
    pub calibration_margin:     f32,
    pub initial_stop_threshold: f32,
    pub initial_jump_threshold: f32,
    /// Minimum hold time of the jump key.
    pub jump_duration:          Duration,
    pub direction_mode:         DirectionMode,
    /// Also tap the stop key when the arms first drop.
    pub stop_tap:               bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            visibility_threshold:   0.7,
            history_length:         5,
            movement_per_frame:     40.0,
            calibration_movement:   50.0,
            calibration_margin:     0.05,
            initial_stop_threshold: 0.8,
            initial_jump_threshold: 0.2,
            jump_duration:          Duration::from_millis(500),
            direction_mode:         DirectionMode::Tracked,
            stop_tap:               false,
        }
    }
}

impl ClassifierConfig {
    /// History sum above which the subject counts as moving.
    pub fn diff_threshold(&self) -> f32 {
        self.history_length as f32 * self.movement_per_frame
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.history_length == 0 {
            return Err(ConfigError::EmptyHistory);
        }
        for (name, value) in [
            ("visibility_threshold", self.visibility_threshold),
            ("movement_per_frame",   self.movement_per_frame),
            ("calibration_movement", self.calibration_movement),
            ("calibration_margin",   self.calibration_margin),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::BadValue { name, value });
            }
        }
        if self.jump_duration.is_zero() {
            return Err(ConfigError::ZeroJumpDuration);
        }
        Ok(())
    }
}
