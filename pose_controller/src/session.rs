//! The session loop: frame → classifier → keys → presenter.
//!
//! A [`Session`] owns everything for one run and is the only thing that
//! touches the classifier.  Headless mode runs it on the main thread; windowed
//! mode runs it inside a [`Worker`](crate::worker::Worker).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use gesture_classifier::{
    Advisory, Direction, Gesture, GestureClassifier, KeyIntent, LogicalKey, Thresholds,
};
use key_actuator::Actuator;
use log::{debug, info, warn};
use pose_model::{FrameSize, Pose};

use crate::source::{PoseFrame, PoseSource, SourceError};
use crate::ControllerError;

// ════════════════════════════════════════════════════════════════════════════
// Snapshot
// ════════════════════════════════════════════════════════════════════════════

/// A copy of what the classifier saw and decided on one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub frame_index:    u64,
    pub frame_size:     FrameSize,
    pub pose:           Option<Pose>,
    pub gesture:        Gesture,
    pub advisory:       Option<Advisory>,
    pub thresholds:     Thresholds,
    pub direction:      Direction,
    pub held_key:       Option<LogicalKey>,
    pub jumping:        bool,
    pub stopped:        bool,
    /// Sum of the movement history (pixels).
    pub movement:       f32,
    /// Movement sum above which the subject counts as moving.
    pub diff_threshold: f32,
}

impl Snapshot {
    fn capture(index: u64, frame: &PoseFrame, c: &GestureClassifier, advisory: Option<Advisory>) -> Self {
        Snapshot {
            frame_index:    index,
            frame_size:     frame.size,
            pose:           frame.pose.clone(),
            gesture:        c.gesture(),
            advisory,
            thresholds:     c.thresholds(),
            direction:      c.direction(),
            held_key:       c.held_key(),
            jumping:        c.jump_in_progress(),
            stopped:        c.stop_detected(),
            movement:       c.history().sum(),
            diff_threshold: c.config().diff_threshold(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Presenter / StopFlag
// ════════════════════════════════════════════════════════════════════════════

/// Receives one snapshot per processed frame.  Returning `false` ends the
/// session (window closed, receiver gone, …).
pub trait Presenter {
    fn present(&mut self, snapshot: &Snapshot) -> bool;
}

/// Shared cancellation flag, polled once per loop iteration.
#[derive(Clone, Debug, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self { Self::default() }

    pub fn request(&self) { self.0.store(true, Ordering::SeqCst); }

    pub fn is_requested(&self) -> bool { self.0.load(Ordering::SeqCst) }
}

// ════════════════════════════════════════════════════════════════════════════
// SessionSummary
// ════════════════════════════════════════════════════════════════════════════

/// Why the loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    /// The stop flag was raised.
    Cancelled,
    /// The presenter asked to stop.
    Closed,
    /// The source ran out of frames.
    EndOfStream,
    /// The source's input side went away.
    Disconnected,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionSummary {
    pub frames:          u64,
    /// Frames that produced an advisory instead of a classification.
    pub advisory_frames: u64,
    pub gesture_changes: u64,
    /// Intents handed to the actuator (including the shutdown releases).
    pub intents:         u64,
    pub end:             SessionEnd,
}

// ════════════════════════════════════════════════════════════════════════════
// Session
// ════════════════════════════════════════════════════════════════════════════

pub struct Session<S, P> {
    source:     S,
    classifier: GestureClassifier,
    actuator:   Actuator,
    presenter:  P,
    stop:       StopFlag,

    frames:          u64,
    advisory_frames: u64,
    gesture_changes: u64,
    intents:         u64,
    last_gesture:    Gesture,
    last_advisory:   Option<Advisory>,
}

impl<S: PoseSource, P: Presenter> Session<S, P> {
    pub fn new(source: S, classifier: GestureClassifier, actuator: Actuator, presenter: P) -> Self {
        let last_gesture = classifier.gesture();
        Session {
            source,
            classifier,
            actuator,
            presenter,
            stop:            StopFlag::new(),
            frames:          0,
            advisory_frames: 0,
            gesture_changes: 0,
            intents:         0,
            last_gesture,
            last_advisory:   None,
        }
    }

    /// Use an externally owned stop flag.
    pub fn with_stop_flag(mut self, stop: StopFlag) -> Self {
        self.stop = stop;
        self
    }

    /// Run until cancelled, closed, or the source ends.
    ///
    /// Every exit path releases all held keys first.  A source failure other
    /// than end-of-stream is returned after that.
    pub fn run(mut self) -> Result<SessionSummary, ControllerError> {
        info!(
            "session started: source={} keys={}",
            self.source.name(),
            self.actuator.backend_name()
        );
        let outcome = self.run_loop();
        self.finish();

        let end = outcome?;
        let summary = SessionSummary {
            frames:          self.frames,
            advisory_frames: self.advisory_frames,
            gesture_changes: self.gesture_changes,
            intents:         self.intents,
            end,
        };
        info!(
            "session ended ({:?}) after {} frames, {} gesture changes",
            summary.end, summary.frames, summary.gesture_changes
        );
        Ok(summary)
    }

    fn run_loop(&mut self) -> Result<SessionEnd, ControllerError> {
        loop {
            if self.stop.is_requested() {
                return Ok(SessionEnd::Cancelled);
            }

            let frame = match self.source.next_frame() {
                Ok(f) => f,
                Err(SourceError::EndOfStream)  => return Ok(SessionEnd::EndOfStream),
                Err(SourceError::Disconnected) => return Ok(SessionEnd::Disconnected),
                Err(e) => return Err(e.into()),
            };

            let report = self.classifier.tick(frame.pose.as_ref(), frame.size, frame.timestamp);
            for intent in &report.intents {
                self.apply(*intent);
            }
            self.track(report.gesture, report.advisory);

            let snapshot = Snapshot::capture(self.frames, &frame, &self.classifier, report.advisory);
            self.frames += 1;
            if !self.presenter.present(&snapshot) {
                return Ok(SessionEnd::Closed);
            }
        }
    }

    fn apply(&mut self, intent: KeyIntent) {
        self.intents += 1;
        if let Err(e) = self.actuator.apply(intent) {
            warn!("{}: {}", intent, e);
        }
    }

    fn track(&mut self, gesture: Gesture, advisory: Option<Advisory>) {
        if gesture != self.last_gesture {
            debug!("gesture {} -> {}", self.last_gesture, gesture);
            self.gesture_changes += 1;
            self.last_gesture = gesture;
        }
        if advisory.is_some() {
            self.advisory_frames += 1;
        }
        if advisory != self.last_advisory {
            if let Some(a) = advisory {
                debug!("advisory: {}", a);
            }
            self.last_advisory = advisory;
        }
    }

    fn finish(&mut self) {
        for intent in self.classifier.shutdown() {
            self.apply(intent);
        }
        if let Err(e) = self.actuator.release_all() {
            warn!("could not release every key: {}", e);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
