//! Headless presentation: gesture and advisory changes go to the log.

use gesture_classifier::{Advisory, Gesture};
use log::{info, warn};

use crate::session::{Presenter, Snapshot};

#[derive(Debug, Default)]
pub struct HeadlessPresenter {
    gesture:  Gesture,
    advisory: Option<Advisory>,
    /// Log lines emitted so far.
    lines:    u64,
}

impl HeadlessPresenter {
    pub fn new() -> Self { Self::default() }

    pub fn lines(&self) -> u64 { self.lines }
}

impl Presenter for HeadlessPresenter {
    fn present(&mut self, s: &Snapshot) -> bool {
        if s.advisory != self.advisory {
            match s.advisory {
                Some(a) => warn!("[frame {}] {}", s.frame_index, a),
                None    => info!("[frame {}] pose back in frame", s.frame_index),
            }
            self.advisory = s.advisory;
            self.lines += 1;
        }
        if s.gesture != self.gesture {
            info!(
                "[frame {}] {} {}  (stop={:.2} jump={:.2} move={:.0}/{:.0})",
                s.frame_index,
                s.gesture,
                s.gesture.glyph(),
                s.thresholds.stop(),
                s.thresholds.jump(),
                s.movement,
                s.diff_threshold,
            );
            self.gesture = s.gesture;
            self.lines += 1;
        }
        true
    }
}
