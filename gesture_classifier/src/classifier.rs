//! The per-frame gesture classifier.
//!
//! # Evaluation order
//!
//! Each [`GestureClassifier::tick`] runs, in this order:
//!
//! 1. visibility gate (nose + both wrists) — on failure nothing else runs
//! 2. movement history update
//! 3. threshold calibration (only while the subject is still)
//! 4. direction detection
//! 5. stop detection
//! 6. jump detection (skipped while stopped)
//! 7. movement handling, then jump release (both skipped while stopped)
//!
//! The order matters: calibration sees this frame's movement, and stop
//! detection releases the direction key before movement handling could
//! re-press it.

use std::time::Instant;

use log::{debug, trace};
use pose_model::{FrameSize, Pose, PoseLandmark};

use crate::{
    Advisory, ClassifierConfig, ConfigError, Direction, DirectionMode, Gesture,
    KeyIntent, LogicalKey, MovementHistory, Thresholds,
};

/// Result of classifying one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    pub gesture:  Gesture,
    /// Key changes to apply, in order.
    pub intents:  Vec<KeyIntent>,
    /// Set when the frame could not be classified.
    pub advisory: Option<Advisory>,
}

// ════════════════════════════════════════════════════════════════════════════
// GestureClassifier
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct GestureClassifier {
    config:        ClassifierConfig,

    // ── movement ──────────────────────────────────────────────────────────
    history:       MovementHistory,
    /// Total landmark height of the last gated frame; `None` until the first.
    prev_height:   Option<f32>,

    // ── calibration ──────────────────────────────────────────────────────
    thresholds:    Thresholds,

    // ── controller state ─────────────────────────────────────────────────
    direction:     Direction,
    /// Direction key currently held down, if any.
    held:          Option<Direction>,
    /// When the current jump started; `Some` while the jump key is down.
    jump_started:  Option<Instant>,
    stop_detected: bool,
    gesture:       Gesture,
}

impl GestureClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let direction = match config.direction_mode {
            DirectionMode::Fixed(d) => d,
            DirectionMode::Tracked  => Direction::default(),
        };
        Ok(GestureClassifier {
            history:       MovementHistory::new(config.history_length),
            prev_height:   None,
            thresholds:    Thresholds::new(config.initial_stop_threshold,
                                           config.initial_jump_threshold),
            direction,
            held:          None,
            jump_started:  None,
            stop_detected: false,
            gesture:       Gesture::None,
            config,
        })
    }

    // ── per-frame entry point ─────────────────────────────────────────────

    /// Classify one frame.
    ///
    /// `pose` is `None` when the estimator found nobody.  `now` is the
    /// capture time of the frame and drives the jump timer.
    pub fn tick(&mut self, pose: Option<&Pose>, frame: FrameSize, now: Instant) -> TickReport {
        let mut intents = Vec::new();

        let pose = match pose {
            None => return self.report(intents, Some(Advisory::NoPose)),
            Some(p) if !self.in_frame(p) => {
                return self.report(intents, Some(Advisory::PartiallyVisible));
            }
            Some(p) => p,
        };

        self.update_movement(pose, frame);
        self.calibrate(pose);
        self.detect_direction(pose, frame);
        self.detect_stop(pose, &mut intents);
        self.detect_jump(pose, now, &mut intents);

        if !self.stop_detected {
            self.handle_movement(&mut intents);
            if self.jump_started.is_some() {
                self.release_jump(now, &mut intents);
            }
        } else {
            self.gesture = Gesture::Stopped;
        }

        if !intents.is_empty() {
            debug!("gesture={} intents={:?}", self.gesture, intents);
        }
        self.report(intents, None)
    }

    fn report(&self, intents: Vec<KeyIntent>, advisory: Option<Advisory>) -> TickReport {
        TickReport { gesture: self.gesture, intents, advisory }
    }

    // ── visibility gate ───────────────────────────────────────────────────

    /// True when the nose and both wrists are confidently visible.
    pub fn in_frame(&self, pose: &Pose) -> bool {
        let min = self.config.visibility_threshold;
        [PoseLandmark::Nose, PoseLandmark::LeftWrist, PoseLandmark::RightWrist]
            .iter()
            .all(|&lm| pose[lm].visibility > min)
    }

    // ── movement tracking ─────────────────────────────────────────────────

    /// Push this frame's total vertical displacement onto the history.
    ///
    /// Height is the sum of every landmark's y in pixels, a crude measure of
    /// how much the whole body moved.  The first frame only sets the
    /// baseline and pushes 0; starting from a zero height instead would
    /// count the whole body as one huge movement and press a key at startup.
    pub fn update_movement(&mut self, pose: &Pose, frame: FrameSize) {
        let frame_h = frame.height as f32;
        let height: f32 = pose.iter().map(|lm| lm.y * frame_h).sum();
        let delta = match self.prev_height {
            Some(prev) => (height - prev).abs(),
            None       => 0.0,
        };
        self.history.push(delta);
        self.prev_height = Some(height);
        trace!("height={:.1} delta={:.1} sum={:.1}", height, delta, self.history.sum());
    }

    // ── calibration ──────────────────────────────────────────────────────

    /// While the subject is still, put the stop line just above the hips and
    /// the jump line just above the nose.
    pub fn calibrate(&mut self, pose: &Pose) {
        if self.history.sum() >= self.config.calibration_movement {
            return;
        }
        let margin = self.config.calibration_margin;
        let hip_y  = (pose[PoseLandmark::LeftHip].y + pose[PoseLandmark::RightHip].y) / 2.0;
        let nose_y = pose[PoseLandmark::Nose].y;
        self.thresholds = Thresholds::new(hip_y - margin, nose_y - margin);
    }

    // ── direction ─────────────────────────────────────────────────────────

    /// Left or right half of the frame, by the mean x of nose and shoulders.
    pub fn detect_direction(&mut self, pose: &Pose, frame: FrameSize) {
        if let DirectionMode::Fixed(d) = self.config.direction_mode {
            self.direction = d;
            return;
        }
        let xs = [
            pose[PoseLandmark::Nose].x,
            pose[PoseLandmark::LeftShoulder].x,
            pose[PoseLandmark::RightShoulder].x,
        ];
        let frame_w = frame.width as f32;
        let avg_px  = xs.iter().sum::<f32>() / xs.len() as f32 * frame_w;
        self.direction = if avg_px < frame_w / 2.0 { Direction::Left } else { Direction::Right };
    }

    // ── stop ──────────────────────────────────────────────────────────────

    /// Both wrists below the stop line: release the direction key and clear
    /// the movement history.
    pub fn detect_stop(&mut self, pose: &Pose, intents: &mut Vec<KeyIntent>) {
        let line = self.thresholds.stop();
        let lowered = pose[PoseLandmark::LeftWrist].y  > line
                   && pose[PoseLandmark::RightWrist].y > line;

        if lowered {
            if let Some(dir) = self.held.take() {
                intents.push(KeyIntent::Release(dir.key()));
                self.history.reset();
                self.gesture = Gesture::Stopped;
            }
            if !self.stop_detected && self.config.stop_tap {
                intents.push(KeyIntent::Tap(LogicalKey::Stop));
            }
        }
        self.stop_detected = lowered;
    }

    // ── jump ──────────────────────────────────────────────────────────────

    /// Nose above the jump line starts a timed jump.
    pub fn detect_jump(&mut self, pose: &Pose, now: Instant, intents: &mut Vec<KeyIntent>) {
        if self.stop_detected || self.jump_started.is_some() {
            return;
        }
        if pose[PoseLandmark::Nose].y < self.thresholds.jump() {
            self.jump_started = Some(now);
            intents.push(KeyIntent::Press(LogicalKey::Jump));
            self.gesture = Gesture::Jumping;
        }
    }

    /// Let go of the jump key once it has been held long enough.
    pub fn release_jump(&mut self, now: Instant, intents: &mut Vec<KeyIntent>) {
        let Some(started) = self.jump_started else { return };
        if now.saturating_duration_since(started) > self.config.jump_duration {
            self.jump_started = None;
            intents.push(KeyIntent::Release(LogicalKey::Jump));
            self.gesture = Gesture::None;
        }
    }

    // ── movement ─────────────────────────────────────────────────────────

    /// Hold the direction key while moving; release it when movement dies
    /// down.  Never holds more than one direction.
    pub fn handle_movement(&mut self, intents: &mut Vec<KeyIntent>) {
        if self.history.sum() > self.config.diff_threshold() {
            let want = self.direction;
            if self.held != Some(want) {
                if let Some(prev) = self.held.take() {
                    intents.push(KeyIntent::Release(prev.key()));
                }
                intents.push(KeyIntent::Press(want.key()));
                self.held = Some(want);
                self.gesture = want.moving();
            }
        } else if let Some(prev) = self.held.take() {
            intents.push(KeyIntent::Release(prev.key()));
            self.gesture = Gesture::Stopped;
        }
    }

    // ── shutdown ─────────────────────────────────────────────────────────

    /// Release everything held.  Used when the session ends.
    pub fn shutdown(&mut self) -> Vec<KeyIntent> {
        let mut intents = Vec::new();
        if let Some(dir) = self.held.take() {
            intents.push(KeyIntent::Release(dir.key()));
        }
        if self.jump_started.take().is_some() {
            intents.push(KeyIntent::Release(LogicalKey::Jump));
        }
        self.gesture = Gesture::None;
        intents
    }

    // ── accessors ─────────────────────────────────────────────────────────

    pub fn config(&self)           -> &ClassifierConfig  { &self.config }
    pub fn gesture(&self)          -> Gesture            { self.gesture }
    pub fn thresholds(&self)       -> Thresholds         { self.thresholds }
    pub fn direction(&self)        -> Direction          { self.direction }
    pub fn held_key(&self)         -> Option<LogicalKey> { self.held.map(Direction::key) }
    pub fn jump_in_progress(&self) -> bool               { self.jump_started.is_some() }
    pub fn stop_detected(&self)    -> bool               { self.stop_detected }
    pub fn history(&self)          -> &MovementHistory   { &self.history }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::time::Duration;
    use pose_model::{ArmPose, BodyModel, Landmark, Script, Action};

    const FRAME: FrameSize = FrameSize::new(640, 480);

    /// Calibration off, so thresholds stay where the test puts them.
    fn fixed_thresholds(stop: f32, jump: f32) -> ClassifierConfig {
        ClassifierConfig {
            calibration_movement:   0.0,
            initial_stop_threshold: stop,
            initial_jump_threshold: jump,
            ..ClassifierConfig::default()
        }
    }

    fn classifier(cfg: ClassifierConfig) -> GestureClassifier {
        GestureClassifier::new(cfg).unwrap()
    }

    /// Everything at mid-frame, fully visible.
    fn neutral_pose() -> Pose {
        Pose::uniform(Landmark::new(0.5, 0.5, 0.9))
    }

    fn with(mut pose: Pose, which: PoseLandmark, x: f32, y: f32, vis: f32) -> Pose {
        pose.set(which, Landmark::new(x, y, vis));
        pose
    }

    #[test]
    fn rejects_invalid_config() {
        let cfg = ClassifierConfig { history_length: 0, ..ClassifierConfig::default() };
        assert!(GestureClassifier::new(cfg).is_err());
    }

    // ── visibility gate ───────────────────────────────────────────────────

    #[test]
    fn partial_visibility_skips_classification() {
        let mut c = classifier(ClassifierConfig::default());
        let t0 = Instant::now();
        c.tick(Some(&neutral_pose()), FRAME, t0);
        let before = (c.gesture(), c.thresholds(), c.history().clone(), c.held_key());

        let pose = with(neutral_pose(), PoseLandmark::RightWrist, 0.5, 0.9, 0.5);
        let report = c.tick(Some(&pose), FRAME, t0 + Duration::from_millis(33));

        assert_eq!(report.advisory, Some(Advisory::PartiallyVisible));
        assert_eq!(report.advisory.unwrap().message(), "Make sure your upper body is fully visible");
        assert!(report.intents.is_empty());
        assert_eq!(before, (c.gesture(), c.thresholds(), c.history().clone(), c.held_key()));
    }

    #[test]
    fn visibility_must_exceed_threshold() {
        let c = classifier(ClassifierConfig::default());
        let at_limit = with(neutral_pose(), PoseLandmark::Nose, 0.5, 0.5, 0.7);
        assert!(!c.in_frame(&at_limit));
        let above = with(neutral_pose(), PoseLandmark::Nose, 0.5, 0.5, 0.71);
        assert!(c.in_frame(&above));
    }

    #[test]
    fn only_nose_and_wrists_matter_for_gate() {
        let c = classifier(ClassifierConfig::default());
        let hidden_hip = with(neutral_pose(), PoseLandmark::LeftHip, 0.5, 0.5, 0.0);
        assert!(c.in_frame(&hidden_hip));
    }

    #[test]
    fn missing_pose_reports_no_pose() {
        let mut c = classifier(ClassifierConfig::default());
        let report = c.tick(None, FRAME, Instant::now());
        assert_eq!(report.advisory, Some(Advisory::NoPose));
        assert!(report.intents.is_empty());
        assert_eq!(report.gesture, Gesture::None);
    }

    // ── movement tracking ─────────────────────────────────────────────────

    #[test]
    fn first_frame_seeds_baseline() {
        let mut c = classifier(ClassifierConfig::default());
        c.update_movement(&neutral_pose(), FRAME);
        assert_eq!(c.history().sum(), 0.0);
    }

    #[test]
    fn movement_is_total_pixel_displacement() {
        let mut c = classifier(ClassifierConfig::default());
        c.update_movement(&Pose::uniform(Landmark::new(0.5, 0.5, 1.0)), FRAME);
        c.update_movement(&Pose::uniform(Landmark::new(0.5, 0.4, 1.0)), FRAME);
        // 33 landmarks × 0.1 × 480 px
        assert!((c.history().latest() - 1584.0).abs() < 0.5);
        assert_eq!(c.history().len(), 5);
    }

    // ── calibration ──────────────────────────────────────────────────────

    #[test]
    fn calibrates_when_still() {
        let mut c = classifier(ClassifierConfig::default());
        let pose = BodyModel::default().pose();
        c.tick(Some(&pose), FRAME, Instant::now());
        let hip = (pose[PoseLandmark::LeftHip].y + pose[PoseLandmark::RightHip].y) / 2.0;
        assert!((c.thresholds().stop() - (hip - 0.05)).abs() < 1e-6);
        assert!((c.thresholds().jump() - (pose[PoseLandmark::Nose].y - 0.05)).abs() < 1e-6);
    }

    #[test]
    fn does_not_calibrate_while_moving() {
        let mut c = classifier(ClassifierConfig::default());
        c.history.push(60.0);
        c.calibrate(&BodyModel::default().pose());
        assert_eq!(c.thresholds(), Thresholds::new(0.8, 0.2));
    }

    #[test]
    fn calibrated_thresholds_are_clamped() {
        let mut c = classifier(ClassifierConfig::default());
        let wild = with(
            with(neutral_pose(), PoseLandmark::Nose, 0.5, -3.0, 0.9),
            PoseLandmark::LeftHip, 0.5, 7.0, 0.9,
        );
        let wild = with(wild, PoseLandmark::RightHip, 0.5, 9.0, 0.9);
        c.calibrate(&wild);
        assert_eq!(c.thresholds().stop(), 1.0);
        assert_eq!(c.thresholds().jump(), 0.0);
    }

    // ── direction ─────────────────────────────────────────────────────────

    #[test]
    fn direction_follows_torso_half() {
        let mut c = classifier(ClassifierConfig::default());
        c.detect_direction(&BodyModel::at(0.2).pose(), FRAME);
        assert_eq!(c.direction(), Direction::Left);
        c.detect_direction(&BodyModel::at(0.8).pose(), FRAME);
        assert_eq!(c.direction(), Direction::Right);
        // Exactly centred counts as right.
        c.detect_direction(&neutral_pose(), FRAME);
        assert_eq!(c.direction(), Direction::Right);
    }

    #[test]
    fn fixed_direction_ignores_pose() {
        let cfg = ClassifierConfig {
            direction_mode: DirectionMode::Fixed(Direction::Left),
            ..ClassifierConfig::default()
        };
        let mut c = classifier(cfg);
        c.detect_direction(&BodyModel::at(0.9).pose(), FRAME);
        assert_eq!(c.direction(), Direction::Left);
    }

    // ── scenarios ─────────────────────────────────────────────────────────

    #[test]
    fn jump_presses_then_releases_after_duration() {
        let mut c = classifier(fixed_thresholds(0.8, 0.2));
        let pose = with(neutral_pose(), PoseLandmark::Nose, 0.5, 0.1, 0.9);
        let t0 = Instant::now();

        let r = c.tick(Some(&pose), FRAME, t0);
        assert_eq!(r.intents, vec![KeyIntent::Press(LogicalKey::Jump)]);
        assert_eq!(r.gesture, Gesture::Jumping);

        let r = c.tick(Some(&pose), FRAME, t0 + Duration::from_millis(300));
        assert!(r.intents.is_empty());
        assert_eq!(r.gesture, Gesture::Jumping);
        assert!(c.jump_in_progress());

        let r = c.tick(Some(&pose), FRAME, t0 + Duration::from_millis(600));
        assert_eq!(r.intents, vec![KeyIntent::Release(LogicalKey::Jump)]);
        assert_eq!(r.gesture, Gesture::None);
        assert!(!c.jump_in_progress());
    }

    #[test]
    fn jump_released_exactly_once() {
        let mut c = classifier(fixed_thresholds(0.8, 0.2));
        let high = with(neutral_pose(), PoseLandmark::Nose, 0.5, 0.1, 0.9);
        let low  = neutral_pose();
        let t0 = Instant::now();

        let mut presses = 0;
        let mut releases = 0;
        let mut pressed_at = None;
        for i in 0..40u64 {
            let now = t0 + Duration::from_millis(i * 33);
            let pose = if i == 0 { &high } else { &low };
            for intent in c.tick(Some(pose), FRAME, now).intents {
                match intent {
                    KeyIntent::Press(LogicalKey::Jump) => { presses += 1; pressed_at = Some(now); }
                    KeyIntent::Release(LogicalKey::Jump) => {
                        releases += 1;
                        let held = now - pressed_at.unwrap();
                        assert!(held >= Duration::from_millis(500));
                    }
                    _ => {}
                }
            }
        }
        assert_eq!(presses, 1);
        assert_eq!(releases, 1);
    }

    #[test]
    fn lowered_arms_release_right_and_stop() {
        let mut c = classifier(fixed_thresholds(0.8, 0.2));
        c.held = Some(Direction::Right);
        c.gesture = Gesture::MovingRight;
        c.history.push(300.0);

        let pose = with(
            with(neutral_pose(), PoseLandmark::LeftWrist, 0.5, 0.85, 0.9),
            PoseLandmark::RightWrist, 0.5, 0.86, 0.9,
        );
        let r = c.tick(Some(&pose), FRAME, Instant::now());

        assert_eq!(r.intents, vec![KeyIntent::Release(LogicalKey::Right)]);
        assert_eq!(r.gesture, Gesture::Stopped);
        assert!(c.stop_detected());
        assert_eq!(c.held_key(), None);
        assert_eq!(c.history().sum(), 0.0);
    }

    #[test]
    fn movement_presses_left() {
        let mut c = classifier(ClassifierConfig::default());
        let pose = BodyModel::at(0.3).pose();
        let t0 = Instant::now();
        c.tick(Some(&pose), FRAME, t0);
        c.history.push(250.0);

        let r = c.tick(Some(&pose), FRAME, t0 + Duration::from_millis(33));
        assert_eq!(r.intents, vec![KeyIntent::Press(LogicalKey::Left)]);
        assert_eq!(r.gesture, Gesture::MovingLeft);
        assert_eq!(c.held_key(), Some(LogicalKey::Left));
    }

    #[test]
    fn switching_direction_releases_first() {
        let mut c = classifier(ClassifierConfig::default());
        c.held = Some(Direction::Right);
        c.direction = Direction::Left;
        c.history.push(500.0);
        let mut intents = Vec::new();
        c.handle_movement(&mut intents);
        assert_eq!(intents, vec![
            KeyIntent::Release(LogicalKey::Right),
            KeyIntent::Press(LogicalKey::Left),
        ]);
    }

    #[test]
    fn holding_same_direction_emits_nothing() {
        let mut c = classifier(ClassifierConfig::default());
        c.held = Some(Direction::Right);
        c.history.push(500.0);
        let mut intents = Vec::new();
        c.handle_movement(&mut intents);
        assert!(intents.is_empty());
    }

    #[test]
    fn movement_dying_down_releases() {
        let mut c = classifier(ClassifierConfig::default());
        c.held = Some(Direction::Left);
        let mut intents = Vec::new();
        c.handle_movement(&mut intents);
        assert_eq!(intents, vec![KeyIntent::Release(LogicalKey::Left)]);
        assert_eq!(c.gesture(), Gesture::Stopped);
    }

    #[test]
    fn no_jump_while_stopped() {
        let mut c = classifier(fixed_thresholds(0.8, 0.2));
        let pose = with(
            with(
                with(neutral_pose(), PoseLandmark::Nose, 0.5, 0.1, 0.9),
                PoseLandmark::LeftWrist, 0.5, 0.9, 0.9,
            ),
            PoseLandmark::RightWrist, 0.5, 0.9, 0.9,
        );
        let r = c.tick(Some(&pose), FRAME, Instant::now());
        assert!(r.intents.is_empty());
        assert_eq!(r.gesture, Gesture::Stopped);
        assert!(!c.jump_in_progress());
    }

    #[test]
    fn stop_tap_fires_on_rising_edge_only() {
        let cfg = ClassifierConfig { stop_tap: true, ..fixed_thresholds(0.8, 0.2) };
        let mut c = classifier(cfg);
        let lowered = with(
            with(neutral_pose(), PoseLandmark::LeftWrist, 0.5, 0.9, 0.9),
            PoseLandmark::RightWrist, 0.5, 0.9, 0.9,
        );
        let t0 = Instant::now();
        let r = c.tick(Some(&lowered), FRAME, t0);
        assert_eq!(r.intents, vec![KeyIntent::Tap(LogicalKey::Stop)]);
        let r = c.tick(Some(&lowered), FRAME, t0 + Duration::from_millis(33));
        assert!(r.intents.is_empty());
        // Raising the arms is enough movement to start running right...
        let r = c.tick(Some(&neutral_pose()), FRAME, t0 + Duration::from_millis(66));
        assert_eq!(r.intents, vec![KeyIntent::Press(LogicalKey::Right)]);
        // ...so dropping them again releases and taps.
        let r = c.tick(Some(&lowered), FRAME, t0 + Duration::from_millis(99));
        assert_eq!(r.intents, vec![
            KeyIntent::Release(LogicalKey::Right),
            KeyIntent::Tap(LogicalKey::Stop),
        ]);
    }

    #[test]
    fn shutdown_releases_everything() {
        let mut c = classifier(ClassifierConfig::default());
        c.held = Some(Direction::Left);
        c.jump_started = Some(Instant::now());
        let intents = c.shutdown();
        assert_eq!(intents, vec![
            KeyIntent::Release(LogicalKey::Left),
            KeyIntent::Release(LogicalKey::Jump),
        ]);
        assert!(c.shutdown().is_empty());
    }

    // ── properties over a long run ───────────────────────────────────────

    /// Drives the classifier through a pseudo-random walk of body states and
    /// checks the key-state invariants after every frame.
    #[test]
    fn invariants_hold_over_random_walk() {
        let mut c = classifier(ClassifierConfig::default());
        let mut held: HashSet<LogicalKey> = HashSet::new();
        let mut seed: u32 = 0x1234_5678;
        let mut next = || { seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223); seed >> 8 };
        let t0 = Instant::now();

        for i in 0..2000u64 {
            let r = next();
            let body = BodyModel {
                center_x: (r % 100) as f32 / 100.0,
                lift:     if r % 3 == 0 { -((r % 17) as f32) / 100.0 } else { 0.0 },
                arms:     if r % 11 == 0 { ArmPose::Lowered } else { ArmPose::Bent },
                right_hand_visibility: if r % 23 == 0 { 0.4 } else { 0.95 },
                ..BodyModel::default()
            };
            let pose = body.pose();
            let report = c.tick(
                if r % 29 == 0 { None } else { Some(&pose) },
                FRAME,
                t0 + Duration::from_millis(i * 33),
            );

            for intent in &report.intents {
                match *intent {
                    KeyIntent::Press(k) => assert!(held.insert(k), "double press of {:?}", k),
                    KeyIntent::Release(k) => assert!(held.remove(&k), "release of unheld {:?}", k),
                    KeyIntent::Tap(_) => {}
                }
            }

            let directions = held.iter()
                .filter(|k| matches!(k, LogicalKey::Left | LogicalKey::Right))
                .count();
            assert!(directions <= 1);

            let t = c.thresholds();
            assert!((0.0..=1.0).contains(&t.stop()));
            assert!((0.0..=1.0).contains(&t.jump()));
            assert_eq!(c.history().len(), 5);

            if c.stop_detected() {
                assert_eq!(c.held_key(), None);
                assert_eq!(report.gesture, Gesture::Stopped);
            }
        }
    }

    #[test]
    fn demo_script_exercises_every_gesture() {
        let script = Script::demo(30);
        let mut c = classifier(ClassifierConfig::default());
        let t0 = Instant::now();
        let mut seen = HashSet::new();
        let mut advisories = HashSet::new();

        for rec in script.records(FRAME) {
            let now = t0 + Duration::from_millis(rec.elapsed_ms);
            let r = c.tick(rec.pose.as_ref(), rec.frame, now);
            seen.insert(r.gesture);
            if let Some(a) = r.advisory { advisories.insert(a); }
        }

        for g in [Gesture::Jumping, Gesture::MovingLeft, Gesture::MovingRight, Gesture::Stopped] {
            assert!(seen.contains(&g), "demo never produced {:?}", g);
        }
        assert!(advisories.contains(&Advisory::NoPose));
        assert!(advisories.contains(&Advisory::PartiallyVisible));
        // The demo ends standing still, so nothing stays held.
        assert_eq!(c.held_key(), None);
    }

    #[test]
    fn standing_still_never_moves() {
        let script = Script::new(30).then(Action::Stand { center_x: 0.2 }, 3.0);
        let mut c = classifier(ClassifierConfig::default());
        let t0 = Instant::now();
        for rec in script.records(FRAME) {
            let r = c.tick(rec.pose.as_ref(), rec.frame, t0 + Duration::from_millis(rec.elapsed_ms));
            assert!(r.intents.is_empty());
        }
    }
}
