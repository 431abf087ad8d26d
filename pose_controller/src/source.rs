//! Pose sources — where landmark frames come from.
//!
//! The session pulls frames through the [`PoseSource`] trait and doesn't
//! care whether they came from an external estimator, a script, or the
//! keyboard-driven simulator.

use std::io::{self, BufRead, BufReader, Stdin};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};
use pose_model::script::{JOG_BOB, JUMP_HEIGHT};
use pose_model::{ArmPose, BodyModel, FrameRecord, FrameSize, Pose, Script};

// ════════════════════════════════════════════════════════════════════════════
// PoseFrame / SourceError
// ════════════════════════════════════════════════════════════════════════════

/// One captured frame after landmark extraction.
#[derive(Clone, Debug)]
pub struct PoseFrame {
    pub size:      FrameSize,
    /// `None` when nobody was detected.
    pub pose:      Option<Pose>,
    /// Capture time; drives the jump timer.
    pub timestamp: Instant,
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Normal end of a finite source.
    #[error("end of pose stream")]
    EndOfStream,
    /// The simulator's input side went away.
    #[error("pose input disconnected")]
    Disconnected,
    #[error("could not read pose stream: {0}")]
    Io(#[from] io::Error),
    #[error("bad frame record on line {line}: {source}")]
    Parse { line: usize, source: serde_json::Error },
}

// ════════════════════════════════════════════════════════════════════════════
// PoseSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`PoseFrame`]s.  `next_frame` may block; it is
/// the only blocking call in the session loop.
pub trait PoseSource: Send {
    fn name(&self) -> &'static str;
    fn next_frame(&mut self) -> Result<PoseFrame, SourceError>;
}

impl<S: PoseSource + ?Sized> PoseSource for Box<S> {
    fn name(&self) -> &'static str { (**self).name() }
    fn next_frame(&mut self) -> Result<PoseFrame, SourceError> { (**self).next_frame() }
}

// ════════════════════════════════════════════════════════════════════════════
// ScriptedPoseSource
// ════════════════════════════════════════════════════════════════════════════

/// Replays a [`Script`].  Timestamps follow the script's frame rate whether
/// or not playback is paced, so classification is deterministic.
pub struct ScriptedPoseSource {
    script: Script,
    frame:  FrameSize,
    next:   usize,
    start:  Instant,
    /// Sleep so frames arrive in real time.
    paced:  bool,
}

impl ScriptedPoseSource {
    pub fn new(script: Script, frame: FrameSize, paced: bool) -> Self {
        ScriptedPoseSource { script, frame, next: 0, start: Instant::now(), paced }
    }
}

impl PoseSource for ScriptedPoseSource {
    fn name(&self) -> &'static str { "script" }

    fn next_frame(&mut self) -> Result<PoseFrame, SourceError> {
        if self.next >= self.script.frame_count() {
            return Err(SourceError::EndOfStream);
        }
        let timestamp = self.start + Duration::from_millis(self.script.elapsed_ms(self.next));
        if self.paced {
            let wait = timestamp.saturating_duration_since(Instant::now());
            if !wait.is_zero() { thread::sleep(wait); }
        }
        let pose = self.script.pose_at(self.next);
        self.next += 1;
        Ok(PoseFrame { size: self.frame, pose, timestamp })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// JsonLinesSource — external estimator
// ════════════════════════════════════════════════════════════════════════════

/// Reads one [`FrameRecord`] per line.  Blank lines are skipped.
pub struct JsonLinesSource<R> {
    reader:  R,
    line_no: usize,
    start:   Instant,
    buf:     String,
}

impl<R: BufRead + Send> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        JsonLinesSource { reader, line_no: 0, start: Instant::now(), buf: String::new() }
    }
}

impl JsonLinesSource<BufReader<Stdin>> {
    pub fn stdin() -> Self {
        JsonLinesSource::new(BufReader::new(io::stdin()))
    }
}

impl<R: BufRead + Send> PoseSource for JsonLinesSource<R> {
    fn name(&self) -> &'static str { "json-lines" }

    fn next_frame(&mut self) -> Result<PoseFrame, SourceError> {
        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Err(SourceError::EndOfStream);
            }
            self.line_no += 1;
            let line = self.buf.trim();
            if line.is_empty() {
                continue;
            }
            let rec = FrameRecord::from_json_line(line)
                .map_err(|source| SourceError::Parse { line: self.line_no, source })?;
            return Ok(PoseFrame {
                size:      rec.frame,
                pose:      rec.pose,
                timestamp: self.start + Duration::from_millis(rec.elapsed_ms),
            });
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimPoseSource — keyboard-driven synthetic body
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the simulation window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimInput {
    KeyDown(SimKey),
    KeyUp(SimKey),
}

/// Simulated body controls (mapped from minifb keys by the visualizer).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    StepLeft,      // ←
    StepRight,     // →
    Jog,           // Space (held)
    Jump,          // ↑
    LowerArms,     // ↓ (held)
    OccludeWrist,  // W (toggle)
    Leave,         // H (toggle)
}

const STEP:        f32 = 0.05;
const JUMP_SECONDS: f32 = 0.4;

/// Synthetic body whose stance follows [`SimInput`] events.
pub struct SimPoseSource {
    rx:       Receiver<SimInput>,
    body:     BodyModel,
    frame:    FrameSize,
    interval: Duration,
    next_due: Instant,
    tick:     u64,

    jogging:  bool,
    occluded: bool,
    hidden:   bool,
    /// Frames into the current jump arc.
    jump_at:  Option<u32>,
    jump_len: u32,
}

impl SimPoseSource {
    pub fn new(rx: Receiver<SimInput>, frame: FrameSize, fps: u32) -> Self {
        let fps = fps.max(1);
        SimPoseSource {
            rx,
            body:     BodyModel::default(),
            frame,
            interval: Duration::from_secs(1) / fps,
            next_due: Instant::now(),
            tick:     0,
            jogging:  false,
            occluded: false,
            hidden:   false,
            jump_at:  None,
            jump_len: ((fps as f32 * JUMP_SECONDS).round() as u32).max(2),
        }
    }

    fn handle(&mut self, input: SimInput) {
        match input {
            SimInput::KeyDown(SimKey::StepLeft) => {
                self.body.center_x = (self.body.center_x - STEP).max(0.1);
            }
            SimInput::KeyDown(SimKey::StepRight) => {
                self.body.center_x = (self.body.center_x + STEP).min(0.9);
            }
            SimInput::KeyDown(SimKey::Jog)       => self.jogging = true,
            SimInput::KeyUp(SimKey::Jog)         => self.jogging = false,
            SimInput::KeyDown(SimKey::LowerArms) => self.body.arms = ArmPose::Lowered,
            SimInput::KeyUp(SimKey::LowerArms)   => self.body.arms = ArmPose::Bent,
            SimInput::KeyDown(SimKey::Jump) => {
                if self.jump_at.is_none() { self.jump_at = Some(0); }
            }
            SimInput::KeyDown(SimKey::OccludeWrist) => self.occluded = !self.occluded,
            SimInput::KeyDown(SimKey::Leave)        => self.hidden = !self.hidden,
            SimInput::KeyUp(_) => {}
        }
        debug!("sim input {:?}", input);
    }

    /// Pose for the current tick, advancing the jump arc.
    fn current_pose(&mut self) -> Option<Pose> {
        let mut lift = 0.0;
        if self.jogging && self.tick % 2 == 1 {
            lift -= JOG_BOB;
        }
        if let Some(k) = self.jump_at {
            let t = (k as f32 + 0.5) / self.jump_len as f32;
            lift -= JUMP_HEIGHT * (std::f32::consts::PI * t).sin();
            self.jump_at = if k + 1 < self.jump_len { Some(k + 1) } else { None };
        }

        if self.hidden {
            return None;
        }
        let body = BodyModel {
            lift,
            right_hand_visibility: if self.occluded { 0.4 } else { self.body.right_hand_visibility },
            ..self.body.clone()
        };
        Some(body.pose())
    }

    fn pace(&mut self) {
        let now = Instant::now();
        if self.next_due > now {
            thread::sleep(self.next_due - now);
            self.next_due += self.interval;
        } else {
            // Fell behind; don't try to catch up with a burst of frames.
            self.next_due = now + self.interval;
        }
    }
}

impl PoseSource for SimPoseSource {
    fn name(&self) -> &'static str { "sim" }

    fn next_frame(&mut self) -> Result<PoseFrame, SourceError> {
        self.pace();
        loop {
            match self.rx.try_recv() {
                Ok(input) => self.handle(input),
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => {
                    info!("simulation input closed");
                    return Err(SourceError::Disconnected);
                }
            }
        }
        let pose = self.current_pose();
        self.tick += 1;
        Ok(PoseFrame { size: self.frame, pose, timestamp: Instant::now() })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
