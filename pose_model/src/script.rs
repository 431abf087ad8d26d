//! Scripted choreography for the synthetic body.
//!
//! A [`Script`] is a list of timed [`Segment`]s.  Rendering it at a given
//! frame rate yields the frame records an estimator would have produced for
//! a person performing those actions.

use std::f32::consts::PI;

use crate::{BodyModel, ArmPose, FrameRecord, FrameSize, Pose};

/// Vertical bob per frame while jogging in place.
pub const JOG_BOB: f32 = 0.012;
/// Peak lift of a jump.
pub const JUMP_HEIGHT: f32 = 0.12;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    /// Stand still at `center_x`.
    Stand { center_x: f32 },
    /// Jog in place at `center_x`.
    Jog { center_x: f32 },
    /// One jump arc spanning the whole segment.
    Jump { center_x: f32 },
    /// Stand with arms hanging down.
    LowerArms { center_x: f32 },
    /// Stand with the right hand hidden behind the body.
    OccludeWrist { center_x: f32 },
    /// Nobody in frame.
    Leave,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub action: Action,
    pub frames: u32,
}

#[derive(Clone, Debug)]
pub struct Script {
    fps:      u32,
    segments: Vec<Segment>,
}

impl Script {
    pub fn new(fps: u32) -> Self {
        Script { fps: fps.max(1), segments: Vec::new() }
    }

    /// Append `action` lasting `seconds` (at least one frame).
    pub fn then(mut self, action: Action, seconds: f32) -> Self {
        let frames = ((seconds * self.fps as f32).round() as u32).max(1);
        self.segments.push(Segment { action, frames });
        self
    }

    /// A short session exercising every gesture: calibrate, run left, jump,
    /// stop, run right, lose a wrist, leave, come back and stand still.
    pub fn demo(fps: u32) -> Self {
        Script::new(fps)
            .then(Action::Stand        { center_x: 0.5 }, 1.0)
            .then(Action::Jog          { center_x: 0.3 }, 1.5)
            .then(Action::Jump         { center_x: 0.3 }, 0.4)
            .then(Action::Jog          { center_x: 0.3 }, 1.0)
            .then(Action::LowerArms    { center_x: 0.3 }, 1.0)
            .then(Action::Stand        { center_x: 0.7 }, 1.0)
            .then(Action::Jog          { center_x: 0.7 }, 1.5)
            .then(Action::OccludeWrist { center_x: 0.7 }, 0.5)
            .then(Action::Leave,                          0.5)
            .then(Action::Stand        { center_x: 0.7 }, 1.0)
    }

    pub fn segments(&self) -> &[Segment] { &self.segments }

    pub fn frame_count(&self) -> usize {
        self.segments.iter().map(|s| s.frames as usize).sum()
    }

    /// Milliseconds from the start of the script to frame `index`.
    pub fn elapsed_ms(&self, index: usize) -> u64 {
        index as u64 * 1000 / self.fps as u64
    }

    /// Pose at absolute frame `index`, or `None` past the end or while the
    /// subject is out of frame.
    pub fn pose_at(&self, index: usize) -> Option<Pose> {
        let mut start = 0usize;
        for seg in &self.segments {
            let len = seg.frames as usize;
            if index < start + len {
                return pose_for(seg.action, index - start, len);
            }
            start += len;
        }
        None
    }

    /// Render the whole script as frame records.
    pub fn records(&self, frame: FrameSize) -> impl Iterator<Item = FrameRecord> + '_ {
        (0..self.frame_count()).map(move |i| FrameRecord {
            elapsed_ms: self.elapsed_ms(i),
            frame,
            pose: self.pose_at(i),
        })
    }
}

/// Pose for frame `k` of a segment of `len` frames.
fn pose_for(action: Action, k: usize, len: usize) -> Option<Pose> {
    let body = match action {
        Action::Stand { center_x } => BodyModel::at(center_x),
        Action::Jog { center_x } => BodyModel {
            lift: if k % 2 == 0 { 0.0 } else { -JOG_BOB },
            ..BodyModel::at(center_x)
        },
        Action::Jump { center_x } => {
            let t = (k as f32 + 0.5) / len as f32;
            BodyModel {
                lift: -JUMP_HEIGHT * (PI * t).sin(),
                ..BodyModel::at(center_x)
            }
        }
        Action::LowerArms { center_x } => BodyModel {
            arms: ArmPose::Lowered,
            ..BodyModel::at(center_x)
        },
        Action::OccludeWrist { center_x } => BodyModel {
            right_hand_visibility: 0.5,
            ..BodyModel::at(center_x)
        },
        Action::Leave => return None,
    };
    Some(body.pose())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
