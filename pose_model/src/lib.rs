//! # pose_model
//!
//! Data model for single-person body poses as produced by a MediaPipe-style
//! pose estimator: 33 named landmarks, each with a normalized position and a
//! visibility score.
//!
//! Also provides:
//!
//! * [`FrameRecord`] — one line of the JSON-lines landmark stream that an
//!   external pose-estimation process writes to our stdin.
//! * [`BodyModel`] — a synthetic stick figure that produces plausible poses
//!   without a camera (simulation mode, demos, tests).
//! * [`Script`] — a deterministic choreography of body actions, rendered to
//!   a sequence of frame records.
//!
//! ## Coordinates
//!
//! `x` grows to the right and `y` grows downward, both normalized to the
//! frame (nominally 0.0–1.0, though estimators happily report values just
//! outside that range).  Frames are mirrored (selfie view): a user stepping
//! to their own right moves toward larger `x`.

use serde::{Deserialize, Serialize};
use std::ops::Index;

pub mod body;
pub mod script;

pub use body::{ArmPose, BodyModel};
pub use script::{Action, Script, Segment};

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, thiserror::Error)]
pub enum PoseError {
    #[error("pose must have exactly {expected} landmarks, got {got}")]
    LandmarkCount { expected: usize, got: usize },
}

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// A single body landmark.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    /// Confidence (0–1) that the point is actually visible and un-occluded.
    #[serde(default)]
    pub visibility: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, visibility: f32) -> Self {
        Landmark { x, y, visibility }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// PoseLandmark — the 33 MediaPipe pose indices
// ════════════════════════════════════════════════════════════════════════════

/// Number of landmarks in a full pose.
pub const POSE_LANDMARK_COUNT: usize = 33;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum PoseLandmark {
    Nose           = 0,
    LeftEyeInner   = 1,
    LeftEye        = 2,
    LeftEyeOuter   = 3,
    RightEyeInner  = 4,
    RightEye       = 5,
    RightEyeOuter  = 6,
    LeftEar        = 7,
    RightEar       = 8,
    MouthLeft      = 9,
    MouthRight     = 10,
    LeftShoulder   = 11,
    RightShoulder  = 12,
    LeftElbow      = 13,
    RightElbow     = 14,
    LeftWrist      = 15,
    RightWrist     = 16,
    LeftPinky      = 17,
    RightPinky     = 18,
    LeftIndex      = 19,
    RightIndex     = 20,
    LeftThumb      = 21,
    RightThumb     = 22,
    LeftHip        = 23,
    RightHip       = 24,
    LeftKnee       = 25,
    RightKnee      = 26,
    LeftAnkle      = 27,
    RightAnkle     = 28,
    LeftHeel       = 29,
    RightHeel      = 30,
    LeftFootIndex  = 31,
    RightFootIndex = 32,
}

impl PoseLandmark {
    pub const ALL: [PoseLandmark; POSE_LANDMARK_COUNT] = [
        PoseLandmark::Nose,
        PoseLandmark::LeftEyeInner,
        PoseLandmark::LeftEye,
        PoseLandmark::LeftEyeOuter,
        PoseLandmark::RightEyeInner,
        PoseLandmark::RightEye,
        PoseLandmark::RightEyeOuter,
        PoseLandmark::LeftEar,
        PoseLandmark::RightEar,
        PoseLandmark::MouthLeft,
        PoseLandmark::MouthRight,
        PoseLandmark::LeftShoulder,
        PoseLandmark::RightShoulder,
        PoseLandmark::LeftElbow,
        PoseLandmark::RightElbow,
        PoseLandmark::LeftWrist,
        PoseLandmark::RightWrist,
        PoseLandmark::LeftPinky,
        PoseLandmark::RightPinky,
        PoseLandmark::LeftIndex,
        PoseLandmark::RightIndex,
        PoseLandmark::LeftThumb,
        PoseLandmark::RightThumb,
        PoseLandmark::LeftHip,
        PoseLandmark::RightHip,
        PoseLandmark::LeftKnee,
        PoseLandmark::RightKnee,
        PoseLandmark::LeftAnkle,
        PoseLandmark::RightAnkle,
        PoseLandmark::LeftHeel,
        PoseLandmark::RightHeel,
        PoseLandmark::LeftFootIndex,
        PoseLandmark::RightFootIndex,
    ];

    pub fn index(self) -> usize { self as usize }
}

/// Bone pairs drawn by the visualizer.
pub const SKELETON: [(PoseLandmark, PoseLandmark); 14] = [
    (PoseLandmark::LeftShoulder,  PoseLandmark::RightShoulder),
    (PoseLandmark::LeftShoulder,  PoseLandmark::LeftElbow),
    (PoseLandmark::LeftElbow,     PoseLandmark::LeftWrist),
    (PoseLandmark::RightShoulder, PoseLandmark::RightElbow),
    (PoseLandmark::RightElbow,    PoseLandmark::RightWrist),
    (PoseLandmark::LeftShoulder,  PoseLandmark::LeftHip),
    (PoseLandmark::RightShoulder, PoseLandmark::RightHip),
    (PoseLandmark::LeftHip,       PoseLandmark::RightHip),
    (PoseLandmark::LeftHip,       PoseLandmark::LeftKnee),
    (PoseLandmark::LeftKnee,      PoseLandmark::LeftAnkle),
    (PoseLandmark::RightHip,      PoseLandmark::RightKnee),
    (PoseLandmark::RightKnee,     PoseLandmark::RightAnkle),
    (PoseLandmark::Nose,          PoseLandmark::LeftEye),
    (PoseLandmark::Nose,          PoseLandmark::RightEye),
];

// ════════════════════════════════════════════════════════════════════════════
// Pose
// ════════════════════════════════════════════════════════════════════════════

/// A complete set of 33 landmarks for one frame.
///
/// Serialized as a plain JSON array; deserialization checks the length.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Landmark>", into = "Vec<Landmark>")]
pub struct Pose {
    landmarks: [Landmark; POSE_LANDMARK_COUNT],
}

impl Pose {
    pub fn new(landmarks: [Landmark; POSE_LANDMARK_COUNT]) -> Self {
        Pose { landmarks }
    }

    /// A pose with every landmark at the same place and visibility.
    pub fn uniform(landmark: Landmark) -> Self {
        Pose { landmarks: [landmark; POSE_LANDMARK_COUNT] }
    }

    pub fn get(&self, which: PoseLandmark) -> &Landmark {
        &self.landmarks[which.index()]
    }

    pub fn set(&mut self, which: PoseLandmark, landmark: Landmark) {
        self.landmarks[which.index()] = landmark;
    }

    pub fn iter(&self) -> impl Iterator<Item = &Landmark> { self.landmarks.iter() }
}

impl Index<PoseLandmark> for Pose {
    type Output = Landmark;
    fn index(&self, which: PoseLandmark) -> &Landmark { self.get(which) }
}

impl TryFrom<Vec<Landmark>> for Pose {
    type Error = PoseError;

    fn try_from(v: Vec<Landmark>) -> Result<Self, Self::Error> {
        let got = v.len();
        let landmarks: [Landmark; POSE_LANDMARK_COUNT] = v.try_into()
            .map_err(|_| PoseError::LandmarkCount { expected: POSE_LANDMARK_COUNT, got })?;
        Ok(Pose { landmarks })
    }
}

impl From<Pose> for Vec<Landmark> {
    fn from(p: Pose) -> Self { p.landmarks.to_vec() }
}

// ════════════════════════════════════════════════════════════════════════════
// FrameSize / FrameRecord
// ════════════════════════════════════════════════════════════════════════════

/// Pixel dimensions of the captured frame the landmarks were measured in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width:  u32,
    pub height: u32,
}

impl FrameSize {
    pub const fn new(width: u32, height: u32) -> Self {
        FrameSize { width, height }
    }
}

impl Default for FrameSize {
    fn default() -> Self { FrameSize::new(640, 480) }
}

/// One frame of the landmark stream.
///
/// ```json
/// {"elapsed_ms":33,"frame":{"width":640,"height":480},"pose":[{"x":0.5,"y":0.3,"visibility":0.98}, …]}
/// ```
///
/// `pose` is `null` when the estimator found nobody in the frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Milliseconds since the start of the stream.
    pub elapsed_ms: u64,
    pub frame:      FrameSize,
    #[serde(default)]
    pub pose:       Option<Pose>,
}

impl FrameRecord {
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
