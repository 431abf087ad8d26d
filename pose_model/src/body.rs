//! Synthetic stick-figure body.
//!
//! Produces full 33-landmark poses from a handful of high-level parameters so
//! the controller can be driven without a camera.  Proportions are rough
//! averages for an adult standing a couple of metres from a webcam.

use crate::{Landmark, Pose, PoseLandmark, POSE_LANDMARK_COUNT};

/// Arm position, which is what the stop and jump gestures key off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ArmPose {
    /// Hands at chest height, elbows bent (the "ready" stance).
    #[default]
    Bent,
    /// Arms hanging straight down, wrists below the hips.
    Lowered,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BodyModel {
    /// Horizontal centre of the torso (normalized).
    pub center_x: f32,
    /// Nose height when standing still (normalized).
    pub nose_y:   f32,
    /// Vertical offset applied to every landmark; negative is up.
    pub lift:     f32,
    pub arms:     ArmPose,
    /// Visibility reported for everything except the hands.
    pub visibility:             f32,
    /// Visibility of the left wrist and its finger points.
    pub left_hand_visibility:   f32,
    /// Visibility of the right wrist and its finger points.
    pub right_hand_visibility:  f32,
}

impl Default for BodyModel {
    fn default() -> Self {
        BodyModel {
            center_x: 0.5,
            nose_y:   0.30,
            lift:     0.0,
            arms:     ArmPose::Bent,
            visibility:            0.98,
            left_hand_visibility:  0.95,
            right_hand_visibility: 0.95,
        }
    }
}

// Offsets from the nose, in normalized frame units.
const SHOULDER_DY: f32 = 0.12;
const SHOULDER_DX: f32 = 0.09;
const HIP_DY:      f32 = 0.35;
const HIP_DX:      f32 = 0.06;
const KNEE_DY:     f32 = 0.50;
const ANKLE_DY:    f32 = 0.63;
const HEEL_DY:     f32 = 0.65;
const FOOT_DY:     f32 = 0.66;
const FOOT_DX:     f32 = 0.08;

impl BodyModel {
    pub fn at(center_x: f32) -> Self {
        BodyModel { center_x, ..BodyModel::default() }
    }

    /// Elbow and wrist offsets `(elbow_dx, elbow_dy, wrist_dx, wrist_dy)`
    /// relative to the nose for the current arm pose.
    fn arm_offsets(&self) -> (f32, f32, f32, f32) {
        match self.arms {
            ArmPose::Bent    => (0.12, SHOULDER_DY + 0.12, 0.08, SHOULDER_DY + 0.08),
            ArmPose::Lowered => (0.11, SHOULDER_DY + 0.14, 0.10, 0.42),
        }
    }

    /// Render the body into a full pose.
    pub fn pose(&self) -> Pose {
        use PoseLandmark::*;

        let cx = self.center_x;
        let ny = self.nose_y + self.lift;
        let v  = self.visibility;
        let lv = self.left_hand_visibility;
        let rv = self.right_hand_visibility;

        let (edx, edy, wdx, wdy) = self.arm_offsets();

        // Left/right are the subject's own sides; in the mirrored frame the
        // subject's left side appears at larger x.
        let side = |dx: f32| (cx + dx, cx - dx);

        let mut lms = [Landmark::new(cx, ny, v); POSE_LANDMARK_COUNT];
        let mut put = |which: PoseLandmark, x: f32, y: f32, vis: f32| {
            lms[which.index()] = Landmark::new(x, y, vis);
        };

        put(Nose, cx, ny, v);

        let (l, r) = side(0.015);
        put(LeftEyeInner,  l, ny - 0.02, v);
        put(RightEyeInner, r, ny - 0.02, v);
        let (l, r) = side(0.025);
        put(LeftEye,  l, ny - 0.02, v);
        put(RightEye, r, ny - 0.02, v);
        let (l, r) = side(0.035);
        put(LeftEyeOuter,  l, ny - 0.02, v);
        put(RightEyeOuter, r, ny - 0.02, v);
        let (l, r) = side(0.05);
        put(LeftEar,  l, ny - 0.01, v);
        put(RightEar, r, ny - 0.01, v);
        let (l, r) = side(0.015);
        put(MouthLeft,  l, ny + 0.025, v);
        put(MouthRight, r, ny + 0.025, v);

        let (l, r) = side(SHOULDER_DX);
        put(LeftShoulder,  l, ny + SHOULDER_DY, v);
        put(RightShoulder, r, ny + SHOULDER_DY, v);

        let (l, r) = side(edx);
        put(LeftElbow,  l, ny + edy, v);
        put(RightElbow, r, ny + edy, v);

        let (l, r) = side(wdx);
        let wy = ny + wdy;
        put(LeftWrist,  l, wy, lv);
        put(RightWrist, r, wy, rv);
        // Finger points cluster just past the wrist.
        let (l, r) = side(wdx + 0.01);
        put(LeftPinky,  l, wy + 0.02, lv);
        put(RightPinky, r, wy + 0.02, rv);
        let (l, r) = side(wdx);
        put(LeftIndex,  l, wy + 0.025, lv);
        put(RightIndex, r, wy + 0.025, rv);
        let (l, r) = side(wdx - 0.01);
        put(LeftThumb,  l, wy + 0.015, lv);
        put(RightThumb, r, wy + 0.015, rv);

        let (l, r) = side(HIP_DX);
        put(LeftHip,    l, ny + HIP_DY,   v);
        put(RightHip,   r, ny + HIP_DY,   v);
        put(LeftKnee,   l, ny + KNEE_DY,  v);
        put(RightKnee,  r, ny + KNEE_DY,  v);
        put(LeftAnkle,  l, ny + ANKLE_DY, v);
        put(RightAnkle, r, ny + ANKLE_DY, v);
        put(LeftHeel,   l, ny + HEEL_DY,  v);
        put(RightHeel,  r, ny + HEEL_DY,  v);

        let (l, r) = side(FOOT_DX);
        put(LeftFootIndex,  l, ny + FOOT_DY, v);
        put(RightFootIndex, r, ny + FOOT_DY, v);

        Pose::new(lms)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bent_wrists_sit_above_hips() {
        let p = BodyModel::default().pose();
        let hip_y = (p[PoseLandmark::LeftHip].y + p[PoseLandmark::RightHip].y) / 2.0;
        assert!(p[PoseLandmark::LeftWrist].y  < hip_y - 0.05);
        assert!(p[PoseLandmark::RightWrist].y < hip_y - 0.05);
    }

    #[test]
    fn lowered_wrists_drop_below_hips() {
        let body = BodyModel { arms: ArmPose::Lowered, ..BodyModel::default() };
        let p = body.pose();
        let hip_y = p[PoseLandmark::LeftHip].y;
        assert!(p[PoseLandmark::LeftWrist].y  > hip_y);
        assert!(p[PoseLandmark::RightWrist].y > hip_y);
    }

    #[test]
    fn lift_moves_everything() {
        let still = BodyModel::default().pose();
        let up = BodyModel { lift: -0.1, ..BodyModel::default() }.pose();
        for (a, b) in still.iter().zip(up.iter()) {
            assert!((a.y - b.y - 0.1).abs() < 1e-6);
        }
    }

    #[test]
    fn mirrored_sides() {
        let p = BodyModel::at(0.3).pose();
        assert!(p[PoseLandmark::LeftShoulder].x > p[PoseLandmark::RightShoulder].x);
        let mid = (p[PoseLandmark::LeftShoulder].x + p[PoseLandmark::RightShoulder].x) / 2.0;
        assert!((mid - 0.3).abs() < 1e-6);
    }

    #[test]
    fn hand_visibility_is_per_side() {
        let body = BodyModel { right_hand_visibility: 0.5, ..BodyModel::default() };
        let p = body.pose();
        assert_eq!(p[PoseLandmark::RightWrist].visibility, 0.5);
        assert_eq!(p[PoseLandmark::RightThumb].visibility, 0.5);
        assert_eq!(p[PoseLandmark::LeftWrist].visibility, 0.95);
        assert_eq!(p[PoseLandmark::Nose].visibility, 0.98);
    }
}
